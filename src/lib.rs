/*
    Argus, conjunction screening and collision probability for Earth orbit
    Copyright (C) 2023 Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

/*! # argus

Argus screens Earth satellites for close approaches against a catalog of tracked objects,
refines each time of closest approach to near-second precision, and estimates the probability
of collision when covariance data is available. Conjunction Data Messages (CCSDS 508.0-B-1)
are read in both KVN and XML encodings.
*/

/// Physical constants, Cartesian states, and the frame rotations shared by every subsystem.
pub mod cosmic;

/// Mean element sets and tolerant catalog parsing.
pub mod elements;

/// Analytic propagation entry points: single object at many times, or a whole catalog at one time.
pub mod propagation;

/// The multi-stage conjunction screening pipeline.
pub mod screening;

/// Collision probability estimation on the encounter plane.
pub mod probability;

/// Utility functions shared by different modules, and which may be useful to engineers.
pub mod utils;

mod errors;
/// Argus will (almost) never panic and functions which may fail will return an error.
pub use self::errors::ArgusError;

/// All the input/output needs for this library, including loading of CCSDS CDM files.
pub mod io;

#[macro_use]
extern crate log;

/// Re-export of hifitime
pub mod time {
    pub use hifitime::*;
}

/// Re-export nalgebra
pub mod linalg {
    pub use nalgebra::base::*;
}

/// Re-export some useful things
pub use self::cosmic::State;
pub use self::elements::ElementSet;
pub use self::probability::{compute_pc, PcMethod, PcResult};
pub use self::screening::{screen, screen_catalog, ConjunctionEvent};
