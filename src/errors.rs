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

use crate::time::Epoch;
use thiserror::Error;

/// Represents all possible errors that can occur in the Argus library.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArgusError {
    /// Occurs when an element set or CCSDS message cannot be decoded. The location is a line or field name.
    #[error("parse error at {location}: {reason}")]
    Parse { location: String, reason: String },

    /// Occurs when the analytic propagator rejects a requested instant.
    #[error("SGP4 rejected object {norad_id} at {epoch}: {reason}")]
    Propagation {
        norad_id: u64,
        epoch: Epoch,
        reason: String,
    },

    /// Occurs when a covariance is ill conditioned beyond what regularization can absorb.
    #[error("numerical conditioning error: {0}")]
    IllConditioned(String),

    /// Occurs when a caller supplies an invalid parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Occurs when an operation is declared but not available in this version.
    #[error("not implemented: {0}")]
    NotImplemented(String),
}
