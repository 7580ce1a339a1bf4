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

//! Physical constants and default thresholds. Every subsystem consumes these from here
//! rather than redefining its own values.

/// Equatorial radius of Earth (WGS-84), in km.
pub const EARTH_RADIUS_KM: f64 = 6378.137;

/// Earth gravitational parameter GM, in km^3/s^2.
pub const EARTH_MU_KM3_S2: f64 = 398600.4418;

/// Earth J2 oblateness coefficient.
pub const EARTH_J2: f64 = 1.082_626_68e-3;

/// Earth rotation rate, in rad/s.
pub const EARTH_ROTATION_RAD_S: f64 = 7.292_115_0e-5;

/// Default miss distance threshold for conjunction screening, in km.
pub const DEFAULT_MISS_DISTANCE_KM: f64 = 10.0;

/// Default collision probability threshold for alerting.
pub const DEFAULT_PC_THRESHOLD: f64 = 1e-4;

/// Default forward screening window, in days.
pub const DEFAULT_SCREENING_WINDOW_DAYS: f64 = 7.0;

/// Default coarse screening cadence, in minutes.
pub const DEFAULT_STEP_MINUTES: f64 = 10.0;

/// Hard-body radius for small satellites (under 100 kg), in meters.
pub const HARD_BODY_RADIUS_SMALL_M: f64 = 1.0;

/// Hard-body radius for medium satellites (100 to 1000 kg), in meters.
pub const HARD_BODY_RADIUS_MEDIUM_M: f64 = 5.0;

/// Hard-body radius for large satellites and upper stages, in meters.
pub const HARD_BODY_RADIUS_LARGE_M: f64 = 20.0;

/// Maximum altitude for Low Earth Orbit, in km.
pub const LEO_MAX_ALT_KM: f64 = 2000.0;

/// Geostationary orbit altitude, in km.
pub const GEO_ALT_KM: f64 = 35786.0;
