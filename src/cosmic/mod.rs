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

pub mod consts;

use crate::linalg::{Matrix3, Matrix6, Vector3};
use crate::time::Epoch;
use crate::ArgusError;
use std::fmt;

/// A Cartesian position and velocity in the TEME frame, tagged with the instant it represents.
///
/// States are value objects: propagation validity travels out-of-band (cf. the batch
/// propagation mask), so the only requirement here is finite components.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct State {
    /// The instant this state represents, in UTC.
    pub epoch: Epoch,
    /// Position in km.
    pub position_km: Vector3<f64>,
    /// Velocity in km/s.
    pub velocity_km_s: Vector3<f64>,
}

impl State {
    pub fn new(epoch: Epoch, position_km: Vector3<f64>, velocity_km_s: Vector3<f64>) -> Self {
        Self {
            epoch,
            position_km,
            velocity_km_s,
        }
    }

    /// Builds a state from the raw TEME arrays returned by the SGP4 propagator.
    pub fn from_teme(epoch: Epoch, position_km: [f64; 3], velocity_km_s: [f64; 3]) -> Self {
        Self {
            epoch,
            position_km: Vector3::from(position_km),
            velocity_km_s: Vector3::from(velocity_km_s),
        }
    }

    /// Magnitude of the position vector, in km.
    pub fn rmag_km(&self) -> f64 {
        self.position_km.norm()
    }

    /// Magnitude of the velocity vector, in km/s.
    pub fn vmag_km_s(&self) -> f64 {
        self.velocity_km_s.norm()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[TEME] {}\tposition = [{:.6}, {:.6}, {:.6}] km\tvelocity = [{:.6}, {:.6}, {:.6}] km/s",
            self.epoch,
            self.position_km[0],
            self.position_km[1],
            self.position_km[2],
            self.velocity_km_s[0],
            self.velocity_km_s[1],
            self.velocity_km_s[2],
        )
    }
}

/// Returns the direction cosine matrix rotating ECI coordinates into the RTN frame of the
/// provided state, with rows set to the radial, along-track, and cross-track unit vectors.
pub fn rtn_dcm(
    position_km: &Vector3<f64>,
    velocity_km_s: &Vector3<f64>,
) -> Result<Matrix3<f64>, ArgusError> {
    let rmag = position_km.norm();
    let h = position_km.cross(velocity_km_s);
    let hmag = h.norm();
    if rmag < f64::EPSILON || hmag < f64::EPSILON {
        return Err(ArgusError::IllConditioned(
            "cannot build an RTN frame from a degenerate state".to_string(),
        ));
    }
    let r_hat = position_km / rmag;
    let n_hat = h / hmag;
    let t_hat = n_hat.cross(&r_hat);
    Ok(Matrix3::from_rows(&[
        r_hat.transpose(),
        t_hat.transpose(),
        n_hat.transpose(),
    ]))
}

/// Rotates a 6x6 covariance expressed in the RTN frame of the provided ECI state into ECI.
///
/// The rotation is block diagonal: the same position DCM applies to the position and
/// velocity partitions. CDM covariances are delivered in RTN and must pass through here
/// before being combined by the probability engine.
pub fn rtn_to_eci_cov(
    position_km: &Vector3<f64>,
    velocity_km_s: &Vector3<f64>,
    cov_rtn: &Matrix6<f64>,
) -> Result<Matrix6<f64>, ArgusError> {
    let dcm = rtn_dcm(position_km, velocity_km_s)?;
    let mut rot = Matrix6::zeros();
    rot.fixed_view_mut::<3, 3>(0, 0).copy_from(&dcm);
    rot.fixed_view_mut::<3, 3>(3, 3).copy_from(&dcm);
    // C_eci = R^T C_rtn R, with R mapping ECI into RTN
    Ok(rot.transpose() * cov_rtn * rot)
}
