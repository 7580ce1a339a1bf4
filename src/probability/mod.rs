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

//! Collision probability estimation.
//!
//! The combined position covariance is projected onto the encounter plane, the plane
//! through the relative position perpendicular to the relative velocity at the time of
//! closest approach. The probability of collision is the mass of the projected bivariate
//! normal inside the combined hard-body disk, evaluated either by adaptive quadrature
//! (Foster's method) or by seeded Monte Carlo sampling of the three dimensional
//! distribution.

mod foster;
mod montecarlo;

use crate::linalg::{Matrix2, Matrix3, Matrix6, Vector2, Vector3};
use crate::ArgusError;
use std::fmt;

/// Default Monte Carlo sample count.
pub const DEFAULT_MC_SAMPLES: u64 = 100_000;

/// Default Monte Carlo seed, fixed for reproducibility unless the caller overrides it.
pub const DEFAULT_MC_SEED: u64 = 42;

/// Relative velocities under this floor collapse the encounter frame to an arbitrary
/// basis perpendicular to the relative position, in km/s.
const REL_VEL_FLOOR_KM_S: f64 = 1e-10;

/// A projected covariance whose determinant falls below this factor of its squared mean
/// eigenvalue is regularized before inversion.
const SINGULAR_DET_FACTOR: f64 = 1e-12;

/// Regularization strength, as a fraction of the projected covariance trace.
const REG_TRACE_FACTOR: f64 = 1e-9;

/// Collision probability calculation methods.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PcMethod {
    /// Analytic quadrature of the bivariate normal over the hard-body disk.
    Foster1992,
    /// Seeded sampling of the three dimensional combined position distribution.
    MonteCarlo,
}

impl fmt::Display for PcMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Foster1992 => write!(f, "FOSTER_1992"),
            Self::MonteCarlo => write!(f, "MONTE_CARLO"),
        }
    }
}

/// The result of a collision probability calculation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PcResult {
    /// Estimated collision probability, in [0, 1].
    pub probability: f64,
    /// Method used for the calculation.
    pub method: PcMethod,
    /// Combined hard-body radius, in meters.
    pub combined_hard_body_radius_m: f64,
    /// Mahalanobis distance of the projected miss, when the projected covariance is
    /// invertible. A large value flags a statistically remote (or ill conditioned)
    /// encounter.
    pub mahalanobis_distance: Option<f64>,
    /// Number of samples drawn, for the Monte Carlo method.
    pub samples: Option<u64>,
}

impl fmt::Display for PcResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Pc = {:.3e} ({}, R = {:.1} m)",
            self.probability, self.method, self.combined_hard_body_radius_m
        )
    }
}

/// The orthonormal pair spanning the encounter plane.
///
/// `x̂` lies along the component of the relative position perpendicular to the relative
/// velocity and `ŷ` completes the right-handed triad with the relative velocity
/// direction. Degenerate geometries fall back to an arbitrary orthonormal pair.
pub(crate) struct EncounterFrame {
    pub xhat: Vector3<f64>,
    pub yhat: Vector3<f64>,
}

impl EncounterFrame {
    pub fn new(rel_pos: &Vector3<f64>, rel_vel: &Vector3<f64>) -> Self {
        let vmag = rel_vel.norm();
        if vmag < REL_VEL_FLOOR_KM_S {
            return Self::perpendicular_to(rel_pos);
        }
        let zhat = rel_vel / vmag;
        let perp = rel_pos - rel_pos.dot(&zhat) * zhat;
        let xhat = if perp.norm() > 1e-12 {
            perp / perp.norm()
        } else {
            // Miss parallel to the relative velocity: any direction in the plane works.
            any_unit_normal_to(&zhat)
        };
        let yhat = zhat.cross(&xhat);
        Self { xhat, yhat }
    }

    /// An arbitrary orthonormal pair perpendicular to the provided vector.
    fn perpendicular_to(direction: &Vector3<f64>) -> Self {
        if direction.norm() < 1e-12 {
            return Self {
                xhat: Vector3::x(),
                yhat: Vector3::y(),
            };
        }
        let u = direction / direction.norm();
        let xhat = any_unit_normal_to(&u);
        let yhat = u.cross(&xhat);
        Self { xhat, yhat }
    }

    pub fn project_vector(&self, v: &Vector3<f64>) -> Vector2<f64> {
        Vector2::new(self.xhat.dot(v), self.yhat.dot(v))
    }

    pub fn project_covariance(&self, cov: &Matrix3<f64>) -> Matrix2<f64> {
        let cx = cov * self.xhat;
        let cy = cov * self.yhat;
        Matrix2::new(
            self.xhat.dot(&cx),
            self.xhat.dot(&cy),
            self.yhat.dot(&cx),
            self.yhat.dot(&cy),
        )
    }
}

fn any_unit_normal_to(u: &Vector3<f64>) -> Vector3<f64> {
    let trial = if u[2].abs() < 0.9 {
        Vector3::z()
    } else {
        Vector3::x()
    };
    let normal = u.cross(&trial);
    normal / normal.norm()
}

/// Computes the probability of collision between two objects at their time of closest
/// approach.
///
/// Positions are in km and velocities in km/s, both in ECI; the 6x6 covariances must
/// already be expressed in ECI (see [`crate::cosmic::rtn_to_eci_cov`] for CDM inputs) and
/// are combined by summation. The hard-body radius is in meters. `mc_samples` and `seed`
/// only apply to the Monte Carlo method and default to [`DEFAULT_MC_SAMPLES`] and
/// [`DEFAULT_MC_SEED`].
///
/// Ill conditioned covariances never raise: the result is returned with the probability
/// forced to zero or the Mahalanobis distance flagging the conditioning, per the library
/// error policy.
#[allow(clippy::too_many_arguments)]
pub fn compute_pc(
    pos1_km: &Vector3<f64>,
    vel1_km_s: &Vector3<f64>,
    pos2_km: &Vector3<f64>,
    vel2_km_s: &Vector3<f64>,
    cov1: &Matrix6<f64>,
    cov2: &Matrix6<f64>,
    hard_body_radius_m: f64,
    method: PcMethod,
    mc_samples: Option<u64>,
    seed: Option<u64>,
) -> Result<PcResult, ArgusError> {
    if !hard_body_radius_m.is_finite() || hard_body_radius_m <= 0.0 {
        return Err(ArgusError::InvalidParameter(format!(
            "hard body radius must be positive, got {hard_body_radius_m} m"
        )));
    }
    let samples = mc_samples.unwrap_or(DEFAULT_MC_SAMPLES);
    if method == PcMethod::MonteCarlo && samples == 0 {
        return Err(ArgusError::InvalidParameter(
            "Monte Carlo requires at least one sample".to_string(),
        ));
    }

    let hbr_km = hard_body_radius_m / 1000.0;
    let rel_pos = pos1_km - pos2_km;
    let rel_vel = vel1_km_s - vel2_km_s;
    let combined = cov1 + cov2;
    let cov_pos: Matrix3<f64> = combined.fixed_view::<3, 3>(0, 0).into_owned();

    let zero_pc = |mahalanobis: Option<f64>| PcResult {
        probability: 0.0,
        method,
        combined_hard_body_radius_m: hard_body_radius_m,
        mahalanobis_distance: mahalanobis,
        samples: None,
    };

    let trace = cov_pos.trace();
    if !trace.is_finite() || trace <= 0.0 {
        warn!("combined position covariance has no extent, reporting zero probability");
        return Ok(zero_pc(None));
    }

    let frame = EncounterFrame::new(&rel_pos, &rel_vel);
    let miss_b = frame.project_vector(&rel_pos);
    let mut sigma_b = frame.project_covariance(&cov_pos);

    let b_trace = sigma_b.trace();
    if sigma_b.determinant() <= SINGULAR_DET_FACTOR * (0.5 * b_trace).powi(2) {
        let eps = REG_TRACE_FACTOR * b_trace;
        sigma_b += Matrix2::identity() * eps;
        warn!("projected covariance is near singular, regularized by {eps:.3e}");
    }

    let mahalanobis = match sigma_b.try_inverse() {
        Some(inv) => (inv * miss_b).dot(&miss_b).max(0.0).sqrt(),
        None => {
            warn!("projected covariance not invertible after regularization, reporting zero probability");
            return Ok(zero_pc(None));
        }
    };

    let (probability, samples_used) = match method {
        PcMethod::Foster1992 => (foster::integrate_disk(&miss_b, &sigma_b, hbr_km), None),
        PcMethod::MonteCarlo => (
            montecarlo::sample_bplane(
                &rel_pos,
                &frame,
                &cov_pos,
                hbr_km,
                samples,
                seed.unwrap_or(DEFAULT_MC_SEED),
            ),
            Some(samples),
        ),
    };

    debug!("Pc = {probability:.3e} via {method}, Mahalanobis distance {mahalanobis:.3}");
    Ok(PcResult {
        probability,
        method,
        combined_hard_body_radius_m: hard_body_radius_m,
        mahalanobis_distance: Some(mahalanobis),
        samples: samples_used,
    })
}
