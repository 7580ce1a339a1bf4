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

use crate::linalg::{Matrix2, Vector2};
use crate::utils::adaptive_simpson;
use std::f64::consts::{PI, TAU};

/// Integrates the bivariate normal density, centered at the projected miss with the
/// projected covariance, over the hard-body disk at the origin.
///
/// The integration runs in polar coordinates: an adaptive sweep in angle per radius ring,
/// and an adaptive sweep over the radius. A first coarse pass sets the scale so the
/// second pass meets a 1e-6 relative tolerance.
pub(crate) fn integrate_disk(
    miss_b: &Vector2<f64>,
    sigma_b: &Matrix2<f64>,
    radius_km: f64,
) -> f64 {
    let det = sigma_b.determinant();
    if det <= 0.0 {
        return 0.0;
    }
    let inv = match sigma_b.try_inverse() {
        Some(inv) => inv,
        None => return 0.0,
    };

    let norm_factor = 1.0 / (TAU * det.sqrt());
    let density = move |x: f64, y: f64| -> f64 {
        let d = Vector2::new(x - miss_b[0], y - miss_b[1]);
        norm_factor * (-0.5 * (inv * d).dot(&d)).exp()
    };

    // Density at the disk point nearest the mean bounds the integrand on the whole disk
    // closely enough to anchor the quadrature tolerances.
    let miss_norm = miss_b.norm();
    let peak = if miss_norm <= radius_km {
        norm_factor
    } else {
        let edge = miss_b * (radius_km / miss_norm);
        density(edge[0], edge[1])
    };
    if peak <= 0.0 {
        // The density underflows everywhere inside the disk.
        return 0.0;
    }

    let inner_tol = 1e-9 * TAU * peak;
    let ring = |rho: f64| -> f64 {
        if rho <= 0.0 {
            return 0.0;
        }
        rho * adaptive_simpson(
            &|theta: f64| density(rho * theta.cos(), rho * theta.sin()),
            0.0,
            TAU,
            inner_tol,
        )
    };

    let coarse = adaptive_simpson(&ring, 0.0, radius_km, 1e-4 * PI * radius_km.powi(2) * peak);
    if coarse <= 0.0 {
        return 0.0;
    }
    let refined = adaptive_simpson(&ring, 0.0, radius_km, 1e-6 * coarse);
    refined.clamp(0.0, 1.0)
}
