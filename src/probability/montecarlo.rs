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

use super::EncounterFrame;
use crate::linalg::{Matrix3, Vector3};
use rand_distr::{Distribution, Normal};
use rand_pcg::Pcg64Mcg;

/// Estimates the disk mass by sampling the three dimensional relative position
/// distribution and projecting every sample onto the encounter plane.
///
/// The covariance square root follows the SVD construction numpy uses for multivariate
/// normal sampling, which tolerates positive semidefinite (rank deficient) covariances.
/// The generator is a seeded 64-bit PCG, so identical seeds reproduce identical
/// estimates.
pub(crate) fn sample_bplane(
    rel_pos: &Vector3<f64>,
    frame: &EncounterFrame,
    cov_pos: &Matrix3<f64>,
    radius_km: f64,
    samples: u64,
    seed: u64,
) -> f64 {
    let eigenvalues = cov_pos.symmetric_eigenvalues();
    let scale = cov_pos.trace().abs().max(1e-30);
    if eigenvalues.min() < -1e-9 * scale {
        warn!("combined covariance is not positive semidefinite, reporting zero probability");
        return 0.0;
    }

    let svd = cov_pos.svd_unordered(true, false);
    let mut sqrt_factor = match svd.u {
        Some(u) => u,
        None => {
            warn!("covariance decomposition failed, reporting zero probability");
            return 0.0;
        }
    };
    for (i, mut col) in sqrt_factor.column_iter_mut().enumerate() {
        col *= svd.singular_values[i].max(0.0).sqrt();
    }

    let mut rng = Pcg64Mcg::new(seed as u128);
    let std_norm = Normal::new(0.0, 1.0).unwrap();

    let mut hits: u64 = 0;
    for _ in 0..samples {
        let z = Vector3::from_fn(|_, _| std_norm.sample(&mut rng));
        let sample = rel_pos + sqrt_factor * z;
        if frame.project_vector(&sample).norm() < radius_km {
            hits += 1;
        }
    }

    hits as f64 / samples as f64
}
