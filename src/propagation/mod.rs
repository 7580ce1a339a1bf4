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

use crate::cosmic::State;
use crate::elements::ElementSet;
use crate::linalg::{Vector3, Vector6};
use crate::time::Epoch;
use crate::ArgusError;
use sgp4::MinutesSinceEpoch;

/// The result of propagating many objects to a single instant.
///
/// Row `i` holds `[x, y, z, vx, vy, vz]` in km and km/s for the `i`-th element set.
/// When `valid[i]` is false the propagator rejected that object at this instant and
/// row `i` is unspecified.
#[derive(Clone, Debug)]
pub struct BatchStates {
    pub states: Vec<Vector6<f64>>,
    pub valid: Vec<bool>,
}

impl BatchStates {
    /// Position columns of row `i`, in km.
    pub fn position_km(&self, i: usize) -> Vector3<f64> {
        self.states[i].fixed_rows::<3>(0).into_owned()
    }

    /// Velocity columns of row `i`, in km/s.
    pub fn velocity_km_s(&self, i: usize) -> Vector3<f64> {
        self.states[i].fixed_rows::<3>(3).into_owned()
    }
}

/// Propagates a single element set to each of the requested UTC instants.
///
/// Fails on the first instant the analytic model rejects, naming the object and the
/// offending instant.
pub fn propagate_one(element: &ElementSet, times: &[Epoch]) -> Result<Vec<State>, ArgusError> {
    let mut states = Vec::with_capacity(times.len());
    for &t in times {
        let prediction = element
            .constants
            .propagate(MinutesSinceEpoch(element.minutes_since_epoch(t)))
            .map_err(|e| ArgusError::Propagation {
                norad_id: element.norad_id,
                epoch: t,
                reason: format!("{e:?}"),
            })?;
        states.push(State::from_teme(t, prediction.position, prediction.velocity));
    }
    trace!(
        "propagated object {} to {} instant(s)",
        element.norad_id,
        times.len()
    );
    Ok(states)
}

/// Propagates every provided element set to a single UTC instant.
///
/// This call never fails: objects the analytic model rejects have their validity flag
/// cleared and their row zeroed. This is the vectorization point of the screening
/// pipeline, one call per coarse time step.
pub fn propagate_batch<'a, I>(elements: I, time: Epoch) -> BatchStates
where
    I: IntoIterator<Item = &'a ElementSet>,
{
    let mut states = Vec::new();
    let mut valid = Vec::new();
    for element in elements {
        match element
            .constants
            .propagate(MinutesSinceEpoch(element.minutes_since_epoch(time)))
        {
            Ok(prediction) => {
                let p = prediction.position;
                let v = prediction.velocity;
                states.push(Vector6::new(p[0], p[1], p[2], v[0], v[1], v[2]));
                valid.push(true);
            }
            Err(e) => {
                debug!(
                    "batch propagation: object {} rejected at {time}: {e:?}",
                    element.norad_id
                );
                states.push(Vector6::zeros());
                valid.push(false);
            }
        }
    }
    BatchStates { states, valid }
}
