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

use super::ConjunctionEvent;
use crate::elements::ElementSet;
use crate::propagation::propagate_one;
use crate::time::{Epoch, Unit};
use crate::ArgusError;

/// Bracket width below which the search stops, in seconds.
const TCA_BRACKET_TOL_S: f64 = 1.0;

/// Events for the same ordered pair closer than this are considered duplicates.
const DEDUP_WINDOW_S: f64 = 300.0;

/// Inverse golden ratio, the section step of the bounded search.
const INV_PHI: f64 = 0.618_033_988_749_894_8;

/// Finds the minimum-distance instant inside a candidate window by golden-section search
/// on the pairwise distance, probing each instant with one direct propagation per object.
///
/// Returns the refined TCA, the miss distance in km, and the relative speed in km/s.
pub(crate) fn refine_window(
    primary: &ElementSet,
    secondary: &ElementSet,
    start: Epoch,
    end: Epoch,
) -> Result<(Epoch, f64, f64), ArgusError> {
    let mut a = 0.0_f64;
    let mut b = (end - start).to_seconds().max(0.0);

    if b > TCA_BRACKET_TOL_S {
        let mut c = b - INV_PHI * b;
        let mut d = INV_PHI * b;
        let mut dist_c = separation_km(primary, secondary, start + c * Unit::Second)?;
        let mut dist_d = separation_km(primary, secondary, start + d * Unit::Second)?;
        while b - a > TCA_BRACKET_TOL_S {
            if dist_c < dist_d {
                b = d;
                d = c;
                dist_d = dist_c;
                c = b - INV_PHI * (b - a);
                dist_c = separation_km(primary, secondary, start + c * Unit::Second)?;
            } else {
                a = c;
                c = d;
                dist_c = dist_d;
                d = a + INV_PHI * (b - a);
                dist_d = separation_km(primary, secondary, start + d * Unit::Second)?;
            }
        }
    }

    let tca = start + 0.5 * (a + b) * Unit::Second;
    let primary_state = propagate_one(primary, &[tca])?;
    let secondary_state = propagate_one(secondary, &[tca])?;
    let miss = (primary_state[0].position_km - secondary_state[0].position_km).norm();
    let rel_speed = (primary_state[0].velocity_km_s - secondary_state[0].velocity_km_s).norm();
    Ok((tca, miss, rel_speed))
}

fn separation_km(
    primary: &ElementSet,
    secondary: &ElementSet,
    t: Epoch,
) -> Result<f64, ArgusError> {
    let p = propagate_one(primary, &[t])?;
    let s = propagate_one(secondary, &[t])?;
    Ok((p[0].position_km - s[0].position_km).norm())
}

/// Collapses events for the same ordered pair whose TCAs lie within five minutes, keeping
/// the smaller miss. Builds a new list; the input records are never patched.
pub(crate) fn dedup_events(events: Vec<ConjunctionEvent>) -> Vec<ConjunctionEvent> {
    let mut reduced: Vec<ConjunctionEvent> = Vec::with_capacity(events.len());
    for event in events {
        let duplicate = reduced.iter_mut().find(|kept| {
            kept.primary_norad_id == event.primary_norad_id
                && kept.secondary_norad_id == event.secondary_norad_id
                && (kept.tca - event.tca).abs() < DEDUP_WINDOW_S * Unit::Second
        });
        match duplicate {
            Some(kept) => {
                if event.miss_distance_km < kept.miss_distance_km {
                    *kept = event;
                }
            }
            None => reduced.push(event),
        }
    }
    reduced
}
