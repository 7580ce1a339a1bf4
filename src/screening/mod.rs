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

//! The screening pipeline narrows an N by M candidate space down to refined conjunction
//! events in three stages: a geometric prefilter on apogee/perigee shells, a coarse
//! time-stepped sweep over batched propagations, and a bounded search refinement of each
//! candidate window.

mod catalog;
mod kdtree;
mod refine;

pub use catalog::{filter_stale_elements, screen_catalog};
pub use kdtree::KdTree;

use crate::elements::ElementSet;
use crate::propagation::propagate_batch;
use crate::time::{Epoch, TimeSeries, Unit};
use crate::ArgusError;
use refine::{dedup_events, refine_window};
use std::collections::BTreeMap;
use std::fmt;

/// A predicted close approach between two tracked objects.
///
/// Events are value objects: deduplication and sorting build new lists instead of
/// patching records in place.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConjunctionEvent {
    /// NORAD catalog number of the primary (protected) object.
    pub primary_norad_id: u64,
    /// NORAD catalog number of the secondary object.
    pub secondary_norad_id: u64,
    /// Time of closest approach, in UTC.
    pub tca: Epoch,
    /// Predicted miss distance, in km.
    pub miss_distance_km: f64,
    /// Relative speed at the time of closest approach, in km/s.
    pub relative_speed_km_s: f64,
}

impl fmt::Display for ConjunctionEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} x {}: {:.4} km at {} ({:.3} km/s)",
            self.primary_norad_id,
            self.secondary_norad_id,
            self.miss_distance_km,
            self.tca,
            self.relative_speed_km_s
        )
    }
}

/// Screens one or more primary objects against a catalog over a forward window anchored
/// at each primary's epoch.
///
/// Candidates whose altitude shell cannot come within `threshold_km` of the primary's
/// are rejected outright. The survivors are swept at `step_minutes` cadence with one
/// batched propagation per step, and every under-threshold encounter window is refined
/// by bounded search down to a one second bracket. Events for the same pair within five
/// minutes are collapsed to the smallest miss. The returned list is sorted by miss
/// distance, ascending.
pub fn screen(
    primaries: &[ElementSet],
    catalog: &[ElementSet],
    days: f64,
    threshold_km: f64,
    step_minutes: f64,
) -> Result<Vec<ConjunctionEvent>, ArgusError> {
    validate_positive("days", days)?;
    validate_positive("threshold_km", threshold_km)?;
    validate_positive("step_minutes", step_minutes)?;

    let mut all_events = Vec::new();

    for primary in primaries {
        let candidates = prefilter(catalog, primary, threshold_km);
        if candidates.is_empty() {
            debug!("no candidates for object {} after prefilter", primary.norad_id);
            continue;
        }
        info!(
            "screening object {} against {} candidate(s) over {days} day(s)",
            primary.norad_id,
            candidates.len()
        );

        let start = primary.epoch;
        let end = start + days * Unit::Day;
        let step = step_minutes * Unit::Minute;

        // Coarse sweep: one batched propagation per step, candidate windows keyed per pair.
        let mut windows: BTreeMap<u64, (&ElementSet, Vec<(Epoch, Epoch)>)> = BTreeMap::new();
        for t_k in TimeSeries::inclusive(start, end, step) {
            let batch = propagate_batch(
                std::iter::once(primary).chain(candidates.iter().copied()),
                t_k,
            );
            if !batch.valid[0] {
                continue;
            }
            let primary_pos = batch.position_km(0);
            for (i, candidate) in candidates.iter().enumerate() {
                let row = i + 1;
                if !batch.valid[row] {
                    continue;
                }
                let distance = (batch.position_km(row) - primary_pos).norm();
                if distance < threshold_km {
                    windows
                        .entry(candidate.norad_id)
                        .or_insert_with(|| (*candidate, Vec::new()))
                        .1
                        .push((t_k - step, t_k + step));
                }
            }
        }

        // Refine each merged window; a propagation failure drops the pair, not the run.
        for (secondary_id, (secondary, pair_windows)) in windows {
            for (w_start, w_end) in merge_windows(pair_windows) {
                let w_start = w_start.max(start);
                let w_end = w_end.min(end);
                match refine_window(primary, secondary, w_start, w_end) {
                    Ok((tca, miss, rel_speed)) => {
                        if miss <= threshold_km {
                            all_events.push(ConjunctionEvent {
                                primary_norad_id: primary.norad_id,
                                secondary_norad_id: secondary_id,
                                tca,
                                miss_distance_km: miss,
                                relative_speed_km_s: rel_speed,
                            });
                        }
                    }
                    Err(e) => {
                        warn!(
                            "dropping pair ({}, {secondary_id}): {e}",
                            primary.norad_id
                        );
                    }
                }
            }
        }
    }

    let mut events = dedup_events(all_events);
    events.sort_by(|a, b| a.miss_distance_km.total_cmp(&b.miss_distance_km));
    info!("screening complete: {} event(s)", events.len());
    Ok(events)
}

/// Retains the candidates whose altitude shell, padded by the threshold, overlaps the
/// primary's. The primary itself is always excluded.
fn prefilter<'a>(
    catalog: &'a [ElementSet],
    primary: &ElementSet,
    threshold_km: f64,
) -> Vec<&'a ElementSet> {
    let (primary_perigee, primary_apogee) = primary.apogee_perigee_alt_km();
    catalog
        .iter()
        .filter(|candidate| candidate.norad_id != primary.norad_id)
        .filter(|candidate| {
            let (perigee, apogee) = candidate.apogee_perigee_alt_km();
            perigee - threshold_km <= primary_apogee + threshold_km
                && primary_perigee - threshold_km <= apogee + threshold_km
        })
        .collect()
}

/// Merges overlapping or touching candidate windows into maximal spans.
pub(crate) fn merge_windows(mut windows: Vec<(Epoch, Epoch)>) -> Vec<(Epoch, Epoch)> {
    windows.sort_by_key(|w| w.0);
    let mut merged: Vec<(Epoch, Epoch)> = Vec::with_capacity(windows.len());
    for window in windows {
        match merged.last_mut() {
            Some(last) if window.0 <= last.1 => {
                if window.1 > last.1 {
                    last.1 = window.1;
                }
            }
            _ => merged.push(window),
        }
    }
    merged
}

pub(crate) fn validate_positive(name: &str, value: f64) -> Result<(), ArgusError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ArgusError::InvalidParameter(format!(
            "{name} must be positive, got {value}"
        )))
    }
}
