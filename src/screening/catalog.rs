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

use super::kdtree::KdTree;
use super::refine::{dedup_events, refine_window};
use super::{merge_windows, validate_positive, ConjunctionEvent};
use crate::elements::ElementSet;
use crate::propagation::propagate_batch;
use crate::time::{Epoch, TimeSeries, Unit};
use crate::ArgusError;
use std::collections::BTreeMap;

/// Retains the element sets whose epoch lies within `max_age_days` of `reference_time`.
///
/// Silently propagating a stale element set is an operational hazard: the screener calls
/// this explicitly when an age limit is configured.
pub fn filter_stale_elements(
    catalog: &[ElementSet],
    max_age_days: f64,
    reference_time: Epoch,
) -> Vec<&ElementSet> {
    let cutoff = max_age_days * Unit::Day;
    let fresh: Vec<&ElementSet> = catalog
        .iter()
        .filter(|element| (reference_time - element.epoch).abs() <= cutoff)
        .collect();
    debug!(
        "{}/{} element set(s) within {max_age_days} day(s) of {reference_time}",
        fresh.len(),
        catalog.len()
    );
    fresh
}

/// Screens every object of the catalog against every other over `[reference_time,
/// reference_time + hours]`.
///
/// Each coarse step batch-propagates the whole catalog, indexes the valid positions in a
/// k-d tree, and registers a candidate window for every pair within `threshold_km`. The
/// windows are then refined, deduplicated, and sorted exactly as in [`super::screen`].
/// When `reference_time` is `None` the window is anchored at the current UTC instant.
pub fn screen_catalog(
    catalog: &[ElementSet],
    hours: f64,
    step_minutes: f64,
    threshold_km: f64,
    max_age_days: Option<f64>,
    reference_time: Option<Epoch>,
) -> Result<Vec<ConjunctionEvent>, ArgusError> {
    validate_positive("hours", hours)?;
    validate_positive("step_minutes", step_minutes)?;
    validate_positive("threshold_km", threshold_km)?;
    if let Some(age) = max_age_days {
        validate_positive("max_age_days", age)?;
    }

    let reference_time = match reference_time {
        Some(t) => t,
        None => Epoch::now().map_err(|e| {
            ArgusError::InvalidParameter(format!("cannot determine the current instant: {e}"))
        })?,
    };

    let catalog: Vec<&ElementSet> = match max_age_days {
        Some(age) => filter_stale_elements(catalog, age, reference_time),
        None => catalog.iter().collect(),
    };

    if catalog.len() < 2 {
        info!("fewer than two element sets to screen, nothing to do");
        return Ok(Vec::new());
    }

    info!(
        "screening {} objects over {hours:.1} h at {step_minutes:.1} min cadence, {threshold_km:.1} km threshold",
        catalog.len()
    );

    let start = reference_time;
    let end = start + hours * Unit::Hour;
    let step = step_minutes * Unit::Minute;

    // Candidate windows keyed by catalog index pair, lower index first.
    let mut windows: BTreeMap<(usize, usize), Vec<(Epoch, Epoch)>> = BTreeMap::new();
    for t_k in TimeSeries::inclusive(start, end, step) {
        let batch = propagate_batch(catalog.iter().copied(), t_k);

        let mut index_map = Vec::new();
        let mut points = Vec::new();
        for (i, ok) in batch.valid.iter().enumerate() {
            if *ok {
                let p = batch.position_km(i);
                index_map.push(i);
                points.push([p[0], p[1], p[2]]);
            }
        }
        if points.len() < 2 {
            continue;
        }

        let tree = KdTree::new(points);
        for (a, b) in tree.pairs_within(threshold_km) {
            let (i, j) = (index_map[a], index_map[b]);
            if catalog[i].norad_id == catalog[j].norad_id {
                continue;
            }
            let key = (i.min(j), i.max(j));
            windows
                .entry(key)
                .or_default()
                .push((t_k - step, t_k + step));
        }
    }

    let mut events = Vec::new();
    for ((i, j), pair_windows) in windows {
        // The lower catalog number takes the primary role in the reported event.
        let (primary, secondary) = if catalog[i].norad_id <= catalog[j].norad_id {
            (catalog[i], catalog[j])
        } else {
            (catalog[j], catalog[i])
        };
        for (w_start, w_end) in merge_windows(pair_windows) {
            let w_start = w_start.max(start);
            let w_end = w_end.min(end);
            match refine_window(primary, secondary, w_start, w_end) {
                Ok((tca, miss, rel_speed)) => {
                    if miss <= threshold_km {
                        events.push(ConjunctionEvent {
                            primary_norad_id: primary.norad_id,
                            secondary_norad_id: secondary.norad_id,
                            tca,
                            miss_distance_km: miss,
                            relative_speed_km_s: rel_speed,
                        });
                    }
                }
                Err(e) => {
                    warn!(
                        "dropping pair ({}, {}): {e}",
                        primary.norad_id, secondary.norad_id
                    );
                }
            }
        }
    }

    let mut events = dedup_events(events);
    events.sort_by(|a, b| a.miss_distance_km.total_cmp(&b.miss_distance_km));
    info!("catalog screening found {} close pair event(s)", events.len());
    Ok(events)
}
