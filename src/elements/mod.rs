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

use crate::cosmic::consts::{EARTH_MU_KM3_S2, EARTH_RADIUS_KM};
use crate::time::Epoch;
use crate::utils::between_0_360;
use crate::ArgusError;
use chrono::{Datelike, Timelike};
use std::f64::consts::TAU;
use std::fmt;

/// An immutable set of mean orbital elements for one tracked object, with its SGP4
/// propagator initialized at construction.
///
/// The epoch is an absolute UTC instant. Angles are canonicalized to [0, 360) degrees.
/// The propagator handle is read-only after construction and safe to share across threads.
pub struct ElementSet {
    /// NORAD catalog number.
    pub norad_id: u64,
    /// International (COSPAR) designator, empty if the element set did not carry one.
    pub international_designator: String,
    /// Object name from the three-line form, if provided.
    pub name: Option<String>,
    /// Element set epoch, in UTC.
    pub epoch: Epoch,
    /// Orbital inclination, in degrees.
    pub inclination_deg: f64,
    /// Right ascension of the ascending node, in degrees.
    pub raan_deg: f64,
    /// Orbital eccentricity.
    pub eccentricity: f64,
    /// Argument of perigee, in degrees.
    pub arg_of_perigee_deg: f64,
    /// Mean anomaly, in degrees.
    pub mean_anomaly_deg: f64,
    /// Mean motion, in revolutions per day.
    pub mean_motion_rev_day: f64,
    /// BSTAR drag term, in units of 1/earth radii.
    pub drag_term: f64,
    /// SGP4 constants bound at construction.
    pub(crate) constants: sgp4::Constants,
}

impl ElementSet {
    /// Parses a single element set from its two lines, with an optional name (line zero of
    /// the three-line form). Field decoding is delegated to the SGP4 element decoder.
    pub fn from_lines(line1: &str, line2: &str, name: Option<&str>) -> Result<Self, ArgusError> {
        let elements = sgp4::Elements::from_tle(
            name.map(|n| n.trim().to_string()),
            line1.trim().as_bytes(),
            line2.trim().as_bytes(),
        )
        .map_err(|e| ArgusError::Parse {
            location: "TLE".to_string(),
            reason: format!("{e:?}"),
        })?;
        Self::from_elements(elements)
    }

    /// Builds an element set from decoded SGP4 elements, enforcing the element invariants
    /// and initializing the propagator.
    pub fn from_elements(elements: sgp4::Elements) -> Result<Self, ArgusError> {
        if elements.mean_motion <= 0.0 {
            return Err(ArgusError::Parse {
                location: format!("object {}", elements.norad_id),
                reason: format!("mean motion must be positive, got {}", elements.mean_motion),
            });
        }
        if !(0.0..1.0).contains(&elements.eccentricity) {
            return Err(ArgusError::Parse {
                location: format!("object {}", elements.norad_id),
                reason: format!(
                    "eccentricity must be in [0, 1), got {}",
                    elements.eccentricity
                ),
            });
        }

        let constants = sgp4::Constants::from_elements(&elements).map_err(|e| ArgusError::Parse {
            location: format!("object {}", elements.norad_id),
            reason: format!("SGP4 initialization failed: {e:?}"),
        })?;

        let dt = &elements.datetime;
        let epoch = Epoch::from_gregorian_utc(
            dt.year(),
            dt.month() as u8,
            dt.day() as u8,
            dt.hour() as u8,
            dt.minute() as u8,
            dt.second() as u8,
            dt.nanosecond(),
        );

        Ok(Self {
            norad_id: elements.norad_id,
            international_designator: elements.international_designator.clone().unwrap_or_default(),
            name: elements.object_name.clone(),
            epoch,
            inclination_deg: between_0_360(elements.inclination),
            raan_deg: between_0_360(elements.right_ascension),
            eccentricity: elements.eccentricity,
            arg_of_perigee_deg: between_0_360(elements.argument_of_perigee),
            mean_anomaly_deg: between_0_360(elements.mean_anomaly),
            mean_motion_rev_day: elements.mean_motion,
            drag_term: elements.drag_term,
            constants,
        })
    }

    /// Semi-major axis recovered from the mean motion, in km.
    pub fn semi_major_axis_km(&self) -> f64 {
        let n_rad_s = self.mean_motion_rev_day * TAU / 86_400.0;
        (EARTH_MU_KM3_S2 / n_rad_s.powi(2)).powf(1.0 / 3.0)
    }

    /// Perigee and apogee altitudes above the equatorial radius, in km.
    pub fn apogee_perigee_alt_km(&self) -> (f64, f64) {
        let a = self.semi_major_axis_km();
        (
            a * (1.0 - self.eccentricity) - EARTH_RADIUS_KM,
            a * (1.0 + self.eccentricity) - EARTH_RADIUS_KM,
        )
    }

    /// Orbital period from the mean motion.
    pub fn period_s(&self) -> f64 {
        86_400.0 / self.mean_motion_rev_day
    }

    pub(crate) fn minutes_since_epoch(&self, t: Epoch) -> f64 {
        (t - self.epoch).to_seconds() / 60.0
    }
}

impl fmt::Display for ElementSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({})\t{}", self.norad_id, name, self.epoch),
            None => write!(f, "{}\t{}", self.norad_id, self.epoch),
        }
    }
}

/// Parses every element set found in the provided text, in two-line or three-line form.
///
/// Lines that do not form a valid element set are skipped; one WARNING reports how many
/// lines were ignored. Leading and trailing whitespace is tolerated.
pub fn parse_catalog(text: &str) -> Vec<ElementSet> {
    let lines: Vec<&str> = text
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut sets = Vec::new();
    let mut skipped = 0_usize;
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            match ElementSet::from_lines(lines[i], lines[i + 1], None) {
                Ok(set) => sets.push(set),
                Err(e) => {
                    skipped += 2;
                    debug!("skipping invalid element set: {e}");
                }
            }
            i += 2;
        } else if !lines[i].starts_with("1 ")
            && !lines[i].starts_with("2 ")
            && i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            let name = lines[i].strip_prefix("0 ").unwrap_or(lines[i]);
            match ElementSet::from_lines(lines[i + 1], lines[i + 2], Some(name)) {
                Ok(set) => sets.push(set),
                Err(e) => {
                    skipped += 3;
                    debug!("skipping invalid element set `{name}`: {e}");
                }
            }
            i += 3;
        } else {
            skipped += 1;
            i += 1;
        }
    }

    if skipped > 0 {
        warn!("ignored {skipped} line(s) that did not form a valid element set");
    }
    debug!("parsed {} element set(s)", sets.len());
    sets
}
