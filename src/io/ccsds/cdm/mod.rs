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

/*
 * This module decodes Conjunction Data Messages per CCSDS 508.0-B-1, published in
 * June 2013, in both the KVN and XML encodings. Both encodings funnel through the
 * same section maps so a message parses identically regardless of its carrier.
 */

mod xml;

use crate::linalg::{Matrix6, Vector3};
use crate::time::Epoch;
use crate::ArgusError;
use std::collections::HashMap;
use std::fmt;

/// The canonical lower-triangular covariance sequence, in the RTN frame with row and
/// column order R, T, N, Rdot, Tdot, Ndot.
const COVARIANCE_FIELDS: [(usize, usize, &str); 21] = [
    (0, 0, "CR_R"),
    (1, 0, "CT_R"),
    (1, 1, "CT_T"),
    (2, 0, "CN_R"),
    (2, 1, "CN_T"),
    (2, 2, "CN_N"),
    (3, 0, "CRDOT_R"),
    (3, 1, "CRDOT_T"),
    (3, 2, "CRDOT_N"),
    (3, 3, "CRDOT_RDOT"),
    (4, 0, "CTDOT_R"),
    (4, 1, "CTDOT_T"),
    (4, 2, "CTDOT_N"),
    (4, 3, "CTDOT_RDOT"),
    (4, 4, "CTDOT_TDOT"),
    (5, 0, "CNDOT_R"),
    (5, 1, "CNDOT_T"),
    (5, 2, "CNDOT_N"),
    (5, 3, "CNDOT_RDOT"),
    (5, 4, "CNDOT_TDOT"),
    (5, 5, "CNDOT_NDOT"),
];

/// Object metadata fields consumed into [`CdmObject`]; everything else in an object
/// section is preserved in the message's side dictionary.
const OBJECT_FIELDS: [&str; 12] = [
    "OBJECT_DESIGNATOR",
    "OBJECT_NAME",
    "INTERNATIONAL_DESIGNATOR",
    "EPHEMERIS_NAME",
    "COVARIANCE_METHOD",
    "MANEUVERABLE",
    "X",
    "Y",
    "Z",
    "X_DOT",
    "Y_DOT",
    "Z_DOT",
];

/// One object's data within a Conjunction Data Message.
#[derive(Clone, Debug, PartialEq)]
pub struct CdmObject {
    /// Catalog designator, typically the NORAD number as a string.
    pub designator: String,
    /// Object name.
    pub name: String,
    /// International (COSPAR) designator.
    pub international_designator: String,
    /// Ephemeris source name.
    pub ephemeris_name: String,
    /// How the covariance was obtained.
    pub covariance_method: String,
    /// Whether the object can maneuver, as reported by the originator.
    pub maneuverable: String,
    /// Position at TCA, in km, in the message's ECI frame.
    pub position_km: Vector3<f64>,
    /// Velocity at TCA, in km/s.
    pub velocity_km_s: Vector3<f64>,
    /// 6x6 covariance in the RTN frame (km, km/s), when the message carries one.
    /// Rotate through [`crate::cosmic::rtn_to_eci_cov`] before combining covariances.
    pub covariance_rtn: Option<Matrix6<f64>>,
}

/// A parsed Conjunction Data Message.
#[derive(Clone, Debug, PartialEq)]
pub struct Cdm {
    /// Format version, `1.0` when the message does not state it.
    pub ccsds_cdm_vers: String,
    /// Message creation time, in UTC.
    pub creation_date: Epoch,
    /// Originating agency or operator.
    pub originator: String,
    /// Originator-unique message identifier.
    pub message_id: String,
    /// Time of closest approach, in UTC.
    pub tca: Epoch,
    /// Reported miss distance, in km.
    pub miss_distance_km: f64,
    /// Reported relative speed at TCA, in km/s.
    pub relative_speed_km_s: f64,
    /// Originator-computed collision probability, if reported.
    pub collision_probability: Option<f64>,
    /// The primary object.
    pub object1: CdmObject,
    /// The secondary object.
    pub object2: CdmObject,
    /// Fields the reader does not interpret, preserved verbatim. Object-scoped entries
    /// are prefixed with their object tag, e.g. `OBJECT1.CATALOG_NAME`.
    pub extra: HashMap<String, String>,
}

impl Cdm {
    /// Parses a CDM from its KVN (key = value notation) encoding.
    ///
    /// The read is two-pass: the first pass builds a flat dictionary of every key, the
    /// second pass re-scopes the keys that follow an `OBJECT = OBJECT1/OBJECT2` marker
    /// under that object. Comment lines and `[unit]` annotations are dropped.
    pub fn from_kvn(text: &str) -> Result<Self, ArgusError> {
        let pairs = kvn_pairs(text);

        let mut flat = HashMap::new();
        for (key, value) in &pairs {
            flat.insert(key.clone(), value.clone());
        }

        let mut object1 = HashMap::new();
        let mut object2 = HashMap::new();
        let mut scope = 0_u8;
        for (key, value) in pairs {
            if key == "OBJECT" {
                scope = match value.as_str() {
                    "OBJECT1" => 1,
                    "OBJECT2" => 2,
                    other => {
                        warn!("unknown object scope `{other}`, keys ignored until the next marker");
                        0
                    }
                };
                continue;
            }
            match scope {
                1 => {
                    object1.insert(key, value);
                }
                2 => {
                    object2.insert(key, value);
                }
                _ => {}
            }
        }
        flat.remove("OBJECT");

        Self::from_sections(flat, object1, object2)
    }

    /// Parses a CDM from its XML encoding. A declared default namespace is tolerated,
    /// as element matching falls back to local names.
    pub fn from_xml(text: &str) -> Result<Self, ArgusError> {
        let (header, object1, object2) = xml::parse_sections(text)?;
        Self::from_sections(header, object1, object2)
    }

    /// Serializes this message back to KVN.
    pub fn to_kvn(&self) -> Result<String, ArgusError> {
        Err(ArgusError::NotImplemented(
            "CDM export to KVN".to_string(),
        ))
    }

    fn from_sections(
        mut header: HashMap<String, String>,
        object1: HashMap<String, String>,
        object2: HashMap<String, String>,
    ) -> Result<Self, ArgusError> {
        if object1.is_empty() {
            return Err(parse_err("OBJECT1", "missing object section"));
        }
        if object2.is_empty() {
            return Err(parse_err("OBJECT2", "missing object section"));
        }

        let ccsds_cdm_vers = header
            .remove("CCSDS_CDM_VERS")
            .unwrap_or_else(|| "1.0".to_string());
        let creation_date = parse_epoch("CREATION_DATE", &required(&mut header, "CREATION_DATE")?)?;
        let originator = required(&mut header, "ORIGINATOR")?;
        let message_id = required(&mut header, "MESSAGE_ID")?;
        let tca = parse_epoch("TCA", &required(&mut header, "TCA")?)?;
        let miss_distance_km = parse_f64("MISS_DISTANCE", &required(&mut header, "MISS_DISTANCE")?)?;
        let relative_speed_km_s =
            parse_f64("RELATIVE_SPEED", &required(&mut header, "RELATIVE_SPEED")?)?;
        let collision_probability = header
            .remove("COLLISION_PROBABILITY")
            .and_then(|v| v.parse::<f64>().ok());

        let (object1_parsed, extra1) = CdmObject::from_fields("OBJECT1", &object1)?;
        let (object2_parsed, extra2) = CdmObject::from_fields("OBJECT2", &object2)?;

        // Whatever remains of the flat dictionary and was not claimed by an object
        // section is an unknown header field: preserved, never fatal.
        let mut extra = HashMap::new();
        for (key, value) in header {
            if !object1.contains_key(&key) && !object2.contains_key(&key) {
                extra.insert(key, value);
            }
        }
        extra.extend(extra1);
        extra.extend(extra2);

        debug!(
            "parsed CDM {message_id}: TCA {tca}, miss {miss_distance_km} km, {} unknown field(s)",
            extra.len()
        );

        Ok(Self {
            ccsds_cdm_vers,
            creation_date,
            originator,
            message_id,
            tca,
            miss_distance_km,
            relative_speed_km_s,
            collision_probability,
            object1: object1_parsed,
            object2: object2_parsed,
            extra,
        })
    }
}

impl fmt::Display for Cdm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "CDM {} from {}: {} x {}, miss {:.3} km at {}",
            self.message_id,
            self.originator,
            self.object1.designator,
            self.object2.designator,
            self.miss_distance_km,
            self.tca
        )
    }
}

impl CdmObject {
    fn from_fields(
        tag: &str,
        fields: &HashMap<String, String>,
    ) -> Result<(Self, HashMap<String, String>), ArgusError> {
        let text = |key: &str| fields.get(key).cloned().unwrap_or_default();
        let coord = |key: &str| -> Result<f64, ArgusError> {
            match fields.get(key) {
                None => Ok(0.0),
                Some(raw) => raw.trim().parse::<f64>().map_err(|_| {
                    parse_err(&format!("{tag}.{key}"), &format!("`{raw}` is not a valid number"))
                }),
            }
        };

        let position_km = Vector3::new(coord("X")?, coord("Y")?, coord("Z")?);
        let velocity_km_s = Vector3::new(coord("X_DOT")?, coord("Y_DOT")?, coord("Z_DOT")?);
        let covariance_rtn = assemble_covariance(tag, fields)?;

        if let Some(cov) = &covariance_rtn {
            let min_eigenvalue = cov.symmetric_eigenvalues().min();
            if min_eigenvalue < -1e-12 * (1.0 + cov.trace().abs()) {
                warn!(
                    "{tag} covariance is not positive semidefinite (min eigenvalue {min_eigenvalue:.3e})"
                );
            }
        }

        let mut extra = HashMap::new();
        for (key, value) in fields {
            let known = OBJECT_FIELDS.contains(&key.as_str())
                || COVARIANCE_FIELDS.iter().any(|(_, _, name)| name == key);
            if !known {
                extra.insert(format!("{tag}.{key}"), value.clone());
            }
        }

        Ok((
            Self {
                designator: text("OBJECT_DESIGNATOR"),
                name: text("OBJECT_NAME"),
                international_designator: text("INTERNATIONAL_DESIGNATOR"),
                ephemeris_name: text("EPHEMERIS_NAME"),
                covariance_method: text("COVARIANCE_METHOD"),
                maneuverable: text("MANEUVERABLE"),
                position_km,
                velocity_km_s,
                covariance_rtn,
            },
            extra,
        ))
    }
}

/// Builds the symmetric 6x6 RTN covariance from the lower-triangular entries. A message
/// without `CR_R` carries no covariance at all.
fn assemble_covariance(
    tag: &str,
    fields: &HashMap<String, String>,
) -> Result<Option<Matrix6<f64>>, ArgusError> {
    if !fields.contains_key("CR_R") {
        return Ok(None);
    }
    let mut cov = Matrix6::zeros();
    for (row, col, key) in COVARIANCE_FIELDS {
        if let Some(raw) = fields.get(key) {
            let value: f64 = raw.trim().parse().map_err(|_| {
                parse_err(&format!("{tag}.{key}"), &format!("`{raw}` is not a valid number"))
            })?;
            cov[(row, col)] = value;
            if row != col {
                cov[(col, row)] = value;
            }
        }
    }
    Ok(Some(cov))
}

/// Splits the KVN body into `(key, value)` pairs, dropping comments, blank lines, and
/// trailing `[unit]` annotations. Lines without an `=` are ignored.
fn kvn_pairs(text: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("COMMENT") {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            pairs.push((key.trim().to_string(), strip_units(value)));
        }
    }
    pairs
}

fn strip_units(value: &str) -> String {
    let value = value.trim();
    match value.find('[') {
        Some(pos) => value[..pos].trim().to_string(),
        None => value.to_string(),
    }
}

fn required(map: &mut HashMap<String, String>, key: &str) -> Result<String, ArgusError> {
    map.remove(key)
        .ok_or_else(|| parse_err(key, "required field is missing"))
}

/// All CDM instants are UTC per CCSDS: a bare instant string has UTC imposed on it.
fn parse_epoch(field: &str, raw: &str) -> Result<Epoch, ArgusError> {
    let trimmed = raw.trim().trim_end_matches('Z');
    Epoch::from_gregorian_str(&format!("{trimmed} UTC")).map_err(|e| {
        parse_err(field, &format!("invalid datetime `{raw}`: {e}"))
    })
}

fn parse_f64(field: &str, raw: &str) -> Result<f64, ArgusError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| parse_err(field, &format!("`{raw}` is not a valid number")))
}

fn parse_err(location: &str, reason: &str) -> ArgusError {
    ArgusError::Parse {
        location: location.to_string(),
        reason: reason.to_string(),
    }
}
