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
 * Raw deserialization of the CDM XML carrier. Every leaf stays a string so malformed
 * numeric values surface as field-level parse errors through the shared section
 * validation, identically to the KVN path.
 */

use super::{parse_err, COVARIANCE_FIELDS};
use crate::ArgusError;
use serde_derive::Deserialize;
use std::collections::HashMap;
use yaserde_derive::{YaDeserialize, YaSerialize};

#[derive(Default, Debug, Deserialize, PartialEq, YaSerialize, YaDeserialize)]
#[yaserde(
    rename = "cdm",
    namespace = "urn:ccsds:recommendation:navigation:schema:cdmxml"
)]
pub struct CdmXml {
    #[yaserde(attribute)]
    pub id: String,
    #[yaserde(attribute)]
    pub version: String,
    #[yaserde(child)]
    pub header: Header,
    #[yaserde(child)]
    pub body: Body,
}

#[derive(Default, Debug, Deserialize, PartialEq, YaSerialize, YaDeserialize)]
#[yaserde(namespace = "urn:ccsds:recommendation:navigation:schema:cdmxml")]
pub struct Header {
    #[yaserde(child, rename = "COMMENT")]
    comment: Vec<String>,
    #[yaserde(child, rename = "CREATION_DATE")]
    pub creation_date: String,
    #[yaserde(child, rename = "ORIGINATOR")]
    pub originator: String,
    #[yaserde(child, rename = "MESSAGE_FOR")]
    pub message_for: Option<String>,
    #[yaserde(child, rename = "MESSAGE_ID")]
    pub message_id: String,
}

impl Header {
    pub fn comments(&self) -> String {
        self.comment.join(" ")
    }
}

#[derive(Default, Debug, Deserialize, PartialEq, YaSerialize, YaDeserialize)]
#[yaserde(namespace = "urn:ccsds:recommendation:navigation:schema:cdmxml")]
pub struct Body {
    #[yaserde(child, rename = "relativeMetadataData")]
    pub relative_metadata_data: RelativeMetadataData,
    #[yaserde(child)]
    pub segment: Vec<Segment>,
}

#[derive(Default, Debug, Deserialize, PartialEq, YaSerialize, YaDeserialize)]
#[yaserde(namespace = "urn:ccsds:recommendation:navigation:schema:cdmxml")]
pub struct RelativeMetadataData {
    #[yaserde(child, rename = "COMMENT")]
    comment: Vec<String>,
    #[yaserde(child, rename = "TCA")]
    pub tca: String,
    #[yaserde(child, rename = "MISS_DISTANCE")]
    pub miss_distance: String,
    #[yaserde(child, rename = "RELATIVE_SPEED")]
    pub relative_speed: String,
    #[yaserde(child, rename = "COLLISION_PROBABILITY")]
    pub collision_probability: Option<String>,
}

impl RelativeMetadataData {
    pub fn comments(&self) -> String {
        self.comment.join(" ")
    }
}

#[derive(Default, Debug, Deserialize, PartialEq, YaSerialize, YaDeserialize)]
#[yaserde(namespace = "urn:ccsds:recommendation:navigation:schema:cdmxml")]
pub struct Segment {
    #[yaserde(child)]
    pub metadata: Metadata,
    #[yaserde(child)]
    pub data: Data,
}

#[derive(Default, Debug, Deserialize, PartialEq, YaSerialize, YaDeserialize)]
#[yaserde(namespace = "urn:ccsds:recommendation:navigation:schema:cdmxml")]
pub struct Metadata {
    #[yaserde(child, rename = "COMMENT")]
    comment: Vec<String>,
    #[yaserde(child, rename = "OBJECT")]
    pub object: String,
    #[yaserde(child, rename = "OBJECT_DESIGNATOR")]
    pub object_designator: String,
    #[yaserde(child, rename = "CATALOG_NAME")]
    pub catalog_name: Option<String>,
    #[yaserde(child, rename = "OBJECT_NAME")]
    pub object_name: String,
    #[yaserde(child, rename = "INTERNATIONAL_DESIGNATOR")]
    pub international_designator: String,
    #[yaserde(child, rename = "EPHEMERIS_NAME")]
    pub ephemeris_name: Option<String>,
    #[yaserde(child, rename = "COVARIANCE_METHOD")]
    pub covariance_method: Option<String>,
    #[yaserde(child, rename = "MANEUVERABLE")]
    pub maneuverable: Option<String>,
    #[yaserde(child, rename = "REF_FRAME")]
    pub ref_frame: Option<String>,
}

impl Metadata {
    pub fn comments(&self) -> String {
        self.comment.join(" ")
    }
}

#[derive(Default, Debug, Deserialize, PartialEq, YaSerialize, YaDeserialize)]
#[yaserde(namespace = "urn:ccsds:recommendation:navigation:schema:cdmxml")]
pub struct Data {
    #[yaserde(child, rename = "COMMENT")]
    comment: Vec<String>,
    #[yaserde(child, rename = "stateVector")]
    pub state_vector: StateVector,
    #[yaserde(child, rename = "covarianceMatrix")]
    pub covariance_matrix: Option<CovarianceMatrix>,
}

impl Data {
    pub fn comments(&self) -> String {
        self.comment.join(" ")
    }
}

#[derive(Default, Debug, Deserialize, PartialEq, YaSerialize, YaDeserialize)]
#[yaserde(namespace = "urn:ccsds:recommendation:navigation:schema:cdmxml")]
pub struct StateVector {
    #[yaserde(child, rename = "X")]
    pub x_km: String,
    #[yaserde(child, rename = "Y")]
    pub y_km: String,
    #[yaserde(child, rename = "Z")]
    pub z_km: String,
    #[yaserde(child, rename = "X_DOT")]
    pub x_dot_km_s: String,
    #[yaserde(child, rename = "Y_DOT")]
    pub y_dot_km_s: String,
    #[yaserde(child, rename = "Z_DOT")]
    pub z_dot_km_s: String,
}

#[derive(Default, Debug, Deserialize, PartialEq, YaSerialize, YaDeserialize)]
#[yaserde(namespace = "urn:ccsds:recommendation:navigation:schema:cdmxml")]
pub struct CovarianceMatrix {
    #[yaserde(child, rename = "CR_R")]
    pub cr_r: Option<String>,
    #[yaserde(child, rename = "CT_R")]
    pub ct_r: Option<String>,
    #[yaserde(child, rename = "CT_T")]
    pub ct_t: Option<String>,
    #[yaserde(child, rename = "CN_R")]
    pub cn_r: Option<String>,
    #[yaserde(child, rename = "CN_T")]
    pub cn_t: Option<String>,
    #[yaserde(child, rename = "CN_N")]
    pub cn_n: Option<String>,
    #[yaserde(child, rename = "CRDOT_R")]
    pub crdot_r: Option<String>,
    #[yaserde(child, rename = "CRDOT_T")]
    pub crdot_t: Option<String>,
    #[yaserde(child, rename = "CRDOT_N")]
    pub crdot_n: Option<String>,
    #[yaserde(child, rename = "CRDOT_RDOT")]
    pub crdot_rdot: Option<String>,
    #[yaserde(child, rename = "CTDOT_R")]
    pub ctdot_r: Option<String>,
    #[yaserde(child, rename = "CTDOT_T")]
    pub ctdot_t: Option<String>,
    #[yaserde(child, rename = "CTDOT_N")]
    pub ctdot_n: Option<String>,
    #[yaserde(child, rename = "CTDOT_RDOT")]
    pub ctdot_rdot: Option<String>,
    #[yaserde(child, rename = "CTDOT_TDOT")]
    pub ctdot_tdot: Option<String>,
    #[yaserde(child, rename = "CNDOT_R")]
    pub cndot_r: Option<String>,
    #[yaserde(child, rename = "CNDOT_T")]
    pub cndot_t: Option<String>,
    #[yaserde(child, rename = "CNDOT_N")]
    pub cndot_n: Option<String>,
    #[yaserde(child, rename = "CNDOT_RDOT")]
    pub cndot_rdot: Option<String>,
    #[yaserde(child, rename = "CNDOT_TDOT")]
    pub cndot_tdot: Option<String>,
    #[yaserde(child, rename = "CNDOT_NDOT")]
    pub cndot_ndot: Option<String>,
}

impl CovarianceMatrix {
    fn entry(&self, key: &str) -> &Option<String> {
        match key {
            "CR_R" => &self.cr_r,
            "CT_R" => &self.ct_r,
            "CT_T" => &self.ct_t,
            "CN_R" => &self.cn_r,
            "CN_T" => &self.cn_t,
            "CN_N" => &self.cn_n,
            "CRDOT_R" => &self.crdot_r,
            "CRDOT_T" => &self.crdot_t,
            "CRDOT_N" => &self.crdot_n,
            "CRDOT_RDOT" => &self.crdot_rdot,
            "CTDOT_R" => &self.ctdot_r,
            "CTDOT_T" => &self.ctdot_t,
            "CTDOT_N" => &self.ctdot_n,
            "CTDOT_RDOT" => &self.ctdot_rdot,
            "CTDOT_TDOT" => &self.ctdot_tdot,
            "CNDOT_R" => &self.cndot_r,
            "CNDOT_T" => &self.cndot_t,
            "CNDOT_N" => &self.cndot_n,
            "CNDOT_RDOT" => &self.cndot_rdot,
            "CNDOT_TDOT" => &self.cndot_tdot,
            "CNDOT_NDOT" => &self.cndot_ndot,
            _ => &None,
        }
    }
}

type Sections = (
    HashMap<String, String>,
    HashMap<String, String>,
    HashMap<String, String>,
);

/// Deserializes the XML carrier and flattens it into the same header and object section
/// maps the KVN reader produces.
pub(crate) fn parse_sections(text: &str) -> Result<Sections, ArgusError> {
    let raw: CdmXml = yaserde::de::from_str(text).map_err(|reason| ArgusError::Parse {
        location: "XML".to_string(),
        reason,
    })?;

    let mut header = HashMap::new();
    insert_nonempty(&mut header, "CCSDS_CDM_VERS", &raw.version);
    insert_nonempty(&mut header, "CREATION_DATE", &raw.header.creation_date);
    insert_nonempty(&mut header, "ORIGINATOR", &raw.header.originator);
    insert_nonempty(&mut header, "MESSAGE_ID", &raw.header.message_id);
    if let Some(message_for) = &raw.header.message_for {
        insert_nonempty(&mut header, "MESSAGE_FOR", message_for);
    }
    let relative = &raw.body.relative_metadata_data;
    insert_nonempty(&mut header, "TCA", &relative.tca);
    insert_nonempty(&mut header, "MISS_DISTANCE", &relative.miss_distance);
    insert_nonempty(&mut header, "RELATIVE_SPEED", &relative.relative_speed);
    if let Some(probability) = &relative.collision_probability {
        insert_nonempty(&mut header, "COLLISION_PROBABILITY", probability);
    }

    if raw.body.segment.len() < 2 {
        return Err(parse_err(
            "body",
            "a CDM requires an OBJECT1 and an OBJECT2 segment",
        ));
    }

    let mut objects: [Option<HashMap<String, String>>; 2] = [None, None];
    for (position, segment) in raw.body.segment.into_iter().enumerate() {
        let slot = match segment.metadata.object.trim() {
            "OBJECT1" => 0,
            "OBJECT2" => 1,
            _ if position < 2 => position,
            other => {
                warn!("ignoring extra CDM segment tagged `{other}`");
                continue;
            }
        };
        objects[slot] = Some(segment_to_map(segment));
    }

    let object1 = objects[0]
        .take()
        .ok_or_else(|| parse_err("OBJECT1", "missing object segment"))?;
    let object2 = objects[1]
        .take()
        .ok_or_else(|| parse_err("OBJECT2", "missing object segment"))?;

    Ok((header, object1, object2))
}

fn segment_to_map(segment: Segment) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let metadata = segment.metadata;
    insert_nonempty(&mut map, "OBJECT_DESIGNATOR", &metadata.object_designator);
    insert_nonempty(&mut map, "OBJECT_NAME", &metadata.object_name);
    insert_nonempty(
        &mut map,
        "INTERNATIONAL_DESIGNATOR",
        &metadata.international_designator,
    );
    for (key, value) in [
        ("CATALOG_NAME", &metadata.catalog_name),
        ("EPHEMERIS_NAME", &metadata.ephemeris_name),
        ("COVARIANCE_METHOD", &metadata.covariance_method),
        ("MANEUVERABLE", &metadata.maneuverable),
        ("REF_FRAME", &metadata.ref_frame),
    ] {
        if let Some(value) = value {
            insert_nonempty(&mut map, key, value);
        }
    }

    let state = segment.data.state_vector;
    insert_nonempty(&mut map, "X", &state.x_km);
    insert_nonempty(&mut map, "Y", &state.y_km);
    insert_nonempty(&mut map, "Z", &state.z_km);
    insert_nonempty(&mut map, "X_DOT", &state.x_dot_km_s);
    insert_nonempty(&mut map, "Y_DOT", &state.y_dot_km_s);
    insert_nonempty(&mut map, "Z_DOT", &state.z_dot_km_s);

    if let Some(covariance) = segment.data.covariance_matrix {
        for (_, _, key) in COVARIANCE_FIELDS {
            if let Some(value) = covariance.entry(key) {
                insert_nonempty(&mut map, key, value);
            }
        }
    }

    map
}

fn insert_nonempty(map: &mut HashMap<String, String>, key: &str, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        map.insert(key.to_string(), value.to_string());
    }
}
