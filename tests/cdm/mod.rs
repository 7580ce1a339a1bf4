use argus::io::ccsds::cdm::Cdm;
use argus::time::Epoch;
use argus::ArgusError;

const SAMPLE_KVN: &str = "\
CCSDS_CDM_VERS                     = 1.0
CREATION_DATE                      = 2020-01-01T10:00:00.000
ORIGINATOR                         = JSPOC
MESSAGE_ID                         = 20200101_25544_90001_001
COMMENT screening results for the ISS complex
TCA                                = 2020-01-02T12:34:56.789
MISS_DISTANCE                      = 0.715 [km]
RELATIVE_SPEED                     = 14.335 [km/s]
COLLISION_PROBABILITY              = 4.5e-05

OBJECT                             = OBJECT1
OBJECT_DESIGNATOR                  = 25544
CATALOG_NAME                       = SATCAT
OBJECT_NAME                        = ISS (ZARYA)
INTERNATIONAL_DESIGNATOR           = 1998-067A
EPHEMERIS_NAME                     = NONE
COVARIANCE_METHOD                  = CALCULATED
MANEUVERABLE                       = YES
REF_FRAME                          = GCRF
X                                  = 6562.2804 [km]
Y                                  = 1703.0163 [km]
Z                                  = 1592.0777 [km]
X_DOT                              = -1.28827 [km/s]
Y_DOT                              = -1.90418 [km/s]
Z_DOT                              = 7.30255 [km/s]
CR_R                               = 4.0e-02 [km**2]
CT_R                               = 1.2e-03 [km**2]
CT_T                               = 2.0e-01 [km**2]
CN_R                               = -8.0e-04 [km**2]
CN_T                               = 2.1e-03 [km**2]
CN_N                               = 9.0e-03 [km**2]
CRDOT_R                            = -1.1e-05 [km**2/s]
CRDOT_T                            = 2.2e-05 [km**2/s]
CRDOT_N                            = 1.3e-06 [km**2/s]
CRDOT_RDOT                         = 1.0e-06 [km**2/s**2]
CTDOT_R                            = -3.0e-05 [km**2/s]
CTDOT_T                            = -1.5e-05 [km**2/s]
CTDOT_N                            = 2.5e-06 [km**2/s]
CTDOT_RDOT                         = 3.0e-07 [km**2/s**2]
CTDOT_TDOT                         = 2.0e-06 [km**2/s**2]
CNDOT_R                            = 1.0e-06 [km**2/s]
CNDOT_T                            = 2.0e-06 [km**2/s]
CNDOT_N                            = -1.4e-06 [km**2/s]
CNDOT_RDOT                         = 1.0e-07 [km**2/s**2]
CNDOT_TDOT                         = 2.3e-07 [km**2/s**2]
CNDOT_NDOT                         = 3.0e-06 [km**2/s**2]

OBJECT                             = OBJECT2
OBJECT_DESIGNATOR                  = 90001
CATALOG_NAME                       = SATCAT
OBJECT_NAME                        = COSMOS 2251 DEB
INTERNATIONAL_DESIGNATOR           = 1993-036B
EPHEMERIS_NAME                     = NONE
COVARIANCE_METHOD                  = CALCULATED
MANEUVERABLE                       = NO
REF_FRAME                          = GCRF
X                                  = 6562.4131 [km]
Y                                  = 1702.9888 [km]
Z                                  = 1591.9883 [km]
X_DOT                              = 4.41126 [km/s]
Y_DOT                              = -4.19272 [km/s]
Z_DOT                              = -4.26593 [km/s]
CR_R                               = 6.0e-02 [km**2]
CT_R                               = -2.3e-03 [km**2]
CT_T                               = 3.0e-01 [km**2]
CN_R                               = 1.1e-03 [km**2]
CN_T                               = -3.2e-03 [km**2]
CN_N                               = 2.0e-02 [km**2]
CRDOT_R                            = 1.4e-05 [km**2/s]
CRDOT_T                            = -2.6e-05 [km**2/s]
CRDOT_N                            = 2.2e-06 [km**2/s]
CRDOT_RDOT                         = 2.0e-06 [km**2/s**2]
CTDOT_R                            = 2.7e-05 [km**2/s]
CTDOT_T                            = 1.9e-05 [km**2/s]
CTDOT_N                            = -3.1e-06 [km**2/s]
CTDOT_RDOT                         = 4.0e-07 [km**2/s**2]
CTDOT_TDOT                         = 4.0e-06 [km**2/s**2]
CNDOT_R                            = -1.5e-06 [km**2/s]
CNDOT_T                            = 2.4e-06 [km**2/s]
CNDOT_N                            = 1.8e-06 [km**2/s]
CNDOT_RDOT                         = 2.0e-07 [km**2/s**2]
CNDOT_TDOT                         = 3.1e-07 [km**2/s**2]
CNDOT_NDOT                         = 5.0e-06 [km**2/s**2]
";

const SAMPLE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<cdm xmlns="urn:ccsds:recommendation:navigation:schema:cdmxml" id="CCSDS_CDM_VERS" version="1.0">
  <header>
    <COMMENT>screening results for the ISS complex</COMMENT>
    <CREATION_DATE>2020-01-01T10:00:00.000</CREATION_DATE>
    <ORIGINATOR>JSPOC</ORIGINATOR>
    <MESSAGE_ID>20200101_25544_90001_001</MESSAGE_ID>
  </header>
  <body>
    <relativeMetadataData>
      <TCA>2020-01-02T12:34:56.789</TCA>
      <MISS_DISTANCE>0.715</MISS_DISTANCE>
      <RELATIVE_SPEED>14.335</RELATIVE_SPEED>
      <COLLISION_PROBABILITY>4.5e-05</COLLISION_PROBABILITY>
    </relativeMetadataData>
    <segment>
      <metadata>
        <OBJECT>OBJECT1</OBJECT>
        <OBJECT_DESIGNATOR>25544</OBJECT_DESIGNATOR>
        <CATALOG_NAME>SATCAT</CATALOG_NAME>
        <OBJECT_NAME>ISS (ZARYA)</OBJECT_NAME>
        <INTERNATIONAL_DESIGNATOR>1998-067A</INTERNATIONAL_DESIGNATOR>
        <EPHEMERIS_NAME>NONE</EPHEMERIS_NAME>
        <COVARIANCE_METHOD>CALCULATED</COVARIANCE_METHOD>
        <MANEUVERABLE>YES</MANEUVERABLE>
        <REF_FRAME>GCRF</REF_FRAME>
      </metadata>
      <data>
        <stateVector>
          <X>6562.2804</X>
          <Y>1703.0163</Y>
          <Z>1592.0777</Z>
          <X_DOT>-1.28827</X_DOT>
          <Y_DOT>-1.90418</Y_DOT>
          <Z_DOT>7.30255</Z_DOT>
        </stateVector>
        <covarianceMatrix>
          <CR_R>4.0e-02</CR_R>
          <CT_R>1.2e-03</CT_R>
          <CT_T>2.0e-01</CT_T>
          <CN_R>-8.0e-04</CN_R>
          <CN_T>2.1e-03</CN_T>
          <CN_N>9.0e-03</CN_N>
          <CRDOT_R>-1.1e-05</CRDOT_R>
          <CRDOT_T>2.2e-05</CRDOT_T>
          <CRDOT_N>1.3e-06</CRDOT_N>
          <CRDOT_RDOT>1.0e-06</CRDOT_RDOT>
          <CTDOT_R>-3.0e-05</CTDOT_R>
          <CTDOT_T>-1.5e-05</CTDOT_T>
          <CTDOT_N>2.5e-06</CTDOT_N>
          <CTDOT_RDOT>3.0e-07</CTDOT_RDOT>
          <CTDOT_TDOT>2.0e-06</CTDOT_TDOT>
          <CNDOT_R>1.0e-06</CNDOT_R>
          <CNDOT_T>2.0e-06</CNDOT_T>
          <CNDOT_N>-1.4e-06</CNDOT_N>
          <CNDOT_RDOT>1.0e-07</CNDOT_RDOT>
          <CNDOT_TDOT>2.3e-07</CNDOT_TDOT>
          <CNDOT_NDOT>3.0e-06</CNDOT_NDOT>
        </covarianceMatrix>
      </data>
    </segment>
    <segment>
      <metadata>
        <OBJECT>OBJECT2</OBJECT>
        <OBJECT_DESIGNATOR>90001</OBJECT_DESIGNATOR>
        <CATALOG_NAME>SATCAT</CATALOG_NAME>
        <OBJECT_NAME>COSMOS 2251 DEB</OBJECT_NAME>
        <INTERNATIONAL_DESIGNATOR>1993-036B</INTERNATIONAL_DESIGNATOR>
        <EPHEMERIS_NAME>NONE</EPHEMERIS_NAME>
        <COVARIANCE_METHOD>CALCULATED</COVARIANCE_METHOD>
        <MANEUVERABLE>NO</MANEUVERABLE>
        <REF_FRAME>GCRF</REF_FRAME>
      </metadata>
      <data>
        <stateVector>
          <X>6562.4131</X>
          <Y>1702.9888</Y>
          <Z>1591.9883</Z>
          <X_DOT>4.41126</X_DOT>
          <Y_DOT>-4.19272</Y_DOT>
          <Z_DOT>-4.26593</Z_DOT>
        </stateVector>
        <covarianceMatrix>
          <CR_R>6.0e-02</CR_R>
          <CT_R>-2.3e-03</CT_R>
          <CT_T>3.0e-01</CT_T>
          <CN_R>1.1e-03</CN_R>
          <CN_T>-3.2e-03</CN_T>
          <CN_N>2.0e-02</CN_N>
          <CRDOT_R>1.4e-05</CRDOT_R>
          <CRDOT_T>-2.6e-05</CRDOT_T>
          <CRDOT_N>2.2e-06</CRDOT_N>
          <CRDOT_RDOT>2.0e-06</CRDOT_RDOT>
          <CTDOT_R>2.7e-05</CTDOT_R>
          <CTDOT_T>1.9e-05</CTDOT_T>
          <CTDOT_N>-3.1e-06</CTDOT_N>
          <CTDOT_RDOT>4.0e-07</CTDOT_RDOT>
          <CTDOT_TDOT>4.0e-06</CTDOT_TDOT>
          <CNDOT_R>-1.5e-06</CNDOT_R>
          <CNDOT_T>2.4e-06</CNDOT_T>
          <CNDOT_N>1.8e-06</CNDOT_N>
          <CNDOT_RDOT>2.0e-07</CNDOT_RDOT>
          <CNDOT_TDOT>3.1e-07</CNDOT_TDOT>
          <CNDOT_NDOT>5.0e-06</CNDOT_NDOT>
        </covarianceMatrix>
      </data>
    </segment>
  </body>
</cdm>
"#;

#[test]
fn test_kvn_full_message() {
    let cdm = Cdm::from_kvn(SAMPLE_KVN).unwrap();

    assert_eq!(cdm.ccsds_cdm_vers, "1.0");
    assert_eq!(cdm.originator, "JSPOC");
    assert_eq!(cdm.message_id, "20200101_25544_90001_001");
    assert_eq!(
        cdm.creation_date,
        Epoch::from_gregorian_utc(2020, 1, 1, 10, 0, 0, 0)
    );
    assert_eq!(
        cdm.tca,
        Epoch::from_gregorian_utc(2020, 1, 2, 12, 34, 56, 789_000_000)
    );
    assert!((cdm.miss_distance_km - 0.715).abs() < 1e-12);
    assert!((cdm.relative_speed_km_s - 14.335).abs() < 1e-12);
    assert_eq!(cdm.collision_probability, Some(4.5e-5));

    assert_eq!(cdm.object1.designator, "25544");
    assert_eq!(cdm.object1.name, "ISS (ZARYA)");
    assert_eq!(cdm.object1.maneuverable, "YES");
    assert!((cdm.object1.position_km[0] - 6562.2804).abs() < 1e-9);
    assert!((cdm.object1.velocity_km_s[2] - 7.30255).abs() < 1e-9);
    assert_eq!(cdm.object2.designator, "90001");
    assert_eq!(cdm.object2.maneuverable, "NO");

    // Unknown fields survive in the side dictionary, object-scoped ones prefixed.
    assert_eq!(cdm.extra.get("OBJECT1.CATALOG_NAME").map(String::as_str), Some("SATCAT"));
    assert_eq!(cdm.extra.get("OBJECT2.REF_FRAME").map(String::as_str), Some("GCRF"));
}

#[test]
fn test_kvn_covariance_symmetric_psd() {
    let cdm = Cdm::from_kvn(SAMPLE_KVN).unwrap();
    for object in [&cdm.object1, &cdm.object2] {
        let cov = object.covariance_rtn.expect("covariance expected");
        assert!((cov - cov.transpose()).norm() < 1e-15, "asymmetric covariance");
        let min_eigenvalue = cov.symmetric_eigenvalues().min();
        assert!(min_eigenvalue >= -1e-12, "min eigenvalue {min_eigenvalue}");
    }
    let cov1 = cdm.object1.covariance_rtn.unwrap();
    assert!((cov1[(0, 0)] - 4.0e-2).abs() < 1e-15);
    assert!((cov1[(1, 0)] - 1.2e-3).abs() < 1e-15);
    assert!((cov1[(0, 1)] - 1.2e-3).abs() < 1e-15);
    assert!((cov1[(5, 5)] - 3.0e-6).abs() < 1e-15);
}

#[test]
fn test_xml_matches_kvn() {
    let from_kvn = Cdm::from_kvn(SAMPLE_KVN).unwrap();
    let from_xml = Cdm::from_xml(SAMPLE_XML).unwrap();

    assert_eq!(from_kvn.tca, from_xml.tca);
    assert_eq!(from_kvn.creation_date, from_xml.creation_date);
    assert!((from_kvn.miss_distance_km - from_xml.miss_distance_km).abs() < 1e-12);
    assert!((from_kvn.relative_speed_km_s - from_xml.relative_speed_km_s).abs() < 1e-12);
    assert_eq!(from_kvn.object1.designator, from_xml.object1.designator);
    assert_eq!(from_kvn.object2.designator, from_xml.object2.designator);

    for (kvn_object, xml_object) in [
        (&from_kvn.object1, &from_xml.object1),
        (&from_kvn.object2, &from_xml.object2),
    ] {
        let kvn_cov = kvn_object.covariance_rtn.unwrap();
        let xml_cov = xml_object.covariance_rtn.unwrap();
        assert!((kvn_cov - xml_cov).norm() < 1e-9);
        assert!((kvn_object.position_km - xml_object.position_km).norm() < 1e-9);
        assert!((kvn_object.velocity_km_s - xml_object.velocity_km_s).norm() < 1e-9);
    }
}

#[test]
fn test_kvn_missing_tca_is_field_level_error() {
    let truncated: String = SAMPLE_KVN
        .lines()
        .filter(|line| !line.starts_with("TCA"))
        .collect::<Vec<_>>()
        .join("\n");
    let error = Cdm::from_kvn(&truncated).unwrap_err();
    assert!(
        matches!(error, ArgusError::Parse { ref location, .. } if location == "TCA"),
        "unexpected error {error:?}"
    );
}

#[test]
fn test_kvn_malformed_number_is_field_level_error() {
    let broken = SAMPLE_KVN.replace(
        "MISS_DISTANCE                      = 0.715 [km]",
        "MISS_DISTANCE                      = not-a-number",
    );
    let error = Cdm::from_kvn(&broken).unwrap_err();
    assert!(
        matches!(error, ArgusError::Parse { ref location, .. } if location == "MISS_DISTANCE"),
        "unexpected error {error:?}"
    );
}

#[test]
fn test_kvn_without_covariance() {
    let minimal = "\
CREATION_DATE = 2020-01-01T00:00:00
ORIGINATOR = TEST
MESSAGE_ID = M1
TCA = 2020-01-02T00:00:00
MISS_DISTANCE = 1.5
RELATIVE_SPEED = 10.0
OBJECT = OBJECT1
OBJECT_DESIGNATOR = 11111
X = 7000.0
Y = 0.0
Z = 0.0
X_DOT = 0.0
Y_DOT = 7.5
Z_DOT = 0.0
OBJECT = OBJECT2
OBJECT_DESIGNATOR = 22222
X = 7000.5
Y = 0.0
Z = 0.0
X_DOT = 0.0
Y_DOT = -7.5
Z_DOT = 0.0
";
    let cdm = Cdm::from_kvn(minimal).unwrap();
    assert!(cdm.object1.covariance_rtn.is_none());
    assert!(cdm.object2.covariance_rtn.is_none());
    assert_eq!(cdm.ccsds_cdm_vers, "1.0");
    assert_eq!(cdm.collision_probability, None);
}

#[test]
fn test_kvn_missing_object_section() {
    let no_objects = "\
CREATION_DATE = 2020-01-01T00:00:00
ORIGINATOR = TEST
MESSAGE_ID = M1
TCA = 2020-01-02T00:00:00
MISS_DISTANCE = 1.5
RELATIVE_SPEED = 10.0
";
    let error = Cdm::from_kvn(no_objects).unwrap_err();
    assert!(matches!(error, ArgusError::Parse { ref location, .. } if location == "OBJECT1"));
}

#[test]
fn test_kvn_malformed_datetime() {
    let broken = SAMPLE_KVN.replace("2020-01-02T12:34:56.789", "not-a-datetime");
    assert!(matches!(
        Cdm::from_kvn(&broken),
        Err(ArgusError::Parse { .. })
    ));
}

#[test]
fn test_xml_without_namespace_also_parses() {
    let plain = SAMPLE_XML.replace(
        r#"<cdm xmlns="urn:ccsds:recommendation:navigation:schema:cdmxml" id="CCSDS_CDM_VERS" version="1.0">"#,
        r#"<cdm id="CCSDS_CDM_VERS" version="1.0">"#,
    );
    let cdm = Cdm::from_xml(&plain).unwrap();
    assert_eq!(cdm.object1.designator, "25544");
}

#[test]
fn test_export_not_implemented() {
    let cdm = Cdm::from_kvn(SAMPLE_KVN).unwrap();
    assert!(matches!(
        cdm.to_kvn(),
        Err(ArgusError::NotImplemented(_))
    ));
}
