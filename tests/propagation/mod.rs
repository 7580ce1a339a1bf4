use crate::{iss, ISS_LINE1, ISS_LINE2};
use argus::elements::{parse_catalog, ElementSet};
use argus::propagation::{propagate_batch, propagate_one};
use argus::time::{Epoch, Unit};
use argus::ArgusError;

#[test]
fn test_element_set_fields() {
    let element = iss();
    assert_eq!(element.norad_id, 25544);
    assert_eq!(element.name.as_deref(), Some("ISS (ZARYA)"));
    assert_eq!(element.epoch, Epoch::from_gregorian_utc(2020, 1, 1, 12, 0, 0, 0));
    assert!((element.inclination_deg - 51.6430).abs() < 1e-4);
    assert!((element.eccentricity - 0.0002236).abs() < 1e-7);
    assert!((element.mean_motion_rev_day - 15.49312345).abs() < 1e-8);
}

#[test]
fn test_invalid_lines_rejected() {
    let result = ElementSet::from_lines("1 garbage", "2 garbage", None);
    assert!(matches!(result, Err(ArgusError::Parse { .. })));
}

#[test]
fn test_batch_matches_single() {
    // Batch propagation of [e] and single propagation of e agree at every instant
    // within one day of the epoch.
    let element = iss();
    let elements = [iss()];
    for hours in [-24.0, -11.5, -0.1, 0.0, 3.7, 12.0, 24.0] {
        let t = element.epoch + hours * Unit::Hour;
        let single = propagate_one(&element, &[t]).unwrap();
        let batch = propagate_batch(elements.iter(), t);
        assert!(batch.valid[0], "batch invalid at {t}");
        let delta = (batch.position_km(0) - single[0].position_km).norm();
        assert!(delta < 1e-6, "positions diverge by {delta} km at {t}");
        let dv = (batch.velocity_km_s(0) - single[0].velocity_km_s).norm();
        assert!(dv < 1e-6, "velocities diverge by {dv} km/s at {t}");
    }
}

#[test]
fn test_propagated_altitude_is_orbital() {
    let element = iss();
    let states = propagate_one(&element, &[element.epoch, element.epoch + 45.0 * Unit::Minute])
        .unwrap();
    for state in &states {
        let altitude = state.rmag_km() - argus::cosmic::consts::EARTH_RADIUS_KM;
        assert!(
            (300.0..600.0).contains(&altitude),
            "implausible ISS altitude {altitude} km"
        );
        assert!((6.5..8.5).contains(&state.vmag_km_s()));
    }
}

#[test]
fn test_parse_catalog_tolerates_junk() {
    let text = format!(
        "# fetched 2020-01-01\nISS (ZARYA)\n{ISS_LINE1}\n{ISS_LINE2}\n{}\n{}\nthis line is noise\n1 truncated\n",
        crate::ISS_DUPLICATE_LINE1,
        crate::ISS_DUPLICATE_LINE2
    );
    let sets = parse_catalog(&text);
    assert_eq!(sets.len(), 2);
    assert_eq!(sets[0].norad_id, 25544);
    assert_eq!(sets[0].name.as_deref(), Some("ISS (ZARYA)"));
    assert_eq!(sets[1].norad_id, 90001);
    assert_eq!(sets[1].name, None);
}

#[test]
fn test_parse_catalog_empty() {
    assert!(parse_catalog("").is_empty());
    assert!(parse_catalog("\n\n  \n").is_empty());
}
