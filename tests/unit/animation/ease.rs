use super::*;

#[test]
fn endpoints_are_exact_for_every_curve() {
    for ease in Ease::ALL {
        assert_eq!(ease.apply(0.0), 0.0, "{ease:?} at 0");
        assert_eq!(ease.apply(1.0), 1.0, "{ease:?} at 1");
    }
}

#[test]
fn out_of_range_progress_is_clamped() {
    for ease in Ease::ALL {
        assert_eq!(ease.apply(-3.0), 0.0);
        assert_eq!(ease.apply(7.0), 1.0);
        assert_eq!(ease.apply(f64::NAN), 0.0);
    }
}

#[test]
fn quadratic_shapes() {
    assert!((Ease::InQuad.apply(0.5) - 0.25).abs() < 1e-12);
    assert!((Ease::OutQuad.apply(0.5) - 0.75).abs() < 1e-12);
    assert!((Ease::InOutQuad.apply(0.25) - 0.125).abs() < 1e-12);
    assert!((Ease::InOutQuad.apply(0.75) - 0.875).abs() < 1e-12);
}

#[test]
fn back_overshoots_and_bounce_hits_zone_edges() {
    let peak = (1..100)
        .map(|i| Ease::OutBack.apply(f64::from(i) / 100.0))
        .fold(f64::MIN, f64::max);
    assert!(peak > 1.0);

    assert!((Ease::OutBounce.apply(1.0 / 2.75) - 1.0).abs() < 1e-9);
    assert!((Ease::OutBounce.apply(2.0 / 2.75) - 1.0).abs() < 1e-9);
}

#[test]
fn names_round_trip_and_unknown_falls_back() {
    for ease in Ease::ALL {
        assert_eq!(Ease::from_name(ease.name()), ease);
    }
    assert_eq!(Ease::from_name("spring"), Ease::Linear);

    let parsed: Ease = serde_json::from_str("\"easeOutElastic\"").unwrap();
    assert_eq!(parsed, Ease::OutElastic);
    let unknown: Ease = serde_json::from_str("\"wobble\"").unwrap();
    assert_eq!(unknown, Ease::Linear);
    assert_eq!(serde_json::to_string(&Ease::OutBack).unwrap(), "\"easeOutBack\"");
}
