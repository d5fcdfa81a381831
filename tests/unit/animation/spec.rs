use super::*;

fn fade(ms: f64) -> AnimationConfig {
    AnimationConfig::new(
        ms,
        Ease::Linear,
        AnimationProperties {
            opacity: Some(Range::new(0.0, 1.0)),
            ..AnimationProperties::default()
        },
    )
}

#[test]
fn deserializes_style_definition_shape() {
    let json = r##"{
        "entry": { "duration": 180, "easing": "easeOutBack",
                   "properties": { "opacity": { "from": 0, "to": 1 },
                                   "scale": { "from": 1.15, "to": 1.0 } } },
        "perWord": { "duration": 120, "delay": 0, "easing": "easeOutBack",
                     "properties": { "scale": { "from": 1.0, "to": 1.08 } } },
        "exit": { "duration": 160, "easing": "easeIn",
                  "properties": { "opacity": { "from": 1, "to": 0 } } },
        "stagger": { "type": "word", "delay": 40 }
    }"##;
    let spec: AnimationSpec = serde_json::from_str(json).unwrap();
    assert_eq!(spec.entry.easing, Ease::OutBack);
    assert_eq!(spec.entry.properties.scale, Some(Range::new(1.15, 1.0)));
    assert_eq!(spec.per_word.as_ref().unwrap().delay_ms, Some(0.0));
    assert_eq!(spec.stagger.unwrap().kind, StaggerKind::Word);
    assert!(spec.per_char.is_none());
    assert!(spec.validate().is_ok());
}

#[test]
fn missing_easing_defaults_to_linear() {
    let cfg: AnimationConfig = serde_json::from_str(r#"{ "duration": 0, "properties": {} }"#).unwrap();
    assert_eq!(cfg.easing, Ease::Linear);
    assert!(cfg.properties.is_empty());
}

#[test]
fn validate_rejects_negative_durations_and_mixed_stagger() {
    let mut spec = AnimationSpec {
        entry: fade(-1.0),
        exit: fade(100.0),
        ..AnimationSpec::default()
    };
    assert!(spec.validate().is_err());

    spec.entry = fade(100.0);
    spec.per_word = Some(fade(80.0));
    spec.stagger = Some(Stagger {
        kind: StaggerKind::Char,
        delay_ms: 40.0,
    });
    assert!(spec.validate().unwrap_err().contains("never both"));

    spec.stagger = None;
    assert!(spec.validate().is_ok());
}

#[test]
fn sample_only_declared_channels() {
    let cfg = fade(200.0);
    assert_eq!(cfg.sample(cfg.properties.opacity.as_ref(), 0.5), Some(0.5));
    assert_eq!(cfg.sample(cfg.properties.scale.as_ref(), 0.5), None);
    assert!((cfg.duration_secs() - 0.2).abs() < 1e-12);
}
