use super::*;

#[test]
fn ids_are_unique_and_lowercase() {
    let styles = builtin_styles();
    let mut ids: Vec<&str> = styles.iter().map(|s| s.id.as_str()).collect();
    assert!(ids.iter().all(|id| *id == id.to_ascii_lowercase()));
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), styles.len());
}

#[test]
fn alias_targets_exist_and_never_shadow_ids() {
    let styles = builtin_styles();
    for (alias, target) in ALIASES {
        assert!(styles.iter().any(|s| s.id == *target), "{alias} -> {target}");
        assert!(!styles.iter().any(|s| s.id == *alias), "{alias} shadows an id");
    }
}

#[test]
fn signature_effects_present() {
    let styles = builtin_styles();
    let by = |id: &str| styles.iter().find(|s| s.id == id).unwrap().clone();

    let hormozi = by("hormozi");
    assert_eq!(hormozi.name, "Alex Hormozi");
    let emph = hormozi.keyword_emphasis.unwrap();
    assert_eq!(emph.color.as_deref(), Some("#FFC94A"));

    let glitch = by("glitch").glitch_effect.unwrap();
    assert_eq!((glitch.frequency_ms, glitch.duration_ms), (1000.0, 80.0));

    let neon = by("neon");
    assert_eq!(neon.glow.unwrap().radius, 40.0);
    assert_eq!(neon.animation.looped.unwrap().duration_ms, 2000.0);

    let minimal = by("minimal");
    assert_eq!(minimal.animation.entry.duration_ms, 180.0);
    assert_eq!(minimal.background.unwrap().opacity, 0.8);
}
