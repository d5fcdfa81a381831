use super::*;
use crate::style::model::{AnimationStrategy, CharMode};

#[test]
fn builtin_catalog_has_eighteen_valid_styles() {
    let reg = StyleRegistry::builtin();
    assert_eq!(reg.len(), 18);
    for s in reg.list() {
        s.validate().unwrap();
        assert_eq!(reg.resolve(&s.id).unwrap().id, s.id);
    }
}

#[test]
fn categories_partition_catalog() {
    let reg = StyleRegistry::builtin();
    let total: usize = Category::ALL
        .iter()
        .map(|c| reg.list_by_category(*c).len())
        .sum();
    assert_eq!(total, reg.len());
    let sales: Vec<_> = reg
        .list_by_category(Category::Sales)
        .iter()
        .map(|s| s.id.clone())
        .collect();
    assert_eq!(sales, vec!["hormozi".to_string()]);
}

#[test]
fn normalization_and_aliases() {
    let reg = StyleRegistry::builtin();
    assert_eq!(StyleRegistry::normalize_id("  Deep_Diver "), "deep-diver");
    assert_eq!(reg.get("Deep Diver").id, "cinematic");
    assert_eq!(reg.get("BEASTY").id, "mrbeast");
    assert_eq!(reg.get("baby_steps").id, "bounce");
    assert_eq!(reg.get("think media").id, "uppercase");
    assert_eq!(reg.get("Karaoke").id, "karaoke");
    assert!(reg.aliases_of("blur").contains(&"focus"));
}

#[test]
fn unknown_id_falls_back_to_default() {
    let reg = StyleRegistry::builtin();
    assert!(reg.resolve("does-not-exist").is_none());
    assert_eq!(reg.get("does-not-exist").id, DEFAULT_STYLE_ID);
    assert_eq!(reg.get("").id, DEFAULT_STYLE_ID);
}

#[test]
fn builtin_strategies_match_declarations() {
    let reg = StyleRegistry::builtin();
    assert_eq!(reg.get("highlight").strategy(), AnimationStrategy::PerWord);
    assert_eq!(reg.get("mrbeast").strategy(), AnimationStrategy::PerWord);
    assert_eq!(
        reg.get("karaoke").strategy(),
        AnimationStrategy::PerChar(CharMode::Karaoke)
    );
    assert_eq!(
        reg.get("typewriter").strategy(),
        AnimationStrategy::PerChar(CharMode::Typewriter {
            delay_ms: 40.0,
            fade_ms: 40.0
        })
    );
    assert_eq!(reg.get("minimal").strategy(), AnimationStrategy::LineLevel);
}

#[test]
fn from_styles_rejects_dangling_alias_and_duplicates() {
    let styles = builtin_styles();
    let mut aliases = HashMap::new();
    aliases.insert("x".to_string(), "missing".to_string());
    let err = StyleRegistry::from_styles(styles.clone(), aliases, "minimal").unwrap_err();
    assert!(err.to_string().contains("unknown style"));

    let mut dup = styles.clone();
    dup.push(styles[0].clone());
    assert!(StyleRegistry::from_styles(dup, HashMap::new(), "minimal").is_err());

    assert!(StyleRegistry::from_styles(styles, HashMap::new(), "nope").is_err());
}

#[test]
fn clones_share_catalog() {
    let a = StyleRegistry::builtin();
    let b = a.clone();
    assert!(Arc::ptr_eq(&a.get("neon"), &b.get("neon")));
}
