use super::*;
use crate::style::model::FillMode;
use crate::style::registry::StyleRegistry;

fn word(text: &str, start: f64, end: f64) -> WordTiming {
    WordTiming::new(text, start, end)
}

#[test]
fn minimal_entry_ramps_opacity_over_180ms() {
    let style = StyleRegistry::builtin().get("minimal");
    let at = |t: f64| line_state(&style, 0.0, 1.2, t);

    assert_eq!(at(0.0).opacity, 0.0);
    assert_eq!(at(0.0).translate_y, 6.0);
    let mid = at(0.09).opacity;
    assert!(mid > 0.0 && mid < 1.0);
    assert!(at(0.06).opacity < at(0.12).opacity);
    assert_eq!(at(0.5), RenderState::neutral(&style));
}

#[test]
fn exit_window_fades_out_and_wins_over_entry() {
    let style = StyleRegistry::builtin().get("minimal");
    let end = line_state(&style, 0.0, 1.2, 1.2);
    assert_eq!(end.opacity, 0.0);
    let near_end = line_state(&style, 0.0, 1.2, 1.1);
    assert!(near_end.opacity < 1.0 && near_end.opacity > 0.0);

    // 0.1 s line: both windows open, exit applied last.
    let short = line_state(&style, 0.0, 0.1, 0.1);
    assert_eq!(short.opacity, 0.0);
}

#[test]
fn loop_only_between_entry_and_exit() {
    let style = StyleRegistry::builtin().get("glitch");
    // glitch loop: 80 ms, translateX -3 -> 3.
    let in_entry = line_state(&style, 0.0, 5.0, 0.05);
    assert_eq!(in_entry.translate_x, 0.0);
    // 1.0 s is half way through an 80 ms period.
    let looped_mid = line_state(&style, 0.0, 5.0, 1.0);
    assert!(looped_mid.translate_x.abs() < 1e-6);
    let looped_late = line_state(&style, 0.0, 5.0, 1.02);
    assert!((looped_late.translate_x - 1.5).abs() < 1e-6);
}

#[test]
fn neutral_glow_comes_from_style() {
    let reg = StyleRegistry::builtin();
    let neon = RenderState::neutral(&reg.get("neon"));
    assert_eq!((neon.glow_intensity, neon.glow_radius), (1.2, 40.0));
    let minimal = RenderState::neutral(&reg.get("minimal"));
    assert_eq!(minimal.glow_intensity, 0.0);
    assert_eq!(minimal.background_width, 1.0);
}

#[test]
fn per_word_reveal_holds_before_and_after_window() {
    let style = StyleRegistry::builtin().get("highlight");
    let line = RenderState::neutral(&style);
    let w = word("money", 1.0, 1.5);

    let before = word_state(&style, &line, &w, 0.5);
    assert_eq!(before.opacity, 0.0);
    assert_eq!(before.background_width, 0.0);

    let during = word_state(&style, &line, &w, 1.06);
    assert!(during.background_width > 0.0 && during.background_width < 1.0);

    let after = word_state(&style, &line, &w, 1.4);
    assert_eq!(after.opacity, 1.0);
    assert_eq!(after.background_width, 1.0);
}

#[test]
fn per_word_pop_only_inside_window() {
    let style = StyleRegistry::builtin().get("mrbeast");
    let line = RenderState::neutral(&style);
    let w = word("big", 2.0, 2.6);
    assert_eq!(word_state(&style, &line, &w, 1.9).scale, 1.0);
    assert!(word_state(&style, &line, &w, 2.06).scale > 1.0);
    assert_eq!(word_state(&style, &line, &w, 2.2).scale, 1.0);
}

#[test]
fn keyword_emphasis_settles_on_emphasis_color() {
    let style = StyleRegistry::builtin().get("hormozi");
    let line = RenderState::neutral(&style);
    let mut w = word("FREE", 1.0, 1.4);

    let plain = word_state(&style, &line, &w, 1.3);
    assert_eq!(plain.color, Rgba8::WHITE);

    w.is_keyword = true;
    assert_eq!(word_state(&style, &line, &w, 0.9).color, Rgba8::WHITE);
    let settled = word_state(&style, &line, &w, 1.3);
    assert_eq!(settled.color, Rgba8::rgb(0xFF, 0xC9, 0x4A));
    assert_eq!(settled.scale, line.scale);
}

#[test]
fn keyword_scale_returns_to_line_scale_after_window() {
    let style = StyleRegistry::builtin().get("mrbeast");
    let line = line_state(&style, 1.0, 3.0, 2.0);
    let mut w = word("FREE", 1.0, 1.5);
    w.is_keyword = true;

    let ws = word_state(&style, &line, &w, 2.0);
    assert_eq!(ws.scale, line.scale);
    let emphasis = style.keyword_emphasis.as_ref().and_then(|e| e.color.as_deref());
    if let Some(color) = emphasis {
        assert_eq!(ws.color, parse_color_or(color, Rgba8::WHITE));
    }
}

#[test]
fn karaoke_progress_matches_word_timing() {
    let w = word("sing", 2.0, 4.0);
    assert_eq!(karaoke_progress(&w, 1.0, FillMode::Progressive), 0.0);
    assert_eq!(karaoke_progress(&w, 3.0, FillMode::Progressive), 0.5);
    assert_eq!(karaoke_progress(&w, 5.0, FillMode::Progressive), 1.0);
    assert_eq!(karaoke_progress(&w, 2.5, FillMode::Instant), 1.0);

    let blip = word("a", 1.0, 1.0);
    assert_eq!(karaoke_progress(&blip, 1.0, FillMode::Progressive), 0.0);
    assert_eq!(karaoke_progress(&blip, 1.001, FillMode::Progressive), 1.0);
}

#[test]
fn typewriter_reveals_in_order() {
    // 40 ms apart, 40 ms fade.
    assert_eq!(char_opacity(1.0, 0, 40.0, 40.0, 0.99), 0.0);
    assert!((char_opacity(1.0, 0, 40.0, 40.0, 1.02) - 0.5).abs() < 1e-9);
    assert_eq!(char_opacity(1.0, 2, 40.0, 40.0, 1.05), 0.0);
    assert_eq!(char_opacity(1.0, 2, 40.0, 0.0, 1.09), 1.0);

    let done = typing_complete_at(1.0, 5, 40.0, 40.0);
    assert!((done - 1.2).abs() < 1e-9);
    assert!(!cursor_visible(done, done - 0.01));
    assert!(cursor_visible(done, done + 0.1));
    assert!(!cursor_visible(done, done + 0.3));
    assert!(cursor_visible(done, done + 0.6));
    assert!(!cursor_visible(done, done + 1.1));
}

#[test]
fn glitch_bursts_are_periodic_and_deterministic() {
    let style = StyleRegistry::builtin().get("glitch");
    let g = style.active_glitch().unwrap();
    let a = glitch_offset(&style.id, g, 2.05);
    assert!(a.is_some());
    assert_eq!(a, glitch_offset(&style.id, g, 2.05));
    assert!(a.unwrap() >= 0.0 && a.unwrap() <= 10.0 * g.intensity);
    assert!(glitch_offset(&style.id, g, 2.5).is_none());
}
