use super::*;
use crate::style::registry::StyleRegistry;
use crate::timing::word::WordTiming;

fn hi_there() -> Vec<CaptionLine> {
    vec![
        CaptionLine::new(vec![
            WordTiming::new("Hi", 0.0, 0.5),
            WordTiming::new("there.", 0.5, 1.2),
        ])
        .unwrap(),
    ]
}

#[test]
fn centisecond_timestamps() {
    assert_eq!(format_ass_time(0.0), "0:00:00.00");
    assert_eq!(format_ass_time(1.2), "0:00:01.20");
    assert_eq!(format_ass_time(3725.456), "1:02:05.46");
}

#[test]
fn colors_are_alpha_blue_green_red() {
    assert_eq!(ass_color(Rgba8::rgb(0x12, 0x34, 0x56)), "&H00563412");
    assert_eq!(ass_color(Rgba8::BLACK.with_opacity(0.8)), "&H33000000");
    assert_eq!(ass_color(Rgba8::TRANSPARENT), "&HFF000000");
}

#[test]
fn script_info_uses_canvas_resolution() {
    let style = StyleRegistry::builtin().get("minimal");
    let text = to_ass(&hi_there(), &style, Canvas::new(1080, 1920));
    assert!(text.starts_with("[Script Info]\n"));
    assert!(text.contains("PlayResX: 1080\nPlayResY: 1920\n"));
    assert!(text.contains("[V4+ Styles]\n"));
    assert!(text.contains("[Events]\n"));
}

#[test]
fn style_line_reflects_caption_style() {
    let style = StyleRegistry::builtin().get("minimal");
    let text = to_ass(&hi_there(), &style, Canvas::new(1080, 1920));
    let line = text.lines().find(|l| l.starts_with("Style: ")).unwrap();
    let fields: Vec<&str> = line.trim_start_matches("Style: ").split(',').collect();
    assert_eq!(fields.len(), 23);
    assert_eq!(fields[0], "minimal");
    assert_eq!(fields[1], "Arial");
    assert_eq!(fields[2], "46");
    assert_eq!(fields[3], "&H00FFFFFF");
    assert_eq!(fields[6], "&H33000000");
    assert_eq!(fields[7], "0", "weight 400 is not bold");
    assert_eq!(fields[15], "3", "background renders as an opaque box");
    assert_eq!(fields[18], "2");
    assert_eq!(fields[21], "384");
}

#[test]
fn heavy_weights_are_bold() {
    let style = StyleRegistry::builtin().get("karaoke");
    let text = to_ass(&hi_there(), &style, Canvas::default());
    let line = text.lines().find(|l| l.starts_with("Style: ")).unwrap();
    let fields: Vec<&str> = line.trim_start_matches("Style: ").split(',').collect();
    assert_eq!(fields[7], "-1");
    assert_eq!(fields[16], "6", "stroke width becomes the outline");
}

#[test]
fn dialogue_carries_fade_from_entry_and_exit() {
    let style = StyleRegistry::builtin().get("minimal");
    let text = to_ass(&hi_there(), &style, Canvas::default());
    assert!(
        text.contains("Dialogue: 0,0:00:00.00,0:00:01.20,minimal,,0,0,0,,{\\fad(180,180)}Hi there.\n"),
        "{text}"
    );
}

#[test]
fn karaoke_styles_tag_every_word() {
    let style = StyleRegistry::builtin().get("karaoke");
    let text = to_ass(&hi_there(), &style, Canvas::default());
    let dialogue = text.lines().find(|l| l.starts_with("Dialogue:")).unwrap();
    assert!(dialogue.ends_with("{\\k50}Hi {\\k70}there."), "{dialogue}");
}

#[test]
fn braces_in_text_cannot_open_override_blocks() {
    assert_eq!(escape_text("a {b} c"), "a (b) c");
    assert_eq!(escape_text("one\ntwo"), "one\\Ntwo");
}
