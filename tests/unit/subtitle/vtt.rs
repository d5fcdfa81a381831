use super::*;
use crate::timing::word::WordTiming;

#[test]
fn header_and_dot_separators() {
    let lines = vec![
        CaptionLine::new(vec![
            WordTiming::new("Hi,", 0.0, 0.5),
            WordTiming::new("there.", 0.5, 1.25),
        ])
        .unwrap(),
    ];
    let text = to_vtt(&lines, TextTransform::None);
    assert!(text.starts_with("WEBVTT\n\n"));
    assert!(text.contains("00:00:00.000 --> 00:00:01.250\n"));
    assert!(!text.contains(",000"));
    // Commas inside cue text are left alone.
    assert!(text.contains("Hi, there."));
}

#[test]
fn empty_timeline_is_header_only() {
    assert_eq!(to_vtt(&[], TextTransform::None), "WEBVTT\n\n");
}
