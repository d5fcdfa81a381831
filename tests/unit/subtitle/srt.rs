use super::*;
use crate::timing::word::WordTiming;

fn line(words: &[(&str, f64, f64)]) -> CaptionLine {
    CaptionLine::new(
        words
            .iter()
            .map(|&(t, s, e)| WordTiming::new(t, s, e))
            .collect(),
    )
    .unwrap()
}

#[test]
fn timestamps_round_to_milliseconds() {
    assert_eq!(format_srt_time(0.0), "00:00:00,000");
    assert_eq!(format_srt_time(1.2), "00:00:01,200");
    assert_eq!(format_srt_time(3725.0456), "01:02:05,046");
    assert_eq!(format_srt_time(-3.0), "00:00:00,000");
}

#[test]
fn cues_are_numbered_from_one() {
    let lines = vec![
        line(&[("Hi", 0.0, 0.5), ("there.", 0.5, 1.2)]),
        line(&[("Bye", 2.0, 2.4)]),
    ];
    let text = to_srt(&lines, TextTransform::None);
    assert_eq!(
        text,
        "1\n00:00:00,000 --> 00:00:01,200\nHi there.\n\n2\n00:00:02,000 --> 00:00:02,400\nBye\n\n"
    );
}

#[test]
fn transform_applies_to_cue_text() {
    let lines = vec![line(&[("make", 0.0, 0.3), ("money", 0.3, 0.7)])];
    assert!(to_srt(&lines, TextTransform::Uppercase).contains("\nMAKE MONEY\n"));
}

#[test]
fn no_lines_is_empty_document() {
    assert!(to_srt(&[], TextTransform::None).is_empty());
}
