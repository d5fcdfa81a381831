use crate::style::model::TextTransform;
use crate::subtitle::srt::to_srt;
use crate::timing::lines::CaptionLine;

/// WebVTT text: the SubRip cues with `.` millisecond separators under a `WEBVTT` header.
pub fn to_vtt(lines: &[CaptionLine], transform: TextTransform) -> String {
    let srt = to_srt(lines, transform);
    let mut out = String::from("WEBVTT\n\n");
    for line in srt.lines() {
        if line.contains(" --> ") {
            out.push_str(&line.replace(',', "."));
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/subtitle/vtt.rs"]
mod tests;
