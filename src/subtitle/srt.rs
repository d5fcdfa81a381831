use crate::style::model::TextTransform;
use crate::timing::lines::CaptionLine;

/// `HH:MM:SS,mmm`, rounded to the nearest millisecond. Negative input clamps to zero.
pub fn format_srt_time(secs: f64) -> String {
    let (h, m, s, ms) = split_millis(secs);
    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}

fn split_millis(secs: f64) -> (u64, u64, u64, u64) {
    let total = if secs.is_finite() && secs > 0.0 {
        (secs * 1000.0).round() as u64
    } else {
        0
    };
    (
        total / 3_600_000,
        (total % 3_600_000) / 60_000,
        (total % 60_000) / 1000,
        total % 1000,
    )
}

/// Numbered SubRip cues, one per line, separated by blank lines.
pub fn to_srt(lines: &[CaptionLine], transform: TextTransform) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            format_srt_time(line.start()),
            format_srt_time(line.end()),
            transform.apply(&line.text())
        ));
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/subtitle/srt.rs"]
mod tests;
