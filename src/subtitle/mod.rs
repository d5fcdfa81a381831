//! Plain-text subtitle exports of a word timeline.

pub mod ass;
pub mod srt;
pub mod vtt;

use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::Canvas;
use crate::foundation::error::{CapError, CapResult};
use crate::style::model::CaptionStyle;
use crate::timing::lines::{CaptionLine, LineBudget, group_lines};
use crate::timing::word::{WordTiming, validate_words};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    #[default]
    Srt,
    Vtt,
    Ass,
}

impl SubtitleFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
            Self::Ass => "ass",
        }
    }

    /// Format implied by a file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }
}

impl std::str::FromStr for SubtitleFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "srt" => Ok(Self::Srt),
            "vtt" | "webvtt" => Ok(Self::Vtt),
            "ass" | "ssa" => Ok(Self::Ass),
            other => Err(format!("unknown subtitle format '{other}' (expected srt, vtt or ass)")),
        }
    }
}

/// Group `words` into subtitle lines with the 42-character budget.
pub fn subtitle_lines(words: &[WordTiming]) -> Vec<CaptionLine> {
    group_lines(words, LineBudget::subtitle_default())
}

/// Render `words` as a subtitle document in `format`.
pub fn export(
    format: SubtitleFormat,
    words: &[WordTiming],
    style: &CaptionStyle,
    canvas: Canvas,
) -> CapResult<String> {
    validate_words(words)?;
    let lines = subtitle_lines(words);
    tracing::debug!(?format, lines = lines.len(), style = %style.id, "exporting subtitles");
    Ok(match format {
        SubtitleFormat::Srt => srt::to_srt(&lines, style.text_transform),
        SubtitleFormat::Vtt => vtt::to_vtt(&lines, style.text_transform),
        SubtitleFormat::Ass => ass::to_ass(&lines, style, canvas),
    })
}

/// [`export`] and write the result to `path`, creating parent directories.
pub fn write_subtitles(
    path: &Path,
    format: SubtitleFormat,
    words: &[WordTiming],
    style: &CaptionStyle,
    canvas: Canvas,
) -> CapResult<()> {
    if matches!(format, SubtitleFormat::Ass) {
        canvas.validate()?;
    }
    let text = export(format, words, style, canvas)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create subtitle directory '{}'", parent.display()))?;
    }
    std::fs::write(path, text)
        .with_context(|| format!("write subtitles '{}'", path.display()))
        .map_err(CapError::from)
}

#[cfg(test)]
#[path = "../../tests/unit/subtitle/mod.rs"]
mod tests;
