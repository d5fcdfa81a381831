use crate::foundation::error::{CapError, CapResult};

/// One transcribed word with absolute timings in seconds.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WordTiming {
    pub text: String,
    pub start: f64,
    pub end: f64,
    #[serde(rename = "isKeyword", default)]
    pub is_keyword: bool,
}

impl WordTiming {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            is_keyword: false,
        }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// `true` when the word ends with sentence punctuation.
    pub fn ends_sentence(&self) -> bool {
        self.text
            .trim_end()
            .ends_with(|c: char| matches!(c, '.' | '!' | '?'))
    }

    /// Copy of this word with both timings shifted by `-offset`.
    pub fn rebased(&self, offset: f64) -> Self {
        Self {
            text: self.text.clone(),
            start: self.start - offset,
            end: self.end - offset,
            is_keyword: self.is_keyword,
        }
    }
}

/// Check the timing invariants: finite times, `start <= end`, starts non-decreasing.
///
/// Zero-length words are accepted; renderers treat them as instantly complete.
pub fn validate_words(words: &[WordTiming]) -> CapResult<()> {
    let mut prev_start = f64::NEG_INFINITY;
    for (i, w) in words.iter().enumerate() {
        if !w.start.is_finite() || !w.end.is_finite() {
            return Err(CapError::validation(format!(
                "word {i} ('{}') has non-finite timing",
                w.text
            )));
        }
        if w.start < 0.0 {
            return Err(CapError::validation(format!(
                "word {i} ('{}') starts before 0",
                w.text
            )));
        }
        if w.end < w.start {
            return Err(CapError::validation(format!(
                "word {i} ('{}') ends before it starts ({} > {})",
                w.text, w.start, w.end
            )));
        }
        if w.start < prev_start {
            return Err(CapError::validation(format!(
                "word {i} ('{}') starts before the previous word",
                w.text
            )));
        }
        prev_start = w.start;
    }
    Ok(())
}

/// End time of the last word, or 0 for an empty list.
pub fn words_end(words: &[WordTiming]) -> f64 {
    words.iter().map(|w| w.end).fold(0.0, f64::max)
}

#[cfg(test)]
#[path = "../../tests/unit/timing/word.rs"]
mod tests;
