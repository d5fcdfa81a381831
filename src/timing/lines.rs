use crate::timing::word::WordTiming;

/// Default character budget for subtitle export.
pub const DEFAULT_MAX_CHARS: usize = 42;
/// Default duration budget for animated overlays, in seconds.
pub const DEFAULT_MAX_LINE_SECS: f64 = 3.0;

/// What closes a caption line besides sentence punctuation.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum LineBudget {
    /// Maximum characters per line, counting one separator per word.
    Chars(usize),
    /// Maximum seconds from the first word's start to the last word's end.
    Duration(f64),
}

impl Default for LineBudget {
    fn default() -> Self {
        Self::Duration(DEFAULT_MAX_LINE_SECS)
    }
}

impl LineBudget {
    pub fn subtitle_default() -> Self {
        Self::Chars(DEFAULT_MAX_CHARS)
    }
}

/// Non-empty run of contiguous words shown together.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptionLine {
    words: Vec<WordTiming>,
}

impl CaptionLine {
    /// `None` for an empty word list.
    pub fn new(words: Vec<WordTiming>) -> Option<Self> {
        if words.is_empty() {
            None
        } else {
            Some(Self { words })
        }
    }

    pub fn words(&self) -> &[WordTiming] {
        &self.words
    }

    pub fn into_words(self) -> Vec<WordTiming> {
        self.words
    }

    pub fn start(&self) -> f64 {
        self.words[0].start
    }

    pub fn end(&self) -> f64 {
        self.words[self.words.len() - 1].end
    }

    pub fn duration(&self) -> f64 {
        (self.end() - self.start()).max(0.0)
    }

    /// Words joined with single spaces.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for (i, w) in self.words.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(&w.text);
        }
        out
    }

    /// Inclusive on both ends.
    pub fn is_active_at(&self, t: f64) -> bool {
        t >= self.start() && t <= self.end()
    }
}

/// Greedy line grouping.
///
/// A line closes when the next word would overflow the budget (that word opens the next
/// line) or right after a word ending in `.`, `!` or `?`.
pub fn group_lines(words: &[WordTiming], budget: LineBudget) -> Vec<CaptionLine> {
    let mut lines = Vec::new();
    let mut current: Vec<WordTiming> = Vec::new();
    let mut char_len = 0usize;

    for word in words {
        let word_len = word.text.chars().count() + 1;
        let overflow = !current.is_empty()
            && match budget {
                LineBudget::Chars(max) => char_len + word_len > max,
                LineBudget::Duration(max) => word.end - current[0].start > max,
            };
        if overflow {
            lines.extend(CaptionLine::new(std::mem::take(&mut current)));
            char_len = 0;
        }
        current.push(word.clone());
        char_len += word_len;

        if word.ends_sentence() {
            lines.extend(CaptionLine::new(std::mem::take(&mut current)));
            char_len = 0;
        }
    }
    lines.extend(CaptionLine::new(current));
    lines
}

/// Lines active at `t`, in order.
pub fn active_lines(lines: &[CaptionLine], t: f64) -> impl Iterator<Item = &CaptionLine> {
    lines.iter().filter(move |l| l.is_active_at(t))
}

#[cfg(test)]
#[path = "../../tests/unit/timing/lines.rs"]
mod tests;
