use crate::animation::ease::Ease;
use crate::animation::interp::interpolate;

/// A `{from, to}` pair for one animatable channel.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Range<T> {
    /// Value at progress 0.
    pub from: T,
    /// Value at progress 1.
    pub to: T,
}

impl<T> Range<T> {
    /// Build a range.
    pub const fn new(from: T, to: T) -> Self {
        Self { from, to }
    }
}

impl Range<f64> {
    /// Sample this range at `progress` with `ease`.
    pub fn sample(&self, progress: f64, ease: Ease) -> f64 {
        interpolate(self.from, self.to, progress, ease)
    }
}

/// Sparse map of animatable channels. `None` means "not animated by this config".
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationProperties {
    pub opacity: Option<Range<f64>>,
    pub scale: Option<Range<f64>>,
    /// Pixels.
    pub translate_x: Option<Range<f64>>,
    /// Pixels.
    pub translate_y: Option<Range<f64>>,
    /// Degrees.
    pub rotate: Option<Range<f64>>,
    /// Pixels.
    pub blur: Option<Range<f64>>,
    pub glow_intensity: Option<Range<f64>>,
    /// Pixels.
    pub glow_radius: Option<Range<f64>>,
    /// Hex colors.
    pub color_shift: Option<Range<String>>,
    /// Fill fraction in `[0, 1]`.
    pub background_width: Option<Range<f64>>,
    /// Fill fraction in `[0, 1]`.
    pub background_height: Option<Range<f64>>,
    /// Pixels.
    pub rgb_split_x: Option<Range<f64>>,
    /// Pixels.
    pub rgb_split_y: Option<Range<f64>>,
}

impl AnimationProperties {
    /// Return `true` when no channel is declared.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One timed animation window.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationConfig {
    /// Window length in milliseconds.
    #[serde(rename = "duration")]
    pub duration_ms: f64,
    /// Optional start delay in milliseconds.
    #[serde(rename = "delay", default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<f64>,
    #[serde(default)]
    pub easing: Ease,
    #[serde(default)]
    pub properties: AnimationProperties,
}

impl AnimationConfig {
    /// Build a config with no delay.
    pub fn new(duration_ms: f64, easing: Ease, properties: AnimationProperties) -> Self {
        Self {
            duration_ms,
            delay_ms: None,
            easing,
            properties,
        }
    }

    /// Window length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration_ms / 1000.0
    }

    /// Sample a numeric channel, if declared.
    pub fn sample(&self, range: Option<&Range<f64>>, progress: f64) -> Option<f64> {
        range.map(|r| r.sample(progress, self.easing))
    }
}

/// Which items a stagger offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaggerKind {
    Word,
    Char,
}

/// Per-item timing offset within a line.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stagger {
    #[serde(rename = "type")]
    pub kind: StaggerKind,
    /// Milliseconds between consecutive items.
    #[serde(rename = "delay")]
    pub delay_ms: f64,
}

/// Full animation declaration of a caption style.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationSpec {
    pub entry: AnimationConfig,
    pub exit: AnimationConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_word: Option<AnimationConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_char: Option<AnimationConfig>,
    #[serde(rename = "loop", default, skip_serializing_if = "Option::is_none")]
    pub looped: Option<AnimationConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stagger: Option<Stagger>,
}

impl AnimationSpec {
    /// Check durations and the word/char exclusivity rule.
    pub fn validate(&self) -> Result<(), String> {
        let windows = [
            ("entry", Some(&self.entry)),
            ("exit", Some(&self.exit)),
            ("perWord", self.per_word.as_ref()),
            ("perChar", self.per_char.as_ref()),
            ("loop", self.looped.as_ref()),
        ];
        for (name, cfg) in windows {
            let Some(cfg) = cfg else { continue };
            if !cfg.duration_ms.is_finite() || cfg.duration_ms < 0.0 {
                return Err(format!("{name} duration must be finite and >= 0"));
            }
            if let Some(d) = cfg.delay_ms
                && (!d.is_finite() || d < 0.0)
            {
                return Err(format!("{name} delay must be finite and >= 0"));
            }
        }
        if let Some(s) = self.stagger
            && (!s.delay_ms.is_finite() || s.delay_ms < 0.0)
        {
            return Err("stagger delay must be finite and >= 0".to_string());
        }

        let wants_word = self.per_word.is_some()
            || matches!(self.stagger, Some(Stagger { kind: StaggerKind::Word, .. }));
        let wants_char = self.per_char.is_some()
            || matches!(self.stagger, Some(Stagger { kind: StaggerKind::Char, .. }));
        if wants_word && wants_char {
            return Err("a style staggers by word or by char, never both".to_string());
        }
        if self.looped.as_ref().is_some_and(|l| l.duration_ms <= 0.0) {
            return Err("loop duration must be > 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/spec.rs"]
mod tests;
