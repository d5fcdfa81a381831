use crate::animation::spec::{AnimationConfig, AnimationSpec, StaggerKind};
use crate::foundation::core::Rgba8;

/// Catalog grouping used for style listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Professional,
    Viral,
    Business,
    Sales,
    Creative,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Professional,
        Category::Viral,
        Category::Business,
        Category::Sales,
        Category::Creative,
    ];

    /// Parse a lowercase category name.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "professional" => Some(Self::Professional),
            "viral" => Some(Self::Viral),
            "business" => Some(Self::Business),
            "sales" => Some(Self::Sales),
            "creative" => Some(Self::Creative),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Professional => "professional",
            Self::Viral => "viral",
            Self::Business => "business",
            Self::Sales => "sales",
            Self::Creative => "creative",
        }
    }
}

/// Case transform applied to caption text before layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTransform {
    #[default]
    None,
    Uppercase,
    Lowercase,
    Capitalize,
}

impl TextTransform {
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::None => text.to_string(),
            Self::Uppercase => text.to_uppercase(),
            Self::Lowercase => text.to_lowercase(),
            Self::Capitalize => {
                let mut out = String::with_capacity(text.len());
                let mut at_start = true;
                for c in text.chars() {
                    if at_start && c.is_alphabetic() {
                        out.extend(c.to_uppercase());
                        at_start = false;
                    } else {
                        if c.is_whitespace() {
                            at_start = true;
                        }
                        out.push(c);
                    }
                }
                out
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StrokeStyle {
    pub color: String,
    pub width: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowStyle {
    pub offset_x: f64,
    pub offset_y: f64,
    pub blur: f64,
    pub color: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GlowStyle {
    pub color: String,
    pub radius: f64,
    pub intensity: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Padding {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundStyle {
    pub color: String,
    pub opacity: f64,
    /// Backdrop blur radius; only meaningful to compositors that see the video underneath.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<Padding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct KeywordEmphasis {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationConfig>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMode {
    #[default]
    Progressive,
    Instant,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KaraokeMode {
    pub enabled: bool,
    pub inactive_color: String,
    pub active_color: String,
    #[serde(default)]
    pub fill_mode: FillMode,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GlitchEffect {
    pub enabled: bool,
    /// Milliseconds between glitch bursts.
    #[serde(rename = "frequency")]
    pub frequency_ms: f64,
    /// Milliseconds each burst lasts.
    #[serde(rename = "duration")]
    pub duration_ms: f64,
    /// `[0, 1]`.
    pub intensity: f64,
}

/// Immutable caption style keyed by a stable id.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionStyle {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: Category,

    pub font_family: String,
    pub font_weight: u16,
    pub font_size: f64,
    pub text_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    #[serde(default)]
    pub text_transform: TextTransform,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<StrokeStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<ShadowStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glow: Option<GlowStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<BackgroundStyle>,

    pub animation: AnimationSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_emphasis: Option<KeywordEmphasis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub karaoke_mode: Option<KaraokeMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glitch_effect: Option<GlitchEffect>,
}

/// Sub-mode of the per-character strategy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CharMode {
    /// Characters appear in order, `delay_ms` apart, each fading in over `fade_ms`.
    Typewriter { delay_ms: f64, fade_ms: f64 },
    /// Words are progressively recolored in sync with their timings.
    Karaoke,
}

/// Rendering strategy, resolved once per style.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnimationStrategy {
    /// Words laid out individually, each with its own window keyed to its start time.
    PerWord,
    /// Character-level reveal or karaoke fill.
    PerChar(CharMode),
    /// The whole line is drawn as one run with only line state applied.
    LineLevel,
}

/// Default inter-character delay for typewriter styles without an explicit stagger.
pub const DEFAULT_TYPEWRITER_DELAY_MS: f64 = 40.0;

impl CaptionStyle {
    /// Resolve the rendering strategy from the animation declaration.
    pub fn strategy(&self) -> AnimationStrategy {
        let anim = &self.animation;
        let stagger = anim.stagger.map(|s| s.kind);
        if anim.per_word.is_some() || stagger == Some(StaggerKind::Word) {
            return AnimationStrategy::PerWord;
        }
        if anim.per_char.is_some() || stagger == Some(StaggerKind::Char) {
            if self.karaoke_mode.as_ref().is_some_and(|k| k.enabled) {
                return AnimationStrategy::PerChar(CharMode::Karaoke);
            }
            let delay_ms = anim
                .stagger
                .filter(|s| s.kind == StaggerKind::Char)
                .map(|s| s.delay_ms)
                .unwrap_or(DEFAULT_TYPEWRITER_DELAY_MS);
            let fade_ms = anim.per_char.as_ref().map(|c| c.duration_ms).unwrap_or(0.0);
            return AnimationStrategy::PerChar(CharMode::Typewriter { delay_ms, fade_ms });
        }
        AnimationStrategy::LineLevel
    }

    /// Validate the animation declaration and numeric typography fields.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("style id must be non-empty".to_string());
        }
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(format!("style '{}': font size must be > 0", self.id));
        }
        self.animation
            .validate()
            .map_err(|e| format!("style '{}': {e}", self.id))
    }

    /// Text color, falling back to opaque white when malformed.
    pub fn text_rgba(&self) -> Rgba8 {
        parse_color_or(&self.text_color, Rgba8::WHITE)
    }

    /// `true` when the style emphasizes keyword words.
    pub fn emphasizes_keywords(&self) -> bool {
        self.keyword_emphasis.as_ref().is_some_and(|k| k.enabled)
    }

    /// Active glitch effect, if any.
    pub fn active_glitch(&self) -> Option<&GlitchEffect> {
        self.glitch_effect.as_ref().filter(|g| g.enabled)
    }
}

/// Parse a style color (`#RRGGBB` or `rgba(..)`), returning `fallback` on malformed input.
pub fn parse_color_or(s: &str, fallback: Rgba8) -> Rgba8 {
    match Rgba8::parse_css(s) {
        Some(c) => c,
        None => {
            tracing::debug!(color = s, "malformed style color, using fallback");
            fallback
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/model.rs"]
mod tests;
