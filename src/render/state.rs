use crate::animation::ease::Ease;
use crate::animation::interp::{interpolate, interpolate_rgba};
use crate::animation::spec::{AnimationConfig, Range};
use crate::foundation::core::Rgba8;
use crate::foundation::math::{clamp01, seeded_unit};
use crate::style::model::{CaptionStyle, FillMode, GlitchEffect, parse_color_or};
use crate::timing::word::WordTiming;

/// Emphasis window used when the style does not declare one.
pub const DEFAULT_EMPHASIS_MS: f64 = 120.0;
/// How long the typewriter cursor stays up after the last character lands.
pub const CURSOR_HOLD_SECS: f64 = 1.0;
/// Full on/off blink cycle of the typewriter cursor.
pub const CURSOR_BLINK_SECS: f64 = 0.5;

/// Frame-local visual parameters of one caption line.
///
/// Always computed from scratch for a timestamp; nothing carries over between frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderState {
    pub opacity: f64,
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    /// Degrees.
    pub rotate: f64,
    pub blur: f64,
    pub glow_intensity: f64,
    pub glow_radius: f64,
    pub background_width: f64,
    pub background_height: f64,
    pub rgb_split_x: f64,
    pub rgb_split_y: f64,
}

impl RenderState {
    /// Values before any animation window applies. Glow starts at the style's own glow.
    pub fn neutral(style: &CaptionStyle) -> Self {
        let (glow_intensity, glow_radius) = style
            .glow
            .as_ref()
            .map(|g| (g.intensity, g.radius))
            .unwrap_or((0.0, 0.0));
        Self {
            opacity: 1.0,
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
            rotate: 0.0,
            blur: 0.0,
            glow_intensity,
            glow_radius,
            background_width: 1.0,
            background_height: 1.0,
            rgb_split_x: 0.0,
            rgb_split_y: 0.0,
        }
    }

    /// Overwrite every channel `cfg` declares with its value at `progress`.
    pub fn apply(&mut self, cfg: &AnimationConfig, progress: f64) {
        let p = clamp01(progress);
        let ease = cfg.easing;
        let props = &cfg.properties;
        let set = |slot: &mut f64, range: &Option<Range<f64>>| {
            if let Some(r) = range {
                *slot = r.sample(p, ease);
            }
        };
        set(&mut self.opacity, &props.opacity);
        set(&mut self.scale, &props.scale);
        set(&mut self.translate_x, &props.translate_x);
        set(&mut self.translate_y, &props.translate_y);
        set(&mut self.rotate, &props.rotate);
        set(&mut self.blur, &props.blur);
        set(&mut self.glow_intensity, &props.glow_intensity);
        set(&mut self.glow_radius, &props.glow_radius);
        set(&mut self.background_width, &props.background_width);
        set(&mut self.background_height, &props.background_height);
        set(&mut self.rgb_split_x, &props.rgb_split_x);
        set(&mut self.rgb_split_y, &props.rgb_split_y);
        self.opacity = clamp01(self.opacity);
        self.background_width = self.background_width.max(0.0);
        self.background_height = self.background_height.max(0.0);
    }
}

/// Line state at `t` for a line spanning `[line_start, line_end]`.
///
/// Entry applies while `t - line_start < entry`, exit while `line_end - t < exit` (exit wins
/// when both overlap), and the loop only when neither window is open.
pub fn line_state(style: &CaptionStyle, line_start: f64, line_end: f64, t: f64) -> RenderState {
    let anim = &style.animation;
    let mut state = RenderState::neutral(style);
    let elapsed = t - line_start;
    let remaining = line_end - t;

    let entry = anim.entry.duration_secs();
    let in_entry = elapsed < entry;
    if in_entry {
        state.apply(&anim.entry, elapsed / entry);
    }

    let exit = anim.exit.duration_secs();
    let in_exit = remaining < exit;
    if in_exit {
        state.apply(&anim.exit, 1.0 - remaining / exit);
    }

    if !in_entry
        && !in_exit
        && let Some(looped) = anim.looped.as_ref()
    {
        let period = looped.duration_secs();
        if period > 0.0 {
            state.apply(looped, elapsed.rem_euclid(period) / period);
        }
    }
    state
}

/// Per-word visual parameters layered on top of the line state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WordRenderState {
    /// Line opacity times the word's own reveal factor.
    pub opacity: f64,
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pub color: Rgba8,
    pub background_width: f64,
    pub glow_intensity: f64,
}

/// Word state at `t`, keyed to the word's own start time.
///
/// Reveal channels (`opacity`, `backgroundWidth`) hold `from` before the word starts and `to`
/// once its window has elapsed. Motion channels (`scale`, `translate*`, `glowIntensity`) only act
/// inside the window, which yields the staggered pop.
pub fn word_state(
    style: &CaptionStyle,
    line: &RenderState,
    word: &WordTiming,
    t: f64,
) -> WordRenderState {
    let mut out = WordRenderState {
        opacity: line.opacity,
        scale: line.scale,
        translate_x: line.translate_x,
        translate_y: line.translate_y,
        color: style.text_rgba(),
        background_width: line.background_width,
        glow_intensity: line.glow_intensity,
    };
    let since = t - word.start;

    if let Some(per_word) = style.animation.per_word.as_ref() {
        let window = per_word.duration_secs();
        let props = &per_word.properties;
        let progress = if since < 0.0 {
            0.0
        } else if window <= 0.0 {
            1.0
        } else {
            clamp01(since / window)
        };
        if let Some(r) = props.opacity.as_ref() {
            out.opacity *= clamp01(r.sample(progress, per_word.easing));
        }
        if let Some(r) = props.background_width.as_ref() {
            out.background_width = r.sample(progress, per_word.easing).max(0.0);
        }
        if since >= 0.0 && since < window {
            if let Some(r) = props.scale.as_ref() {
                out.scale *= r.sample(progress, per_word.easing);
            }
            if let Some(r) = props.translate_x.as_ref() {
                out.translate_x += r.sample(progress, per_word.easing);
            }
            if let Some(r) = props.translate_y.as_ref() {
                out.translate_y += r.sample(progress, per_word.easing);
            }
            if let Some(r) = props.glow_intensity.as_ref() {
                out.glow_intensity = r.sample(progress, per_word.easing);
            }
        }
    }

    if word.is_keyword
        && let Some(emphasis) = style.keyword_emphasis.as_ref().filter(|k| k.enabled)
    {
        let base = style.text_rgba();
        let shift = emphasis
            .animation
            .as_ref()
            .and_then(|a| a.properties.color_shift.as_ref());
        let from = shift.map_or(base, |s| parse_color_or(&s.from, base));
        let to = match (emphasis.color.as_deref(), shift) {
            (Some(c), _) => parse_color_or(c, base),
            (None, Some(s)) => parse_color_or(&s.to, base),
            (None, None) => base,
        };
        let target_scale = emphasis.scale.unwrap_or(1.0);
        let window = emphasis
            .animation
            .as_ref()
            .map_or(DEFAULT_EMPHASIS_MS, |a| a.duration_ms)
            / 1000.0;

        if since >= 0.0 && since < window {
            let p = since / window;
            out.color = interpolate_rgba(from, to, p, Ease::OutBack);
            out.scale *= interpolate(1.0, target_scale, p, Ease::OutBack);
        } else if since >= window {
            out.color = to;
        }
    }

    out.opacity = clamp01(out.opacity);
    out
}

/// Karaoke fill fraction of a word at `t`.
///
/// Zero before the word starts and one after it ends. A zero-length word counts as complete
/// once `t` passes its start.
pub fn karaoke_progress(word: &WordTiming, t: f64, mode: FillMode) -> f64 {
    match mode {
        FillMode::Instant => {
            if t >= word.start {
                1.0
            } else {
                0.0
            }
        }
        FillMode::Progressive => {
            let span = word.end - word.start;
            if span <= 0.0 {
                return if t > word.start { 1.0 } else { 0.0 };
            }
            if t <= word.start {
                0.0
            } else {
                clamp01((t - word.start) / span)
            }
        }
    }
}

/// Opacity of typewriter character `index`.
pub fn char_opacity(line_start: f64, index: usize, delay_ms: f64, fade_ms: f64, t: f64) -> f64 {
    let start = line_start + index as f64 * delay_ms / 1000.0;
    if t < start {
        0.0
    } else if fade_ms <= 0.0 {
        1.0
    } else {
        clamp01((t - start) / (fade_ms / 1000.0))
    }
}

/// Moment the last of `chars` characters is fully visible.
pub fn typing_complete_at(line_start: f64, chars: usize, delay_ms: f64, fade_ms: f64) -> f64 {
    let last = chars.saturating_sub(1) as f64;
    line_start + (last * delay_ms + fade_ms.max(0.0)) / 1000.0
}

/// Blinking cursor: shown for [`CURSOR_HOLD_SECS`] after typing completes, lit during the first
/// half of each blink cycle.
pub fn cursor_visible(complete_at: f64, t: f64) -> bool {
    let since = t - complete_at;
    (0.0..CURSOR_HOLD_SECS).contains(&since)
        && since.rem_euclid(CURSOR_BLINK_SECS) < CURSOR_BLINK_SECS / 2.0
}

/// Horizontal wash offset when a glitch burst is active at `t`.
///
/// The jitter is a hash of the timestamp and style id, so a frame renders identically on every
/// run.
pub fn glitch_offset(style_id: &str, glitch: &GlitchEffect, t: f64) -> Option<f64> {
    if !glitch.enabled || glitch.frequency_ms <= 0.0 || glitch.duration_ms <= 0.0 {
        return None;
    }
    let ms = t * 1000.0;
    if ms.rem_euclid(glitch.frequency_ms) >= glitch.duration_ms {
        return None;
    }
    let jitter = seeded_unit(style_id, ms.round().max(0.0) as u64);
    Some(jitter * 10.0 * glitch.intensity)
}

#[cfg(test)]
#[path = "../../tests/unit/render/state.rs"]
mod tests;
