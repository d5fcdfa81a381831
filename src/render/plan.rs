use crate::foundation::core::{Affine, Canvas, Rect, Rgba8};
use crate::render::state::{
    RenderState, char_opacity, cursor_visible, glitch_offset, karaoke_progress, line_state,
    typing_complete_at, word_state,
};
use crate::render::text::{FontSpec, TextMeasure};
use crate::style::model::{AnimationStrategy, CaptionStyle, CharMode, FillMode, parse_color_or};
use crate::timing::lines::CaptionLine;

/// Vertical anchor of captions as a fraction of canvas height.
pub const CAPTION_Y_FRACTION: f64 = 0.80;
/// Horizontal gap between words in per-word layout.
pub const WORD_SPACING: f64 = 20.0;
const WORD_BG_PADDING: (f64, f64) = (12.0, 6.0);
const LINE_BG_PADDING: (f64, f64) = (20.0, 10.0);
const SPLIT_ALPHA: f32 = 0.5;

/// How glyphs of a text op are painted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextPaint {
    Fill(Rgba8),
    Stroke { color: Rgba8, width: f64 },
}

/// One rasterization command. Text is drawn centered on its transform's origin.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    FillRect {
        rect: Rect,
        radius: f64,
        color: Rgba8,
        transform: Affine,
    },
    Text {
        text: String,
        font: FontSpec,
        transform: Affine,
        paint: TextPaint,
    },
    PushOpacity(f32),
    PushClip {
        rect: Rect,
        transform: Affine,
    },
    PopLayer,
}

/// Display list for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    pub width: u32,
    pub height: u32,
    pub ops: Vec<DrawOp>,
}

impl FramePlan {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Strings of every text op, in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Static inputs shared by every frame of one caption job.
#[derive(Clone, Copy, Debug)]
pub struct CaptionScene<'a> {
    pub style: &'a CaptionStyle,
    pub strategy: AnimationStrategy,
    pub lines: &'a [CaptionLine],
    pub canvas: Canvas,
}

/// Compile the display list for timestamp `t`.
pub fn compile_frame(scene: &CaptionScene<'_>, t: f64, measure: &mut dyn TextMeasure) -> FramePlan {
    let mut b = PlanBuilder {
        style: scene.style,
        font: FontSpec {
            family: scene.style.font_family.clone(),
            weight: scene.style.font_weight,
            size: scene.style.font_size,
            letter_spacing: scene.style.letter_spacing.unwrap_or(0.0),
        },
        canvas: scene.canvas,
        measure,
        ops: Vec::new(),
    };

    for line in scene.lines.iter().filter(|l| l.is_active_at(t)) {
        let state = line_state(scene.style, line.start(), line.end(), t);
        match scene.strategy {
            AnimationStrategy::LineLevel => b.line_level(line, &state),
            AnimationStrategy::PerWord => b.per_word(line, &state, t),
            AnimationStrategy::PerChar(CharMode::Typewriter { delay_ms, fade_ms }) => {
                b.typewriter(line, &state, t, delay_ms, fade_ms)
            }
            AnimationStrategy::PerChar(CharMode::Karaoke) => b.karaoke(line, &state, t),
        }
        b.glitch(t);
    }

    FramePlan {
        width: scene.canvas.width,
        height: scene.canvas.height,
        ops: b.ops,
    }
}

struct Glow {
    color: Rgba8,
    radius: f64,
    intensity: f64,
}

struct PlanBuilder<'a> {
    style: &'a CaptionStyle,
    font: FontSpec,
    canvas: Canvas,
    measure: &'a mut dyn TextMeasure,
    ops: Vec<DrawOp>,
}

impl PlanBuilder<'_> {
    fn anchor(&self) -> (f64, f64) {
        (
            f64::from(self.canvas.width) / 2.0,
            f64::from(self.canvas.height) * CAPTION_Y_FRACTION,
        )
    }

    fn line_transform(&self, state: &RenderState) -> Affine {
        let (cx, cy) = self.anchor();
        Affine::translate((cx + state.translate_x, cy + state.translate_y))
            * Affine::rotate(state.rotate.to_radians())
            * Affine::scale(state.scale)
    }

    fn width_of(&mut self, text: &str) -> f64 {
        self.measure.measure(text, &self.font)
    }

    fn push_opacity(&mut self, opacity: f64) -> bool {
        if opacity < 1.0 {
            self.ops.push(DrawOp::PushOpacity(opacity as f32));
            true
        } else {
            false
        }
    }

    fn pop_if(&mut self, pushed: bool) {
        if pushed {
            self.ops.push(DrawOp::PopLayer);
        }
    }

    fn style_glow(&self, state: &RenderState, intensity: f64) -> Option<Glow> {
        let glow = self.style.glow.as_ref()?;
        Some(Glow {
            color: parse_color_or(&glow.color, Rgba8::TRANSPARENT),
            radius: state.glow_radius,
            intensity,
        })
    }

    /// Box behind text of width `text_w`, scaled horizontally by `fill_w` around its center.
    fn background(
        &mut self,
        text_w: f64,
        fill_w: f64,
        fill_h: f64,
        default_pad: (f64, f64),
        transform: Affine,
    ) {
        let Some(bg) = self.style.background.as_ref() else {
            return;
        };
        if fill_w <= 0.0 || fill_h <= 0.0 {
            return;
        }
        let (px, py) = bg.padding.map_or(default_pad, |p| (p.x, p.y));
        let w = (text_w + px * 2.0) * fill_w;
        let h = (self.font.size + py * 2.0) * fill_h;
        let radius = bg.border_radius.unwrap_or(0.0).clamp(0.0, w.min(h) / 2.0);
        let color = parse_color_or(&bg.color, Rgba8::TRANSPARENT).with_opacity(bg.opacity as f32);
        self.ops.push(DrawOp::FillRect {
            rect: Rect::new(-w / 2.0, -h / 2.0, w / 2.0, h / 2.0),
            radius,
            color,
            transform,
        });
    }

    fn text(&mut self, text: &str, transform: Affine, paint: TextPaint) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            font: self.font.clone(),
            transform,
            paint,
        });
    }

    /// Shadow, glow, chromatic split, stroke, then fill.
    fn decorated_text(
        &mut self,
        text: &str,
        transform: Affine,
        fill: Rgba8,
        glow: Option<Glow>,
        split: (f64, f64),
    ) {
        if let Some(shadow) = self.style.shadow.as_ref() {
            let color = parse_color_or(&shadow.color, Rgba8::TRANSPARENT);
            let offset = Affine::translate((shadow.offset_x, shadow.offset_y));
            self.text(text, transform * offset, TextPaint::Fill(color));
        }
        if let Some(g) = glow
            && g.intensity > 0.0
            && g.radius > 0.0
        {
            let alpha = (0.3 * g.intensity).clamp(0.0, 1.0) as f32;
            self.text(
                text,
                transform,
                TextPaint::Stroke {
                    color: g.color.with_opacity(alpha),
                    width: g.radius * g.intensity / 4.0,
                },
            );
        }
        let (sx, sy) = split;
        if sx.abs() > f64::EPSILON || sy.abs() > f64::EPSILON {
            let red = Rgba8::rgb(255, 0, 0).with_opacity(SPLIT_ALPHA);
            let cyan = Rgba8::rgb(0, 255, 255).with_opacity(SPLIT_ALPHA);
            self.text(
                text,
                transform * Affine::translate((-sx, -sy)),
                TextPaint::Fill(red),
            );
            self.text(
                text,
                transform * Affine::translate((sx, sy)),
                TextPaint::Fill(cyan),
            );
        }
        if let Some(stroke) = self.style.stroke.as_ref()
            && stroke.width > 0.0
        {
            let color = parse_color_or(&stroke.color, Rgba8::TRANSPARENT);
            self.text(
                text,
                transform,
                TextPaint::Stroke {
                    color,
                    width: stroke.width,
                },
            );
        }
        self.text(text, transform, TextPaint::Fill(fill));
    }

    fn line_level(&mut self, line: &CaptionLine, state: &RenderState) {
        if state.opacity <= 0.0 {
            return;
        }
        let text = self.style.text_transform.apply(&line.text());
        if text.is_empty() {
            return;
        }
        let tf = self.line_transform(state);
        let pushed = self.push_opacity(state.opacity);
        if self.style.background.is_some() {
            let w = self.width_of(&text);
            self.background(
                w,
                state.background_width,
                state.background_height,
                LINE_BG_PADDING,
                tf,
            );
        }
        let glow = self.style_glow(state, state.glow_intensity);
        self.decorated_text(
            &text,
            tf,
            self.style.text_rgba(),
            glow,
            (state.rgb_split_x, state.rgb_split_y),
        );
        self.pop_if(pushed);
    }

    fn per_word(&mut self, line: &CaptionLine, state: &RenderState, t: f64) {
        let words: Vec<String> = line
            .words()
            .iter()
            .map(|w| self.style.text_transform.apply(&w.text))
            .collect();
        let widths: Vec<f64> = words.iter().map(|w| self.width_of(w)).collect();
        let total = widths.iter().sum::<f64>() + WORD_SPACING * (words.len().saturating_sub(1)) as f64;

        let (cx, cy) = self.anchor();
        let base = Affine::translate((cx, cy)) * Affine::rotate(state.rotate.to_radians());
        let mut x = -total / 2.0;

        for ((word, text), w) in line.words().iter().zip(&words).zip(&widths) {
            let center = x + w / 2.0;
            x += w + WORD_SPACING;

            let ws = word_state(self.style, state, word, t);
            if ws.opacity <= 0.0 || text.is_empty() {
                continue;
            }
            let tf = base
                * Affine::translate((center + ws.translate_x, ws.translate_y))
                * Affine::scale(ws.scale);
            let pushed = self.push_opacity(ws.opacity);
            self.background(*w, ws.background_width, 1.0, WORD_BG_PADDING, tf);
            let glow = self.style_glow(state, ws.glow_intensity);
            self.decorated_text(
                text,
                tf,
                ws.color,
                glow,
                (state.rgb_split_x, state.rgb_split_y),
            );
            self.pop_if(pushed);
        }
    }

    fn typewriter(
        &mut self,
        line: &CaptionLine,
        state: &RenderState,
        t: f64,
        delay_ms: f64,
        fade_ms: f64,
    ) {
        if state.opacity <= 0.0 {
            return;
        }
        let text = self.style.text_transform.apply(&line.text());
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return;
        }
        let full_w = self.width_of(&text);
        let left = -full_w / 2.0;
        let tf = self.line_transform(state);
        let color = self.style.text_rgba();
        let split = (state.rgb_split_x, state.rgb_split_y);

        let pushed = self.push_opacity(state.opacity);
        self.background(full_w, state.background_width, state.background_height, LINE_BG_PADDING, tf);

        let opacity_at = |i: usize| char_opacity(line.start(), i, delay_ms, fade_ms, t);
        let revealed = (0..chars.len())
            .take_while(|&i| opacity_at(i) >= 1.0)
            .count();
        if revealed > 0 {
            let prefix: String = chars[..revealed].iter().collect();
            let w = self.width_of(&prefix);
            let glow = self.style_glow(state, state.glow_intensity);
            self.decorated_text(
                &prefix,
                tf * Affine::translate((left + w / 2.0, 0.0)),
                color,
                glow,
                split,
            );
        }
        for i in revealed..chars.len() {
            let alpha = opacity_at(i);
            if alpha <= 0.0 {
                break;
            }
            if chars[i].is_whitespace() {
                continue;
            }
            let before: String = chars[..i].iter().collect();
            let ch = chars[i].to_string();
            let offset = self.width_of(&before);
            let w = self.width_of(&ch);
            let char_pushed = self.push_opacity(alpha);
            let glow = self.style_glow(state, state.glow_intensity);
            self.decorated_text(
                &ch,
                tf * Affine::translate((left + offset + w / 2.0, 0.0)),
                color,
                glow,
                split,
            );
            self.pop_if(char_pushed);
        }

        let done = typing_complete_at(line.start(), chars.len(), delay_ms, fade_ms);
        if cursor_visible(done, t) {
            let size = self.font.size;
            let x0 = left + full_w + size * 0.1;
            self.ops.push(DrawOp::FillRect {
                rect: Rect::new(x0, -size / 2.0, x0 + size * 0.08, size / 2.0),
                radius: 0.0,
                color,
                transform: tf,
            });
        }
        self.pop_if(pushed);
    }

    fn karaoke(&mut self, line: &CaptionLine, state: &RenderState, t: f64) {
        if state.opacity <= 0.0 {
            return;
        }
        let Some(mode) = self.style.karaoke_mode.as_ref().filter(|k| k.enabled) else {
            self.line_level(line, state);
            return;
        };
        let base = self.style.text_rgba();
        let inactive = parse_color_or(&mode.inactive_color, base);
        let active = parse_color_or(&mode.active_color, base);
        let fill_mode: FillMode = mode.fill_mode;

        let words: Vec<String> = line
            .words()
            .iter()
            .map(|w| self.style.text_transform.apply(&w.text))
            .collect();
        let text = words.join(" ");
        if text.is_empty() {
            return;
        }
        let full_w = self.width_of(&text);
        let left = -full_w / 2.0;
        let tf = self.line_transform(state);
        let split = (state.rgb_split_x, state.rgb_split_y);

        let pushed = self.push_opacity(state.opacity);
        self.background(full_w, state.background_width, state.background_height, LINE_BG_PADDING, tf);
        self.decorated_text(&text, tf, inactive, None, split);

        let size = self.font.size;
        for (i, word) in line.words().iter().enumerate() {
            let p = karaoke_progress(word, t, fill_mode);
            if p <= 0.0 {
                continue;
            }
            let w = self.width_of(&words[i]);
            let through = words[..=i].join(" ");
            let x0 = left + self.width_of(&through) - w;
            self.ops.push(DrawOp::PushClip {
                rect: Rect::new(x0, -size, x0 + w * p, size),
                transform: tf,
            });
            let glow = match self.style.glow.as_ref() {
                Some(_) => self.style_glow(state, state.glow_intensity),
                None => Some(Glow {
                    color: active,
                    radius: size * 0.2,
                    intensity: 0.5,
                }),
            };
            if let Some(g) = glow {
                let alpha = (0.3 * g.intensity).clamp(0.0, 1.0) as f32;
                self.text(
                    &text,
                    tf,
                    TextPaint::Stroke {
                        color: g.color.with_opacity(alpha),
                        width: g.radius * g.intensity / 4.0,
                    },
                );
            }
            self.text(&text, tf, TextPaint::Fill(active));
            self.ops.push(DrawOp::PopLayer);
        }
        self.pop_if(pushed);
    }

    /// Translucent wash drawn after the text while a glitch burst is active.
    fn glitch(&mut self, t: f64) {
        let Some(glitch) = self.style.active_glitch() else {
            return;
        };
        let Some(offset) = glitch_offset(&self.style.id, glitch, t) else {
            return;
        };
        let w = f64::from(self.canvas.width);
        let h = f64::from(self.canvas.height);
        let alpha = (0.5 * 0.3 * glitch.intensity).clamp(0.0, 1.0) as f32;
        self.ops.push(DrawOp::FillRect {
            rect: Rect::new(offset, 0.0, w + offset, h),
            radius: 0.0,
            color: Rgba8::rgb(255, 0, 0).with_opacity(alpha),
            transform: Affine::IDENTITY,
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
