use crate::foundation::core::{Canvas, Rgba8};
use crate::render::plan::CAPTION_Y_FRACTION;
use crate::style::model::{CaptionStyle, parse_color_or};
use crate::timing::lines::CaptionLine;

const STYLES_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, \
OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, \
BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";
const EVENTS_FORMAT: &str =
    "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// Numpad-style alignment: bottom center.
const ALIGN_BOTTOM_CENTER: u8 = 2;
const SIDE_MARGIN: u32 = 20;

/// `H:MM:SS.cc`, rounded to the nearest centisecond.
pub fn format_ass_time(secs: f64) -> String {
    let cs = if secs.is_finite() && secs > 0.0 {
        (secs * 100.0).round() as u64
    } else {
        0
    };
    format!(
        "{}:{:02}:{:02}.{:02}",
        cs / 360_000,
        (cs % 360_000) / 6_000,
        (cs % 6_000) / 100,
        cs % 100
    )
}

/// `&HAABBGGRR`; ASS alpha is inverted (`00` is opaque).
pub fn ass_color(c: Rgba8) -> String {
    format!("&H{:02X}{:02X}{:02X}{:02X}", 255 - c.a, c.b, c.g, c.r)
}

/// Advanced SubStation Alpha script with one style derived from `style`.
pub fn to_ass(lines: &[CaptionLine], style: &CaptionStyle, canvas: Canvas) -> String {
    let mut out = String::new();
    out.push_str("[Script Info]\n");
    out.push_str("Title: capflow captions\n");
    out.push_str("ScriptType: v4.00+\n");
    out.push_str(&format!("PlayResX: {}\n", canvas.width));
    out.push_str(&format!("PlayResY: {}\n", canvas.height));
    out.push_str("WrapStyle: 0\n");
    out.push_str("ScaledBorderAndShadow: yes\n\n");

    out.push_str("[V4+ Styles]\n");
    out.push_str(STYLES_FORMAT);
    out.push('\n');
    out.push_str(&style_line(style, canvas));
    out.push_str("\n\n");

    out.push_str("[Events]\n");
    out.push_str(EVENTS_FORMAT);
    out.push('\n');
    let fade = fade_tag(style);
    let karaoke = style.karaoke_mode.as_ref().is_some_and(|k| k.enabled);
    for line in lines {
        let body = if karaoke {
            karaoke_text(line, style)
        } else {
            escape_text(&style.text_transform.apply(&line.text()))
        };
        out.push_str(&format!(
            "Dialogue: 0,{},{},{},,0,0,0,,{fade}{body}\n",
            format_ass_time(line.start()),
            format_ass_time(line.end()),
            style_name(style),
        ));
    }
    out
}

fn style_name(style: &CaptionStyle) -> String {
    style.id.replace(',', "_")
}

/// First family of a CSS-like list, unquoted.
fn primary_family(family: &str) -> &str {
    family
        .split(',')
        .next()
        .unwrap_or(family)
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
}

fn style_line(style: &CaptionStyle, canvas: Canvas) -> String {
    let text = style.text_rgba();
    let (primary, secondary) = match style.karaoke_mode.as_ref().filter(|k| k.enabled) {
        Some(k) => (
            parse_color_or(&k.active_color, text),
            parse_color_or(&k.inactive_color, text),
        ),
        None => (text, Rgba8::BLACK),
    };
    let outline_color = style
        .stroke
        .as_ref()
        .map(|s| parse_color_or(&s.color, Rgba8::BLACK))
        .unwrap_or(Rgba8::BLACK);
    let (back_color, border_style) = match &style.background {
        Some(bg) => (
            parse_color_or(&bg.color, Rgba8::BLACK).with_opacity(bg.opacity as f32),
            3,
        ),
        None => (
            style
                .shadow
                .as_ref()
                .map(|s| parse_color_or(&s.color, Rgba8::TRANSPARENT))
                .unwrap_or(Rgba8::TRANSPARENT),
            1,
        ),
    };
    let outline = style.stroke.as_ref().map_or(0.0, |s| s.width);
    let shadow = style
        .shadow
        .as_ref()
        .map_or(0.0, |s| s.offset_x.abs().max(s.offset_y.abs()));
    let bold = if style.font_weight >= 600 { -1 } else { 0 };
    let spacing = style.letter_spacing.unwrap_or(0.0);
    let margin_v = (f64::from(canvas.height) * (1.0 - CAPTION_Y_FRACTION)).round() as u32;

    format!(
        "Style: {},{},{},{},{},{},{},{bold},0,0,0,100,100,{},0,{border_style},{},{},{ALIGN_BOTTOM_CENTER},{SIDE_MARGIN},{SIDE_MARGIN},{margin_v},1",
        style_name(style),
        primary_family(&style.font_family),
        num(style.font_size),
        ass_color(primary),
        ass_color(secondary),
        ass_color(outline_color),
        ass_color(back_color),
        num(spacing),
        num(outline),
        num(shadow),
    )
}

/// Integers without a fraction, everything else with up to two decimals.
fn num(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

fn fade_tag(style: &CaptionStyle) -> String {
    let fade_in = style.animation.entry.duration_ms.max(0.0).round() as u64;
    let fade_out = style.animation.exit.duration_ms.max(0.0).round() as u64;
    if fade_in == 0 && fade_out == 0 {
        String::new()
    } else {
        format!("{{\\fad({fade_in},{fade_out})}}")
    }
}

/// One `{\kNN}` tag per word; each word owns the time up to the next word's start.
fn karaoke_text(line: &CaptionLine, style: &CaptionStyle) -> String {
    let words = line.words();
    words
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let until = words.get(i + 1).map_or(w.end, |next| next.start);
            let cs = ((until - w.start).max(0.0) * 100.0).round() as u64;
            format!(
                "{{\\k{cs}}}{}",
                escape_text(&style.text_transform.apply(&w.text))
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Override blocks are brace-delimited; braces in caption text become parentheses.
fn escape_text(text: &str) -> String {
    text.replace('{', "(")
        .replace('}', ")")
        .replace('\n', "\\N")
}

#[cfg(test)]
#[path = "../../tests/unit/subtitle/ass.rs"]
mod tests;
