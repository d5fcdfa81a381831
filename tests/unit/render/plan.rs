use super::*;
use crate::render::text::EstimateMeasure;
use crate::style::registry::StyleRegistry;
use crate::timing::lines::{LineBudget, group_lines};
use crate::timing::word::WordTiming;

fn words() -> Vec<WordTiming> {
    vec![
        WordTiming::new("make", 0.0, 0.4),
        WordTiming::new("more", 0.4, 0.8),
        WordTiming::new("money", 0.8, 1.2),
    ]
}

fn plan_at(style_id: &str, words: &[WordTiming], t: f64) -> FramePlan {
    let style = StyleRegistry::builtin().get(style_id);
    let lines = group_lines(words, LineBudget::default());
    let scene = CaptionScene {
        style: &style,
        strategy: style.strategy(),
        lines: &lines,
        canvas: Canvas::new(1080, 1920),
    };
    compile_frame(&scene, t, &mut EstimateMeasure)
}

fn opacity_layers(plan: &FramePlan) -> Vec<f32> {
    plan.ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::PushOpacity(o) => Some(*o),
            _ => None,
        })
        .collect()
}

fn assert_balanced(plan: &FramePlan) {
    let mut depth = 0i32;
    for op in &plan.ops {
        match op {
            DrawOp::PushOpacity(_) | DrawOp::PushClip { .. } => depth += 1,
            DrawOp::PopLayer => depth -= 1,
            _ => {}
        }
        assert!(depth >= 0);
    }
    assert_eq!(depth, 0);
}

#[test]
fn first_frame_of_minimal_is_empty_then_ramps() {
    let ws = words();
    assert!(plan_at("minimal", &ws, 0.0).is_empty());

    let mut previous = 0.0f32;
    for frame in 1..=5 {
        let plan = plan_at("minimal", &ws, f64::from(frame) / 30.0);
        assert_balanced(&plan);
        let layer = opacity_layers(&plan)[0];
        assert!(layer > previous, "frame {frame} did not brighten");
        previous = layer;
    }
    let settled = plan_at("minimal", &ws, 0.6);
    assert!(opacity_layers(&settled).is_empty());
    assert_eq!(settled.texts().collect::<Vec<_>>(), vec!["make more money"]);
}

#[test]
fn no_active_line_yields_empty_plan() {
    let ws = words();
    assert!(plan_at("minimal", &ws, 5.0).is_empty());
    assert!(plan_at("minimal", &[], 0.5).is_empty());
}

#[test]
fn line_level_draws_background_before_text() {
    let plan = plan_at("minimal", &words(), 0.6);
    let first = plan.ops.first().unwrap();
    let DrawOp::FillRect { rect, color, .. } = first else {
        panic!("expected background first, got {first:?}");
    };
    assert!(rect.width() > 0.0);
    assert_eq!(color.a, 204);
    assert!(matches!(plan.ops.last(), Some(DrawOp::Text { paint: TextPaint::Fill(_), .. })));
}

#[test]
fn stroke_precedes_fill() {
    let plan = plan_at("bold", &words(), 0.6);
    let paints: Vec<&TextPaint> = plan
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text { paint, .. } => Some(paint),
            _ => None,
        })
        .collect();
    let stroke = paints.iter().position(|p| matches!(p, TextPaint::Stroke { .. }));
    let fill = paints.iter().position(|p| matches!(p, TextPaint::Fill(_)));
    assert!(stroke.unwrap() < fill.unwrap());
}

#[test]
fn per_word_lays_out_each_word_separately() {
    let plan = plan_at("mrbeast", &words(), 1.1);
    assert_balanced(&plan);
    let fills: Vec<&str> = plan
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text {
                text,
                paint: TextPaint::Fill(_),
                ..
            } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(fills, vec!["MAKE", "MORE", "MONEY"]);
}

#[test]
fn typewriter_reveals_prefix_and_fading_char() {
    let ws = vec![WordTiming::new("hello", 1.0, 2.0)];
    // 1.1 s: chars 0..=1 done, char 2 half faded, char 3 just started.
    let plan = plan_at("typewriter", &ws, 1.1);
    assert_balanced(&plan);
    let texts: Vec<&str> = plan.texts().collect();
    assert!(texts.contains(&"he"));
    assert!(texts.contains(&"l"));
    assert!(!texts.contains(&"hello"));

    let done = plan_at("typewriter", &ws, 1.5);
    assert!(done.texts().any(|t| t == "hello"));
}

#[test]
fn typewriter_cursor_blinks_after_typing() {
    let ws = vec![WordTiming::new("hi", 0.0, 3.0)];
    // Typing completes at 0.08 s.
    let cursor_count = |plan: &FramePlan| {
        plan.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::FillRect { radius, .. } if *radius == 0.0))
            .count()
    };
    let lit = plan_at("typewriter", &ws, 0.1);
    let dark = plan_at("typewriter", &ws, 0.4);
    assert_eq!(cursor_count(&lit), 1);
    assert_eq!(cursor_count(&dark), 0);
}

#[test]
fn karaoke_clips_the_active_fill() {
    let ws = words();
    let plan = plan_at("karaoke", &ws, 0.6);
    assert_balanced(&plan);
    let clips: Vec<&Rect> = plan
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::PushClip { rect, .. } => Some(rect),
            _ => None,
        })
        .collect();
    // "make" complete, "more" half sung, "money" not started.
    assert_eq!(clips.len(), 2);
    assert!(clips[1].width() < clips[0].width() * 1.5);
    assert!(clips[0].x1 <= clips[1].x0);
}

#[test]
fn glitch_wash_only_during_burst() {
    let ws = vec![WordTiming::new("static", 0.0, 5.0)];
    let wash = |plan: &FramePlan| {
        plan.ops.iter().any(|op| {
            matches!(op, DrawOp::FillRect { rect, transform, .. }
                if *transform == Affine::IDENTITY && rect.height() == 1920.0)
        })
    };
    assert!(wash(&plan_at("glitch", &ws, 2.04)));
    assert!(!wash(&plan_at("glitch", &ws, 2.5)));
}

#[test]
fn glitch_split_draws_red_and_cyan_copies() {
    let ws = vec![WordTiming::new("static", 0.0, 5.0)];
    let plan = plan_at("glitch", &ws, 1.02);
    let colors: Vec<Rgba8> = plan
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text {
                paint: TextPaint::Fill(c),
                ..
            } => Some(*c),
            _ => None,
        })
        .collect();
    assert!(colors.iter().any(|c| (c.r, c.g, c.b) == (255, 0, 0)));
    assert!(colors.iter().any(|c| (c.r, c.g, c.b) == (0, 255, 255)));
}
