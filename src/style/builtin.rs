use crate::animation::ease::Ease;
use crate::animation::spec::{
    AnimationConfig, AnimationProperties, AnimationSpec, Range, Stagger, StaggerKind,
};
use crate::style::model::{
    BackgroundStyle, CaptionStyle, Category, FillMode, GlitchEffect, GlowStyle, KaraokeMode,
    KeywordEmphasis, Padding, ShadowStyle, StrokeStyle, TextTransform,
};

/// Style used when a requested id resolves to nothing.
pub const DEFAULT_STYLE_ID: &str = "minimal";

/// Alternate human-facing names mapped to canonical style ids.
pub const ALIASES: &[(&str, &str)] = &[
    ("beasty", "mrbeast"),
    ("deep-diver", "cinematic"),
    ("deepdiver", "cinematic"),
    ("youshaei", "bold"),
    ("pod-p", "podcast"),
    ("podp", "podcast"),
    ("mozi", "neon"),
    ("glitch-infinite", "glitch"),
    ("glitchinfinite", "glitch"),
    ("seamless-bounce", "bounce"),
    ("seamlessbounce", "bounce"),
    ("baby-earthquake", "bounce"),
    ("babyearthquake", "bounce"),
    ("baby-steps", "bounce"),
    ("babysteps", "bounce"),
    ("grow", "bounce"),
    ("blur-switch", "blur"),
    ("blurswitch", "blur"),
    ("blur-in", "blur"),
    ("blurin", "blur"),
    ("focus", "blur"),
    ("highlighter-box", "highlight"),
    ("highlighterbox", "highlight"),
    ("simple", "minimal"),
    ("breathe", "minimal"),
    ("think-media", "uppercase"),
    ("thinkmedia", "uppercase"),
    ("with-backdrop", "documentary"),
    ("withbackdrop", "documentary"),
    ("soft-landing", "podcast"),
    ("softlanding", "podcast"),
];

fn span(from: f64, to: f64) -> Option<Range<f64>> {
    Some(Range::new(from, to))
}

fn window(duration_ms: f64, easing: Ease, properties: AnimationProperties) -> AnimationConfig {
    AnimationConfig::new(duration_ms, easing, properties)
}

fn fade(duration_ms: f64, easing: Ease, from: f64, to: f64) -> AnimationConfig {
    window(
        duration_ms,
        easing,
        AnimationProperties {
            opacity: span(from, to),
            ..AnimationProperties::default()
        },
    )
}

fn instant() -> AnimationConfig {
    AnimationConfig::new(0.0, Ease::Linear, AnimationProperties::default())
}

fn background(color: &str, opacity: f64, pad: (f64, f64), radius: f64) -> Option<BackgroundStyle> {
    Some(BackgroundStyle {
        color: color.to_string(),
        opacity,
        blur: None,
        padding: Some(Padding { x: pad.0, y: pad.1 }),
        border_radius: Some(radius),
    })
}

fn stroke(color: &str, width: f64) -> Option<StrokeStyle> {
    Some(StrokeStyle {
        color: color.to_string(),
        width,
    })
}

fn shadow(offset_y: f64, blur: f64, color: &str) -> Option<ShadowStyle> {
    Some(ShadowStyle {
        offset_x: 0.0,
        offset_y,
        blur,
        color: color.to_string(),
    })
}

#[allow(clippy::too_many_arguments)]
fn base(
    id: &str,
    name: &str,
    description: &str,
    category: Category,
    font_family: &str,
    font_weight: u16,
    font_size: f64,
    text_color: &str,
    animation: AnimationSpec,
) -> CaptionStyle {
    CaptionStyle {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        category,
        font_family: font_family.to_string(),
        font_weight,
        font_size,
        text_color: text_color.to_string(),
        letter_spacing: None,
        text_transform: TextTransform::None,
        stroke: None,
        shadow: None,
        glow: None,
        background: None,
        animation,
        keyword_emphasis: None,
        karaoke_mode: None,
        glitch_effect: None,
    }
}

fn entry_exit(entry: AnimationConfig, exit: AnimationConfig) -> AnimationSpec {
    AnimationSpec {
        entry,
        exit,
        ..AnimationSpec::default()
    }
}

/// The built-in catalog, in listing order.
pub fn builtin_styles() -> Vec<CaptionStyle> {
    vec![
        minimal(),
        subtitle(),
        podcast(),
        cinematic(),
        bold(),
        mrbeast(),
        neon(),
        highlight(),
        bounce(),
        glitch(),
        popline(),
        documentary(),
        uppercase(),
        blur(),
        bubble(),
        hormozi(),
        karaoke(),
        typewriter(),
    ]
}

fn minimal() -> CaptionStyle {
    let mut s = base(
        "minimal",
        "Minimal",
        "Simple white text with subtle background",
        Category::Professional,
        "Arial",
        400,
        46.0,
        "#FFFFFF",
        entry_exit(
            window(
                180.0,
                Ease::OutQuad,
                AnimationProperties {
                    opacity: span(0.0, 1.0),
                    translate_y: span(6.0, 0.0),
                    ..AnimationProperties::default()
                },
            ),
            fade(180.0, Ease::InQuad, 1.0, 0.0),
        ),
    );
    s.background = background("#000000", 0.8, (20.0, 10.0), 4.0);
    s
}

fn subtitle() -> CaptionStyle {
    let mut s = base(
        "subtitle",
        "Subtitle",
        "Professional Netflix/YouTube style",
        Category::Professional,
        "Arial",
        400,
        42.0,
        "#FFFFFF",
        entry_exit(
            fade(120.0, Ease::Linear, 0.0, 1.0),
            fade(80.0, Ease::Linear, 1.0, 0.0),
        ),
    );
    s.background = background("#000000", 0.95, (24.0, 8.0), 0.0);
    s
}

fn podcast() -> CaptionStyle {
    let mut s = base(
        "podcast",
        "Podcast",
        "Soft subtitle style for educational content",
        Category::Professional,
        "Inter",
        400,
        44.0,
        "#FFFFFF",
        entry_exit(
            window(
                220.0,
                Ease::OutQuad,
                AnimationProperties {
                    opacity: span(0.0, 1.0),
                    translate_y: span(10.0, 0.0),
                    ..AnimationProperties::default()
                },
            ),
            window(
                200.0,
                Ease::InQuad,
                AnimationProperties {
                    opacity: span(1.0, 0.0),
                    translate_y: span(0.0, 4.0),
                    ..AnimationProperties::default()
                },
            ),
        ),
    );
    s.background = background("#000000", 0.75, (20.0, 12.0), 8.0);
    if let Some(bg) = s.background.as_mut() {
        bg.blur = Some(8.0);
    }
    s
}

fn cinematic() -> CaptionStyle {
    let mut s = base(
        "cinematic",
        "Cinematic",
        "Film-style captions for travel reels",
        Category::Professional,
        "Georgia",
        400,
        48.0,
        "#FFFFFF",
        entry_exit(
            window(
                260.0,
                Ease::InOutQuad,
                AnimationProperties {
                    opacity: span(0.0, 1.0),
                    scale: span(0.98, 1.0),
                    ..AnimationProperties::default()
                },
            ),
            fade(260.0, Ease::InOutQuad, 1.0, 0.0),
        ),
    );
    s.shadow = shadow(4.0, 12.0, "rgba(0, 0, 0, 0.8)");
    s
}

fn bold() -> CaptionStyle {
    let mut s = base(
        "bold",
        "Bold",
        "Classic YouTube meme style",
        Category::Professional,
        "Impact",
        700,
        80.0,
        "#FFFFFF",
        entry_exit(
            fade(160.0, Ease::Linear, 0.0, 1.0),
            fade(160.0, Ease::Linear, 1.0, 0.0),
        ),
    );
    s.text_transform = TextTransform::Uppercase;
    s.stroke = stroke("#000000", 8.0);
    s
}

fn mrbeast() -> CaptionStyle {
    let mut anim = entry_exit(
        window(
            180.0,
            Ease::OutBack,
            AnimationProperties {
                opacity: span(0.0, 1.0),
                scale: span(1.15, 1.0),
                ..AnimationProperties::default()
            },
        ),
        fade(160.0, Ease::InQuad, 1.0, 0.0),
    );
    anim.per_word = Some(window(
        120.0,
        Ease::OutBack,
        AnimationProperties {
            scale: span(1.0, 1.08),
            ..AnimationProperties::default()
        },
    ));
    let mut s = base(
        "mrbeast",
        "MrBeast",
        "Most viral style - ALL CAPS jumpy emphasis",
        Category::Viral,
        "Impact",
        700,
        75.0,
        "#FFD900",
        anim,
    );
    s.text_transform = TextTransform::Uppercase;
    s.stroke = stroke("#000000", 5.0);
    s.keyword_emphasis = Some(KeywordEmphasis {
        enabled: true,
        color: None,
        scale: Some(1.08),
        animation: None,
    });
    s
}

fn neon() -> CaptionStyle {
    let mut anim = entry_exit(
        window(
            200.0,
            Ease::OutQuad,
            AnimationProperties {
                opacity: span(0.0, 1.0),
                glow_intensity: span(0.0, 1.0),
                ..AnimationProperties::default()
            },
        ),
        window(
            200.0,
            Ease::InQuad,
            AnimationProperties {
                opacity: span(1.0, 0.0),
                glow_intensity: span(1.0, 0.0),
                ..AnimationProperties::default()
            },
        ),
    );
    let mut per_word = window(
        80.0,
        Ease::OutQuad,
        AnimationProperties {
            glow_intensity: span(1.0, 1.3),
            scale: span(1.0, 1.03),
            ..AnimationProperties::default()
        },
    );
    per_word.delay_ms = Some(0.0);
    anim.per_word = Some(per_word);
    anim.looped = Some(window(
        2000.0,
        Ease::InOutQuad,
        AnimationProperties {
            glow_intensity: span(1.0, 1.03),
            ..AnimationProperties::default()
        },
    ));
    let mut s = base(
        "neon",
        "Neon",
        "Bright neon green with glow effect",
        Category::Viral,
        "Arial Black",
        900,
        85.0,
        "#00FF00",
        anim,
    );
    s.glow = Some(GlowStyle {
        color: "#00FF00".to_string(),
        radius: 40.0,
        intensity: 1.2,
    });
    s
}

fn highlight() -> CaptionStyle {
    let mut anim = entry_exit(instant(), fade(160.0, Ease::InQuad, 1.0, 0.0));
    let mut per_word = window(
        120.0,
        Ease::OutQuad,
        AnimationProperties {
            background_width: span(0.0, 1.0),
            opacity: span(0.0, 1.0),
            ..AnimationProperties::default()
        },
    );
    per_word.delay_ms = Some(50.0);
    anim.per_word = Some(per_word);
    anim.stagger = Some(Stagger {
        kind: StaggerKind::Word,
        delay_ms: 50.0,
    });
    let mut s = base(
        "highlight",
        "Highlight",
        "Word-level emphasis for debate clips",
        Category::Viral,
        "Inter",
        700,
        52.0,
        "#FFFFFF",
        anim,
    );
    s.background = background("#FFE600", 1.0, (12.0, 6.0), 4.0);
    s
}

fn bounce() -> CaptionStyle {
    let mut anim = entry_exit(
        window(
            200.0,
            Ease::OutBack,
            AnimationProperties {
                scale: span(0.8, 1.0),
                ..AnimationProperties::default()
            },
        ),
        window(
            180.0,
            Ease::InQuad,
            AnimationProperties {
                opacity: span(1.0, 0.0),
                translate_y: span(0.0, 6.0),
                ..AnimationProperties::default()
            },
        ),
    );
    let mut per_word = window(
        200.0,
        Ease::OutBounce,
        AnimationProperties {
            scale: span(1.0, 1.25),
            translate_y: span(10.0, 0.0),
            ..AnimationProperties::default()
        },
    );
    per_word.delay_ms = Some(0.0);
    anim.per_word = Some(per_word);
    anim.stagger = Some(Stagger {
        kind: StaggerKind::Word,
        delay_ms: 40.0,
    });
    let mut s = base(
        "bounce",
        "Bounce",
        "Bouncy word animation",
        Category::Viral,
        "Montserrat",
        900,
        72.0,
        "#FFFFFF",
        anim,
    );
    s.stroke = stroke("#000000", 8.0);
    s
}

fn glitch() -> CaptionStyle {
    let mut anim = entry_exit(
        window(
            120.0,
            Ease::Linear,
            AnimationProperties {
                opacity: span(0.0, 1.0),
                rgb_split_x: span(4.0, 0.0),
                ..AnimationProperties::default()
            },
        ),
        window(
            160.0,
            Ease::Linear,
            AnimationProperties {
                opacity: span(1.0, 0.0),
                rgb_split_x: span(0.0, 4.0),
                ..AnimationProperties::default()
            },
        ),
    );
    anim.looped = Some(window(
        80.0,
        Ease::Linear,
        AnimationProperties {
            translate_x: span(-3.0, 3.0),
            rgb_split_x: span(0.0, 5.0),
            ..AnimationProperties::default()
        },
    ));
    let mut s = base(
        "glitch",
        "Glitch",
        "Digital glitch effect",
        Category::Viral,
        "Courier New",
        700,
        62.0,
        "#FFFFFF",
        anim,
    );
    s.glitch_effect = Some(GlitchEffect {
        enabled: true,
        frequency_ms: 1000.0,
        duration_ms: 80.0,
        intensity: 0.8,
    });
    s
}

fn popline() -> CaptionStyle {
    let mut s = base(
        "popline",
        "Popline",
        "Horizontal wipe bar",
        Category::Viral,
        "Inter",
        700,
        52.0,
        "#000000",
        entry_exit(
            window(
                220.0,
                Ease::OutQuad,
                AnimationProperties {
                    translate_x: span(-100.0, 0.0),
                    ..AnimationProperties::default()
                },
            ),
            fade(180.0, Ease::InQuad, 1.0, 0.0),
        ),
    );
    s.background = background("#87FF00", 1.0, (24.0, 12.0), 8.0);
    s
}

fn documentary() -> CaptionStyle {
    let mut s = base(
        "documentary",
        "Documentary",
        "White text on pink box",
        Category::Business,
        "Inter",
        600,
        48.0,
        "#FFFFFF",
        entry_exit(
            window(
                180.0,
                Ease::OutQuad,
                AnimationProperties {
                    background_width: span(0.0, 1.0),
                    opacity: span(0.0, 1.0),
                    ..AnimationProperties::default()
                },
            ),
            window(
                160.0,
                Ease::InQuad,
                AnimationProperties {
                    background_width: span(1.0, 0.0),
                    opacity: span(1.0, 0.0),
                    ..AnimationProperties::default()
                },
            ),
        ),
    );
    s.background = background("#FF6B9D", 1.0, (20.0, 10.0), 6.0);
    s
}

fn uppercase() -> CaptionStyle {
    let mut s = base(
        "uppercase",
        "Uppercase",
        "All caps white on black box",
        Category::Business,
        "Arial",
        700,
        54.0,
        "#FFFFFF",
        entry_exit(
            window(
                160.0,
                Ease::OutQuad,
                AnimationProperties {
                    opacity: span(0.0, 1.0),
                    translate_y: span(6.0, 0.0),
                    ..AnimationProperties::default()
                },
            ),
            fade(160.0, Ease::InQuad, 1.0, 0.0),
        ),
    );
    s.text_transform = TextTransform::Uppercase;
    s.background = background("#000000", 1.0, (20.0, 10.0), 4.0);
    s
}

fn blur() -> CaptionStyle {
    let mut s = base(
        "blur",
        "Blur",
        "Frosted glass blur box",
        Category::Business,
        "Inter",
        500,
        46.0,
        "#FFFFFF",
        entry_exit(
            window(
                200.0,
                Ease::OutQuad,
                AnimationProperties {
                    opacity: span(0.0, 1.0),
                    blur: span(14.0, 8.0),
                    translate_y: span(6.0, 0.0),
                    ..AnimationProperties::default()
                },
            ),
            window(
                200.0,
                Ease::InQuad,
                AnimationProperties {
                    opacity: span(1.0, 0.0),
                    blur: span(8.0, 0.0),
                    ..AnimationProperties::default()
                },
            ),
        ),
    );
    s.background = background("rgba(255, 255, 255, 0.2)", 1.0, (20.0, 12.0), 12.0);
    if let Some(bg) = s.background.as_mut() {
        bg.blur = Some(8.0);
    }
    s
}

fn bubble() -> CaptionStyle {
    let mut s = base(
        "bubble",
        "Bubble",
        "Rounded bubble background",
        Category::Business,
        "Montserrat",
        500,
        46.0,
        "#000000",
        entry_exit(
            window(
                180.0,
                Ease::OutBack,
                AnimationProperties {
                    scale: span(0.9, 1.0),
                    opacity: span(0.0, 1.0),
                    ..AnimationProperties::default()
                },
            ),
            window(
                180.0,
                Ease::InQuad,
                AnimationProperties {
                    scale: span(1.0, 0.95),
                    opacity: span(1.0, 0.0),
                    ..AnimationProperties::default()
                },
            ),
        ),
    );
    s.background = background("#FFFFFF", 0.95, (24.0, 14.0), 24.0);
    s.shadow = shadow(4.0, 12.0, "rgba(0, 0, 0, 0.2)");
    s
}

fn hormozi() -> CaptionStyle {
    let mut s = base(
        "hormozi",
        "Alex Hormozi",
        "White text + GOLD keywords",
        Category::Sales,
        "Arial",
        700,
        58.0,
        "#FFFFFF",
        entry_exit(
            window(
                200.0,
                Ease::OutQuad,
                AnimationProperties {
                    opacity: span(0.0, 1.0),
                    translate_y: span(8.0, 0.0),
                    ..AnimationProperties::default()
                },
            ),
            fade(160.0, Ease::InQuad, 1.0, 0.0),
        ),
    );
    s.stroke = stroke("#000000", 3.0);
    s.keyword_emphasis = Some(KeywordEmphasis {
        enabled: true,
        color: Some("#FFC94A".to_string()),
        scale: Some(1.06),
        animation: Some(window(
            120.0,
            Ease::OutBack,
            AnimationProperties {
                color_shift: Some(Range::new("#FFFFFF".to_string(), "#FFC94A".to_string())),
                scale: span(1.0, 1.06),
                ..AnimationProperties::default()
            },
        )),
    });
    s
}

fn karaoke() -> CaptionStyle {
    let mut anim = entry_exit(
        fade(180.0, Ease::OutQuad, 0.0, 1.0),
        fade(180.0, Ease::InQuad, 1.0, 0.0),
    );
    anim.per_char = Some(window(
        0.0,
        Ease::Linear,
        AnimationProperties {
            color_shift: Some(Range::new("#FFFFFF".to_string(), "#00F8C8".to_string())),
            ..AnimationProperties::default()
        },
    ));
    let mut s = base(
        "karaoke",
        "Karaoke",
        "Progressive fill synced to audio",
        Category::Creative,
        "Arial Black",
        900,
        68.0,
        "#FFFFFF",
        anim,
    );
    s.stroke = stroke("#000000", 6.0);
    s.karaoke_mode = Some(KaraokeMode {
        enabled: true,
        inactive_color: "#FFFFFF".to_string(),
        active_color: "#00D9FF".to_string(),
        fill_mode: FillMode::Progressive,
    });
    s
}

fn typewriter() -> CaptionStyle {
    let mut anim = entry_exit(instant(), fade(200.0, Ease::InQuad, 1.0, 0.0));
    let mut per_char = fade(40.0, Ease::Linear, 0.0, 1.0);
    per_char.delay_ms = Some(0.0);
    anim.per_char = Some(per_char);
    anim.stagger = Some(Stagger {
        kind: StaggerKind::Char,
        delay_ms: 40.0,
    });
    let mut s = base(
        "typewriter",
        "Typewriter",
        "Letter-by-letter typing effect",
        Category::Creative,
        "monospace",
        700,
        52.0,
        "#FFFFFF",
        anim,
    );
    s.background = background("#000000", 0.85, (16.0, 10.0), 4.0);
    s
}

#[cfg(test)]
#[path = "../../tests/unit/style/builtin.rs"]
mod tests;
