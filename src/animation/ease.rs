use std::f64::consts::PI;

/// Easing curves used to map normalized animation progress.
///
/// Names serialize in the camelCase form used by style definitions (`"easeOutBack"`). Unknown
/// names deserialize to [`Ease::Linear`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String")]
pub enum Ease {
    /// Identity curve.
    #[default]
    #[serde(rename = "linear")]
    Linear,
    /// Quadratic ease-in.
    #[serde(rename = "easeIn")]
    InQuad,
    /// Quadratic ease-out.
    #[serde(rename = "easeOut")]
    OutQuad,
    /// Quadratic ease-in/out, split at the midpoint.
    #[serde(rename = "easeInOut")]
    InOutQuad,
    /// Cubic overshoot (`c1 = 1.70158`).
    #[serde(rename = "easeOutBack")]
    OutBack,
    /// Exponentially decayed sine with period `2π/3`.
    #[serde(rename = "easeOutElastic")]
    OutElastic,
    /// Four-zone piecewise quadratic bounce.
    #[serde(rename = "easeOutBounce")]
    OutBounce,
}

const BACK_C1: f64 = 1.70158;
const BACK_C3: f64 = BACK_C1 + 1.0;
const ELASTIC_C4: f64 = (2.0 * PI) / 3.0;
const BOUNCE_N1: f64 = 7.5625;
const BOUNCE_D1: f64 = 2.75;

impl Ease {
    /// All supported curves, in declaration order.
    pub const ALL: [Ease; 7] = [
        Ease::Linear,
        Ease::InQuad,
        Ease::OutQuad,
        Ease::InOutQuad,
        Ease::OutBack,
        Ease::OutElastic,
        Ease::OutBounce,
    ];

    /// Resolve a curve by its style-definition name, falling back to [`Ease::Linear`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "linear" => Self::Linear,
            "easeIn" => Self::InQuad,
            "easeOut" => Self::OutQuad,
            "easeInOut" => Self::InOutQuad,
            "easeOutBack" => Self::OutBack,
            "easeOutElastic" => Self::OutElastic,
            "easeOutBounce" => Self::OutBounce,
            other => {
                tracing::debug!(easing = other, "unknown easing, using linear");
                Self::Linear
            }
        }
    }

    /// Style-definition name of this curve.
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::InQuad => "easeIn",
            Self::OutQuad => "easeOut",
            Self::InOutQuad => "easeInOut",
            Self::OutBack => "easeOutBack",
            Self::OutElastic => "easeOutElastic",
            Self::OutBounce => "easeOutBounce",
        }
    }

    /// Apply this curve to progress `t`.
    ///
    /// `t` is clamped to `[0, 1]`, and both endpoints map exactly to `0` and `1`. Overshooting
    /// curves may leave `[0, 1]` in between.
    pub fn apply(self, t: f64) -> f64 {
        let t = crate::foundation::math::clamp01(t);
        if t == 0.0 {
            return 0.0;
        }
        if t == 1.0 {
            return 1.0;
        }
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => t * (2.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Self::OutBack => 1.0 + BACK_C3 * (t - 1.0).powi(3) + BACK_C1 * (t - 1.0).powi(2),
            Self::OutElastic => 2f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * ELASTIC_C4).sin() + 1.0,
            Self::OutBounce => bounce(t),
        }
    }
}

fn bounce(t: f64) -> f64 {
    if t < 1.0 / BOUNCE_D1 {
        BOUNCE_N1 * t * t
    } else if t < 2.0 / BOUNCE_D1 {
        let t = t - 1.5 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.75
    } else if t < 2.5 / BOUNCE_D1 {
        let t = t - 2.25 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.984375
    }
}

impl From<String> for Ease {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<&str> for Ease {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
