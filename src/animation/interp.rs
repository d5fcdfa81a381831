use crate::animation::ease::Ease;
use crate::foundation::core::Rgba8;

/// Interpolate between `from` and `to` after easing `progress`.
///
/// Callers clamp `progress` to `[0, 1]`; the curve clamps again. `progress = 0` yields exactly
/// `from` and `progress = 1` exactly `to`.
pub fn interpolate(from: f64, to: f64, progress: f64, ease: Ease) -> f64 {
    let e = ease.apply(progress);
    if e == 1.0 {
        return to;
    }
    from + (to - from) * e
}

/// Interpolate two opaque colors channel-wise after easing `progress`.
///
/// Channels are rounded to the nearest integer and clamped, so overshooting curves saturate
/// instead of wrapping. Alpha is taken from `from`.
pub fn interpolate_rgba(from: Rgba8, to: Rgba8, progress: f64, ease: Ease) -> Rgba8 {
    let e = ease.apply(progress);
    let ch = |a: u8, b: u8| -> u8 {
        let v = f64::from(a) + (f64::from(b) - f64::from(a)) * e;
        v.round().clamp(0.0, 255.0) as u8
    };
    Rgba8 {
        r: ch(from.r, to.r),
        g: ch(from.g, to.g),
        b: ch(from.b, to.b),
        a: from.a,
    }
}

/// Interpolate two `#RRGGBB` colors and return the result as lowercase hex.
///
/// Malformed input on either side returns `from` unchanged. When the interpolated channels equal
/// `from`'s channels the original spelling of `from` is returned.
pub fn interpolate_color(from: &str, to: &str, progress: f64, ease: Ease) -> String {
    let (Some(a), Some(b)) = (Rgba8::from_hex(from), Rgba8::from_hex(to)) else {
        tracing::debug!(from, to, "malformed hex color, keeping source color");
        return from.to_string();
    };
    let out = interpolate_rgba(a, b, progress, ease);
    if out == a {
        from.to_string()
    } else {
        out.to_hex()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/interp.rs"]
mod tests;
