use std::sync::Arc;

use crate::foundation::core::{Affine, BezPath, Canvas, Point, Rect, Rgba8, RoundedRect};
use crate::foundation::error::{CapError, CapResult};
use crate::render::FrameRGBA;
use crate::render::plan::{DrawOp, FramePlan, TextPaint};
use crate::render::text::{FontLibrary, FontSpec, TextShaper};

const ROUNDED_RECT_TOLERANCE: f64 = 0.1;

/// CPU rasterizer for [`FramePlan`]s.
///
/// One backend per worker thread: it owns its render context, target pixmap and text shaper,
/// and shares only the read-only [`FontLibrary`].
pub struct CpuBackend {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    shaper: TextShaper,
}

impl CpuBackend {
    pub fn new(canvas: Canvas, fonts: Arc<FontLibrary>) -> CapResult<Self> {
        canvas.validate()?;
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| CapError::render("canvas width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| CapError::render("canvas height exceeds u16"))?;
        Ok(Self {
            width,
            height,
            ctx: vello_cpu::RenderContext::new(width, height),
            pixmap: vello_cpu::Pixmap::new(width, height),
            shaper: TextShaper::new(fonts),
        })
    }

    /// Shaper used both for layout measurement and glyph drawing, so the two always agree.
    pub fn shaper_mut(&mut self) -> &mut TextShaper {
        &mut self.shaper
    }

    /// Rasterize `plan` onto a transparent canvas. Returns premultiplied pixels.
    pub fn render(&mut self, plan: &FramePlan) -> CapResult<FrameRGBA> {
        if plan.width != u32::from(self.width) || plan.height != u32::from(self.height) {
            return Err(CapError::render(format!(
                "plan is {}x{} but backend canvas is {}x{}",
                plan.width, plan.height, self.width, self.height
            )));
        }

        clear_pixmap(&mut self.pixmap);
        self.ctx.reset();

        let mut depth = 0usize;
        for op in &plan.ops {
            self.ctx
                .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            match op {
                DrawOp::FillRect {
                    rect,
                    radius,
                    color,
                    transform,
                } => {
                    if color.a == 0 {
                        continue;
                    }
                    self.ctx.set_transform(affine_to_cpu(*transform));
                    self.ctx.set_paint(color_to_cpu(*color));
                    if *radius > 0.0 {
                        let path = rounded_rect_path(*rect, *radius);
                        self.ctx.fill_path(&bezpath_to_cpu(&path));
                    } else {
                        self.ctx.fill_rect(&rect_to_cpu(*rect));
                    }
                }
                DrawOp::Text {
                    text,
                    font,
                    transform,
                    paint,
                } => self.draw_text(text, font, *transform, *paint),
                DrawOp::PushOpacity(opacity) => {
                    self.ctx.push_opacity_layer(opacity.clamp(0.0, 1.0));
                    depth += 1;
                }
                DrawOp::PushClip { rect, transform } => {
                    self.ctx.set_transform(affine_to_cpu(*transform));
                    let path = rect_path(*rect);
                    self.ctx.push_clip_layer(&bezpath_to_cpu(&path));
                    depth += 1;
                }
                DrawOp::PopLayer => {
                    if depth == 0 {
                        return Err(CapError::render("pop without matching push"));
                    }
                    self.ctx.pop_layer();
                    depth -= 1;
                }
            }
        }
        if depth > 0 {
            tracing::warn!(depth, "frame plan left layers open, closing them");
            for _ in 0..depth {
                self.ctx.pop_layer();
            }
        }

        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);

        Ok(FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn draw_text(&mut self, text: &str, spec: &FontSpec, transform: Affine, paint: TextPaint) {
        let shaped = self.shaper.shape(text, spec);
        let Some(font) = shaped.font.as_ref() else {
            return;
        };
        if shaped.glyphs.is_empty() {
            return;
        }
        let centered = transform * Affine::translate((-shaped.width / 2.0, -shaped.height / 2.0));
        self.ctx.set_transform(affine_to_cpu(centered));
        let glyphs = shaped.glyphs.iter().cloned();
        match paint {
            TextPaint::Fill(color) => {
                if color.a == 0 {
                    return;
                }
                self.ctx.set_paint(color_to_cpu(color));
                self.ctx
                    .glyph_run(font)
                    .font_size(shaped.font_size)
                    .fill_glyphs(glyphs);
            }
            TextPaint::Stroke { color, width } => {
                if color.a == 0 || width <= 0.0 {
                    return;
                }
                self.ctx.set_paint(color_to_cpu(color));
                self.ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
                self.ctx
                    .glyph_run(font)
                    .font_size(shaped.font_size)
                    .stroke_glyphs(glyphs);
            }
        }
    }
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn rect_path(r: Rect) -> BezPath {
    use kurbo::Shape;

    r.to_path(ROUNDED_RECT_TOLERANCE)
}

fn rounded_rect_path(r: Rect, radius: f64) -> BezPath {
    use kurbo::Shape;

    let radius = radius.clamp(0.0, r.width().min(r.height()) / 2.0);
    RoundedRect::from_rect(r, radius).to_path(ROUNDED_RECT_TOLERANCE)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3))
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
