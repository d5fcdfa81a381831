use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context as _;
use rayon::prelude::*;

use crate::foundation::core::{CancelFlag, Canvas, Fps, FrameIndex};
use crate::foundation::error::{CapError, CapResult};
use crate::render::FrameRGBA;
use crate::render::cpu::CpuBackend;
use crate::render::plan::{CaptionScene, FramePlan, compile_frame};
use crate::render::text::{FontLibrary, TextMeasure};
use crate::style::model::{AnimationStrategy, CaptionStyle};
use crate::timing::lines::{CaptionLine, LineBudget, group_lines};
use crate::timing::word::{WordTiming, validate_words};

const PROGRESS_EVERY: u64 = 100;

/// Options for [`FrameRenderer`].
#[derive(Clone, Debug)]
pub struct RenderOpts {
    /// Render frames on a rayon pool instead of the calling thread.
    pub parallel: bool,
    /// Worker count for the pool; `None` uses one per core.
    pub threads: Option<usize>,
    pub canvas: Canvas,
    pub fps: Fps,
    pub line_budget: LineBudget,
    /// File name prefix; frames are written as `<prefix><index:06>.png`.
    pub frame_prefix: String,
    /// Leave already written frames on disk when rendering fails or is cancelled.
    pub keep_frames: bool,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: None,
            canvas: Canvas::default(),
            fps: Fps::default(),
            line_budget: LineBudget::default(),
            frame_prefix: "frame_".to_string(),
            keep_frames: false,
        }
    }
}

/// Result of a completed frame render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderSummary {
    pub frames: u64,
    pub dir: PathBuf,
    /// printf-style input pattern for the encoder, e.g. `frame_%06d.png`.
    pub pattern: String,
}

impl RenderSummary {
    pub fn pattern_path(&self) -> PathBuf {
        self.dir.join(&self.pattern)
    }
}

/// Renders the caption overlay of one word sequence to a PNG sequence.
///
/// Every frame is a pure function of its timestamp, so frames can be rendered in any order and
/// on any worker.
#[derive(Debug)]
pub struct FrameRenderer {
    style: Arc<CaptionStyle>,
    strategy: AnimationStrategy,
    lines: Vec<CaptionLine>,
    fonts: Arc<FontLibrary>,
    opts: RenderOpts,
}

impl FrameRenderer {
    pub fn new(
        style: Arc<CaptionStyle>,
        words: &[WordTiming],
        opts: RenderOpts,
        fonts: Arc<FontLibrary>,
    ) -> CapResult<Self> {
        opts.canvas.validate()?;
        Fps::new(opts.fps.num, opts.fps.den)?;
        if opts.threads == Some(0) {
            return Err(CapError::validation("render threads must be >= 1 when set"));
        }
        style.validate().map_err(CapError::validation)?;
        validate_words(words)?;

        let lines = group_lines(words, opts.line_budget);
        let strategy = style.strategy();
        tracing::debug!(
            style = %style.id,
            ?strategy,
            words = words.len(),
            lines = lines.len(),
            "prepared frame renderer"
        );
        Ok(Self {
            style,
            strategy,
            lines,
            fonts,
            opts,
        })
    }

    pub fn style(&self) -> &CaptionStyle {
        &self.style
    }

    pub fn strategy(&self) -> AnimationStrategy {
        self.strategy
    }

    pub fn lines(&self) -> &[CaptionLine] {
        &self.lines
    }

    pub fn opts(&self) -> &RenderOpts {
        &self.opts
    }

    /// `ceil(duration * fps)`; zero for non-positive durations.
    pub fn frame_count(&self, duration: f64) -> u64 {
        self.opts.fps.frames_for_duration(duration)
    }

    pub fn timestamp(&self, frame: FrameIndex) -> f64 {
        self.opts.fps.frame_to_secs(frame)
    }

    pub fn frame_path(&self, dir: &Path, frame: FrameIndex) -> PathBuf {
        dir.join(format!("{}{:06}.png", self.opts.frame_prefix, frame.0))
    }

    pub fn new_backend(&self) -> CapResult<CpuBackend> {
        CpuBackend::new(self.opts.canvas, Arc::clone(&self.fonts))
    }

    pub fn plan_frame(&self, frame: FrameIndex, measure: &mut dyn TextMeasure) -> FramePlan {
        let scene = CaptionScene {
            style: &self.style,
            strategy: self.strategy,
            lines: &self.lines,
            canvas: self.opts.canvas,
        };
        compile_frame(&scene, self.timestamp(frame), measure)
    }

    /// Rasterize one frame. Layout is measured with the backend's own shaper.
    pub fn render_frame(&self, frame: FrameIndex, backend: &mut CpuBackend) -> CapResult<FrameRGBA> {
        let plan = self.plan_frame(frame, backend.shaper_mut());
        backend.render(&plan)
    }

    /// Render `ceil(duration * fps)` frames into `out_dir`.
    ///
    /// Cancellation is checked before every frame. On failure or cancellation the frames written
    /// so far are removed unless [`RenderOpts::keep_frames`] is set.
    #[tracing::instrument(skip(self, cancel), fields(style = %self.style.id))]
    pub fn render_frames(
        &self,
        duration: f64,
        out_dir: &Path,
        cancel: &CancelFlag,
    ) -> CapResult<RenderSummary> {
        let total = self.frame_count(duration);
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("create frame dir '{}'", out_dir.display()))?;

        let mut guard = FrameDirGuard::new(out_dir, &self.opts.frame_prefix);
        let done = AtomicU64::new(0);
        let render_one = |backend: &mut CpuBackend, f: u64| -> CapResult<()> {
            cancel.check()?;
            let frame = self.render_frame(FrameIndex(f), backend)?.into_straight();
            write_png(&self.frame_path(out_dir, FrameIndex(f)), &frame)?;
            let n = done.fetch_add(1, Ordering::Relaxed) + 1;
            if n % PROGRESS_EVERY == 0 || n == total {
                tracing::info!(rendered = n, total, "frame progress");
            }
            Ok(())
        };

        let result = if self.opts.parallel && total > 1 {
            let pool = build_thread_pool(self.opts.threads)?;
            pool.install(|| {
                (0..total)
                    .into_par_iter()
                    .map_init(
                        || self.new_backend(),
                        |backend, f| match backend {
                            Ok(backend) => render_one(backend, f),
                            Err(e) => Err(CapError::render(format!("worker backend: {e}"))),
                        },
                    )
                    .collect::<CapResult<Vec<()>>>()
            })
            .map(|_| ())
        } else {
            self.new_backend().and_then(|mut backend| {
                (0..total).try_for_each(|f| render_one(&mut backend, f))
            })
        };

        match result {
            Ok(()) => {
                guard.disarm();
                Ok(RenderSummary {
                    frames: total,
                    dir: out_dir.to_path_buf(),
                    pattern: format!("{}%06d.png", self.opts.frame_prefix),
                })
            }
            Err(e) => {
                if self.opts.keep_frames {
                    guard.disarm();
                }
                if e.is_cancelled() {
                    tracing::info!(dir = %out_dir.display(), "frame render cancelled");
                } else {
                    tracing::warn!(dir = %out_dir.display(), error = %e, "frame render failed");
                }
                Err(e)
            }
        }
    }
}

/// One-shot helper: build a [`FrameRenderer`] and render `duration` seconds into `out_dir`.
pub fn render_frames(
    style: Arc<CaptionStyle>,
    words: &[WordTiming],
    duration: f64,
    out_dir: &Path,
    opts: RenderOpts,
    fonts: Arc<FontLibrary>,
    cancel: &CancelFlag,
) -> CapResult<RenderSummary> {
    FrameRenderer::new(style, words, opts, fonts)?.render_frames(duration, out_dir, cancel)
}

fn write_png(path: &Path, frame: &FrameRGBA) -> CapResult<()> {
    image::save_buffer_with_format(
        path,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

pub(crate) fn build_thread_pool(threads: Option<usize>) -> CapResult<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(CapError::validation("threads must be >= 1 when set"));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| CapError::render(format!("failed to build rayon thread pool: {e}")))
}

/// Delete every `<prefix>*.png` file in `dir`. Returns how many were removed.
pub fn remove_frames(dir: &Path, prefix: &str) -> CapResult<usize> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("read frame dir '{}'", dir.display()))
                .into());
        }
    };
    let mut removed = 0;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(prefix) && name.ends_with(".png") && std::fs::remove_file(entry.path()).is_ok()
        {
            removed += 1;
        }
    }
    Ok(removed)
}

/// Removes a job's frames when dropped while armed.
struct FrameDirGuard {
    dir: Option<PathBuf>,
    prefix: String,
}

impl FrameDirGuard {
    fn new(dir: &Path, prefix: &str) -> Self {
        Self {
            dir: Some(dir.to_path_buf()),
            prefix: prefix.to_string(),
        }
    }

    fn disarm(&mut self) {
        self.dir = None;
    }
}

impl Drop for FrameDirGuard {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            match remove_frames(&dir, &self.prefix) {
                Ok(n) => tracing::debug!(dir = %dir.display(), removed = n, "removed partial frames"),
                Err(e) => tracing::warn!(dir = %dir.display(), error = %e, "frame cleanup failed"),
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
