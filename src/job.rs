use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use rayon::prelude::*;

use crate::chunk::manager::{
    Chunk, ChunkIssue, ChunkSummary, DEFAULT_CHUNK_SECS, split_into_chunks, validate_chunks,
};
use crate::foundation::core::{CancelFlag, Canvas, Fps};
use crate::foundation::error::{CapError, CapResult};
use crate::merge::ffmpeg::{BurnIn, FfmpegTools};
use crate::merge::merger::{MergeIssue, MergeOptions, Transition, VideoMerger, cleanup_chunks};
use crate::render::pipeline::{RenderOpts, build_thread_pool, remove_frames, render_frames};
use crate::render::text::FontLibrary;
use crate::style::builtin::DEFAULT_STYLE_ID;
use crate::style::model::CaptionStyle;
use crate::style::registry::StyleRegistry;
use crate::timing::keywords::detect_keywords;
use crate::timing::word::{WordTiming, validate_words, words_end};

fn default_style_id() -> String {
    DEFAULT_STYLE_ID.to_string()
}

fn default_chunk_size() -> f64 {
    DEFAULT_CHUNK_SECS
}

/// Job description as read from JSON.
///
/// ```json
/// { "words": [{"text": "Hi", "start": 0.0, "end": 0.5}], "style": "mrbeast",
///   "duration": 12.5, "video": "in.mp4" }
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CaptionJob {
    #[serde(default)]
    pub words: Vec<WordTiming>,
    #[serde(default = "default_style_id")]
    pub style: String,
    /// Clip length in seconds; defaults to the end of the last word.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default)]
    pub canvas: Canvas,
    #[serde(default)]
    pub fps: Fps,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: f64,
    /// Source video the captions are burned onto.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<PathBuf>,
}

impl Default for CaptionJob {
    fn default() -> Self {
        Self {
            words: Vec::new(),
            style: default_style_id(),
            duration: None,
            canvas: Canvas::default(),
            fps: Fps::default(),
            chunk_size: DEFAULT_CHUNK_SECS,
            video: None,
        }
    }
}

impl CaptionJob {
    pub fn from_json(text: &str) -> CapResult<Self> {
        serde_json::from_str(text).map_err(|e| CapError::serde(format!("job json: {e}")))
    }

    pub fn load(path: &Path) -> CapResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read job file '{}'", path.display()))?;
        Self::from_json(&text)
    }

    /// Explicit duration, or the end of the last word.
    pub fn total_duration(&self) -> f64 {
        self.duration.unwrap_or_else(|| words_end(&self.words))
    }

    pub fn resolve_style(&self, registry: &StyleRegistry) -> Arc<CaptionStyle> {
        registry.get(&self.style)
    }

    /// Words ready for rendering: keyword flags are detected when the style emphasizes
    /// keywords and the input carries none.
    pub fn prepared_words(&self, style: &CaptionStyle) -> Vec<WordTiming> {
        let mut words = self.words.clone();
        if style.emphasizes_keywords() && !words.iter().any(|w| w.is_keyword) {
            detect_keywords(&mut words);
            tracing::debug!(
                keywords = words.iter().filter(|w| w.is_keyword).count(),
                "detected keywords"
            );
        }
        words
    }

    pub fn render_opts(&self) -> RenderOpts {
        RenderOpts {
            canvas: self.canvas,
            fps: self.fps,
            ..RenderOpts::default()
        }
    }
}

/// Execution settings for [`run_job`].
#[derive(Clone, Debug)]
pub struct JobOpts {
    /// Scratch directory for frame sequences and chunk videos.
    pub work_dir: PathBuf,
    pub output: PathBuf,
    /// Chunks rendered and burned at the same time.
    pub max_parallel_chunks: usize,
    /// Frame workers per chunk; `None` uses one per core.
    pub render_threads: Option<usize>,
    pub transition: Transition,
    pub fade_duration: f64,
    /// Merge even when chunk videos differ in size or frame rate.
    pub allow_mismatch: bool,
    /// Leave frame sequences and chunk videos in `work_dir`.
    pub keep_intermediates: bool,
    pub tools: FfmpegTools,
}

impl Default for JobOpts {
    fn default() -> Self {
        let merge = MergeOptions::default();
        Self {
            work_dir: std::env::temp_dir().join("capflow"),
            output: merge.output_path,
            max_parallel_chunks: 2,
            render_threads: None,
            transition: merge.transition,
            fade_duration: merge.fade_duration,
            allow_mismatch: false,
            keep_intermediates: false,
            tools: FfmpegTools::from_env(),
        }
    }
}

/// Outcome of a finished job.
#[derive(Clone, Debug)]
pub struct JobReport {
    /// `None` when the clip is empty and nothing was produced.
    pub output: Option<PathBuf>,
    pub summary: ChunkSummary,
    pub chunk_issues: Vec<ChunkIssue>,
    pub merge_issues: Vec<MergeIssue>,
}

/// Render captions for `job` chunk by chunk, burn them onto the source video and join the result.
///
/// Chunks run concurrently up to [`JobOpts::max_parallel_chunks`]; the merge starts only after
/// every chunk finished. Frames and chunk videos are removed on success, failure and
/// cancellation unless [`JobOpts::keep_intermediates`] is set.
#[tracing::instrument(skip_all, fields(style = %job.style, words = job.words.len()))]
pub fn run_job(
    job: &CaptionJob,
    opts: &JobOpts,
    fonts: Arc<FontLibrary>,
    cancel: &CancelFlag,
) -> CapResult<JobReport> {
    if opts.max_parallel_chunks == 0 {
        return Err(CapError::validation("max_parallel_chunks must be >= 1"));
    }
    let style = job.resolve_style(&StyleRegistry::builtin());
    validate_words(&job.words)?;
    let duration = job.total_duration();
    let video = job
        .video
        .as_deref()
        .ok_or_else(|| CapError::validation("job has no source video"))?;
    if !video.is_file() {
        return Err(CapError::missing_input(video));
    }

    let chunks = split_into_chunks(&job.prepared_words(&style), duration, job.chunk_size)?;
    let summary = ChunkSummary::of(&chunks);
    let chunk_issues = validate_chunks(&chunks);
    if duration <= 0.0 {
        tracing::info!("empty clip, nothing to render");
        return Ok(JobReport {
            output: None,
            summary,
            chunk_issues,
            merge_issues: Vec::new(),
        });
    }

    std::fs::create_dir_all(&opts.work_dir)
        .with_context(|| format!("create work dir '{}'", opts.work_dir.display()))?;
    let chunk_paths: Vec<PathBuf> = chunks
        .iter()
        .map(|c| chunk_video_path(&opts.work_dir, c.index))
        .collect();
    let mut guard = ChunkVideosGuard {
        paths: if opts.keep_intermediates {
            Vec::new()
        } else {
            chunk_paths.clone()
        },
    };

    let render_opts = RenderOpts {
        threads: opts.render_threads,
        keep_frames: opts.keep_intermediates,
        ..job.render_opts()
    };
    let ctx = ChunkContext {
        style: &style,
        video,
        render_opts: &render_opts,
        fonts: &fonts,
        opts,
        cancel,
    };

    let pool = build_thread_pool(Some(opts.max_parallel_chunks.min(chunks.len()).max(1)))?;
    pool.install(|| {
        chunks
            .par_iter()
            .zip(chunk_paths.par_iter())
            .try_for_each(|(chunk, out)| ctx.process(chunk, out))
    })?;
    tracing::info!(chunks = chunks.len(), "all chunks rendered");

    cancel.check()?;
    let merge_opts = MergeOptions {
        transition: opts.transition,
        fade_duration: opts.fade_duration,
        durations: Some(chunks.iter().map(|c| c.duration).collect()),
        output_path: opts.output.clone(),
        ..MergeOptions::default()
    };
    let merger = VideoMerger::new(opts.tools.clone());
    let (output, merge_issues) =
        merger.merge_validated(&chunk_paths, &merge_opts, opts.allow_mismatch)?;

    if !opts.keep_intermediates {
        cleanup_chunks(&chunk_paths);
    }
    guard.paths.clear();
    tracing::info!(output = %output.display(), "caption job finished");
    Ok(JobReport {
        output: Some(output),
        summary,
        chunk_issues,
        merge_issues,
    })
}

pub fn chunk_video_path(work_dir: &Path, index: usize) -> PathBuf {
    work_dir.join(format!("chunk_{index:04}.mp4"))
}

pub fn chunk_frames_dir(work_dir: &Path, index: usize) -> PathBuf {
    work_dir.join(format!("chunk_{index:04}_frames"))
}

struct ChunkContext<'a> {
    style: &'a Arc<CaptionStyle>,
    video: &'a Path,
    render_opts: &'a RenderOpts,
    fonts: &'a Arc<FontLibrary>,
    opts: &'a JobOpts,
    cancel: &'a CancelFlag,
}

impl ChunkContext<'_> {
    /// Render one chunk's frames and burn them onto its slice of the source video.
    fn process(&self, chunk: &Chunk, out: &Path) -> CapResult<()> {
        self.cancel.check()?;
        let frames_dir = chunk_frames_dir(&self.opts.work_dir, chunk.index);
        let result = render_frames(
            Arc::clone(self.style),
            &chunk.words,
            chunk.duration,
            &frames_dir,
            self.render_opts.clone(),
            Arc::clone(self.fonts),
            self.cancel,
        )
        .and_then(|frames| {
            self.cancel.check()?;
            BurnIn {
                video: self.video,
                start: chunk.start_time,
                duration: chunk.duration,
                frames: &frames.pattern_path(),
                fps: self.render_opts.fps,
                output: out,
            }
            .run(&self.opts.tools)
        });

        if !self.opts.keep_intermediates {
            let _ = remove_frames(&frames_dir, &self.render_opts.frame_prefix);
            let _ = std::fs::remove_dir(&frames_dir);
        }
        match &result {
            Ok(()) => tracing::info!(
                chunk = chunk.index,
                start = chunk.start_time,
                duration = chunk.duration,
                "chunk burned"
            ),
            Err(e) if e.is_cancelled() => tracing::info!(chunk = chunk.index, "chunk cancelled"),
            Err(e) => tracing::warn!(chunk = chunk.index, error = %e, "chunk failed"),
        }
        result
    }
}

/// Removes chunk videos when a job does not reach its merge.
struct ChunkVideosGuard {
    paths: Vec<PathBuf>,
}

impl Drop for ChunkVideosGuard {
    fn drop(&mut self) {
        if !self.paths.is_empty() {
            cleanup_chunks(&self.paths);
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/job.rs"]
mod tests;
