#![forbid(unsafe_code)]
//! capflow renders animated, style-driven captions as transparent PNG sequences, burns them onto
//! video in independently processed chunks and joins the chunks back together.
//!
//! Every frame is a pure function of `(style, word timings, timestamp)`, so frames render in any
//! order and on any worker.

pub mod animation;
pub mod chunk;
pub mod foundation;
pub mod job;
pub mod merge;
pub mod render;
pub mod style;
pub mod subtitle;
pub mod timing;

pub use animation::ease::Ease;
pub use animation::spec::{AnimationConfig, AnimationProperties, AnimationSpec, Range};
pub use chunk::{Chunk, ChunkIssue, ChunkSummary, split_into_chunks, validate_chunks};
pub use foundation::core::{CancelFlag, Canvas, Fps, FrameIndex, Rgba8};
pub use foundation::error::{CapError, CapResult};
pub use job::{CaptionJob, JobOpts, JobReport, run_job};
pub use merge::{FfmpegTools, MergeIssue, MergeOptions, Transition, VideoMerger, cleanup_chunks};
pub use render::FrameRGBA;
pub use render::pipeline::{FrameRenderer, RenderOpts, RenderSummary, render_frames};
pub use render::text::FontLibrary;
pub use style::model::{AnimationStrategy, CaptionStyle, Category};
pub use style::registry::StyleRegistry;
pub use subtitle::SubtitleFormat;
pub use timing::lines::{CaptionLine, LineBudget, group_lines};
pub use timing::word::WordTiming;
