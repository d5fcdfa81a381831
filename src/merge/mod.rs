//! Chunk video assembly: burn-in of frame sequences, metadata checks and joining.

pub mod ffmpeg;
pub mod merger;

pub use ffmpeg::{BurnIn, FfmpegTools, VideoMeta};
pub use merger::{
    MergeIssue, MergeOptions, Transition, VideoMerger, cleanup_chunks, compare_metadata,
};
