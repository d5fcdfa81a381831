//! Splitting long word sequences into independently rendered chunks.

pub mod manager;

pub use manager::{
    Chunk, ChunkBoundary, ChunkIssue, ChunkOpts, ChunkSummary, split_into_chunks, validate_chunks,
};
