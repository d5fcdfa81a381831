use std::fmt;

use crate::foundation::error::{CapError, CapResult};
use crate::timing::word::WordTiming;

/// Default chunk length in seconds.
pub const DEFAULT_CHUNK_SECS: f64 = 8.0;
/// Candidates are searched within this many seconds either side of the target.
pub const SEARCH_WINDOW_SECS: f64 = 2.0;
pub const SENTENCE_END_BONUS: f64 = 10.0;
/// Score per second of pause after the candidate word.
pub const GAP_WEIGHT: f64 = 2.0;
pub const GAP_BONUS_CAP: f64 = 5.0;
/// Score lost per second of distance from the target.
pub const DISTANCE_PENALTY: f64 = 0.5;
/// Allowed gap or overlap between consecutive chunks.
pub const JOIN_TOLERANCE_SECS: f64 = 0.1;

/// Baseline a candidate must beat to replace the literal target time.
const BASELINE_SCORE: f64 = -1.0;

/// Options for [`split_into_chunks`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChunkOpts {
    /// Target chunk length in seconds.
    pub chunk_size: f64,
}

impl Default for ChunkOpts {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SECS,
        }
    }
}

/// One slice of the timeline. Word timings are relative to `start_time`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub index: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub words: Vec<WordTiming>,
}

/// A chosen split point: the cut time and the index of the first word after it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkBoundary {
    pub time: f64,
    pub word_index: usize,
}

/// Split `words` into chunks of roughly `chunk_size` seconds, cutting at natural pauses.
///
/// Chunks tile `[0, total_duration]` exactly. A word belongs to the chunk that fully contains
/// it; a word straddling a cut made between words is dropped from both sides.
#[tracing::instrument(skip(words), fields(words = words.len()))]
pub fn split_into_chunks(
    words: &[WordTiming],
    total_duration: f64,
    chunk_size: f64,
) -> CapResult<Vec<Chunk>> {
    if !chunk_size.is_finite() || chunk_size <= 0.0 {
        return Err(CapError::validation(format!(
            "chunk size must be a positive number of seconds, got {chunk_size}"
        )));
    }
    if !total_duration.is_finite() || total_duration < 0.0 {
        return Err(CapError::validation(format!(
            "total duration must be finite and >= 0, got {total_duration}"
        )));
    }

    if total_duration <= chunk_size {
        tracing::debug!(total_duration, chunk_size, "clip fits in a single chunk");
        return Ok(vec![Chunk {
            index: 0,
            start_time: 0.0,
            end_time: total_duration,
            duration: total_duration,
            words: words.to_vec(),
        }]);
    }

    let boundaries = chunk_boundaries(words, total_duration, chunk_size);
    let chunks: Vec<Chunk> = boundaries
        .windows(2)
        .enumerate()
        .map(|(index, pair)| {
            let (start, end) = (pair[0].time, pair[1].time);
            let words: Vec<WordTiming> = words
                .iter()
                .filter(|w| w.start >= start && w.end <= end)
                .map(|w| w.rebased(start))
                .collect();
            tracing::debug!(
                index,
                start = format_args!("{start:.2}"),
                end = format_args!("{end:.2}"),
                words = words.len(),
                "chunk"
            );
            Chunk {
                index,
                start_time: start,
                end_time: end,
                duration: end - start,
                words,
            }
        })
        .collect();

    tracing::info!(chunks = chunks.len(), total_duration, chunk_size, "split clip into chunks");
    Ok(chunks)
}

/// Boundaries from 0 to `total_duration`, inclusive of both ends.
fn chunk_boundaries(words: &[WordTiming], total_duration: f64, chunk_size: f64) -> Vec<ChunkBoundary> {
    let mut boundaries = vec![ChunkBoundary {
        time: 0.0,
        word_index: 0,
    }];
    let mut current = boundaries[0];

    while current.time < total_duration {
        let target = current.time + chunk_size;
        if target >= total_duration {
            boundaries.push(ChunkBoundary {
                time: total_duration,
                word_index: words.len(),
            });
            break;
        }
        current = find_split_point(words, current, target, total_duration);
        boundaries.push(current);
    }
    boundaries
}

/// Score of cutting right after `words[i]`.
fn split_score(words: &[WordTiming], i: usize, target: f64) -> f64 {
    let word = &words[i];
    let mut score = 0.0;
    if word.ends_sentence() {
        score += SENTENCE_END_BONUS;
    }
    if let Some(next) = words.get(i + 1) {
        score += ((next.start - word.end) * GAP_WEIGHT).min(GAP_BONUS_CAP);
    }
    score - (word.end - target).abs() * DISTANCE_PENALTY
}

/// Best cut near `target`. Falls back to the literal target when no candidate beats the baseline.
///
/// Candidates must end strictly after the current boundary and strictly before the clip end, so
/// every step makes progress and no chunk overruns the clip. Ties go to the earliest candidate.
fn find_split_point(
    words: &[WordTiming],
    current: ChunkBoundary,
    target: f64,
    total_duration: f64,
) -> ChunkBoundary {
    let min_time = target - SEARCH_WINDOW_SECS;
    let max_time = target + SEARCH_WINDOW_SECS;

    let mut best = ChunkBoundary {
        time: target,
        word_index: current.word_index,
    };
    let mut best_score = BASELINE_SCORE;

    for (i, word) in words.iter().enumerate().skip(current.word_index) {
        if word.end < min_time {
            continue;
        }
        if word.start > max_time {
            break;
        }
        if word.end <= current.time || word.end >= total_duration {
            continue;
        }
        let score = split_score(words, i, target);
        if score > best_score {
            best_score = score;
            best = ChunkBoundary {
                time: word.end,
                word_index: i + 1,
            };
        }
    }

    tracing::debug!(
        target,
        time = best.time,
        word_index = best.word_index,
        score = best_score,
        "chunk boundary"
    );
    best
}

/// Non-fatal finding from [`validate_chunks`].
#[derive(Clone, Debug, PartialEq)]
pub enum ChunkIssue {
    Gap { after: usize, secs: f64 },
    Overlap { after: usize, secs: f64 },
    EmptyChunk { index: usize },
}

impl fmt::Display for ChunkIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gap { after, secs } => write!(
                f,
                "gap detected between chunk {after} and {}: {secs:.2}s",
                after + 1
            ),
            Self::Overlap { after, secs } => write!(
                f,
                "overlap detected between chunk {after} and {}: {secs:.2}s",
                after + 1
            ),
            Self::EmptyChunk { index } => write!(f, "chunk {index} has no words"),
        }
    }
}

impl ChunkIssue {
    /// `true` for timeline gaps and overlaps; empty chunks are informational.
    pub fn is_join_error(&self) -> bool {
        !matches!(self, Self::EmptyChunk { .. })
    }
}

/// Check joins between consecutive chunks and flag chunks without words.
///
/// Every problem is reported; nothing is raised as an error.
pub fn validate_chunks(chunks: &[Chunk]) -> Vec<ChunkIssue> {
    let mut issues = Vec::new();
    for (i, pair) in chunks.windows(2).enumerate() {
        let gap = pair[1].start_time - pair[0].end_time;
        if gap > JOIN_TOLERANCE_SECS {
            issues.push(ChunkIssue::Gap { after: i, secs: gap });
        }
        if gap < -JOIN_TOLERANCE_SECS {
            issues.push(ChunkIssue::Overlap {
                after: i,
                secs: -gap,
            });
        }
    }
    issues.extend(
        chunks
            .iter()
            .filter(|c| c.words.is_empty())
            .map(|c| ChunkIssue::EmptyChunk { index: c.index }),
    );
    for issue in &issues {
        tracing::warn!(%issue, "chunk validation");
    }
    issues
}

/// Aggregate numbers for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkSummary {
    pub total_chunks: usize,
    pub total_duration: f64,
    pub average_chunk_size: f64,
    pub total_words: usize,
}

impl ChunkSummary {
    pub fn of(chunks: &[Chunk]) -> Self {
        let total_duration: f64 = chunks.iter().map(|c| c.duration).sum();
        let total_words = chunks.iter().map(|c| c.words.len()).sum();
        let average_chunk_size = if chunks.is_empty() {
            0.0
        } else {
            total_duration / chunks.len() as f64
        };
        Self {
            total_chunks: chunks.len(),
            total_duration,
            average_chunk_size,
            total_words,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/chunk/manager.rs"]
mod tests;
