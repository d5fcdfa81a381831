use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;

use crate::foundation::error::{CapError, CapResult};
use crate::merge::ffmpeg::{FfmpegTools, TempFileGuard, VideoMeta, ensure_parent_dir};

pub const DEFAULT_FADE_SECS: f64 = 0.5;
/// Largest frame-rate difference still treated as equal.
pub const FPS_TOLERANCE: f64 = 0.1;

/// How consecutive inputs are joined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    /// Lossless stream-copy concatenation.
    #[default]
    Cut,
    /// Cross-fade between inputs; re-encodes the video stream.
    Fade,
}

impl std::str::FromStr for Transition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cut" | "simple" | "concat" => Ok(Self::Cut),
            "fade" | "crossfade" => Ok(Self::Fade),
            other => Err(format!("unknown transition '{other}' (expected cut or fade)")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MergeOptions {
    pub transition: Transition,
    /// Cross-fade length in seconds.
    pub fade_duration: f64,
    /// Per-input durations for fade offsets; probed when `None`.
    pub durations: Option<Vec<f64>>,
    /// Treat every input as this long when computing fade offsets.
    ///
    /// Only correct for uniform inputs. Overrides `durations`.
    pub assumed_chunk_secs: Option<f64>,
    pub output_path: PathBuf,
    /// Per-invocation limit; falls back to the tools' own timeout.
    pub timeout: Option<Duration>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            transition: Transition::Cut,
            fade_duration: DEFAULT_FADE_SECS,
            durations: None,
            assumed_chunk_secs: None,
            output_path: PathBuf::from("merged.mp4"),
            timeout: None,
        }
    }
}

/// Problem found while checking that inputs can be joined. Never raised as an error by itself.
#[derive(Clone, Debug, PartialEq)]
pub enum MergeIssue {
    NoInputs,
    Probe {
        index: usize,
        path: PathBuf,
        message: String,
    },
    WidthMismatch {
        index: usize,
        expected: u32,
        actual: u32,
    },
    HeightMismatch {
        index: usize,
        expected: u32,
        actual: u32,
    },
    FpsMismatch {
        index: usize,
        expected: f64,
        actual: f64,
    },
}

impl fmt::Display for MergeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoInputs => write!(f, "no chunk videos to merge"),
            Self::Probe {
                index,
                path,
                message,
            } => write!(f, "chunk {index} ('{}') could not be probed: {message}", path.display()),
            Self::WidthMismatch {
                index,
                expected,
                actual,
            } => write!(f, "chunk {index} width mismatch: {actual} vs {expected}"),
            Self::HeightMismatch {
                index,
                expected,
                actual,
            } => write!(f, "chunk {index} height mismatch: {actual} vs {expected}"),
            Self::FpsMismatch {
                index,
                expected,
                actual,
            } => write!(f, "chunk {index} fps mismatch: {actual:.3} vs {expected:.3}"),
        }
    }
}

/// Compare every entry against the first one.
pub fn compare_metadata(metas: &[VideoMeta]) -> Vec<MergeIssue> {
    compare_indexed(metas.iter().enumerate())
}

fn compare_indexed<'a>(mut metas: impl Iterator<Item = (usize, &'a VideoMeta)>) -> Vec<MergeIssue> {
    let Some((_, reference)) = metas.next() else {
        return Vec::new();
    };
    let mut issues = Vec::new();
    for (index, meta) in metas {
        if meta.width != reference.width {
            issues.push(MergeIssue::WidthMismatch {
                index,
                expected: reference.width,
                actual: meta.width,
            });
        }
        if meta.height != reference.height {
            issues.push(MergeIssue::HeightMismatch {
                index,
                expected: reference.height,
                actual: meta.height,
            });
        }
        let (expected, actual) = (reference.fps.as_f64(), meta.fps.as_f64());
        if (expected - actual).abs() > FPS_TOLERANCE {
            issues.push(MergeIssue::FpsMismatch {
                index,
                expected,
                actual,
            });
        }
    }
    issues
}

/// Cross-fade start times from real input durations: `sum(d_0..d_{i-1}) - i * fade`.
pub fn fade_offsets(durations: &[f64], fade: f64) -> Vec<f64> {
    let mut elapsed = 0.0;
    durations
        .iter()
        .take(durations.len().saturating_sub(1))
        .enumerate()
        .map(|(i, d)| {
            elapsed += d;
            elapsed - (i + 1) as f64 * fade
        })
        .collect()
}

/// Whether `a` and `b` resolve to the same existing file.
fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Cross-fade start times assuming every input lasts `chunk_secs`: `i * chunk_secs - fade`.
pub fn uniform_fade_offsets(count: usize, chunk_secs: f64, fade: f64) -> Vec<f64> {
    (1..count).map(|i| i as f64 * chunk_secs - fade).collect()
}

/// `xfade` chain over inputs `0..=offsets.len()`, ending in the `[v]` label.
pub fn xfade_filter(offsets: &[f64], fade: f64) -> String {
    let last = offsets.len();
    offsets
        .iter()
        .enumerate()
        .map(|(i, offset)| {
            let n = i + 1;
            let input = if n == 1 {
                "[0:v]".to_string()
            } else {
                format!("[v{}]", n - 1)
            };
            let output = if n == last {
                "[v]".to_string()
            } else {
                format!("[v{n}]")
            };
            format!("{input}[{n}:v]xfade=transition=fade:duration={fade:.3}:offset={offset:.3}{output}")
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Concat demuxer manifest: one `file '<path>'` line per input.
pub fn concat_manifest(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| {
            let abs = std::path::absolute(p).unwrap_or_else(|_| p.clone());
            let escaped = abs.to_string_lossy().replace('\'', r"'\''");
            format!("file '{escaped}'\n")
        })
        .collect()
}

/// Joins chunk videos into one output.
#[derive(Clone, Debug, Default)]
pub struct VideoMerger {
    tools: FfmpegTools,
}

impl VideoMerger {
    pub fn new(tools: FfmpegTools) -> Self {
        Self { tools }
    }

    pub fn tools(&self) -> &FfmpegTools {
        &self.tools
    }

    /// Join `paths` in order into `opts.output_path`.
    ///
    /// A single input is copied byte for byte. Every input must exist before anything runs.
    #[tracing::instrument(skip(self, paths, opts), fields(inputs = paths.len(), transition = ?opts.transition))]
    pub fn concatenate(&self, paths: &[PathBuf], opts: &MergeOptions) -> CapResult<PathBuf> {
        if paths.is_empty() {
            return Err(CapError::validation("no input videos to merge"));
        }
        if let Some(missing) = paths.iter().find(|p| !p.is_file()) {
            return Err(CapError::missing_input(missing));
        }
        let output = &opts.output_path;
        ensure_parent_dir(output)?;

        if paths.len() == 1 {
            if same_file(&paths[0], output) {
                tracing::info!(output = %output.display(), "single input is the output, nothing to copy");
                return Ok(output.clone());
            }
            std::fs::copy(&paths[0], output).with_context(|| {
                format!("copy '{}' to '{}'", paths[0].display(), output.display())
            })?;
            tracing::info!(output = %output.display(), "single input copied");
            return Ok(output.clone());
        }

        let tools = match opts.timeout {
            Some(t) => self.tools.clone().with_timeout(t),
            None => self.tools.clone(),
        };
        match opts.transition {
            Transition::Cut => concat_copy(&tools, paths, output)?,
            Transition::Fade => concat_fade(&tools, paths, opts)?,
        }
        tracing::info!(output = %output.display(), inputs = paths.len(), "merged chunk videos");
        Ok(output.clone())
    }

    /// Probe every input and report each one that differs from the first.
    pub fn validate_chunk_videos(&self, paths: &[PathBuf]) -> Vec<MergeIssue> {
        if paths.is_empty() {
            return vec![MergeIssue::NoInputs];
        }
        let mut issues = Vec::new();
        let mut probed = Vec::with_capacity(paths.len());
        for (index, path) in paths.iter().enumerate() {
            match self.tools.probe_video(path) {
                Ok(meta) => probed.push((index, meta)),
                Err(e) => issues.push(MergeIssue::Probe {
                    index,
                    path: path.clone(),
                    message: e.to_string(),
                }),
            }
        }
        issues.extend(compare_indexed(probed.iter().map(|(i, m)| (*i, m))));
        for issue in &issues {
            tracing::warn!(%issue, "chunk video validation");
        }
        issues
    }

    /// Validate, then merge. Findings abort the merge unless `allow_mismatch` is set.
    pub fn merge_validated(
        &self,
        paths: &[PathBuf],
        opts: &MergeOptions,
        allow_mismatch: bool,
    ) -> CapResult<(PathBuf, Vec<MergeIssue>)> {
        let issues = self.validate_chunk_videos(paths);
        if !issues.is_empty() && !allow_mismatch {
            let summary = issues
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(CapError::validation(format!(
                "chunk videos cannot be joined as-is: {summary}"
            )));
        }
        let output = self.concatenate(paths, opts)?;
        Ok((output, issues))
    }
}

fn concat_copy(tools: &FfmpegTools, paths: &[PathBuf], output: &Path) -> CapResult<()> {
    let manifest = manifest_path(output);
    std::fs::write(&manifest, concat_manifest(paths))
        .with_context(|| format!("write concat manifest '{}'", manifest.display()))?;
    let _manifest_guard = TempFileGuard(Some(manifest.clone()));

    let mut partial = TempFileGuard(Some(output.to_path_buf()));
    let args: Vec<OsString> = vec![
        "-f".into(),
        "concat".into(),
        "-safe".into(),
        "0".into(),
        "-i".into(),
        manifest.into(),
        "-c".into(),
        "copy".into(),
        output.into(),
    ];
    tools.ffmpeg(args)?;
    partial.0 = None;
    Ok(())
}

fn concat_fade(tools: &FfmpegTools, paths: &[PathBuf], opts: &MergeOptions) -> CapResult<()> {
    let fade = opts.fade_duration;
    if !fade.is_finite() || fade <= 0.0 {
        return Err(CapError::validation(format!(
            "fade duration must be > 0, got {fade}"
        )));
    }

    let offsets = match (opts.assumed_chunk_secs, &opts.durations) {
        (Some(secs), _) => uniform_fade_offsets(paths.len(), secs, fade),
        (None, Some(durations)) => {
            if durations.len() != paths.len() {
                return Err(CapError::validation(format!(
                    "{} durations given for {} inputs",
                    durations.len(),
                    paths.len()
                )));
            }
            fade_offsets(durations, fade)
        }
        (None, None) => {
            let durations = paths
                .iter()
                .map(|p| tools.probe_video(p).map(|m| m.duration))
                .collect::<CapResult<Vec<_>>>()?;
            fade_offsets(&durations, fade)
        }
    };
    let mut prev = 0.0;
    for &offset in &offsets {
        if offset <= prev {
            return Err(CapError::validation(format!(
                "cross-fade offset {offset:.3}s is not after {prev:.3}s; inputs are shorter than the fade"
            )));
        }
        prev = offset;
    }
    tracing::debug!(?offsets, fade, "cross-fade offsets");

    let mut args: Vec<OsString> = Vec::with_capacity(paths.len() * 2 + 14);
    for p in paths {
        args.push("-i".into());
        args.push(p.into());
    }
    args.extend(
        [
            "-filter_complex".to_string(),
            xfade_filter(&offsets, fade),
            "-map".to_string(),
            "[v]".to_string(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            "fast".to_string(),
            "-crf".to_string(),
            "23".to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
        ]
        .into_iter()
        .map(OsString::from),
    );
    args.push(opts.output_path.as_os_str().to_os_string());

    let mut partial = TempFileGuard(Some(opts.output_path.clone()));
    tools.ffmpeg(args)?;
    partial.0 = None;
    Ok(())
}

fn manifest_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "merge".to_string());
    output.with_file_name(format!("{stem}.concat.txt"))
}

/// Delete chunk videos. Failures are logged and skipped. Returns how many were removed.
pub fn cleanup_chunks(paths: &[PathBuf]) -> usize {
    let mut removed = 0;
    for path in paths {
        match std::fs::remove_file(path) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove chunk video"),
        }
    }
    tracing::debug!(removed, "cleaned up chunk videos");
    removed
}

#[cfg(test)]
#[path = "../../tests/unit/merge/merger.rs"]
mod tests;
