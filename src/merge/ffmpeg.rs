use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::Context as _;

use crate::foundation::core::Fps;
use crate::foundation::error::{CapError, CapResult};

pub const FFMPEG_ENV: &str = "CAPFLOW_FFMPEG";
pub const FFPROBE_ENV: &str = "CAPFLOW_FFPROBE";
pub const TIMEOUT_ENV: &str = "CAPFLOW_PROCESS_TIMEOUT_SECS";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// stderr fragments that mark a run as failed even when the exit status is zero.
const FATAL_MARKERS: &[&str] = &[
    "Conversion failed",
    "No such file or directory",
    "Invalid data found when processing input",
    "Error opening input",
    "Error opening output",
    "Could not open",
];

/// Locations of the external media tools and the per-invocation time limit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FfmpegTools {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    pub timeout: Duration,
}

impl Default for FfmpegTools {
    fn default() -> Self {
        Self::from_env()
    }
}

impl FfmpegTools {
    /// Read `CAPFLOW_FFMPEG`, `CAPFLOW_FFPROBE` and `CAPFLOW_PROCESS_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let tool = |var: &str, default: &str| {
            std::env::var_os(var)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };
        let timeout = std::env::var(TIMEOUT_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        Self {
            ffmpeg: tool(FFMPEG_ENV, "ffmpeg"),
            ffprobe: tool(FFPROBE_ENV, "ffprobe"),
            timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn ffmpeg_available(&self) -> bool {
        responds_to_version(&self.ffmpeg)
    }

    pub fn ffprobe_available(&self) -> bool {
        responds_to_version(&self.ffprobe)
    }

    /// Run ffmpeg with `-y -hide_banner -loglevel error` prepended.
    pub fn ffmpeg(&self, args: Vec<OsString>) -> CapResult<ToolOutput> {
        let mut argv: Vec<OsString> = ["-y", "-hide_banner", "-loglevel", "error", "-nostdin"]
            .into_iter()
            .map(OsString::from)
            .collect();
        argv.extend(args);
        run_tool(&self.ffmpeg, &argv, self.timeout)
    }

    /// Probe the first video stream of `path`.
    pub fn probe_video(&self, path: &Path) -> CapResult<VideoMeta> {
        if !path.is_file() {
            return Err(CapError::missing_input(path));
        }
        let mut argv: Vec<OsString> = [
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate,duration:format=duration",
            "-of",
            "json",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        argv.push(path.as_os_str().to_os_string());
        let out = run_tool(&self.ffprobe, &argv, self.timeout)?;
        parse_probe_json(&out.stdout)
            .with_context(|| format!("probe '{}'", path.display()))
            .map_err(CapError::from)
    }
}

fn responds_to_version(program: &Path) -> bool {
    Command::new(program)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Captured output of a finished tool run.
#[derive(Clone, Debug, Default)]
pub struct ToolOutput {
    pub stdout: Vec<u8>,
    pub stderr: String,
}

/// Run `program` with `args` (no shell), killing it after `timeout`.
///
/// Fails with [`CapError::Process`] on spawn failure, timeout, non-zero exit, or a fatal marker
/// in stderr. Progress lines (`frame=`) are never treated as errors.
pub fn run_tool(program: &Path, args: &[OsString], timeout: Duration) -> CapResult<ToolOutput> {
    let tool = tool_name(program);
    tracing::debug!(tool = %tool, argv = ?args, "running external tool");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| CapError::process(&tool, "spawn failed", e.to_string()))?;

    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Some(status),
            Ok(None) if started.elapsed() >= timeout => {
                let _ = child.kill();
                let _ = child.wait();
                break None;
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                return Err(CapError::process(&tool, "wait failed", e.to_string()));
            }
        }
    };

    let join = |h: Option<std::thread::JoinHandle<Vec<u8>>>| {
        h.and_then(|h| h.join().ok()).unwrap_or_default()
    };
    let stdout = join(stdout);
    let stderr = String::from_utf8_lossy(&join(stderr)).into_owned();

    let Some(status) = status else {
        tracing::warn!(tool = %tool, timeout_secs = timeout.as_secs(), "external tool timed out");
        return Err(CapError::process(
            &tool,
            format!("timeout after {}s", timeout.as_secs()),
            error_lines(&stderr).join("\n"),
        ));
    };
    if !status.success() {
        return Err(CapError::process(
            &tool,
            status.to_string(),
            error_lines(&stderr).join("\n"),
        ));
    }
    let fatal = fatal_lines(&stderr);
    if !fatal.is_empty() {
        return Err(CapError::process(&tool, "fatal diagnostic", fatal.join("\n")));
    }
    let noise = error_lines(&stderr);
    if !noise.is_empty() {
        tracing::warn!(tool = %tool, stderr = %noise.join(" | "), "external tool reported diagnostics");
    }
    Ok(ToolOutput { stdout, stderr })
}

fn drain(mut pipe: impl Read + Send + 'static) -> std::thread::JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn tool_name(program: &Path) -> String {
    program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string())
}

/// Non-empty stderr lines that are not progress output.
pub fn error_lines(stderr: &str) -> Vec<&str> {
    stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.contains("frame="))
        .collect()
}

/// stderr lines carrying a fatal marker.
pub fn fatal_lines(stderr: &str) -> Vec<&str> {
    error_lines(stderr)
        .into_iter()
        .filter(|l| FATAL_MARKERS.iter().any(|m| l.contains(m)))
        .collect()
}

/// Stream metadata used to check that chunk videos can be joined.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoMeta {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    /// Seconds; 0 when the container does not report it.
    pub duration: f64,
}

/// Parse `ffprobe -of json` output for the first video stream.
pub fn parse_probe_json(bytes: &[u8]) -> anyhow::Result<VideoMeta> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        #[serde(default)]
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let parsed: ProbeOut = serde_json::from_slice(bytes).context("ffprobe json parse failed")?;
    let stream = parsed
        .streams
        .first()
        .context("no video stream found")?;
    let width = stream.width.context("missing video width")?;
    let height = stream.height.context("missing video height")?;
    let rate = stream
        .r_frame_rate
        .as_deref()
        .context("missing video r_frame_rate")?;
    let fps = Fps::parse_rational(rate).map_err(|e| anyhow::anyhow!("{e}"))?;
    let duration = stream
        .duration
        .as_deref()
        .or_else(|| parsed.format.as_ref().and_then(|f| f.duration.as_deref()))
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .unwrap_or(0.0);
    Ok(VideoMeta {
        width,
        height,
        fps,
        duration,
    })
}

/// Overlay a PNG sequence onto a slice of `video`, producing one chunk video.
#[derive(Clone, Debug)]
pub struct BurnIn<'a> {
    pub video: &'a Path,
    /// Slice start in the source video, seconds.
    pub start: f64,
    pub duration: f64,
    /// printf-style frame pattern, e.g. `dir/frame_%06d.png`.
    pub frames: &'a Path,
    pub fps: Fps,
    pub output: &'a Path,
}

impl BurnIn<'_> {
    pub fn args(&self) -> Vec<OsString> {
        let mut argv: Vec<OsString> = vec![
            "-ss".into(),
            format!("{:.3}", self.start).into(),
            "-t".into(),
            format!("{:.3}", self.duration).into(),
            "-i".into(),
            self.video.into(),
            "-framerate".into(),
            format!("{}/{}", self.fps.num, self.fps.den).into(),
            "-i".into(),
            self.frames.into(),
        ];
        argv.extend(
            [
                "-filter_complex",
                "[0:v][1:v]overlay=0:0:eof_action=pass[v]",
                "-map",
                "[v]",
                "-map",
                "0:a?",
                "-c:v",
                "libx264",
                "-preset",
                "fast",
                "-crf",
                "23",
                "-pix_fmt",
                "yuv420p",
                "-c:a",
                "aac",
            ]
            .into_iter()
            .map(OsString::from),
        );
        argv.push(self.output.into());
        argv
    }

    /// Run the overlay. A partial output file is removed on failure.
    pub fn run(&self, tools: &FfmpegTools) -> CapResult<()> {
        if !self.video.is_file() {
            return Err(CapError::missing_input(self.video));
        }
        ensure_parent_dir(self.output)?;
        let mut partial = TempFileGuard(Some(self.output.to_path_buf()));
        tools.ffmpeg(self.args())?;
        partial.0 = None;
        Ok(())
    }
}

pub(crate) fn ensure_parent_dir(path: &Path) -> CapResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Deletes the held path on drop unless cleared.
pub(crate) struct TempFileGuard(pub(crate) Option<PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/merge/ffmpeg.rs"]
mod tests;
