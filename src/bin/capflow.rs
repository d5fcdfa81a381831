use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use capflow::chunk::manager::ChunkSummary;
use capflow::foundation::core::FrameIndex;
use capflow::merge::merger::DEFAULT_FADE_SECS;
use capflow::render::text::FONTS_DIR_ENV;
use capflow::subtitle::write_subtitles;
use capflow::{
    CancelFlag, Canvas, CaptionJob, Category, FfmpegTools, FontLibrary, Fps, FrameRenderer,
    JobOpts, MergeOptions, StyleRegistry, SubtitleFormat, Transition, VideoMerger, run_job,
    split_into_chunks, validate_chunks,
};

#[derive(Parser, Debug)]
#[command(name = "capflow", version, about = "Animated caption rendering and chunked video assembly")]
struct Cli {
    /// Directory holding the caption fonts (overrides CAPFLOW_FONTS_DIR).
    #[arg(long, global = true)]
    fonts_dir: Option<PathBuf>,

    /// Do not load system fonts.
    #[arg(long, global = true)]
    no_system_fonts: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List built-in caption styles.
    Styles(StylesArgs),
    /// Render a job's caption overlay as a PNG sequence.
    Frames(FramesArgs),
    /// Export a job's words as SRT, WebVTT or ASS subtitles.
    Subtitles(SubtitlesArgs),
    /// Print the chunk plan for a job as JSON.
    Chunks(ChunksArgs),
    /// Join chunk videos into one file (requires `ffmpeg` and `ffprobe`).
    Merge(MergeArgs),
    /// Run a full job: render, burn in per chunk, merge (requires `ffmpeg` and `ffprobe`).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct StylesArgs {
    /// Only list styles of this category.
    #[arg(long)]
    category: Option<String>,

    /// Print full style definitions as JSON.
    #[arg(long)]
    json: bool,
}

/// Options shared by subcommands that read a job file.
#[derive(Parser, Debug)]
struct JobInput {
    /// Input job JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Override the job's style id.
    #[arg(long)]
    style: Option<String>,

    /// Override the job's duration in seconds.
    #[arg(long)]
    duration: Option<f64>,
}

impl JobInput {
    fn load(&self) -> anyhow::Result<CaptionJob> {
        let mut job = CaptionJob::load(&self.in_path)?;
        if let Some(style) = &self.style {
            job.style = style.clone();
        }
        if let Some(duration) = self.duration {
            job.duration = Some(duration);
        }
        Ok(job)
    }
}

#[derive(Parser, Debug)]
struct FramesArgs {
    #[command(flatten)]
    job: JobInput,

    /// Output directory for `frame_%06d.png`.
    #[arg(long)]
    out: PathBuf,

    /// Render only this frame.
    #[arg(long)]
    frame: Option<u64>,

    /// Canvas width override.
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height override.
    #[arg(long)]
    height: Option<u32>,

    /// Frame rate override, e.g. `30` or `30000/1001`.
    #[arg(long)]
    fps: Option<String>,

    /// Worker threads; defaults to one per core.
    #[arg(long)]
    threads: Option<usize>,

    /// Render on the calling thread.
    #[arg(long)]
    sequential: bool,
}

#[derive(Parser, Debug)]
struct SubtitlesArgs {
    #[command(flatten)]
    job: JobInput,

    /// Output subtitle path.
    #[arg(long)]
    out: PathBuf,

    /// srt, vtt or ass; inferred from the output extension when omitted.
    #[arg(long)]
    format: Option<SubtitleFormat>,
}

#[derive(Parser, Debug)]
struct ChunksArgs {
    #[command(flatten)]
    job: JobInput,

    /// Target chunk length in seconds.
    #[arg(long)]
    chunk_size: Option<f64>,
}

#[derive(Parser, Debug)]
struct MergeArgs {
    /// Chunk videos in playback order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output video path.
    #[arg(long)]
    out: PathBuf,

    /// cut (stream copy) or fade.
    #[arg(long, default_value = "cut")]
    transition: Transition,

    /// Cross-fade length in seconds.
    #[arg(long, default_value_t = DEFAULT_FADE_SECS)]
    fade: f64,

    /// Treat every input as this long when placing cross-fades.
    #[arg(long)]
    assumed_chunk_secs: Option<f64>,

    /// Merge even when inputs differ in size or frame rate.
    #[arg(long)]
    force: bool,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    job: JobInput,

    /// Output video path.
    #[arg(long)]
    out: PathBuf,

    /// Source video; overrides the job's `video`.
    #[arg(long)]
    video: Option<PathBuf>,

    /// Scratch directory for frames and chunk videos.
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Chunks processed at the same time.
    #[arg(long, default_value_t = 2)]
    parallel_chunks: usize,

    /// cut (stream copy) or fade.
    #[arg(long, default_value = "cut")]
    transition: Transition,

    /// Merge even when chunk videos differ in size or frame rate.
    #[arg(long)]
    force: bool,

    /// Keep frames and chunk videos in the work directory.
    #[arg(long)]
    keep: bool,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let fonts = FontsChoice {
        dir: cli.fonts_dir,
        system: !cli.no_system_fonts,
    };
    match cli.cmd {
        Command::Styles(args) => cmd_styles(args),
        Command::Frames(args) => cmd_frames(args, &fonts),
        Command::Subtitles(args) => cmd_subtitles(args),
        Command::Chunks(args) => cmd_chunks(args),
        Command::Merge(args) => cmd_merge(args),
        Command::Render(args) => cmd_render(args, &fonts),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("capflow=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

struct FontsChoice {
    dir: Option<PathBuf>,
    system: bool,
}

impl FontsChoice {
    fn load(&self) -> Arc<FontLibrary> {
        let dir = self
            .dir
            .clone()
            .or_else(|| std::env::var_os(FONTS_DIR_ENV).map(PathBuf::from));
        let fonts = FontLibrary::load(dir.as_deref(), self.system);
        if !fonts.has_faces() {
            tracing::warn!("no fonts available; captions will render without glyphs");
        }
        Arc::new(fonts)
    }
}

fn cmd_styles(args: StylesArgs) -> anyhow::Result<()> {
    let registry = StyleRegistry::builtin();
    let styles = match args.category.as_deref() {
        Some(name) => {
            let category = Category::parse(name).with_context(|| {
                let known: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
                format!("unknown category '{name}' (known: {})", known.join(", "))
            })?;
            registry.list_by_category(category)
        }
        None => registry.list(),
    };

    if args.json {
        let defs: Vec<&capflow::CaptionStyle> = styles.iter().map(|s| s.as_ref()).collect();
        println!("{}", serde_json::to_string_pretty(&defs)?);
        return Ok(());
    }
    for style in &styles {
        let aliases = registry.aliases_of(&style.id);
        print!("{:<12} {:<13} {}", style.id, style.category.as_str(), style.description);
        if !aliases.is_empty() {
            print!(" (aliases: {})", aliases.join(", "));
        }
        println!();
    }
    Ok(())
}

fn cmd_frames(args: FramesArgs, fonts: &FontsChoice) -> anyhow::Result<()> {
    let job = args.job.load()?;
    let style = job.resolve_style(&StyleRegistry::builtin());
    let mut opts = job.render_opts();
    opts.canvas = Canvas::new(
        args.width.unwrap_or(opts.canvas.width),
        args.height.unwrap_or(opts.canvas.height),
    );
    if let Some(fps) = &args.fps {
        opts.fps = Fps::parse_rational(fps)?;
    }
    opts.threads = args.threads;
    opts.parallel = !args.sequential;

    let words = job.prepared_words(&style);
    let renderer = FrameRenderer::new(style, &words, opts, fonts.load())?;

    if let Some(frame) = args.frame {
        let mut backend = renderer.new_backend()?;
        let rgba = renderer.render_frame(FrameIndex(frame), &mut backend)?.into_straight();
        std::fs::create_dir_all(&args.out)
            .with_context(|| format!("create output dir '{}'", args.out.display()))?;
        let path = renderer.frame_path(&args.out, FrameIndex(frame));
        image::save_buffer_with_format(
            &path,
            &rgba.data,
            rgba.width,
            rgba.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        eprintln!("wrote {}", path.display());
        return Ok(());
    }

    let summary = renderer.render_frames(job.total_duration(), &args.out, &CancelFlag::new())?;
    eprintln!(
        "wrote {} frames to {}",
        summary.frames,
        summary.pattern_path().display()
    );
    Ok(())
}

fn cmd_subtitles(args: SubtitlesArgs) -> anyhow::Result<()> {
    let job = args.job.load()?;
    let format = match args.format {
        Some(f) => f,
        None => SubtitleFormat::from_path(&args.out).with_context(|| {
            format!(
                "cannot infer subtitle format from '{}'; pass --format",
                args.out.display()
            )
        })?,
    };
    let style = job.resolve_style(&StyleRegistry::builtin());
    write_subtitles(&args.out, format, &job.words, &style, job.canvas)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_chunks(args: ChunksArgs) -> anyhow::Result<()> {
    let job = args.job.load()?;
    let chunk_size = args.chunk_size.unwrap_or(job.chunk_size);
    let chunks = split_into_chunks(&job.words, job.total_duration(), chunk_size)?;
    let issues: Vec<String> = validate_chunks(&chunks)
        .iter()
        .map(ToString::to_string)
        .collect();
    let out = serde_json::json!({
        "summary": ChunkSummary::of(&chunks),
        "chunks": chunks,
        "issues": issues,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_merge(args: MergeArgs) -> anyhow::Result<()> {
    let merger = VideoMerger::new(FfmpegTools::from_env());
    let opts = MergeOptions {
        transition: args.transition,
        fade_duration: args.fade,
        assumed_chunk_secs: args.assumed_chunk_secs,
        output_path: args.out.clone(),
        ..MergeOptions::default()
    };
    let (out, issues) = merger.merge_validated(&args.inputs, &opts, args.force)?;
    for issue in &issues {
        eprintln!("warning: {issue}");
    }
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs, fonts: &FontsChoice) -> anyhow::Result<()> {
    let mut job = args.job.load()?;
    if let Some(video) = args.video {
        job.video = Some(video);
    }
    let defaults = JobOpts::default();
    let opts = JobOpts {
        work_dir: args
            .work_dir
            .unwrap_or_else(|| default_work_dir(&args.out)),
        output: args.out.clone(),
        max_parallel_chunks: args.parallel_chunks,
        transition: args.transition,
        allow_mismatch: args.force,
        keep_intermediates: args.keep,
        ..defaults
    };
    let report = run_job(&job, &opts, fonts.load(), &CancelFlag::new())?;
    for issue in &report.chunk_issues {
        eprintln!("note: {issue}");
    }
    for issue in &report.merge_issues {
        eprintln!("warning: {issue}");
    }
    match report.output {
        Some(out) => eprintln!(
            "wrote {} ({} chunks, {:.2}s)",
            out.display(),
            report.summary.total_chunks,
            report.summary.total_duration
        ),
        None => eprintln!("nothing to render"),
    }
    Ok(())
}

fn default_work_dir(out: &Path) -> PathBuf {
    let stem = out
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "capflow".to_string());
    out.with_file_name(format!(".{stem}.work"))
}
