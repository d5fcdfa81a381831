use super::*;

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("capflow_job_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn fonts() -> Arc<FontLibrary> {
    Arc::new(FontLibrary::empty())
}

#[test]
fn json_fills_defaults() {
    let job = CaptionJob::from_json(
        r#"{"words": [{"text": "Hi", "start": 0.0, "end": 0.5},
                      {"text": "there.", "start": 0.5, "end": 1.2}]}"#,
    )
    .unwrap();
    assert_eq!(job.style, "minimal");
    assert_eq!(job.canvas, Canvas::default());
    assert_eq!(job.fps, Fps::default());
    assert_eq!(job.chunk_size, DEFAULT_CHUNK_SECS);
    assert!(job.video.is_none());
    assert_eq!(job.total_duration(), 1.2);
}

#[test]
fn explicit_fields_override_defaults() {
    let job = CaptionJob::from_json(
        r#"{"style": "beasty", "duration": 20.0, "canvas": {"width": 720, "height": 1280},
            "fps": {"num": 25, "den": 1}, "chunk_size": 6.0, "video": "in.mp4"}"#,
    )
    .unwrap();
    assert_eq!(job.total_duration(), 20.0);
    assert_eq!(job.resolve_style(&StyleRegistry::builtin()).id, "mrbeast");
    let opts = job.render_opts();
    assert_eq!(opts.canvas, Canvas::new(720, 1280));
    assert_eq!(opts.fps, Fps::new(25, 1).unwrap());
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = CaptionJob::from_json("{\"words\": 3}").unwrap_err();
    assert!(matches!(err, CapError::Serde(_)));
}

#[test]
fn keywords_are_detected_only_for_emphasis_styles() {
    let job = CaptionJob {
        words: vec![
            WordTiming::new("make", 0.0, 0.3),
            WordTiming::new("money", 0.3, 0.7),
            WordTiming::new("today", 0.7, 1.0),
        ],
        ..CaptionJob::default()
    };
    let registry = StyleRegistry::builtin();
    let emphasized = job.prepared_words(&registry.get("mrbeast"));
    assert!(emphasized.iter().any(|w| w.is_keyword));
    let plain = job.prepared_words(&registry.get("minimal"));
    assert!(plain.iter().all(|w| !w.is_keyword));
}

#[test]
fn caller_keyword_flags_are_kept() {
    let mut flagged = WordTiming::new("hello", 0.0, 0.5);
    flagged.is_keyword = true;
    let job = CaptionJob {
        words: vec![flagged, WordTiming::new("money", 0.5, 1.0)],
        ..CaptionJob::default()
    };
    let words = job.prepared_words(&StyleRegistry::builtin().get("mrbeast"));
    assert!(words[0].is_keyword);
    assert!(!words[1].is_keyword);
}

#[test]
fn job_without_video_is_rejected() {
    let job = CaptionJob {
        words: vec![WordTiming::new("hi", 0.0, 0.5)],
        ..CaptionJob::default()
    };
    let err = run_job(&job, &JobOpts::default(), fonts(), &CancelFlag::new()).unwrap_err();
    assert!(matches!(err, CapError::Validation(_)));
}

#[test]
fn missing_video_is_reported() {
    let dir = scratch("missing");
    let job = CaptionJob {
        words: vec![WordTiming::new("hi", 0.0, 0.5)],
        video: Some(dir.join("absent.mp4")),
        ..CaptionJob::default()
    };
    let err = run_job(&job, &JobOpts::default(), fonts(), &CancelFlag::new()).unwrap_err();
    assert!(matches!(err, CapError::MissingInput { .. }));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn empty_clip_produces_nothing() {
    let dir = scratch("empty");
    let video = dir.join("in.mp4");
    std::fs::write(&video, b"x").unwrap();
    let job = CaptionJob {
        video: Some(video),
        ..CaptionJob::default()
    };
    let opts = JobOpts {
        work_dir: dir.join("work"),
        output: dir.join("out.mp4"),
        ..JobOpts::default()
    };
    let report = run_job(&job, &opts, fonts(), &CancelFlag::new()).unwrap();
    assert!(report.output.is_none());
    assert_eq!(report.summary.total_chunks, 1);
    assert!(!dir.join("out.mp4").exists());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn cancelled_job_leaves_no_chunk_videos() {
    let dir = scratch("cancel");
    let video = dir.join("in.mp4");
    std::fs::write(&video, b"x").unwrap();
    let job = CaptionJob {
        words: vec![WordTiming::new("hi", 0.0, 0.5)],
        duration: Some(20.0),
        video: Some(video),
        ..CaptionJob::default()
    };
    let opts = JobOpts {
        work_dir: dir.join("work"),
        output: dir.join("out.mp4"),
        ..JobOpts::default()
    };
    let cancel = CancelFlag::new();
    cancel.cancel();
    let err = run_job(&job, &opts, fonts(), &cancel).unwrap_err();
    assert!(err.is_cancelled());
    for i in 0..3 {
        assert!(!chunk_video_path(&opts.work_dir, i).exists());
        assert!(!chunk_frames_dir(&opts.work_dir, i).exists());
    }
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn zero_parallelism_is_rejected() {
    let opts = JobOpts {
        max_parallel_chunks: 0,
        ..JobOpts::default()
    };
    let err = run_job(&CaptionJob::default(), &opts, fonts(), &CancelFlag::new()).unwrap_err();
    assert!(matches!(err, CapError::Validation(_)));
}
