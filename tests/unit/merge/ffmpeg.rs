use super::*;

#[test]
fn progress_lines_are_not_errors() {
    let stderr = "frame=  120 fps= 60 q=28.0 size=  256kB\n\n  [libx264 @ 0x1] using cpu capabilities\nframe=  240 fps= 61\n";
    assert_eq!(error_lines(stderr), vec!["[libx264 @ 0x1] using cpu capabilities"]);
    assert!(fatal_lines(stderr).is_empty());
}

#[test]
fn fatal_markers_are_detected() {
    let stderr = "frame=  1\nin.mp4: No such file or directory\nConversion failed!\n";
    let fatal = fatal_lines(stderr);
    assert_eq!(fatal.len(), 2);
    assert!(fatal[1].starts_with("Conversion failed"));
}

#[test]
fn probe_json_parses_rational_rate() {
    let json = br#"{
        "streams": [{"width": 1080, "height": 1920, "r_frame_rate": "30000/1001", "duration": "8.008000"}],
        "format": {"duration": "8.100000"}
    }"#;
    let meta = parse_probe_json(json).unwrap();
    assert_eq!((meta.width, meta.height), (1080, 1920));
    assert_eq!((meta.fps.num, meta.fps.den), (30000, 1001));
    assert!((meta.duration - 8.008).abs() < 1e-9);
}

#[test]
fn probe_duration_falls_back_to_format() {
    let json = br#"{"streams": [{"width": 640, "height": 360, "r_frame_rate": "25/1"}],
        "format": {"duration": "3.5"}}"#;
    assert_eq!(parse_probe_json(json).unwrap().duration, 3.5);

    let bare = br#"{"streams": [{"width": 640, "height": 360, "r_frame_rate": "25/1"}]}"#;
    assert_eq!(parse_probe_json(bare).unwrap().duration, 0.0);
}

#[test]
fn probe_json_without_dimensions_is_an_error() {
    let json = br#"{"streams": [{"height": 360, "r_frame_rate": "25/1"}]}"#;
    let err = parse_probe_json(json).unwrap_err();
    assert!(err.to_string().contains("width"));
    assert!(parse_probe_json(br#"{"streams": []}"#).is_err());
    assert!(parse_probe_json(b"not json").is_err());
}

#[test]
fn burn_in_args_overlay_the_frame_sequence() {
    let burn = BurnIn {
        video: Path::new("in.mp4"),
        start: 8.0,
        duration: 7.5,
        frames: Path::new("frames/frame_%06d.png"),
        fps: Fps::new(30, 1).unwrap(),
        output: Path::new("out/chunk_0001.mp4"),
    };
    let args: Vec<String> = burn
        .args()
        .iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    assert_eq!(&args[..4], ["-ss", "8.000", "-t", "7.500"]);
    let pattern = args.iter().position(|a| a == "frames/frame_%06d.png").unwrap();
    assert_eq!(args[pattern - 1], "-i");
    assert_eq!(args[pattern - 2], "30/1");
    assert!(args.iter().any(|a| a.contains("overlay=0:0")));
    assert!(args.iter().any(|a| a == "0:a?"));
    assert_eq!(args.last().map(String::as_str), Some("out/chunk_0001.mp4"));
}

#[test]
fn probing_a_missing_file_reports_missing_input() {
    let tools = FfmpegTools::from_env();
    let err = tools
        .probe_video(Path::new("definitely/not/here.mp4"))
        .unwrap_err();
    assert!(matches!(err, CapError::MissingInput { .. }));
}

#[test]
fn unknown_program_is_a_process_error() {
    let err = run_tool(
        Path::new("capflow-no-such-tool"),
        &[OsString::from("-version")],
        Duration::from_secs(5),
    )
    .unwrap_err();
    match err {
        CapError::Process { tool, status, .. } => {
            assert_eq!(tool, "capflow-no-such-tool");
            assert_eq!(status, "spawn failed");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn temp_file_guard_removes_unless_cleared() {
    let dir = std::env::temp_dir().join(format!("capflow_guard_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let doomed = dir.join("partial.mp4");
    let kept = dir.join("done.mp4");
    std::fs::write(&doomed, b"x").unwrap();
    std::fs::write(&kept, b"x").unwrap();
    drop(TempFileGuard(Some(doomed.clone())));
    let mut guard = TempFileGuard(Some(kept.clone()));
    guard.0 = None;
    drop(guard);
    assert!(!doomed.exists());
    assert!(kept.is_file());
    let _ = std::fs::remove_dir_all(&dir);
}
