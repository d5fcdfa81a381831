use super::*;
use crate::foundation::core::Fps;

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("capflow_merger_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn meta(width: u32, height: u32, num: u32, den: u32) -> VideoMeta {
    VideoMeta {
        width,
        height,
        fps: Fps::new(num, den).unwrap(),
        duration: 8.0,
    }
}

#[test]
fn fade_offsets_follow_real_durations() {
    let offsets = fade_offsets(&[8.0, 7.5, 6.0], 0.5);
    assert_eq!(offsets, vec![7.5, 14.5]);
    assert!(fade_offsets(&[8.0], 0.5).is_empty());
    assert!(fade_offsets(&[], 0.5).is_empty());
}

#[test]
fn uniform_offsets_use_index_times_chunk() {
    assert_eq!(uniform_fade_offsets(3, 8.0, 0.5), vec![7.5, 15.5]);
}

#[test]
fn xfade_chain_ends_in_v_label() {
    assert_eq!(
        xfade_filter(&[7.5], 0.5),
        "[0:v][1:v]xfade=transition=fade:duration=0.500:offset=7.500[v]"
    );
    let chain = xfade_filter(&[7.5, 15.0], 0.5);
    let parts: Vec<&str> = chain.split(';').collect();
    assert_eq!(parts.len(), 2);
    assert!(parts[0].starts_with("[0:v][1:v]") && parts[0].ends_with("[v1]"));
    assert!(parts[1].starts_with("[v1][2:v]") && parts[1].ends_with("[v]"));
}

#[test]
fn manifest_lists_absolute_escaped_paths() {
    let text = concat_manifest(&[PathBuf::from("/tmp/a.mp4"), PathBuf::from("/tmp/it's.mp4")]);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "file '/tmp/a.mp4'");
    assert_eq!(lines[1], r"file '/tmp/it'\''s.mp4'");
}

#[test]
fn metadata_comparison_flags_width_mismatch() {
    let issues = compare_metadata(&[meta(1080, 1920, 30, 1), meta(720, 1920, 30, 1)]);
    assert_eq!(
        issues,
        vec![MergeIssue::WidthMismatch {
            index: 1,
            expected: 1080,
            actual: 720
        }]
    );
    assert_eq!(issues[0].to_string(), "chunk 1 width mismatch: 720 vs 1080");
}

#[test]
fn fps_within_tolerance_is_accepted() {
    assert!(compare_metadata(&[meta(640, 360, 30, 1), meta(640, 360, 30000, 1001)]).is_empty());
    let issues = compare_metadata(&[meta(640, 360, 30, 1), meta(640, 360, 25, 1)]);
    assert!(matches!(issues[..], [MergeIssue::FpsMismatch { index: 1, .. }]));
    assert!(compare_metadata(&[]).is_empty());
}

#[test]
fn transition_parses_aliases() {
    assert_eq!("simple".parse::<Transition>(), Ok(Transition::Cut));
    assert_eq!("Fade".parse::<Transition>(), Ok(Transition::Fade));
    assert!("wipe".parse::<Transition>().is_err());
}

#[test]
fn single_input_is_copied_byte_for_byte() {
    let dir = scratch("single");
    let input = dir.join("chunk_0000.mp4");
    std::fs::write(&input, b"\x00\x00\x00\x18ftypmp42 not really a video").unwrap();
    let opts = MergeOptions {
        output_path: dir.join("out/final.mp4"),
        ..MergeOptions::default()
    };
    let out = VideoMerger::default()
        .concatenate(std::slice::from_ref(&input), &opts)
        .unwrap();
    assert_eq!(std::fs::read(&out).unwrap(), std::fs::read(&input).unwrap());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn single_input_merged_onto_itself_is_left_intact() {
    let dir = scratch("self_copy");
    let input = dir.join("a.mp4");
    std::fs::write(&input, b"0123456789").unwrap();
    let opts = MergeOptions {
        output_path: dir.join(".").join("a.mp4"),
        ..MergeOptions::default()
    };
    let out = VideoMerger::default()
        .concatenate(std::slice::from_ref(&input), &opts)
        .unwrap();
    assert_eq!(out, opts.output_path);
    assert_eq!(std::fs::read(&input).unwrap(), b"0123456789");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_input_aborts_before_running_anything() {
    let dir = scratch("missing");
    let present = dir.join("a.mp4");
    std::fs::write(&present, b"x").unwrap();
    let absent = dir.join("b.mp4");
    let opts = MergeOptions {
        output_path: dir.join("out.mp4"),
        ..MergeOptions::default()
    };
    let err = VideoMerger::default()
        .concatenate(&[present, absent.clone()], &opts)
        .unwrap_err();
    match err {
        CapError::MissingInput { path } => assert_eq!(path, absent),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!dir.join("out.mp4").exists());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn empty_input_list_is_rejected() {
    let merger = VideoMerger::default();
    assert!(merger.concatenate(&[], &MergeOptions::default()).is_err());
    assert_eq!(merger.validate_chunk_videos(&[]), vec![MergeIssue::NoInputs]);
}

#[test]
fn unprobeable_inputs_block_unacknowledged_merge() {
    let dir = scratch("validated");
    let paths = vec![dir.join("a.mp4"), dir.join("b.mp4")];
    let opts = MergeOptions {
        output_path: dir.join("out.mp4"),
        ..MergeOptions::default()
    };
    let merger = VideoMerger::default();
    let issues = merger.validate_chunk_videos(&paths);
    assert_eq!(issues.len(), 2);
    assert!(matches!(issues[0], MergeIssue::Probe { index: 0, .. }));

    let err = merger.merge_validated(&paths, &opts, false).unwrap_err();
    assert!(matches!(err, CapError::Validation(_)));
    assert!(!dir.join("out.mp4").exists());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn cleanup_counts_removed_files() {
    let dir = scratch("cleanup");
    let a = dir.join("chunk_0000.mp4");
    let b = dir.join("chunk_0001.mp4");
    std::fs::write(&a, b"x").unwrap();
    std::fs::write(&b, b"x").unwrap();
    assert_eq!(cleanup_chunks(&[a.clone(), b, dir.join("gone.mp4")]), 2);
    assert!(!a.exists());
    let _ = std::fs::remove_dir_all(&dir);
}
