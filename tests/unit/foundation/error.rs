use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CapError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(CapError::render("x").to_string().contains("render error:"));
    assert!(
        CapError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert_eq!(CapError::Cancelled.to_string(), "cancelled");
}

#[test]
fn missing_input_names_the_path() {
    let err = CapError::missing_input("chunks/chunk_0003.mp4");
    let msg = err.to_string();
    assert!(msg.starts_with("missing input:"));
    assert!(msg.contains("chunk_0003.mp4"));
}

#[test]
fn process_error_carries_tool_status_and_stderr() {
    let err = CapError::process("ffmpeg", "exit status: 1", "No such file or directory");
    let msg = err.to_string();
    assert!(msg.contains("ffmpeg"));
    assert!(msg.contains("exit status: 1"));
    assert!(msg.contains("No such file"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CapError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert!(!err.is_cancelled());
    assert!(CapError::Cancelled.is_cancelled());
}
