//! Integration tests for headless mode.

use super::common::run_headless;
use crate::fake_monk::FakeMonk;
use tempfile::TempDir;

fn workdir() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}

#[test]
fn test_server_selection_lists_servers() {
    let dir = workdir();
    let monk = FakeMonk::vault();
    let (code, stdout, _) = run_headless(
        dir.path(),
        &[
            "--monk",
            monk.path_str(),
            "--screen",
            "server",
            "--events",
            "assert:contains:prod,assert:state:screen=server_selection",
        ],
    );

    assert_eq!(code, 0, "stdout:\n{stdout}");
    assert!(stdout.contains("Assertions: 2 passed, 0 failed"));
    assert!(stdout.contains("Found 2 vault facility servers"));
}

#[test]
fn test_failed_assertion_exits_with_one() {
    let dir = workdir();
    let monk = FakeMonk::vault();
    let (code, stdout, _) = run_headless(
        dir.path(),
        &[
            "--monk",
            monk.path_str(),
            "--screen",
            "server",
            "--events",
            "assert:contains:no such vault",
            "--output",
            "json",
        ],
    );

    assert_eq!(code, 1, "Should exit with code 1 on assertion failure");
    assert!(stdout.contains(r#""passed": 0"#));
    assert!(stdout.contains(r#""failed": 1"#));
}

#[test]
fn test_overseer_mode_reads_identity_from_monk() {
    let dir = workdir();
    let monk = FakeMonk::vault();
    let (code, stdout, _) = run_headless(
        dir.path(),
        &[
            "--monk",
            monk.path_str(),
            "--events",
            "assert:state:screen=overseer,assert:state:tenant=vault-101,assert:state:authenticated=true",
        ],
    );

    assert_eq!(code, 0, "stdout:\n{stdout}");
    assert!(stdout.contains("OVERSEER"));
}

#[test]
fn test_registry_falls_back_to_demo_data() {
    let dir = workdir();
    let (code, stdout, _) = run_headless(
        dir.path(),
        &[
            "--monk",
            "/nonexistent/vault-tec/monk",
            "--screen",
            "registry",
            "--events",
            "assert:state:status_level=Warning",
            "--output",
            "json",
        ],
    );

    assert_eq!(code, 0, "stdout:\n{stdout}");
    assert!(stdout.contains("Using demo data - monk CLI not available"));
}

#[test]
fn test_quit_confirmation_stops_the_app() {
    let dir = workdir();
    let monk = FakeMonk::vault();
    let (code, stdout, _) = run_headless(
        dir.path(),
        &[
            "--monk",
            monk.path_str(),
            "--screen",
            "server",
            "--events",
            "key:q,assert:state:screen=quit_confirmation,key:y",
            "--output",
            "json",
        ],
    );

    assert_eq!(code, 0, "stdout:\n{stdout}");
    assert!(stdout.contains(r#""running": false"#));
    assert!(stdout.contains(r#""events_executed": 3"#));
}

#[test]
fn test_frames_output() {
    let dir = workdir();
    let monk = FakeMonk::vault();
    let (code, stdout, _) = run_headless(
        dir.path(),
        &[
            "--monk",
            monk.path_str(),
            "--screen",
            "server",
            "--events",
            "key:down,key:up",
            "--output",
            "frames",
        ],
    );

    assert_eq!(code, 0);
    assert!(stdout.contains("=== FRAME 0 (initial) ==="));
    assert!(stdout.contains("=== FRAME 2 (key:up) ==="));
    assert!(stdout.contains("Total: 3 frames"));
}

#[test]
fn test_output_file() {
    let dir = workdir();
    let monk = FakeMonk::vault();
    let output_path = dir.path().join("screen.txt");
    let (code, stdout, _) = run_headless(
        dir.path(),
        &[
            "--monk",
            monk.path_str(),
            "--screen",
            "server",
            "--events",
            "wait:10ms",
            "--output-file",
            output_path.to_str().unwrap(),
        ],
    );

    assert_eq!(code, 0);
    assert!(stdout.is_empty());
    let written = std::fs::read_to_string(&output_path).unwrap();
    assert!(written.contains("Events: 1 executed"));
}

#[test]
fn test_invalid_event_is_a_configuration_error() {
    let dir = workdir();
    let (code, _, stderr) = run_headless(dir.path(), &["--events", "key:hyper+x"]);

    assert_eq!(code, 1);
    assert!(stderr.contains("Configuration Error"), "stderr:\n{stderr}");
}

#[test]
fn test_headless_requires_events() {
    let dir = workdir();
    let (code, _, stderr) = run_headless(dir.path(), &["--size", "80x24"]);

    assert_eq!(code, 1);
    assert!(stderr.contains("--headless requires --events or --script"));
}

#[test]
fn test_invalid_size_is_rejected() {
    let dir = workdir();
    let (code, _, stderr) = run_headless(dir.path(), &["--size", "wide", "--events", "key:esc"]);

    assert_eq!(code, 1);
    assert!(stderr.contains("Configuration Error"), "stderr:\n{stderr}");
}
