#![cfg(unix)]

use std::path::Path;
use std::time::{Duration, Instant};

use roundtrip_core::process::{run_command, run_ok, ProcessError};

const TIMEOUT: Duration = Duration::from_secs(10);

#[test]
fn captures_stdout_stderr_and_exit_code() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = run_command(
        Path::new("sh"),
        &["-c", "echo out-line; echo err-line >&2; exit 3"],
        tmp.path(),
        TIMEOUT,
    )
    .expect("run");

    assert_eq!(out.exit_code, 3);
    assert!(!out.success());
    assert_eq!(out.stdout_text(), "out-line");
    assert_eq!(out.stderr_text(), "err-line");
}

#[test]
fn runs_in_the_requested_working_directory() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = run_command(Path::new("pwd"), &[] as &[&str], tmp.path(), TIMEOUT).expect("run");
    let reported = Path::new(out.stdout_text().as_str()).canonicalize().expect("canon");
    assert_eq!(reported, tmp.path().canonicalize().expect("canon tmp"));
}

#[test]
fn run_ok_maps_exit_status_to_bool() {
    let tmp = tempfile::tempdir().expect("tempdir");
    assert!(run_ok(Path::new("true"), &[] as &[&str], tmp.path(), TIMEOUT).expect("true"));
    assert!(!run_ok(Path::new("false"), &[] as &[&str], tmp.path(), TIMEOUT).expect("false"));
}

#[test]
fn missing_program_is_a_spawn_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let err = run_command(
        Path::new("/nonexistent/no-such-tool"),
        &[] as &[&str],
        tmp.path(),
        TIMEOUT,
    )
    .expect_err("should fail to spawn");
    assert!(matches!(err, ProcessError::Spawn { .. }), "got: {err}");
}

/// A child that outlives the timeout must be killed, and the caller must see
/// a timeout error rather than hanging for the child's full runtime.
#[test]
fn timeout_kills_the_child() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let start = Instant::now();
    let err = run_command(
        Path::new("sh"),
        &["-c", "sleep 30"],
        tmp.path(),
        Duration::from_millis(200),
    )
    .expect_err("should time out");

    assert!(matches!(err, ProcessError::TimedOut { .. }), "got: {err}");
    assert!(start.elapsed() < Duration::from_secs(10), "was not killed promptly");
}
