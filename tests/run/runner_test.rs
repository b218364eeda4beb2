//! Tests for the process runner against real child processes.

#![cfg(unix)]

use std::sync::Arc;
use std::time::Duration;

use ci_action::log::{ClassifiedLine, MemorySink};
use ci_action::run::{DetectionMode, ProcessRunner, Severity};

fn sh(script: &str) -> Vec<String> {
    vec!["sh".to_string(), "-c".to_string(), script.to_string()]
}

fn runner() -> (ProcessRunner, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    (ProcessRunner::new(sink.clone()), sink)
}

/// Lines emitted by the child, without the leading "Running command" line.
fn output(sink: &MemorySink) -> Vec<ClassifiedLine> {
    sink.lines()
        .into_iter()
        .filter(|line| !line.text.starts_with("Running command: "))
        .collect()
}

#[tokio::test]
async fn logs_command_before_running() {
    let (runner, sink) = runner();
    let code = runner.run(&sh("true"), DetectionMode::ContentHeuristic).await;

    assert_eq!(code, 0);
    assert_eq!(
        sink.lines(),
        vec![ClassifiedLine::new(Severity::Info, "Running command: sh -c true")]
    );
}

#[tokio::test]
async fn exit_code_passes_through() {
    let (runner, _sink) = runner();
    assert_eq!(runner.run(&sh("exit 3"), DetectionMode::ContentHeuristic).await, 3);
    assert_eq!(runner.run(&sh("exit 0"), DetectionMode::NinjaProgress).await, 0);
}

#[tokio::test]
async fn missing_executable_reports_one_error() {
    let (runner, sink) = runner();
    let command = vec!["ci-action-definitely-missing-binary".to_string()];
    let code = runner.run(&command, DetectionMode::ContentHeuristic).await;

    assert_eq!(code, 1);
    let errors = sink.at(Severity::Error);
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].text,
        "Command not found: ci-action-definitely-missing-binary. Make sure it's installed and in PATH."
    );
}

#[tokio::test]
async fn empty_command_reports_one_error() {
    let (runner, sink) = runner();
    let code = runner.run(&[], DetectionMode::ContentHeuristic).await;

    assert_eq!(code, 1);
    assert_eq!(
        sink.lines(),
        vec![ClassifiedLine::new(Severity::Error, "Cannot run an empty command")]
    );
    assert_eq!(runner.run_line("   ", DetectionMode::ColorMarker).await, 1);
}

#[tokio::test]
async fn killed_child_is_a_failure() {
    let (runner, sink) = runner();
    let code = runner.run(&sh("kill -9 $$"), DetectionMode::ContentHeuristic).await;

    assert_eq!(code, 1);
    let errors = sink.at(Severity::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].text.contains("terminated without an exit code"));
}

#[tokio::test]
async fn content_heuristic_classifies_stdout() {
    let (runner, sink) = runner();
    let script = "echo 'Configuring done'; echo 'Warning: deprecated API'; \
                  echo 'FATAL: crash'; echo '0 tests failed out of 4'";
    runner.run(&sh(script), DetectionMode::ContentHeuristic).await;

    let severities: Vec<_> = output(&sink).iter().map(|l| l.severity).collect();
    assert_eq!(
        severities,
        vec![
            Severity::Info,
            Severity::Warning,
            Severity::Error,
            Severity::Info
        ]
    );
}

#[tokio::test]
async fn stderr_is_floored_at_warning() {
    let (runner, sink) = runner();
    runner
        .run(
            &sh("echo 'just a note' >&2; echo 'an error occurred' >&2"),
            DetectionMode::ContentHeuristic,
        )
        .await;

    assert_eq!(
        output(&sink),
        vec![
            ClassifiedLine::new(Severity::Warning, "just a note"),
            ClassifiedLine::new(Severity::Error, "an error occurred"),
        ]
    );
}

#[tokio::test]
async fn empty_lines_are_skipped() {
    let (runner, sink) = runner();
    runner
        .run(&sh("printf 'a\\n\\n\\r\\nb\\n'"), DetectionMode::ContentHeuristic)
        .await;

    let texts: Vec<_> = output(&sink).into_iter().map(|l| l.text).collect();
    assert_eq!(texts, vec!["a", "b"]);
}

#[tokio::test]
async fn ninja_mode_flags_unprefixed_lines() {
    let (runner, sink) = runner();
    let script = "echo '[1/2] Building CXX object foo.o'; \
                  echo 'foo.cpp:10:5: expected semicolon'; \
                  echo '[2/2] Linking CXX executable app'";
    runner.run(&sh(script), DetectionMode::NinjaProgress).await;

    let severities: Vec<_> = output(&sink).iter().map(|l| l.severity).collect();
    assert_eq!(
        severities,
        vec![Severity::Info, Severity::Error, Severity::Info]
    );
}

#[tokio::test]
async fn color_marker_tracks_blocks_and_strips_codes() {
    let (runner, sink) = runner();
    let script = "printf '\\033[31merror here\\nstill red context\\n\\033[0mback to normal\\nplain line\\n'";
    runner.run(&sh(script), DetectionMode::ColorMarker).await;

    assert_eq!(
        output(&sink),
        vec![
            ClassifiedLine::new(Severity::Error, "error here"),
            ClassifiedLine::new(Severity::Error, "still red context"),
            ClassifiedLine::new(Severity::Error, "back to normal"),
            ClassifiedLine::new(Severity::Info, "plain line"),
        ]
    );
}

#[tokio::test]
async fn other_modes_keep_escape_codes() {
    let (runner, sink) = runner();
    runner
        .run(&sh("printf '\\033[32mok\\033[0m\\n'"), DetectionMode::ContentHeuristic)
        .await;

    assert_eq!(output(&sink)[0].text, "\x1b[32mok\x1b[0m");
}

#[tokio::test]
async fn color_marker_forces_color_env() {
    let sink = Arc::new(MemorySink::new());
    let runner = ProcessRunner::new(sink.clone()).color_env("CI_ACTION_TEST_FORCE_COLOR");
    let script = "echo \"color=${CI_ACTION_TEST_FORCE_COLOR:-unset}\"";

    runner.run(&sh(script), DetectionMode::ColorMarker).await;
    runner.run(&sh(script), DetectionMode::ContentHeuristic).await;

    let texts: Vec<_> = output(&sink).into_iter().map(|l| l.text).collect();
    assert_eq!(texts, vec!["color=1", "color=unset"]);
}

#[tokio::test]
async fn runs_in_working_dir() {
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(MemorySink::new());
    let runner = ProcessRunner::new(sink.clone()).working_dir(dir.path());

    runner.run(&sh("pwd -P"), DetectionMode::ContentHeuristic).await;

    let expected = std::fs::canonicalize(dir.path()).unwrap();
    assert_eq!(output(&sink)[0].text, expected.display().to_string());
}

#[tokio::test]
async fn run_line_tokenizes_on_whitespace() {
    let (runner, sink) = runner();
    let code = runner
        .run_line("echo  hello   world", DetectionMode::ContentHeuristic)
        .await;

    assert_eq!(code, 0);
    assert_eq!(sink.texts()[0], "Running command: echo hello world");
    assert_eq!(output(&sink)[0].text, "hello world");
}

#[tokio::test]
async fn drains_large_interleaved_output_without_deadlock() {
    let (runner, sink) = runner();
    let script = "i=0; while [ $i -lt 10000 ]; do echo \"out $i\"; echo \"err $i\" >&2; i=$((i+1)); done; exit 5";

    let code = tokio::time::timeout(
        Duration::from_secs(120),
        runner.run(&sh(script), DetectionMode::ContentHeuristic),
    )
    .await
    .expect("runner deadlocked");

    assert_eq!(code, 5);
    let lines = output(&sink);
    assert_eq!(lines.len(), 20_000);

    let stdout: Vec<_> = lines
        .iter()
        .filter(|l| l.text.starts_with("out "))
        .map(|l| l.text.clone())
        .collect();
    let stderr: Vec<_> = lines
        .iter()
        .filter(|l| l.text.starts_with("err "))
        .collect();
    assert_eq!(stdout.len(), 10_000);
    assert_eq!(stderr.len(), 10_000);
    assert!(stderr.iter().all(|l| l.severity == Severity::Warning));

    let expected: Vec<_> = (0..10_000).map(|i| format!("out {i}")).collect();
    assert_eq!(stdout, expected);
    let stderr_texts: Vec<_> = stderr.iter().map(|l| l.text.clone()).collect();
    let expected: Vec<_> = (0..10_000).map(|i| format!("err {i}")).collect();
    assert_eq!(stderr_texts, expected);
}

#[tokio::test]
async fn concurrent_color_marker_runs_do_not_share_state() {
    let (runner_a, sink_a) = runner();
    let (runner_b, sink_b) = runner();
    let script_a = "printf '\\033[31mfailure\\n'; sleep 0.2; echo after";
    let script_b = "sleep 0.1; echo one; sleep 0.2; echo two";

    let command_a = sh(script_a);
    let command_b = sh(script_b);

    let (code_a, code_b) = tokio::join!(
        runner_a.run(&command_a, DetectionMode::ColorMarker),
        runner_b.run(&command_b, DetectionMode::ColorMarker),
    );

    assert_eq!((code_a, code_b), (0, 0));
    assert_eq!(
        output(&sink_a),
        vec![
            ClassifiedLine::new(Severity::Error, "failure"),
            ClassifiedLine::new(Severity::Error, "after"),
        ]
    );
    assert_eq!(
        output(&sink_b),
        vec![
            ClassifiedLine::new(Severity::Info, "one"),
            ClassifiedLine::new(Severity::Info, "two"),
        ]
    );
}
