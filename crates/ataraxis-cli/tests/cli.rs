use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

const HEADER_WIDTH: usize = 37;

fn ataraxis() -> assert_cmd::Command {
    cargo_bin_cmd!("ataraxis")
}

fn stdout_of(args: &[&str]) -> String {
    let output = ataraxis().args(args).output().unwrap();
    assert!(output.status.success(), "{args:?}: {output:?}");
    String::from_utf8(output.stdout).unwrap()
}

// ── echo ──────────────────────────────────────────────────────────────────────

#[test]
fn echo_info_goes_to_stdout_with_header() {
    ataraxis()
        .args(["echo", "hello there"])
        .assert()
        .success()
        .stdout(predicate::str::contains("| INFO     | hello there"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn echo_routes_every_level() {
    for level in ["debug", "info", "success", "warning"] {
        let message = format!("Test {level} message");
        ataraxis()
            .args(["--debug", "echo", &message, "--level", level])
            .assert()
            .success()
            .stdout(predicate::str::contains(message.as_str()))
            .stderr(predicate::str::is_empty());
    }
    for level in ["error", "critical"] {
        let message = format!("Test {level} message");
        ataraxis()
            .args(["echo", &message, "--level", level])
            .assert()
            .success()
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains(message.as_str()));
    }
}

#[test]
fn echo_unknown_level_fails() {
    ataraxis()
        .args(["echo", "Test message", "--level", "INVALID_LEVEL"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unable to echo the requested message"));
}

#[test]
fn echo_raw_has_no_header() {
    let stdout = stdout_of(&["echo", "Raw info line", "--raw"]);
    assert_eq!(stdout, "Raw info line\n");

    ataraxis()
        .args(["echo", "Raw error line", "--raw", "--level", "error"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr("Raw error line\n");
}

#[test]
fn quiet_echo_prints_nothing() {
    ataraxis()
        .args(["--quiet", "echo", "Should not appear"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

#[test]
fn plain_backend_prints_message_only() {
    let stdout = stdout_of(&["--backend", "plain", "echo", "Click message"]);
    assert_eq!(stdout, "Click message\n");
}

#[test]
fn long_echo_is_wrapped() {
    let message = "This is a very long message ".repeat(20);
    let stdout = stdout_of(&["--line-width", "80", "echo", &message]);
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines.len() > 1);
    assert!(lines.iter().all(|l| l.len() <= 80));
    for line in &lines[1..] {
        assert!(line.starts_with(&" ".repeat(HEADER_WIDTH)));
    }
}

// ── error ─────────────────────────────────────────────────────────────────────

#[test]
fn error_logs_and_exits_nonzero() {
    let tmp = tempfile::tempdir().unwrap();
    let log_dir = tmp.path().join("logs");
    ataraxis()
        .args(["--log-dir", log_dir.to_str().unwrap(), "error", "Test error"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("| ERROR    | Test error"));

    let logged = std::fs::read_to_string(log_dir.join("error.log")).unwrap();
    assert!(logged.contains("Test error"));
}

#[test]
fn error_no_raise_succeeds() {
    ataraxis()
        .args(["error", "Test error", "--no-raise"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Test error"));
}

#[test]
fn quiet_error_still_fails() {
    ataraxis()
        .args(["--quiet", "error", "Disabled error", "--kind", "type"])
        .assert()
        .code(1)
        .stderr(predicate::str::is_empty());
}

#[test]
fn error_unknown_kind() {
    ataraxis()
        .args(["error", "x", "--kind", "panic"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid 'kind' argument"));
}

// ── configuration ─────────────────────────────────────────────────────────────

#[test]
fn zero_line_width_is_rejected() {
    ataraxis()
        .args(["--line-width", "0", "echo", "x"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid 'line_width' argument"));
}

#[test]
fn unsupported_log_format_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    ataraxis()
        .args([
            "--log-dir",
            tmp.path().to_str().unwrap(),
            "--log-format",
            ".zipp",
            "echo",
            "x",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid 'log_format' argument"));
}

#[test]
fn file_as_log_dir_is_rejected() {
    let file = tempfile::NamedTempFile::new().unwrap();
    ataraxis()
        .args(["--log-dir", file.path().to_str().unwrap(), "echo", "x"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid 'log_directory' argument"));
}

#[test]
fn debug_log_requires_debug_flag() {
    let tmp = tempfile::tempdir().unwrap();
    let quiet_dir = tmp.path().join("quiet");
    ataraxis()
        .args(["--log-dir", quiet_dir.to_str().unwrap(), "echo", "msg", "--level", "debug"])
        .assert()
        .success();
    assert!(quiet_dir.join("message.log").exists());
    assert!(!quiet_dir.join("debug.log").exists());

    let loud_dir = tmp.path().join("loud");
    ataraxis()
        .args([
            "--log-dir",
            loud_dir.to_str().unwrap(),
            "--debug",
            "echo",
            "msg",
            "--level",
            "debug",
        ])
        .assert()
        .success();
    let content = std::fs::read_to_string(loud_dir.join("debug.log")).unwrap();
    assert!(content.contains("| DEBUG    | msg"));
}

#[test]
fn json_log_format() {
    let tmp = tempfile::tempdir().unwrap();
    ataraxis()
        .args([
            "--log-dir",
            tmp.path().to_str().unwrap(),
            "--log-format",
            "json",
            "--enqueue",
            "echo",
            "structured",
            "--level",
            "success",
        ])
        .assert()
        .success();
    let content = std::fs::read_to_string(tmp.path().join("message.json")).unwrap();
    let record: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
    assert_eq!(record["level"], "success");
    assert_eq!(record["message"], "structured");
}

#[test]
fn config_file_settings_apply() {
    let tmp = tempfile::tempdir().unwrap();
    let config = tmp.path().join("console.toml");
    std::fs::write(
        &config,
        "[console]\nline_width = 40\nlog_directory = \"logs\"\nlog_format = \".txt\"\n",
    )
    .unwrap();

    ataraxis()
        .args(["--config", config.to_str().unwrap(), "echo", "from config"])
        .assert()
        .success();
    let content = std::fs::read_to_string(tmp.path().join("logs/message.txt")).unwrap();
    assert!(content.contains("from config"));
}

#[test]
fn broken_config_file() {
    let tmp = tempfile::tempdir().unwrap();
    let config = tmp.path().join("console.toml");
    std::fs::write(&config, "line_width = \"wide\"\n").unwrap();
    ataraxis()
        .args(["--config", config.to_str().unwrap(), "echo", "x"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("failed to parse console config"));
}

// ── wrap / track / progress ───────────────────────────────────────────────────

#[test]
fn wrap_with_header_offset() {
    let message =
        "This is a long message that should be wrapped properly according to the specified parameters";
    let stdout = stdout_of(&["--line-width", "80", "wrap", message, "--header"]);
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines[0].len() <= 43);
    for line in &lines[1..] {
        assert!(line.len() <= 80);
        assert!(line.starts_with(&" ".repeat(HEADER_WIDTH)));
    }
    let words: Vec<&str> = stdout.split_whitespace().collect();
    assert_eq!(words, message.split_whitespace().collect::<Vec<_>>());
}

#[test]
fn wrap_keeps_long_words() {
    let long_word = "a".repeat(100);
    let stdout = stdout_of(&["--line-width", "50", "wrap", &long_word]);
    assert_eq!(stdout, format!("{long_word}\n"));
}

#[test]
fn track_yields_every_item() {
    assert_eq!(stdout_of(&["track", "3", "--unit", "batch"]), "0\n1\n2\n");
    assert_eq!(stdout_of(&["--progress", "track", "4"]), "0\n1\n2\n3\n");
    assert_eq!(stdout_of(&["track", "0"]), "");
}

#[test]
fn progress_supports_fractional_totals() {
    let stdout = stdout_of(&["--progress", "progress", "100.5", "--step", "50.25", "--unit", "ml"]);
    assert_eq!(stdout, "100.5\n");
}

#[test]
fn progress_rejects_non_positive_step() {
    ataraxis()
        .args(["progress", "10", "--step", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid 'step' value"));
}

#[test]
fn progress_rejects_infinite_total() {
    ataraxis()
        .args(["--quiet", "progress", "inf"])
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .code(1);
    ataraxis()
        .args(["progress", "inf"])
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid 'total' value"));
}

#[test]
fn progress_rejects_nan_step() {
    ataraxis()
        .args(["progress", "10", "--step", "NaN"])
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid 'step' value"));
}

#[test]
fn progress_rejects_totals_beyond_float_precision() {
    ataraxis()
        .args(["progress", "1e300"])
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("more than"));
}

#[test]
fn plain_backend_log_file_keeps_header() {
    let tmp = tempfile::tempdir().unwrap();
    ataraxis()
        .args([
            "--backend",
            "plain",
            "--log-dir",
            tmp.path().to_str().unwrap(),
            "echo",
            "hello",
        ])
        .assert()
        .success()
        .stdout("hello\n");
    let content = std::fs::read_to_string(tmp.path().join("message.log")).unwrap();
    assert!(content.ends_with(" | INFO     | hello\n"), "{content}");
}
