mod common;

use common::{run_precis, TestEnv};

#[test]
fn precis_help_shows_usage() {
    let output = run_precis(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "--help should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr
    );
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("Commands:"));
    assert!(stdout.contains("serve"));
    assert!(
        !stderr.contains("No config file found"),
        "--help should not log config fallback noise\nstderr:\n{}",
        stderr
    );
}

#[test]
fn precis_version_shows_version() {
    let output = run_precis(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "--version should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr
    );
    assert!(stdout.contains("precis "));
}

#[test]
fn completions_bash_outputs_script() {
    let output = run_precis(&["completions", "bash"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "completions bash should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr
    );
    assert!(
        stdout.contains("precis"),
        "expected completion output to reference command name\nstdout:\n{}",
        stdout
    );
}

#[test]
fn config_show_works() {
    let output = run_precis(&["config", "show"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "config show should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr
    );
    assert!(stdout.contains("[general]"));
    assert!(stdout.contains("data_dir"));
    assert!(stdout.contains("[llm]"));
    assert!(stdout.contains("mixtral-8x7b-32768"));
}

#[test]
fn config_show_redacts_secrets() {
    let env = TestEnv::new();
    env.write_config(
        r#"
[llm]
api_key = "gsk_secret_value"

[email]
host = "smtp.example.com"
user = "bot@example.com"
pass = "hunter2"
"#,
    );

    let output = env.run(&["config", "show"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "config show should succeed");
    assert!(stdout.contains("smtp.example.com"));
    assert!(!stdout.contains("gsk_secret_value"));
    assert!(!stdout.contains("hunter2"));
}

#[test]
fn config_path_returns_valid_path() {
    let output = run_precis(&["config", "path"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "config path should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr
    );
    assert!(stdout.contains("config.toml"));
}

#[test]
fn config_init_refuses_to_overwrite() {
    let env = TestEnv::new();

    let first = env.run(&["config", "init"]);
    assert!(first.status.success(), "first init should succeed");
    assert!(env.config_path().exists());

    let second = env.run(&["config", "init"]);
    let stderr = String::from_utf8_lossy(&second.stderr);
    assert!(!second.status.success(), "second init should fail");
    assert!(stderr.contains("--force"));

    let forced = env.run(&["config", "init", "--force"]);
    assert!(forced.status.success(), "forced init should succeed");
}

#[test]
fn list_works_with_empty_database() {
    let output = run_precis(&["list"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "list should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr
    );
    assert!(stdout.contains("No summaries found"));
}

#[test]
fn stats_works_with_empty_database() {
    let output = run_precis(&["stats"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stats should succeed");
    assert!(stdout.contains("Summaries:           0"));
    assert!(stdout.contains("Share rate:          0.0%"));
}
