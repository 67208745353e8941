//! CLI integration tests for plur-share

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Command isolated from any user config and log settings
fn plur_share(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("plur-share").unwrap();
    cmd.env("PLURSHARE_CONFIG", temp_dir.path().join("missing.toml"))
        .env_remove("RUST_LOG")
        .env_remove("PLURSHARE_LOG_FORMAT")
        .env_remove("PLURSHARE_LOG_LEVEL");
    cmd
}

fn write_png(path: &Path) {
    image::RgbaImage::from_pixel(5, 3, image::Rgba([200, 10, 10, 255]))
        .save(path)
        .unwrap();
}

#[test]
fn test_help_flag_output() {
    let temp_dir = TempDir::new().unwrap();

    plur_share(&temp_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Run a share session"))
        .stdout(predicate::str::contains("--url"))
        .stdout(predicate::str::contains("--image"))
        .stdout(predicate::str::contains("--script"))
        .stdout(predicate::str::contains("--format"))
        .stdout(predicate::str::contains("--verbose"));
}

#[test]
fn test_text_is_printed_after_finish() {
    let temp_dir = TempDir::new().unwrap();

    plur_share(&temp_dir)
        .arg("Release notes are up")
        .assert()
        .success()
        .stdout(predicate::str::contains("Release notes are up"));
}

#[test]
fn test_url_and_image_are_collected() {
    let temp_dir = TempDir::new().unwrap();
    let png = temp_dir.path().join("shot.png");
    write_png(&png);

    plur_share(&temp_dir)
        .args(["look", "--url", "https://example.org/post"])
        .arg("--image")
        .arg(&png)
        .assert()
        .success()
        .stdout(predicate::str::contains("look"))
        .stdout(predicate::str::contains("https://example.org/post"))
        .stdout(predicate::str::contains("[image 5x3]"));
}

#[test]
fn test_json_output() {
    let temp_dir = TempDir::new().unwrap();

    let output = plur_share(&temp_dir)
        .args([
            "hello",
            "--format",
            "json",
            "--script",
            "push:servers,push:rooms,pop,push:compose,finish",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        summary["presented"],
        serde_json::json!(["rooms", "servers", "rooms", "compose"])
    );
    assert_eq!(
        summary["items"],
        serde_json::json!([{ "type": "text", "text": "hello" }])
    );
}

#[test]
fn test_unreadable_image_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let bogus = temp_dir.path().join("broken.png");
    fs::write(&bogus, b"definitely not a png").unwrap();

    plur_share(&temp_dir)
        .arg("still here")
        .arg("--image")
        .arg(&bogus)
        .assert()
        .success()
        .stdout(predicate::str::contains("still here"))
        .stdout(predicate::str::contains("[image").not());
}

#[test]
fn test_invalid_script_step_exits_3() {
    let temp_dir = TempDir::new().unwrap();

    plur_share(&temp_dir)
        .args(["hi", "--script", "push:lobby,finish"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid scene: 'lobby'"));
}

#[test]
fn test_script_without_finish_exits_3() {
    let temp_dir = TempDir::new().unwrap();

    plur_share(&temp_dir)
        .args(["hi", "--script", "push:compose"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("without finishing the session"));
}

#[test]
fn test_config_file_disables_urls() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
[ingestion]
accept_urls = false
"#,
    )
    .unwrap();

    plur_share(&temp_dir)
        .args(["kept", "--url", "https://example.org/dropped"])
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("kept"))
        .stdout(predicate::str::contains("example.org").not());
}

#[test]
fn test_invalid_config_exits_1() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[ingestion]\nmax_image_bytes = 0\n").unwrap();

    plur_share(&temp_dir)
        .arg("hi")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ingestion.max_image_bytes"));
}

#[test]
fn test_verbose_logs_presented_screens() {
    let temp_dir = TempDir::new().unwrap();

    plur_share(&temp_dir)
        .args(["hi", "--verbose", "--script", "push:compose,finish"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Presenting screen"));
}
