#![allow(clippy::unwrap_used)]
#![allow(missing_docs)]

use assert_cmd::cargo_bin_cmd;
use predicates::prelude::predicate;

fn cinerec(dir: &tempfile::TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("cinerec");
    cmd.env_remove("CINEREC_BASE_URL")
        .env_remove("OTEL_EXPORTER_OTLP_ENDPOINT")
        .env("NO_COLOR", "1")
        .arg("--dir")
        .arg(dir.path());
    cmd
}

#[test]
fn test_config_set_persists_settings() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act
    cinerec(&dir)
        .args(["config", "set", "renderer", "carousel"])
        .assert()
        .success();
    cinerec(&dir)
        .args(["config", "set", "base-url", "http://10.0.0.5:5000/api/"])
        .assert()
        .success();

    // Assert
    let written = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(written.contains("renderer = \"carousel\""));
    assert!(written.contains("base_url = \"http://10.0.0.5:5000/api/\""));
    cinerec(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("region = \"US\""))
        .stdout(predicate::str::contains("renderer = \"carousel\""));
}

#[test]
fn test_config_set_invalid_value_keeps_file_untouched() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    cinerec(&dir)
        .args(["config", "set", "region", "USA"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("two-letter country code"));
    assert!(!dir.path().join("config.toml").exists());
}

#[test]
fn test_config_show_does_not_open_store() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    cinerec(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
    assert!(!dir.path().join("cinerec.db").exists());
}
