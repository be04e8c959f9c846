use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn bulkcrop() -> Command {
    let mut cmd = Command::cargo_bin("bulkcrop").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    bulkcrop()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("crop"))
        .stdout(predicate::str::contains("probe"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_crop_without_source_fails() {
    bulkcrop()
        .args(["crop", "--crop", "0,0,10,10"])
        .assert()
        .failure();
}

#[test]
fn test_crf_out_of_range_fails() {
    bulkcrop()
        .args(["crop", "a.mp4", "--crop", "0,0,10,10", "--crf", "60"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("crf"));
}

#[test]
fn test_malformed_crop_fails() {
    bulkcrop()
        .args(["crop", "a.mp4", "--crop", "1,2,3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("x,y,width,height"));
}

#[test]
fn test_missing_manifest_fails() {
    let dir = TempDir::new().unwrap();
    bulkcrop()
        .current_dir(dir.path())
        .args(["crop", "--manifest", "missing.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.json"));
}

#[test]
fn test_manifest_without_drawn_crops_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.mp4"), b"a").unwrap();
    std::fs::write(
        dir.path().join("jobs.yaml"),
        "jobs:\n  - path: a.mp4\n    crop: {x: 0, y: 0, width: 0, height: 0}\n",
    )
    .unwrap();

    bulkcrop()
        .current_dir(dir.path())
        .args(["crop", "--manifest", "jobs.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No videos with valid crop settings"));
}

#[test]
fn test_invalid_config_file_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("bulkcrop.toml"), "crf = 80\n").unwrap();
    std::fs::write(dir.path().join("a.mp4"), b"a").unwrap();

    bulkcrop()
        .current_dir(dir.path())
        .args(["crop", "a.mp4", "--crop", "0,0,10,10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CRF value cannot exceed 51"));
}

#[test]
fn test_validate_rejects_unsupported_format() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"text").unwrap();

    bulkcrop()
        .current_dir(dir.path())
        .args(["--ffprobe-path", "/nonexistent/ffprobe", "validate", "notes.txt", "--json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Invalid file format"))
        .stdout(predicate::str::contains("\"valid\": false"));
}
