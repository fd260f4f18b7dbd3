// CLI integration tests
// Runs the appraisal-engine binary and checks its JSON output

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn appraisal_engine() -> Command {
    let mut cmd = Command::cargo_bin("appraisal-engine").unwrap();
    cmd.env("RUST_LOG", "warn");
    cmd
}

#[test]
fn grade_reports_band_for_boundary() {
    appraisal_engine()
        .args(["grade", "30.00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"grade\": \"Developing\""))
        .stdout(predicate::str::contains("\"is_under_performing\": true"));
}

#[test]
fn period_score_prints_scoring_result() {
    appraisal_engine()
        .args([
            "period-score",
            "--work-product",
            "40",
            "--objective",
            "30",
            "--competency",
            "15",
            "--max-points",
            "100",
            "--hrd-deduction",
            "5",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"grade\": \"Accomplished\""))
        .stdout(predicate::str::contains("\"category_breakdown\""));
}

#[test]
fn period_score_with_zero_max_points_does_not_fail() {
    appraisal_engine()
        .args([
            "period-score",
            "--work-product",
            "10",
            "--objective",
            "10",
            "--competency",
            "10",
            "--max-points",
            "0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"grade\": \"Probation\""));
}

#[test]
fn unbalanced_weights_exit_with_error() {
    appraisal_engine()
        .args(["weights", "60", "30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("weights not balanced"));

    appraisal_engine()
        .args(["weights", "60", "40"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"balanced\": true"));
}

#[cfg(feature = "database")]
#[test]
fn next_code_persists_between_runs() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("appraisal-engine.toml");
    std::fs::write(
        &config_path,
        format!(
            "[database]\nurl = \"sqlite://{}\"\n",
            temp_dir.path().join("counters.db").display()
        ),
    )
    .unwrap();

    for expected in ["WP/0001", "WP/0002"] {
        appraisal_engine()
            .arg("--config")
            .arg(&config_path)
            .args(["next-code", "--type", "1", "--width", "4", "--concat", "WP/"])
            .assert()
            .success()
            .stdout(predicate::str::contains(format!("\"code\": \"{expected}\"")));
    }
}

#[test]
fn zero_width_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("appraisal-engine.toml");
    std::fs::write(
        &config_path,
        format!(
            "[database]\nurl = \"sqlite://{}\"\n",
            temp_dir.path().join("counters.db").display()
        ),
    )
    .unwrap();

    appraisal_engine()
        .arg("--config")
        .arg(&config_path)
        .args(["next-code", "--type", "4", "--width", "0"])
        .assert()
        .failure();
}
