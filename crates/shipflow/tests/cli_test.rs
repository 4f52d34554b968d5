#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! へ移行

use assert_cmd::Command;
use predicates::prelude::*;

/// CLIヘルプが正しく表示されることを確認
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("ship").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("パイプラインは、設定になった"))
        .stdout(predicate::str::contains("synth"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("stages"));
}

/// バージョン表示が正しく動作することを確認
#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("ship").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("shipflow"));
}

/// synthコマンドのヘルプが正しく表示されることを確認
#[test]
fn test_synth_help() {
    let mut cmd = Command::cargo_bin("ship").unwrap();
    cmd.arg("synth")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--out"))
        .stdout(predicate::str::contains("--build-number"));
}

/// プロジェクトルートが無い場合のエラーメッセージを確認
#[test]
fn test_validate_without_project_fails() {
    let temp_dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::cargo_bin("ship").unwrap();
    cmd.arg("validate")
        .current_dir(temp_dir.path())
        .env_remove("SHIPFLOW_PROJECT_ROOT")
        .env_remove("SHIP_CONFIG_PATH")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "プロジェクトルートが見つかりません",
        ));
}
