mod common;

use common::{SPRING, fixture_path, run_cli, stdout_json, store_dir};

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn version_json() {
    let dir = store_dir();
    let output = run_cli(dir.path(), &["version", "--format", "json"]);
    assert!(output.status.success());
    let parsed = stdout_json(&output);
    assert_eq!(parsed["name"], "hackjudge");
}

#[test]
fn phases_reports_active_phase() {
    let dir = store_dir();
    let output = run_cli(
        dir.path(),
        &["phases", SPRING, "--at", "2024-03-05T12:00:00Z", "--format", "json"],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    let parsed = stdout_json(&output);
    assert_eq!(parsed["active"], 1);
    assert_eq!(parsed["phases"][0]["status"], "completed");
    assert_eq!(parsed["phases"][1]["status"], "active");
    assert_eq!(parsed["phases"][2]["status"], "upcoming");
}

#[test]
fn overall_leaderboard_json() {
    let dir = store_dir();
    let output = run_cli(dir.path(), &["leaderboard", SPRING, "--format", "json"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let parsed = stdout_json(&output);
    let ids: Vec<&str> = parsed["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["teamId"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["alpha", "bravo", "charlie", "delta", "echo"]);
    let ranks: Vec<u64> = parsed["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["rank"].as_u64().unwrap())
        .collect();
    assert_eq!(ranks, vec![1, 2, 2, 4, 5]);
    assert_eq!(parsed["pendingGrades"], 1);
    assert_eq!(parsed["scope"], "overall");
}

#[test]
fn phase_leaderboard_by_name_human() {
    let dir = store_dir();
    let output = run_cli(dir.path(), &["leaderboard", SPRING, "--phase", "Build"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("phase 1 leaderboard: 3 team(s)"), "{stdout}");
    assert!(!stdout.contains("echo"), "{stdout}");
}

#[test]
fn phase_leaderboard_shows_judging_state() {
    let dir = store_dir();
    let output = run_cli(
        dir.path(),
        &["leaderboard", SPRING, "--phase", "finals", "--format", "json"],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    let parsed = stdout_json(&output);
    assert_eq!(parsed["entries"][0]["teamId"], "delta");
    assert_eq!(parsed["entries"][0]["judging"]["state"], "awaitingScore");

    let output = run_cli(dir.path(), &["leaderboard", SPRING, "--phase", "0"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("STATUS"), "{stdout}");
    assert!(stdout.contains("scored"), "{stdout}");
}

#[test]
fn list_reports_stored_codes() {
    let dir = store_dir();
    std::fs::write(dir.path().join("notes.txt"), b"not a snapshot").unwrap();
    let output = run_cli(dir.path(), &["list", "--format", "json"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout_json(&output),
        serde_json::json!({"hackathons": [SPRING]})
    );

    let empty = tempfile::tempdir().unwrap();
    let output = run_cli(empty.path(), &["list"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("no hackathons in store"));
}

#[test]
fn misspelled_phase_suggests_name() {
    let dir = store_dir();
    let output = run_cli(dir.path(), &["leaderboard", SPRING, "--phase", "biuld"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("did you mean 'build'"), "{}", stderr(&output));
}

#[test]
fn score_then_read_back() {
    let dir = store_dir();
    let output = run_cli(
        dir.path(),
        &[
            "score", SPRING, "--team", "echo", "--phase", "finals", "--score", "77", "--as",
            "judge@spring-hack.dev", "--format", "json",
        ],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    let receipt = stdout_json(&output);
    assert_eq!(receipt["phaseIndex"], 2);
    assert_eq!(receipt["score"], 77);
    assert_eq!(receipt["created"], true);

    let output = run_cli(dir.path(), &["leaderboard", SPRING, "--format", "json"]);
    let parsed = stdout_json(&output);
    let echo = parsed["entries"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["teamId"] == "echo")
        .unwrap();
    assert_eq!(echo["score"], 87);
}

#[test]
fn out_of_range_score_exits_with_score_error() {
    let dir = store_dir();
    for raw in ["150", "-1"] {
        let output = run_cli(
            dir.path(),
            &["score", SPRING, "--team", "alpha", "--phase", "0", "--score", raw, "--as", "judge"],
        );
        assert_eq!(output.status.code(), Some(5), "{raw}: {}", stderr(&output));
        assert!(stderr(&output).contains("invalid score"));
    }
}

#[test]
fn unknown_hackathon_exits_with_storage_error() {
    let dir = store_dir();
    let output = run_cli(dir.path(), &["leaderboard", "WINTER"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("hackathon not found: WINTER"));
}

#[test]
fn eliminate_dry_run_then_apply() {
    let dir = store_dir();
    let output = run_cli(
        dir.path(),
        &["eliminate", SPRING, "--count", "1", "--as", "ops", "--dry-run", "--format", "json"],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    let preview = stdout_json(&output);
    assert_eq!(preview["cutoffScore"], 60);
    assert_eq!(preview["eliminated"], serde_json::json!(["delta", "echo"]));

    let board = stdout_json(&run_cli(dir.path(), &["leaderboard", SPRING, "--format", "json"]));
    assert_eq!(board["entries"].as_array().unwrap().len(), 5);

    let output = run_cli(dir.path(), &["eliminate", SPRING, "--count", "1", "--as", "ops"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("eliminated 2 team(s) scoring <= 60"), "{stdout}");

    let board = stdout_json(&run_cli(dir.path(), &["leaderboard", SPRING, "--format", "json"]));
    assert_eq!(board["entries"].as_array().unwrap().len(), 3);
}

#[test]
fn eliminate_refusals_exit_with_elimination_error() {
    let dir = store_dir();
    for count in ["0", "-2", "5"] {
        let output = run_cli(
            dir.path(),
            &["eliminate", SPRING, "--count", count, "--as", "ops"],
        );
        assert_eq!(output.status.code(), Some(6), "{count}: {}", stderr(&output));
    }
    let output = run_cli(
        dir.path(),
        &["eliminate", SPRING, "--phase", "demo-day", "--count", "1", "--as", "ops"],
    );
    assert_eq!(output.status.code(), Some(6));
}

#[test]
fn events_file_receives_audit_lines() {
    let dir = store_dir();
    let events = dir.path().join("audit.jsonl");
    let output = run_cli(
        dir.path(),
        &[
            "--events-file",
            events.to_str().unwrap(),
            "score", SPRING, "--team", "alpha", "--phase", "1", "--score", "41", "--as", "judge",
        ],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    let body = std::fs::read_to_string(&events).unwrap();
    let line: serde_json::Value = serde_json::from_str(body.lines().next().unwrap()).unwrap();
    assert_eq!(line["type"], "ScoreRecorded");
    assert_eq!(line["principal"], "judge");
    assert_eq!(line["previous"], 40);
}

#[test]
fn config_file_supplies_store_dir() {
    let dir = store_dir();
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_hackjudge"))
        .args(["--config"])
        .arg(fixture_path("engine.yaml"))
        .args(["leaderboard", SPRING, "--format", "json"])
        .env("HACKJUDGE_TEST_STORE_DIR", dir.path())
        .env_remove("HACKJUDGE_STORE")
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout_json(&output)["entries"].as_array().unwrap().len(), 5);
}

#[test]
fn validate_fixture_ok() {
    let dir = store_dir();
    let output = run_cli(
        dir.path(),
        &["validate", fixture_path("spring-hack.json").to_str().unwrap()],
    );
    assert!(output.status.success(), "{}", stderr(&output));
}

#[test]
fn validate_reports_every_error() {
    let dir = store_dir();
    let output = run_cli(
        dir.path(),
        &[
            "validate",
            "--format",
            "json",
            fixture_path("spring-hack.json").to_str().unwrap(),
            fixture_path("broken-snapshot.json").to_str().unwrap(),
        ],
    );
    assert_eq!(output.status.code(), Some(2));
    let parsed = stdout_json(&output);
    assert_eq!(parsed["summary"]["total"], 2);
    assert_eq!(parsed["summary"]["failed"], 1);
    assert_eq!(parsed["files"][0]["valid"], true);
    let errors = parsed["files"][1]["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 4, "{errors:?}");
}

#[test]
fn validate_missing_file() {
    let dir = store_dir();
    let output = run_cli(dir.path(), &["validate", "/tmp/nonexistent_hackjudge_snapshot.json"]);
    assert!(!output.status.success());
}
