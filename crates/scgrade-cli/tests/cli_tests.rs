//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CAPITALS: &str = "../../questions/capitals.toml";
const RIVERS: &str = "../../questions/rivers.toml";
const CAPITALS_ORDER: &str = "graz,linz,vienna,salzburg";

fn scgrade() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("scgrade").unwrap()
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn validate_question_file() {
    scgrade()
        .arg("validate")
        .arg("--question")
        .arg(CAPITALS)
        .assert()
        .success()
        .stdout(predicate::str::contains("Capital of Austria (4 rows, aprime)"))
        .stdout(predicate::str::contains("All questions valid"));
}

#[test]
fn validate_directory() {
    scgrade()
        .arg("validate")
        .arg("--question")
        .arg("../../questions")
        .assert()
        .success()
        .stdout(predicate::str::contains("Capital of Austria"))
        .stdout(predicate::str::contains("Longest river in Europe"));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(
        &path,
        r#"
[question]
id = "broken"
correct_row = 5
scoring_method = "mystery"

[[rows]]
number = 1
text = "Only row"
"#,
    )
    .unwrap();

    scgrade()
        .arg("validate")
        .arg("--question")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown scoring method: mystery"))
        .stdout(predicate::str::contains("warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    scgrade()
        .arg("validate")
        .arg("--question")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    scgrade()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created scgrade.toml"))
        .stdout(predicate::str::contains("Created questions/example.toml"));

    assert!(dir.path().join("scgrade.toml").exists());
    assert!(dir.path().join("questions/example.toml").exists());

    // The generated files are usable as-is
    scgrade()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--question")
        .arg("questions/example.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("All questions valid"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    scgrade().current_dir(dir.path()).arg("init").assert().success();

    scgrade()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn start_with_seed_is_reproducible() {
    let run = || {
        let output = scgrade()
            .args(["start", "--question", CAPITALS, "--seed", "42"])
            .output()
            .unwrap();
        assert!(output.status.success());
        String::from_utf8(output.stdout).unwrap()
    };

    let first = run();
    assert_eq!(first, run());
    let mut ids: Vec<&str> = first.trim().split(',').collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["graz", "linz", "salzburg", "vienna"]);
}

#[test]
fn start_without_shuffle_keeps_catalog_order() {
    scgrade()
        .args(["start", "--question", RIVERS])
        .assert()
        .success()
        .stdout("danube,volga,rhine,loire,elbe\n");
}

#[test]
fn grade_correct_inline_response() {
    scgrade()
        .args(["grade", "--question", CAPITALS, "--order", CAPITALS_ORDER])
        .args(["--response", "option2=1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Order: graz,linz,vienna,salzburg"))
        .stdout(predicate::str::contains("Vienna"))
        .stdout(predicate::str::contains("Final grade: 100.0%"))
        .stdout(predicate::str::contains("Hint").not());
}

#[test]
fn grade_wrong_answer_shows_hint() {
    scgrade()
        .args(["grade", "--question", CAPITALS, "--order", CAPITALS_ORDER])
        .args(["--response", "option0=1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Final grade: 0.0%"))
        .stdout(predicate::str::contains("Hint: It lies on the Danube."));
}

#[test]
fn grade_applies_penalty_across_tries() {
    let dir = TempDir::new().unwrap();
    let responses = dir.path().join("tries.json");
    std::fs::write(&responses, r#"[{"option0": 1}, {"option2": 1, "distractor3": 1}]"#).unwrap();

    let report = stdout_json(
        scgrade()
            .args(["grade", "--question", CAPITALS, "--order", CAPITALS_ORDER])
            .arg("--responses")
            .arg(&responses)
            .args(["--format", "json"]),
    );

    let tries = report["tries"].as_array().unwrap();
    assert_eq!(tries.len(), 2);
    assert_eq!(tries[0]["state"], "incorrect");
    assert_eq!(tries[1]["state"], "correct");
    assert_eq!(tries[1]["summary"], "Vienna; Salzburg is crossed out");
    let final_fraction = report["final_fraction"].as_f64().unwrap();
    assert!((final_fraction - 0.9).abs() < 1e-9);
}

#[test]
fn grade_partial_credit_for_crossed_out_distractors() {
    let report = stdout_json(
        scgrade()
            .args(["grade", "--question", RIVERS, "--order", "danube,volga,rhine,loire,elbe"])
            .args(["--response", "distractor0=1,distractor2=1", "--format", "json"]),
    );
    assert_eq!(report["tries"][0]["state"], "partially_correct");
    assert_eq!(report["final_fraction"].as_f64().unwrap(), 0.5);
}

#[test]
fn grade_rebuilds_stale_order() {
    scgrade()
        .args(["grade", "--question", CAPITALS, "--order", "ghost,linz,vienna,salzburg"])
        .args(["--response", "option2=1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("rebuilt"))
        .stdout(predicate::str::contains("Order: graz,linz,vienna,salzburg"))
        .stdout(predicate::str::contains("Final grade: 100.0%"));
}

#[test]
fn grade_keeps_order_with_unmarked_missing_row() {
    // Only the first position is checked, so a mid-list edit goes unnoticed
    scgrade()
        .args(["grade", "--question", CAPITALS, "--order", "graz,ghost,vienna,salzburg"])
        .args(["--response", "option2=1,distractor3=1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("rebuilt").not())
        .stdout(predicate::str::contains("Order: graz,ghost,vienna,salzburg"))
        .stdout(predicate::str::contains("Vienna; Salzburg is crossed out"))
        .stdout(predicate::str::contains("Final grade: 100.0%"));
}

#[test]
fn grade_accepts_loose_json_values() {
    let dir = TempDir::new().unwrap();
    let responses = dir.path().join("tries.json");
    std::fs::write(&responses, r#"[{"option2": true, "distractor0": null, "distractor3": 1.0}]"#)
        .unwrap();

    let report = stdout_json(
        scgrade()
            .args(["grade", "--question", CAPITALS, "--order", CAPITALS_ORDER])
            .arg("--responses")
            .arg(&responses)
            .args(["--format", "json"]),
    );
    assert_eq!(report["tries"][0]["state"], "correct");
    assert_eq!(report["tries"][0]["summary"], "Vienna; Salzburg is crossed out");
}

#[test]
fn grade_reports_ungradable_response() {
    scgrade()
        .args(["grade", "--question", CAPITALS, "--order", CAPITALS_ORDER])
        .args(["--response", "option9=1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Please select an answer"))
        .stdout(predicate::str::contains("Final grade: 0.0%"));
}

#[test]
fn grade_saves_report_and_prints_markdown() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out").join("report.json");

    scgrade()
        .args(["grade", "--question", CAPITALS, "--order", CAPITALS_ORDER])
        .args(["--response", "option2=1", "--format", "markdown"])
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("## Capital of Austria"))
        .stdout(predicate::str::contains("| 1 | Vienna | 100.0% | correct |"));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(saved["order"], CAPITALS_ORDER);
}

#[test]
fn grade_requires_responses() {
    scgrade()
        .args(["grade", "--question", CAPITALS])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no responses given"));
}

#[test]
fn grade_rejects_malformed_pairs() {
    scgrade()
        .args(["grade", "--question", CAPITALS, "--response", "option2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected key=value"));
}

#[test]
fn batch_grades_all_jobs() {
    let dir = TempDir::new().unwrap();
    let jobs = dir.path().join("jobs.json");
    std::fs::write(
        &jobs,
        r#"[
  {"id": "alice", "order": "graz,linz,vienna,salzburg", "responses": [{"option2": 1}]},
  {"id": "bob", "order": "vienna,graz,linz,salzburg", "responses": [{"option1": 1}, {"option0": 1}]},
  {"id": "carol", "seed": 3, "responses": [{}]}
]"#,
    )
    .unwrap();

    let summary = stdout_json(
        scgrade()
            .args(["batch", "--question", CAPITALS, "--parallelism", "2", "--format", "json"])
            .arg("--jobs")
            .arg(&jobs),
    );

    let outcomes = summary["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0]["job_id"], "alice");
    assert_eq!(outcomes[1]["job_id"], "bob");
    assert!((outcomes[1]["final_fraction"].as_f64().unwrap() - 0.9).abs() < 1e-9);
    assert_eq!(summary["failures"][0]["job_id"], "carol");
}

#[test]
fn batch_text_output() {
    let dir = TempDir::new().unwrap();
    let jobs = dir.path().join("jobs.json");
    std::fs::write(
        &jobs,
        r#"[{"id": "dave", "order": "danube,volga,rhine,loire,elbe", "responses": [{"option1": 1}]}]"#,
    )
    .unwrap();

    scgrade()
        .args(["batch", "--question", RIVERS])
        .arg("--jobs")
        .arg(&jobs)
        .assert()
        .success()
        .stdout(predicate::str::contains("dave"))
        .stdout(predicate::str::contains("Mean final grade: 100.0%"));
}

#[test]
fn stats_summarizes_responses() {
    let dir = TempDir::new().unwrap();
    let responses = dir.path().join("responses.json");
    std::fs::write(
        &responses,
        r#"[{"option2": 1}, {"option2": 1}, {"option0": 1}, {"distractor0": 1, "distractor1": 1}, {}]"#,
    )
    .unwrap();

    let stats = stdout_json(
        scgrade()
            .args(["stats", "--question", CAPITALS, "--order", CAPITALS_ORDER, "--format", "json"])
            .arg("--responses")
            .arg(&responses),
    );

    assert_eq!(stats["total_responses"], 5);
    assert_eq!(stats["gradable_responses"], 4);
    assert_eq!(stats["outcomes"]["correct"], 2);
    assert_eq!(stats["outcomes"]["partially_correct"], 1);
    assert_eq!(stats["outcomes"]["incorrect"], 1);
    assert_eq!(stats["rows"][2]["text"], "Vienna");
    assert_eq!(stats["rows"][2]["selected"], 2);
    assert_eq!(stats["rows"][0]["crossed_out"], 1);
}

#[test]
fn list_methods() {
    scgrade()
        .arg("list-methods")
        .assert()
        .success()
        .stdout(predicate::str::contains("aprime"))
        .stdout(predicate::str::contains("sconezero"))
        .stdout(predicate::str::contains("subpoints"));
}

#[test]
fn help_output() {
    scgrade()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Single-choice question grading with distractors",
        ));
}
