use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn stemflow() -> Command {
    Command::cargo_bin("stemflow").unwrap()
}

#[test]
fn test_config_writes_default_json() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("engine.json");

    stemflow()
        .arg("config")
        .arg("--output")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration written to"));

    let json = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["seed"], 42);
    assert_eq!(value["parameters"].as_array().unwrap().len(), 10);
}

#[test]
fn test_config_to_stdout() {
    stemflow()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"initial_state\""));
}

#[test]
fn test_params_lists_defaults() {
    stemflow()
        .arg("params")
        .assert()
        .success()
        .stdout(predicate::str::contains("Stem cell production (λ): 20.00"))
        .stdout(predicate::str::contains("Red blood cell death (d3): 0.50"))
        .stdout(predicate::str::contains("Stem cell death (d1): 0.00"));
}

#[test]
fn test_solve_csv_has_full_grid() {
    let output = stemflow().arg("solve").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let mut lines = stdout.lines().filter(|line| !line.is_empty());
    assert_eq!(lines.next(), Some("time,stem,progenitor,differentiated"));
    assert_eq!(lines.next(), Some("0,1000,100,100"));
    let rest: Vec<&str> = lines.collect();
    assert_eq!(rest.len(), 1000);

    let times: Vec<&str> = rest
        .iter()
        .map(|line| line.split(',').next().unwrap())
        .collect();
    assert_eq!(&times[..3], &["0.1", "0.2", "0.3"]);
    assert!(times.iter().all(|t| t.len() <= 5));
    assert_eq!(times.last(), Some(&"100"));
}

#[test]
fn test_solve_json_to_file() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("trajectory.json");

    stemflow()
        .args(["solve", "--format", "json", "--adjust", "d3:up", "--output"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Trajectory exported to"));

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["revision"], 1);
    assert!((value["parameters"]["d3"].as_f64().unwrap() - 0.51).abs() < 1e-9);
    assert_eq!(value["trajectory"]["times"].as_array().unwrap().len(), 1001);
}

#[test]
fn test_solve_is_deterministic() {
    let first = stemflow().arg("solve").output().unwrap();
    let second = stemflow().arg("solve").output().unwrap();
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn test_solve_with_config_file() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("short.json");

    let mut config: serde_json::Value = serde_json::from_slice(
        &stemflow().arg("config").output().unwrap().stdout,
    )
    .unwrap();
    config["grid"]["time_max"] = serde_json::json!(10.0);
    std::fs::write(&path, config.to_string()).unwrap();

    let output = stemflow()
        .args(["solve", "--config"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().filter(|line| !line.is_empty()).count(), 102);
}

#[test]
fn test_solve_rejects_unknown_parameter() {
    stemflow()
        .args(["solve", "--adjust", "zeta:up"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("zeta"));
}

#[test]
fn test_solve_rejects_bad_direction() {
    stemflow()
        .args(["solve", "--adjust", "d3:sideways"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid direction"));
}

#[test]
fn test_missing_config_fails() {
    let temp = tempdir().unwrap();
    stemflow()
        .args(["params", "--config"])
        .arg(temp.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_query_initial_state() {
    stemflow()
        .args(["query", "--time", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1000.00"))
        .stdout(predicate::str::contains("status_neutral"))
        .stdout(predicate::str::contains("10 markers"));
}

#[test]
fn test_query_settled_state_is_happy() {
    stemflow()
        .args(["query", "--time", "100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("status_happy"));
}

#[test]
fn test_query_off_grid_requires_snap() {
    stemflow()
        .args(["query", "--time", "50.03"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--snap"));

    stemflow()
        .args(["query", "--time", "50.03", "--snap"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Time 50.00"));
}

#[test]
fn test_query_after_adjustment_reports_revision() {
    stemflow()
        .args(["query", "--time", "50", "--adjust", "d3:up", "--adjust", "d1:down"])
        .assert()
        .success()
        .stdout(predicate::str::contains("revision 1"));
}
