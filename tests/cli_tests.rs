use std::fs;
use std::process::Command;
use tempfile::tempdir;

const ACTIVITY_CSV: &str = "\
Activity Type,Date,Title,Distance,Calories,Time,Max HR
Running,2025-03-01 07:00:00,Parkrun,5.00,350,25:00,178
Cycling,2025-03-03 17:30:00,Evening Ride,40.00,900,1:30:00,160
";

fn fitwrapped(home: &std::path::Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_fitwrapped"));
    command.env("HOME", home).env_remove("RUST_LOG");
    command
}

#[test]
fn test_analyze_json_stdout_is_parseable() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("activities.csv");
    fs::write(&input, ACTIVITY_CSV).unwrap();

    let output = fitwrapped(dir.path())
        .args(["analyze", "--input"])
        .arg(&input)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["year"], 2025);
    assert_eq!(stats["total_activities"], 2);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("activities imported"));
}

#[test]
fn test_analyze_writes_output_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("activities.csv");
    let report = dir.path().join("year.json");
    fs::write(&input, ACTIVITY_CSV).unwrap();

    let status = fitwrapped(dir.path())
        .args(["analyze", "--input"])
        .arg(&input)
        .args(["--format", "json", "--output"])
        .arg(&report)
        .status()
        .unwrap();
    assert!(status.success());

    let content = fs::read_to_string(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value["stats"]["total_activities"], 2);
}
