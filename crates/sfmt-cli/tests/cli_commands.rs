//! # CLI Integration Tests
//!
//! Drives the `sfmt` binary against documents written to a temporary
//! directory and checks exit codes and output.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{json, Value};

fn sfmt(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sfmt"))
        .args(args)
        .output()
        .unwrap()
}

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

fn fleet() -> Value {
    json!({
        "AllocationStrategy": "capacityOptimizedPrioritized",
        "IamFleetRole": "arn:aws:iam::123456789012:role/aws-ec2-spot-fleet-tagging-role",
        "TargetCapacity": 2,
        "LaunchTemplateConfigs": [{
            "LaunchTemplateSpecification": {
                "LaunchTemplateId": "lt-0123456789abcdef0",
                "Version": "$Latest"
            },
            "Overrides": [{
                "InstanceType": "c5.large",
                "SubnetId": ["subnet-0123456789abcdef0", "subnet-0fedcba9876543210"],
                "Priority": 1,
                "WeightedCapacity": 1
            }]
        }]
    })
}

fn code(output: &Output) -> i32 {
    output.status.code().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn validate_accepts_good_document() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "fleet.json", &json!({"render": fleet()}).to_string());
    let output = sfmt(&["validate", file.to_str().unwrap()]);
    assert_eq!(code(&output), 0);
    assert!(stdout(&output).starts_with("OK:"));
}

#[test]
fn validate_rejects_with_line_numbers() {
    let dir = tempfile::tempdir().unwrap();
    let mut bad = fleet();
    bad["TargetCapacity"] = json!("2");
    let pretty = serde_json::to_string_pretty(&json!({"render": bad.clone()})).unwrap();
    let file = write(dir.path(), "fleet.json", &pretty);
    let output = sfmt(&["validate", file.to_str().unwrap()]);
    assert_eq!(code(&output), 1);
    let text = stdout(&output);
    assert!(text.contains("[1/1] line 5: render > TargetCapacity: must be a number (found \"2\")"), "{text}");

    let compact = write(dir.path(), "compact.json", &json!({"render": bad}).to_string());
    let output = sfmt(&["validate", compact.to_str().unwrap()]);
    let text = stdout(&output);
    assert!(text.contains("[1/1] line 1: render > TargetCapacity"), "{text}");
}

#[test]
fn validate_json_format() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "fleet.json", &json!({"bad name": fleet()}).to_string());
    let output = sfmt(&["validate", file.to_str().unwrap(), "--format", "json"]);
    assert_eq!(code(&output), 1);
    let report: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["accepted"], false);
    assert_eq!(report["report"]["entries"][0]["category"], "fleet_name");
}

#[test]
fn validate_reports_parse_errors() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "fleet.json", "{\n  \"render\": {,}\n}");
    let output = sfmt(&["validate", file.to_str().unwrap()]);
    assert_eq!(code(&output), 2);
    assert!(stdout(&output).contains("line 2: document:"));
}

#[test]
fn missing_file_is_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    let output = sfmt(&["validate", missing.to_str().unwrap()]);
    assert_eq!(code(&output), 2);
}

#[test]
fn normalize_writes_flattened_document() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "fleet.json", &json!({"render": fleet()}).to_string());
    let out = dir.path().join("out.json");
    let output = sfmt(&["normalize", file.to_str().unwrap(), "-o", out.to_str().unwrap()]);
    assert_eq!(code(&output), 0);

    let normalized: Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let fleet = &normalized["render"];
    assert_eq!(fleet["LaunchTemplateConfigs"][0]["Overrides"].as_array().unwrap().len(), 2);
    assert_eq!(
        fleet["LaunchTemplateConfigs"][0]["Overrides"][1]["SubnetId"],
        "subnet-0fedcba9876543210"
    );
    assert_eq!(fleet["TagSpecifications"][0]["ResourceType"], "spot-fleet-request");
}

#[test]
fn normalize_strip_priorities() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = fleet();
    doc["AllocationStrategy"] = json!("lowestPrice");
    let file = write(dir.path(), "fleet.json", &json!({"render": doc}).to_string());

    let rejected = sfmt(&["normalize", file.to_str().unwrap()]);
    assert_eq!(code(&rejected), 1);
    assert!(stdout(&rejected).is_empty());

    let accepted = sfmt(&["normalize", file.to_str().unwrap(), "--strip-priorities"]);
    assert_eq!(code(&accepted), 0);
    let normalized: Value = serde_json::from_str(&stdout(&accepted)).unwrap();
    assert!(normalized["render"]["LaunchTemplateConfigs"][0]["Overrides"][0]
        .get("Priority")
        .is_none());
}

#[test]
fn group_shows_merged_subnets() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "fleet.json", &json!({"render": fleet()}).to_string());
    let output = sfmt(&["group", file.to_str().unwrap(), "--fleet", "render"]);
    assert_eq!(code(&output), 0);
    let groups: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(groups[0]["Overrides"].as_array().unwrap().len(), 1);

    let unknown = sfmt(&["group", file.to_str().unwrap(), "--fleet", "nope"]);
    assert_eq!(code(&unknown), 2);
}

#[test]
fn rename_keeps_position_and_refuses_collisions() {
    let dir = tempfile::tempdir().unwrap();
    let document = json!({"a": fleet(), "b": fleet(), "c": fleet()});
    let file = write(dir.path(), "fleet.json", &document.to_string());

    let output = sfmt(&["rename", file.to_str().unwrap(), "b", "render"]);
    assert_eq!(code(&output), 0);
    let renamed: Value = serde_json::from_str(&stdout(&output)).unwrap();
    let names: Vec<&String> = renamed.as_object().unwrap().keys().collect();
    assert_eq!(names, ["a", "render", "c"]);

    let collision = sfmt(&["rename", file.to_str().unwrap(), "b", "c"]);
    assert_eq!(code(&collision), 1);
}

#[test]
fn rename_preserves_fields_outside_the_model() {
    let dir = tempfile::tempdir().unwrap();
    let mut draft = fleet();
    draft["AllocationStrategy"] = json!("");
    draft["SpotPrice"] = json!("0.05");
    draft["ValidUntil"] = json!("2027-01-01T00:00:00Z");
    let document = json!({"draft": draft.clone(), "other": fleet()});
    let file = write(dir.path(), "fleet.json", &document.to_string());

    let output = sfmt(&["rename", file.to_str().unwrap(), "draft", "render"]);
    assert_eq!(code(&output), 0, "{}", String::from_utf8_lossy(&output.stderr));
    let renamed: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(renamed, json!({"render": draft, "other": fleet()}));
}

#[test]
fn schema_is_printed() {
    let output = sfmt(&["schema"]);
    assert_eq!(code(&output), 0);
    let schema: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(schema["$schema"], "https://json-schema.org/draft/2020-12/schema");
}

#[test]
fn config_file_changes_separator() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(dir.path(), "sfmt.yaml", "report:\n  path_separator: \" / \"\n");
    let mut bad = fleet();
    bad.as_object_mut().unwrap().remove("IamFleetRole");
    let file = write(dir.path(), "fleet.json", &json!({"render": bad}).to_string());
    let output = sfmt(&[
        "validate",
        file.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);
    assert_eq!(code(&output), 1);
    assert!(stdout(&output).contains("render / IamFleetRole: is required"));
}
