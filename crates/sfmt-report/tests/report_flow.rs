//! End-to-end: validate a document, build the report against its rendered
//! text and navigate the entries.

use serde_json::json;
use sfmt_report::{render_document, DiagnosticReport, LineIndex, ReportCategory, ReportOptions};
use sfmt_schema::{validate, validate_text};

fn broken_document() -> serde_json::Value {
    json!({
        "render": {
            "AllocationStrategy": "capacityOptimizedPrioritized",
            "IamFleetRole": "arn:aws:iam::123456789012:role/x",
            "TargetCapacity": "5",
            "LaunchTemplateConfigs": [{
                "LaunchTemplateSpecification": {
                    "LaunchTemplateId": "lt-00000000000000000",
                    "Version": "1"
                },
                "Overrides": [{
                    "InstanceType": "c5.large",
                    "SubnetId": "subnet-00000000000000000",
                    "WeightedCapacity": 1
                }]
            }]
        }
    })
}

#[test]
fn test_report_maps_violations_to_rendered_lines() {
    let document = broken_document();
    let text = render_document(&document).unwrap();
    let index = LineIndex::build(&document);
    let result = validate(&document);
    let report = DiagnosticReport::from_result(&result, Some(&index), &ReportOptions::default());

    assert_eq!(report.len(), 2);
    let capacity = &report.entries[0];
    assert_eq!(capacity.location, "render > TargetCapacity");
    let line = text.lines().nth(capacity.line.unwrap() - 1).unwrap();
    assert!(line.contains("\"TargetCapacity\": \"5\""));

    let priority = &report.entries[1];
    assert_eq!(
        priority.location,
        "render > LaunchTemplateConfigs > item 1 > Overrides > item 1 > Priority"
    );
    // Missing field: points at the override that needs it.
    let line = text.lines().nth(priority.line.unwrap() - 1).unwrap();
    assert_eq!(line.trim(), "{");
}

#[test]
fn test_navigation_survives_shorter_list() {
    let document = broken_document();
    let report = DiagnosticReport::from_result(&validate(&document), None, &ReportOptions::default());
    let state = report.navigation().next();
    assert_eq!(report.current(&state).unwrap().location, report.entries[1].location);

    let mut fixed = document.clone();
    fixed["render"]["TargetCapacity"] = json!(5);
    let report = DiagnosticReport::from_result(&validate(&fixed), None, &ReportOptions::default());
    let state = state.resync(report.len());
    assert_eq!(state.index, 0);
    assert!(report.current(&state).unwrap().location.ends_with("Priority"));
}

#[test]
fn test_bad_fleet_name_takes_precedence() {
    let mut document = broken_document();
    let fleet = document["render"].clone();
    document["render farm"] = fleet;
    let report = DiagnosticReport::from_result(&validate(&document), None, &ReportOptions::default());
    assert_eq!(report.len(), 1);
    assert_eq!(report.entries[0].category, ReportCategory::FleetName);
    assert_eq!(report.entries[0].location, "render farm");
    assert_eq!(report.suppressed, 4);
}

#[test]
fn test_parse_failure_report() {
    let err = validate_text("{\"f1\": ").unwrap_err();
    let report = DiagnosticReport::from_engine_error(&err);
    assert_eq!(report.len(), 1);
    assert_eq!(report.entries[0].category, ReportCategory::Parse);
    assert!(report.entries[0].path.is_none());
}

#[test]
fn test_advisories_listed_separately() {
    let mut document = broken_document();
    document["render"]["TargetCapacity"] = json!(5);
    document["render"]["LaunchTemplateConfigs"][0]["Overrides"][0]["Priority"] = json!(1);
    document["render"]["LaunchTemplateConfigs"][0]["Overrides"][0]
        .as_object_mut()
        .unwrap()
        .remove("WeightedCapacity");
    let result = validate(&document);
    assert!(result.is_accepted());
    let report = DiagnosticReport::from_result(&result, None, &ReportOptions::default());
    assert!(report.is_empty());
    assert_eq!(report.advisories.len(), 1);
    assert!(report.to_string().starts_with("warning: "));
}
