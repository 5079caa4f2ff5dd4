//! Tests for the provenance tracker
//!
//! Copyright (c) 2025 x2conf Team
//! Licensed under the Apache-2.0 license

use super::*;
use crate::conversion::source::FieldReferenceTable;
use serde_json::json;

#[test]
fn test_tracker_creation() {
    let tracker = ProvenanceTracker::new();
    assert!(tracker.is_empty());
    assert_eq!(tracker.statistics().total(), 0);
    assert!(tracker.to_result().success);
}

#[test]
fn test_record_direct() {
    let mut tracker = ProvenanceTracker::new();
    tracker.record_direct(
        Some("job.content[0].reader.parameter.username"),
        Some("source.Jdbc.user"),
        "root",
        "Directly extracted from DataX",
    );

    let result = tracker.to_result();
    assert_eq!(result.direct.len(), 1);
    let event = &result.direct[0];
    assert_eq!(event.kind, MappingKind::Direct);
    assert_eq!(event.value.as_deref(), Some("root"));
    assert_eq!(event.filter_name(), None);
}

#[test]
fn test_record_transform_carries_filter_label() {
    let mut tracker = ProvenanceTracker::new();
    tracker.record_transform(
        Some("job.content[0].writer.parameter.path"),
        Some("sink.Hive.database"),
        "test_ods",
        "regex_extract",
    );

    let result = tracker.to_result();
    assert_eq!(result.transform.len(), 1);
    assert_eq!(result.transform[0].filter_name(), Some("regex_extract"));
}

#[test]
fn test_record_default_and_missing() {
    let mut tracker = ProvenanceTracker::new();
    tracker.record_default(Some("source.Jdbc.fetch_size"), "1000", "Applied default value: 1000");
    tracker.record_missing(
        "job.content[0].reader.parameter.host",
        Some("source.Jdbc.host"),
        "Field not found in DataX configuration",
    );

    let result = tracker.to_result();
    assert_eq!(result.defaults.len(), 1);
    assert_eq!(result.missing.len(), 1);
    assert_eq!(result.missing[0].value, None);
    assert_eq!(result.missing[0].note, "Field not found in DataX configuration");
}

#[test]
fn test_compute_unmapped() {
    let mut table = FieldReferenceTable::build(&json!({
        "job": {
            "setting": {"speed": {"channel": 3, "byte": 1048576}},
            "content": [{"reader": {"parameter": {"username": "root"}}, "writer": {}}]
        }
    }));
    table.increment("job.setting.speed.channel");

    let mut tracker = ProvenanceTracker::new();
    tracker.compute_unmapped(&table);

    let result = tracker.to_result();
    let unmapped: Vec<&str> = result
        .unmapped
        .iter()
        .filter_map(|e| e.source_path.as_deref())
        .collect();
    assert_eq!(unmapped.len(), 2);
    assert!(unmapped.contains(&"job.setting.speed.byte"));
    assert!(unmapped.contains(&"job.content[0].reader.parameter.username"));
    assert!(result
        .unmapped
        .iter()
        .all(|e| e.note == "Exists in DataX but not referenced in template"));
}

#[test]
fn test_reset_clears_everything() {
    let mut tracker = ProvenanceTracker::new();
    tracker.record_direct(Some("a"), Some("x.a"), "1", "direct");
    tracker.record_unmapped("b", Some("2"), "unmapped");
    assert_eq!(tracker.event_count(), 2);

    tracker.reset();

    assert!(tracker.is_empty());
    assert!(tracker.events_for_field("x.a").is_empty());
    assert!(tracker.to_result().unmapped.is_empty());
}

#[test]
fn test_events_for_field() {
    let mut tracker = ProvenanceTracker::new();
    tracker.record_direct(Some("job.a"), Some("sink.path"), "/tmp", "direct");
    tracker.record_transform(Some("job.a"), Some("sink.path"), "/TMP", "upper");
    tracker.record_unmapped("job.b", None, "unmapped");

    assert_eq!(tracker.events_for_field("sink.path").len(), 2);
    assert_eq!(tracker.events_for_field("job.b").len(), 1);
}

#[test]
fn test_statistics_text() {
    let mut tracker = ProvenanceTracker::new();
    tracker.record_direct(Some("a"), None, "1", "direct");
    tracker.record_direct(Some("b"), None, "2", "direct");
    tracker.record_transform(Some("c"), None, "3", "upper");
    tracker.record_default(None, "4", "Applied default value: 4");
    tracker.record_missing("e", None, "Field not found in DataX configuration");
    tracker.record_unmapped("f", Some("6"), "unmapped");

    let text = tracker.statistics_text();
    assert!(text.contains("Direct mappings: 2"));
    assert!(text.contains("Transform mappings: 1"));
    assert!(text.contains("Default values: 1"));
    assert!(text.contains("Missing: 1"));
    assert!(text.contains("Unmapped: 1"));
    assert!(text.contains("Total: 6"));
}

#[test]
fn test_statistics_percentages() {
    let stats = MappingStatistics {
        direct: 3,
        transform: 1,
        default: 0,
        missing: 0,
        unmapped: 0,
    };
    assert_eq!(stats.percent(stats.direct), 75.0);
    assert_eq!(stats.resolved(), 4);
    assert_eq!(MappingStatistics::default().percent(0), 0.0);
}

#[test]
fn test_result_serializes_kinds_in_snake_case() {
    let mut tracker = ProvenanceTracker::new();
    tracker.record_default(Some("env.parallelism"), "1", "Applied default value: 1");

    let json = serde_json::to_value(tracker.to_result()).unwrap();
    assert_eq!(json["defaults"][0]["kind"], "default");
    assert!(json["defaults"][0].get("source_path").is_none());
}

#[test]
fn test_failed_result() {
    let result = MappingResult::failed("boom");
    assert!(!result.success);
    assert_eq!(result.error_message.as_deref(), Some("boom"));
    assert!(result.is_empty());
}
