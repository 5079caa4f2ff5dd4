//! Tests for source document lookup and reference counting
//!
//! Copyright (c) 2025 x2conf Team
//! Licensed under the Apache-2.0 license

use super::*;
use crate::conversion::context::{DefaultGuard, ResolutionContext};
use crate::conversion::state::ConversionState;
use crate::error::ResolutionIssue;
use crate::Error;
use serde_json::json;

fn sample_document() -> SourceDocument {
    SourceDocument::from_value(json!({
        "job": {
            "setting": {"speed": {"channel": 3}, "errorLimit": {"record": null}},
            "content": [{
                "reader": {
                    "name": "mysqlreader",
                    "parameter": {
                        "username": "root",
                        "password": "123456",
                        "column": ["id", "name", "age"],
                        "connection": [{
                            "jdbcUrl": ["jdbc:mysql://localhost:3306/test_db"],
                            "table": ["user_info"]
                        }]
                    }
                },
                "writer": {
                    "name": "hdfswriter",
                    "parameter": {
                        "path": "/warehouse/test_ods/ods_user_info/",
                        "fileType": "orc",
                        "compress": ""
                    }
                }
            }]
        }
    }))
    .unwrap()
}

fn path(raw: &str) -> FieldPath {
    FieldPath::parse(raw, DEFAULT_NAMESPACE)
}

#[test]
fn test_structure_checks() {
    assert!(matches!(
        SourceDocument::parse("[1, 2]"),
        Err(Error::SourceParse { .. })
    ));
    assert!(matches!(
        SourceDocument::parse("{\"job\": {\"content\": []}}"),
        Err(Error::SourceParse { .. })
    ));
    assert!(matches!(
        SourceDocument::parse("{\"job\": {\"content\": [{\"reader\": {}}]}}"),
        Err(Error::SourceParse { .. })
    ));

    let err = SourceDocument::parse("{not json").unwrap_err();
    assert!(matches!(err, Error::SourceParse { source: Some(_), .. }));
    assert!(err.is_fatal_for_run());
}

#[test]
fn test_resolve_scalars() {
    let doc = sample_document();
    assert_eq!(
        doc.resolve(&path("datax.job.content[0].reader.parameter.username")),
        Ok("root".to_string())
    );
    assert_eq!(
        doc.resolve(&path("datax.job.setting.speed.channel")),
        Ok("3".to_string())
    );
    assert_eq!(
        doc.resolve(&path("datax.job.content[0].reader.parameter.connection[0].jdbcUrl[0]")),
        Ok("jdbc:mysql://localhost:3306/test_db".to_string())
    );
}

#[test]
fn test_resolve_trailing_array_joins_elements() {
    let doc = sample_document();
    assert_eq!(
        doc.resolve(&path("datax.job.content[0].reader.parameter.column")),
        Ok("id,name,age".to_string())
    );
}

#[test]
fn test_resolve_failures() {
    let doc = sample_document();

    let missing = doc
        .resolve(&path("datax.job.content[0].reader.parameter.host"))
        .unwrap_err();
    assert_eq!(missing.issue, ResolutionIssue::MissingField);
    assert_eq!(missing.reason, "Field not found in DataX configuration");

    let out_of_range = doc
        .resolve(&path("datax.job.content[5].reader.name"))
        .unwrap_err();
    assert_eq!(out_of_range.issue, ResolutionIssue::MissingField);

    let invalid = doc
        .resolve(&path("datax.job.content[first].reader.name"))
        .unwrap_err();
    assert_eq!(invalid.issue, ResolutionIssue::MalformedPath);
    assert_eq!(invalid.reason, "Invalid array index: first");

    let null = doc
        .resolve(&path("datax.job.setting.errorLimit.record"))
        .unwrap_err();
    assert_eq!(null.issue, ResolutionIssue::EmptyValue);
    assert_eq!(null.reason, "Field value is empty in DataX configuration");

    let indexed_object = doc
        .resolve(&path("datax.job.setting[0]"))
        .unwrap_err();
    assert_eq!(indexed_object.issue, ResolutionIssue::MissingField);
}

#[test]
fn test_extract_records_direct() {
    let doc = sample_document();
    let mut state = ConversionState::new(&doc);
    let ctx = ResolutionContext::new().for_target("source.Jdbc.user");

    let value = doc.extract(
        &path("datax.job.content[0].reader.parameter.username"),
        &ctx,
        &mut state,
    );

    assert_eq!(value, "root");
    let result = state.tracker().to_result();
    assert_eq!(result.direct.len(), 1);
    assert_eq!(
        result.direct[0].source_path.as_deref(),
        Some("job.content[0].reader.parameter.username")
    );
    assert_eq!(result.direct[0].target_path.as_deref(), Some("source.Jdbc.user"));
    assert_eq!(result.direct[0].note, "Directly extracted from DataX");
}

#[test]
fn test_extract_empty_string_records_nothing() {
    let doc = sample_document();
    let mut state = ConversionState::new(&doc);

    let value = doc.extract(
        &path("datax.job.content[0].writer.parameter.compress"),
        &ResolutionContext::new(),
        &mut state,
    );

    assert_eq!(value, "");
    assert!(state.tracker().is_empty());
}

#[test]
fn test_extract_missing_respects_guard() {
    let doc = sample_document();
    let mut state = ConversionState::new(&doc);
    let host = path("datax.job.content[0].reader.parameter.host");

    doc.extract(&host, &ResolutionContext::new(), &mut state);
    assert_eq!(state.tracker().statistics().missing, 1);

    let guarded = ResolutionContext::new().guarded_by(DefaultGuard::Leading);
    doc.extract(&host, &guarded, &mut state);
    assert_eq!(state.tracker().statistics().missing, 1);
}

#[test]
fn test_extract_complex_defers_direct() {
    let doc = sample_document();
    let mut state = ConversionState::new(&doc);
    let ctx = ResolutionContext::new().as_complex(true);

    let value = doc.extract(
        &path("datax.job.content[0].reader.parameter.username"),
        &ctx,
        &mut state,
    );

    assert_eq!(value, "root");
    assert!(state.tracker().is_empty());
    assert!(
        state
            .references()
            .get("job.content[0].reader.parameter.username")
            .unwrap()
            .count
            > 0
    );
}

#[test]
fn test_reference_table_keeps_meaningful_leaves() {
    let doc = sample_document();
    let table = FieldReferenceTable::build(doc.root());

    assert!(table.contains("job.content[0].reader.parameter.username"));
    assert!(table.contains("job.setting.speed.channel"));
    assert!(!table.contains("job.content[0].reader.name"));
    assert_eq!(
        table.get("job.content[0].reader.parameter.column").unwrap().value,
        "id,name,age"
    );
    assert_eq!(
        table
            .get("job.content[0].reader.parameter.connection[0].jdbcUrl")
            .unwrap()
            .value,
        "jdbc:mysql://localhost:3306/test_db"
    );
    assert_eq!(table.referenced_count(), 0);
    assert_eq!(table.unreferenced_count(), table.total());
}

#[test]
fn test_element_reference_marks_parent_array() {
    let doc = sample_document();
    let mut table = FieldReferenceTable::build(doc.root());

    table.increment("job.content[0].reader.parameter.column[0]");

    assert_eq!(table.get("job.content[0].reader.parameter.column").unwrap().count, 1);
    assert!(table
        .unreferenced()
        .all(|(p, _)| p != "job.content[0].reader.parameter.column"));
}

#[test]
fn test_array_reference_marks_element_keys() {
    let mut table = FieldReferenceTable::build(&json!({
        "job": {"setting": {"matrix": [[1, 2], [3]]}}
    }));
    assert!(table.contains("job.setting.matrix[0]"));
    assert!(table.contains("job.setting.matrix[1]"));

    table.increment("job.setting.matrix");

    assert_eq!(table.get("job.setting.matrix[0]").unwrap().count, 1);
    assert_eq!(table.get("job.setting.matrix[1]").unwrap().count, 1);
    assert_eq!(table.unreferenced_count(), 0);
}

#[test]
fn test_unknown_reference_is_ignored() {
    let doc = sample_document();
    let mut table = FieldReferenceTable::build(doc.root());
    let total = table.total();

    table.increment("job.content[0].reader.parameter.nothing");

    assert_eq!(table.total(), total);
    assert_eq!(table.referenced_count(), 0);
}

#[test]
fn test_reader_writer_names() {
    let doc = sample_document();
    assert_eq!(doc.reader_name(), Some("mysqlreader"));
    assert_eq!(doc.writer_name(), Some("hdfswriter"));
}
