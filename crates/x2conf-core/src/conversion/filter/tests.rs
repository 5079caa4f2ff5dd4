//! Tests for filter chain parsing and evaluation
//!
//! Copyright (c) 2025 x2conf Team
//! Licensed under the Apache-2.0 license

use super::*;
use crate::conversion::catalog::{Manifest, TransformerTable};
use crate::conversion::context::{DefaultGuard, ResolutionContext};
use crate::conversion::provenance::{MappingKind, ProvenanceTracker};

fn evaluate(chain: &str, input: &str, ctx: &ResolutionContext) -> (String, ProvenanceTracker) {
    let mut tracker = ProvenanceTracker::new();
    let chain = FilterChain::parse(chain).unwrap();
    let value = ChainEvaluator::new(FilterRegistry::builtin_only()).evaluate(
        &chain,
        input.to_string(),
        ctx,
        &mut tracker,
    );
    (value, tracker)
}

fn target() -> ResolutionContext {
    ResolutionContext::new()
        .for_target("sink.path")
        .with_source("job.content[0].writer.parameter.path")
}

#[test]
fn test_parse_chain_respects_quotes_and_parens() {
    let chain =
        FilterChain::parse("default('a|b') | replace(\"x,y\") | regex_extract('(a|b)(c)', '$1')")
            .unwrap();

    let names: Vec<&str> = chain.names().collect();
    assert_eq!(names, vec!["default", "replace", "regex_extract"]);
    assert_eq!(chain.stages()[0].argument().as_deref(), Some("a|b"));
    assert_eq!(chain.stages()[1].argument().as_deref(), Some("x,y"));
    assert_eq!(
        chain.stages()[2].arguments(),
        vec!["(a|b)(c)".to_string(), "$1".to_string()]
    );
}

#[test]
fn test_parse_errors() {
    assert!(matches!(
        FilterChain::parse("upper || lower"),
        Err(FilterParseError::EmptyName { .. })
    ));
    assert!(matches!(
        FilterChain::parse("default('x'"),
        Err(FilterParseError::UnclosedParen { .. })
    ));
    assert!(matches!(
        FilterChain::parse("default('x)"),
        Err(FilterParseError::UnterminatedQuote { .. })
    ));
    assert!(matches!(
        FilterChain::parse("default('x') tail"),
        Err(FilterParseError::InvalidName { .. })
    ));
    assert!(matches!(
        FilterChain::parse("(x)"),
        Err(FilterParseError::EmptyName { .. })
    ));
}

#[test]
fn test_non_identifier_names_parse() {
    let chain = FilterChain::parse("my-mapper | format.v2('x')").unwrap();
    assert_eq!(chain.names().collect::<Vec<_>>(), vec!["my-mapper", "format.v2"]);
}

#[test]
fn test_parse_error_converts_to_template_syntax() {
    let err: crate::Error = FilterChain::parse("a ||").unwrap_err().into();
    assert!(matches!(err, crate::Error::TemplateSyntax { .. }));
}

#[test]
fn test_empty_chain() {
    let chain = FilterChain::parse("   ").unwrap();
    assert!(chain.is_empty());
    assert!(chain.first().is_none());
}

#[test]
fn test_default_supplies_value() {
    let ctx = target().guarded_by(DefaultGuard::Leading);
    let (value, tracker) = evaluate("default('/tmp/out')", "", &ctx);

    assert_eq!(value, "/tmp/out");
    let result = tracker.to_result();
    assert_eq!(result.defaults.len(), 1);
    assert_eq!(result.defaults[0].note, "Applied default value: /tmp/out");
    assert_eq!(result.defaults[0].target_path.as_deref(), Some("sink.path"));
    assert!(result.direct.is_empty());
}

#[test]
fn test_default_keeps_original() {
    let ctx = target().guarded_by(DefaultGuard::Leading);
    let (value, tracker) = evaluate("default('/tmp/out')", "/warehouse", &ctx);

    assert_eq!(value, "/warehouse");
    let result = tracker.to_result();
    assert_eq!(result.direct.len(), 1);
    assert_eq!(
        result.direct[0].note,
        "Used original value, default value not applied"
    );
    assert_eq!(
        result.direct[0].source_path.as_deref(),
        Some("job.content[0].writer.parameter.path")
    );
}

#[test]
fn test_changed_stage_records_transform() {
    let (value, tracker) = evaluate("upper", "orc", &target());

    assert_eq!(value, "ORC");
    let result = tracker.to_result();
    assert_eq!(result.transform.len(), 1);
    assert_eq!(result.transform[0].filter_name(), Some("upper"));
    assert_eq!(result.transform[0].value.as_deref(), Some("ORC"));
}

#[test]
fn test_unchanged_stage_records_nothing() {
    let (value, tracker) = evaluate("upper", "ORC", &target());
    assert_eq!(value, "ORC");
    assert!(tracker.is_empty());
}

#[test]
fn test_regex_extract_records_once() {
    let (value, tracker) = evaluate(
        "regex_extract('/warehouse/([^/]+)/.*','$1')",
        "/warehouse/test_ods/ods_user_info/",
        &target(),
    );

    assert_eq!(value, "test_ods");
    let result = tracker.to_result();
    assert_eq!(result.transform.len(), 1);
    assert_eq!(result.transform[0].filter_name(), Some("regex_extract"));
}

#[test]
fn test_filter_order_matters() {
    let (upper_first, _) = evaluate("upper | default('y')", "orc", &target());
    let (default_first, _) = evaluate("default('y') | upper", "", &target());
    let (default_present, _) = evaluate("default('y') | upper", "orc", &target());

    assert_eq!(upper_first, "ORC");
    assert_eq!(default_first, "Y");
    assert_eq!(default_present, "ORC");
}

#[test]
fn test_complex_context_records_nothing() {
    let ctx = target().as_complex(true);
    let (value, tracker) = evaluate("split('/') | get(2) | upper", "/a/b/c", &ctx);

    assert_eq!(value, "B");
    assert!(tracker.is_empty());
}

#[test]
fn test_unsupported_filter_passes_through() {
    let (value, tracker) = evaluate("no_such_filter | upper", "x", &target());
    assert_eq!(value, "X");
    assert_eq!(tracker.count(MappingKind::Transform), 1);
}

#[test]
fn test_transformer_from_catalog() {
    let manifest = Manifest::new().with_transformer(
        "jdbc_driver_mapper",
        TransformerTable::new()
            .with_entry("mysql", "com.mysql.cj.jdbc.Driver")
            .with_entry("postgresql", "org.postgresql.Driver"),
    );
    let registry = FilterRegistry::with_catalog(&manifest);
    assert!(registry.is_known("jdbc_driver_mapper"));
    assert!(!FilterRegistry::builtin_only().is_known("jdbc_driver_mapper"));

    let chain = FilterChain::parse("jdbc_driver_mapper").unwrap();
    let mut tracker = ProvenanceTracker::new();
    let value = ChainEvaluator::new(registry).evaluate(
        &chain,
        "jdbc:mysql://localhost:3306/test_db".to_string(),
        &target(),
        &mut tracker,
    );

    assert_eq!(value, "com.mysql.cj.jdbc.Driver");
    assert_eq!(
        tracker.to_result().transform[0].filter_name(),
        Some("jdbc_driver_mapper")
    );
}

#[test]
fn test_split_join_roundtrip_in_chain() {
    let (value, tracker) = evaluate("split(',') | join(' - ')", "id,name", &target());
    assert_eq!(value, "id - name");
    // split renders back to the same text, so only join counts as a change
    assert_eq!(tracker.count(MappingKind::Transform), 1);
}
