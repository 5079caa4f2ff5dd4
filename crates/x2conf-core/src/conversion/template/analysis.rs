//! Static analysis of template field mappings
//!
//! Reports which source paths feed which target fields without resolving
//! anything against a document.

use crate::conversion::filter::split_top_level;
use crate::conversion::template::expression::scan_expressions;
use crate::conversion::template::scanner::StructureStack;
use crate::conversion::template::ResolverOptions;
use serde::{Deserialize, Serialize};

/// Source paths referenced on the line defining one target field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub target: String,
    pub sources: Vec<String>,
}

/// Map target fields to the source paths referenced on their lines
///
/// Targets are prefixed with `kind` when given and keep first-seen order; a
/// target defined twice keeps the later line's sources.
pub fn analyze_field_mappings(
    text: &str,
    kind: Option<&str>,
    options: &ResolverOptions,
) -> Vec<FieldMapping> {
    let mut mappings: Vec<FieldMapping> = Vec::new();
    let mut stack = StructureStack::new(options.indent_unit, options.tab_width);

    for line in text.split('\n') {
        stack.observe(line);

        let sources: Vec<String> = scan_expressions(line)
            .iter()
            .filter_map(|span| expression_path(span.inner))
            .collect();
        if sources.is_empty() {
            continue;
        }

        let local = stack.target_path(line.trim());
        let target = match kind.filter(|k| !k.is_empty()) {
            Some(kind) if local.is_empty() => kind.to_string(),
            Some(kind) => format!("{}.{}", kind, local),
            None => local,
        };

        match mappings.iter_mut().find(|m| m.target == target) {
            Some(existing) => existing.sources = sources,
            None => mappings.push(FieldMapping { target, sources }),
        }
    }

    mappings
}

fn expression_path(inner: &str) -> Option<String> {
    let path = match split_top_level(inner, '|') {
        Ok(parts) => parts.first().copied().map(str::trim).unwrap_or_default(),
        Err(_) => inner.split('|').next().unwrap_or_default().trim(),
    };
    (!path.is_empty()).then(|| path.to_string())
}
