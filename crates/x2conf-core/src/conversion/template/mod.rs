//! Template parsing, structural context tracking and resolution
//!
//! Templates are block-structured text with `{{ path | filters }}`
//! expressions and `{% set name = expr %}` local assignments. Every resolved
//! expression is attributed to the target field path derived from the
//! enclosing blocks and the line's own `key =`.
//!
//! # Examples
//!
//! ```
//! use x2conf_core::conversion::filter::FilterRegistry;
//! use x2conf_core::conversion::source::SourceDocument;
//! use x2conf_core::conversion::state::ConversionState;
//! use x2conf_core::conversion::template::{ResolverOptions, TemplateResolver};
//! use serde_json::json;
//!
//! let doc = SourceDocument::from_value(json!({
//!     "job": {"content": [{
//!         "reader": {"name": "mysqlreader", "parameter": {"username": "root"}},
//!         "writer": {"name": "hdfswriter", "parameter": {}}
//!     }]}
//! })).unwrap();
//!
//! let template = "source {\n  Jdbc {\n    user = \"{{ datax.job.content[0].reader.parameter.username }}\"\n  }\n}";
//! let mut state = ConversionState::new(&doc);
//! let resolver = TemplateResolver::new(&doc, FilterRegistry::builtin_only(), ResolverOptions::default());
//! let text = resolver.resolve(template, &mut state).unwrap();
//!
//! assert!(text.contains("user = \"root\""));
//! let result = state.finish();
//! assert_eq!(result.direct[0].target_path.as_deref(), Some("source.Jdbc.user"));
//! ```
//!
//! Copyright (c) 2025 x2conf Team
//! Licensed under the Apache-2.0 license

pub mod analysis;
pub mod expression;
pub mod resolver;
pub mod scanner;
pub mod validation;


pub use analysis::{analyze_field_mappings, FieldMapping};
pub use expression::{
    classify_line, scan_expressions, scan_set_statements, ExpressionSpan, LineClass,
    SetStatement, TemplateExpression,
};
pub use resolver::{assignment_value, escape_markdown, TemplateResolver};
pub use scanner::StructureStack;
pub use validation::validate_template;

use crate::conversion::source::DEFAULT_NAMESPACE;
use serde::{Deserialize, Serialize};

/// Knobs for template resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    /// Leading path segment marking a source-document path
    pub namespace: String,
    /// Spaces per structural level
    pub indent_unit: usize,
    /// Spaces a tab counts for
    pub tab_width: usize,
    /// Record `key = value` lines without expressions as Default events
    pub track_hardcoded_defaults: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            indent_unit: 2,
            tab_width: 4,
            track_hardcoded_defaults: false,
        }
    }
}
