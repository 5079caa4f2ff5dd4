//! Source tree access
//!
//! Resolves dotted and indexed paths against a parsed JSON job description
//! and keeps the reference-count table of meaningful leaf fields used for
//! unmapped detection.
//!
//! # Examples
//!
//! ```
//! use x2conf_core::conversion::source::{FieldPath, SourceDocument, DEFAULT_NAMESPACE};
//! use serde_json::json;
//!
//! let doc = SourceDocument::from_value(json!({
//!     "job": {"content": [{
//!         "reader": {"name": "mysqlreader", "parameter": {"column": ["id", "name"]}},
//!         "writer": {"name": "hdfswriter"}
//!     }]}
//! })).unwrap();
//!
//! let path = FieldPath::parse("datax.job.content[0].reader.parameter.column", DEFAULT_NAMESPACE);
//! assert_eq!(doc.resolve(&path).unwrap(), "id,name");
//! assert_eq!(doc.reader_name(), Some("mysqlreader"));
//! ```
//!
//! Copyright (c) 2025 x2conf Team
//! Licensed under the Apache-2.0 license

pub mod document;
pub mod path;
pub mod references;

#[cfg(test)]
mod tests;

pub use document::{render_scalar, SourceDocument, Unresolved};
pub use path::{FieldPath, PathSegment, SegmentIndex, DEFAULT_NAMESPACE, ROOT_KEY};
pub use references::{is_meaningful, FieldReferenceTable, ReferenceEntry};
