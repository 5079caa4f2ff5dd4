//! Parsed source document and path lookup

use crate::conversion::context::ResolutionContext;
use crate::conversion::source::path::{FieldPath, SegmentIndex, ROOT_KEY};
use crate::conversion::state::ConversionState;
use crate::error::ResolutionIssue;
use crate::{Error, Result};
use serde_json::Value;
use tracing::{debug, warn};

const DIRECT_NOTE: &str = "Directly extracted from DataX";
const NOT_FOUND_REASON: &str = "Field not found in DataX configuration";
const EMPTY_REASON: &str = "Field value is empty in DataX configuration";

/// Why a path produced no value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub issue: ResolutionIssue,
    pub reason: String,
}

impl Unresolved {
    fn new(issue: ResolutionIssue, reason: impl Into<String>) -> Self {
        Self {
            issue,
            reason: reason.into(),
        }
    }

    fn not_found() -> Self {
        Self::new(ResolutionIssue::MissingField, NOT_FOUND_REASON)
    }
}

/// Immutable JSON job description for one conversion run
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    root: Value,
}

impl SourceDocument {
    /// Parse JSON text and check the required job structure
    pub fn parse(json: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(json).map_err(|e| Error::SourceParse {
            message: format!("invalid JSON: {}", e),
            source: Some(e),
        })?;
        Self::from_value(root)
    }

    /// Wrap an already-parsed tree, checking the required job structure
    ///
    /// The root must be an object with a `job` key, `job.content` must be a
    /// non-empty array and its first element must carry `reader` and `writer`.
    pub fn from_value(root: Value) -> Result<Self> {
        let job = root
            .as_object()
            .ok_or_else(|| Error::source_parse("document root must be a JSON object"))?
            .get(ROOT_KEY)
            .ok_or_else(|| Error::source_parse("missing 'job' section"))?;

        let first = job
            .get("content")
            .and_then(Value::as_array)
            .and_then(|content| content.first())
            .ok_or_else(|| Error::source_parse("'job.content' must be a non-empty array"))?;

        for side in ["reader", "writer"] {
            if first.get(side).is_none() {
                return Err(Error::source_parse(format!(
                    "'job.content[0]' is missing '{}'",
                    side
                )));
            }
        }

        Ok(Self { root })
    }

    /// Wrap a tree without any structure check
    pub fn unchecked(root: Value) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn reader_name(&self) -> Option<&str> {
        self.root
            .pointer("/job/content/0/reader/name")
            .and_then(Value::as_str)
    }

    pub fn writer_name(&self) -> Option<&str> {
        self.root
            .pointer("/job/content/0/writer/name")
            .and_then(Value::as_str)
    }

    /// Resolve a path to its text without recording anything
    ///
    /// A trailing array resolves to its comma-joined elements.
    pub fn resolve(&self, path: &FieldPath) -> std::result::Result<String, Unresolved> {
        let mut node = &self.root;

        for segment in path.segments() {
            if segment.is_empty() {
                return Err(Unresolved::new(
                    ResolutionIssue::MalformedPath,
                    format!("Invalid path segment in: {}", path.normalized()),
                ));
            }

            if !segment.name.is_empty() {
                node = node.get(&segment.name).ok_or_else(Unresolved::not_found)?;
            }

            for index in &segment.indices {
                node = match index {
                    SegmentIndex::At(i) => node
                        .as_array()
                        .and_then(|items| items.get(*i))
                        .ok_or_else(Unresolved::not_found)?,
                    SegmentIndex::Invalid(text) => {
                        return Err(Unresolved::new(
                            ResolutionIssue::MalformedPath,
                            format!("Invalid array index: {}", text),
                        ))
                    }
                };
            }
        }

        match node {
            Value::Null => Err(Unresolved::new(ResolutionIssue::EmptyValue, EMPTY_REASON)),
            Value::Array(items) => Ok(items
                .iter()
                .map(render_scalar)
                .collect::<Vec<_>>()
                .join(",")),
            other => Ok(render_scalar(other)),
        }
    }

    /// Resolve a path for a template expression, recording its provenance
    ///
    /// Namespaced paths count as references whether or not they resolve. A
    /// non-empty value records a Direct event unless `ctx` defers recording;
    /// a failure records a Missing event unless `ctx` suppresses it. Failures
    /// always yield an empty string.
    pub fn extract(
        &self,
        path: &FieldPath,
        ctx: &ResolutionContext,
        state: &mut ConversionState,
    ) -> String {
        if path.is_namespaced() {
            state.references_mut().increment(path.normalized());
        }

        match self.resolve(path) {
            Ok(value) => {
                if ctx.records_extraction() && !value.is_empty() {
                    state.tracker_mut().record_direct(
                        Some(path.normalized()),
                        ctx.target_path(),
                        &value,
                        DIRECT_NOTE,
                    );
                }
                value
            }
            Err(unresolved) => {
                match unresolved.issue {
                    ResolutionIssue::MalformedPath => {
                        warn!(path = %path, reason = %unresolved.reason, "malformed field path")
                    }
                    issue => debug!(path = %path, %issue, "field not resolved"),
                }

                if !ctx.suppress_missing() {
                    state.tracker_mut().record_missing(
                        path.normalized(),
                        ctx.target_path(),
                        &unresolved.reason,
                    );
                }
                String::new()
            }
        }
    }
}

/// Natural text of a JSON value
///
/// Strings render raw, numbers and booleans as their literal text, null as
/// empty and nested containers as compact JSON.
pub fn render_scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        container => container.to_string(),
    }
}
