//! Field path parsing and namespace normalization
//!
//! Path grammar: `segment(.segment|[idx])*`. A path that starts with the
//! source namespace (`datax.` by default) is normalized onto the document's
//! `job` root before lookup; only such paths take part in reference counting.

use std::fmt;

/// Namespace prefix marking a template path as a source-document path
pub const DEFAULT_NAMESPACE: &str = "datax";

/// Top-level key of a source document
pub const ROOT_KEY: &str = "job";

/// One `[...]` suffix of a path segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentIndex {
    At(usize),
    /// Text between the brackets that is not a non-negative integer
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub name: String,
    pub indices: Vec<SegmentIndex>,
}

impl PathSegment {
    fn parse(raw: &str) -> Self {
        let Some(open) = raw.find('[') else {
            return Self {
                name: raw.to_string(),
                indices: Vec::new(),
            };
        };

        let name = raw[..open].to_string();
        let mut indices = Vec::new();
        let mut rest = &raw[open..];

        while let Some(stripped) = rest.strip_prefix('[') {
            match stripped.find(']') {
                Some(close) => {
                    let text = stripped[..close].trim();
                    indices.push(match text.parse::<usize>() {
                        Ok(i) => SegmentIndex::At(i),
                        Err(_) => SegmentIndex::Invalid(text.to_string()),
                    });
                    rest = &stripped[close + 1..];
                }
                None => {
                    indices.push(SegmentIndex::Invalid(stripped.to_string()));
                    rest = "";
                }
            }
        }

        if !rest.is_empty() {
            indices.push(SegmentIndex::Invalid(rest.to_string()));
        }

        Self { name, indices }
    }

    /// A segment with neither a key nor an index selects nothing
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.indices.is_empty()
    }
}

/// A parsed template path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    normalized: String,
    namespaced: bool,
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Parse `raw` and normalize it against `namespace`
    ///
    /// Parsing never fails; malformed segments and indices are kept and
    /// reported when the path is resolved.
    pub fn parse(raw: &str, namespace: &str) -> Self {
        let raw = raw.trim();
        let (normalized, namespaced) = normalize(raw, namespace);
        let segments = normalized.split('.').map(PathSegment::parse).collect();

        Self {
            raw: raw.to_string(),
            normalized,
            namespaced,
            segments,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Path relative to the document root, e.g. `job.setting.speed.channel`
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Whether the path carried the source namespace prefix
    pub fn is_namespaced(&self) -> bool {
        self.namespaced
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.normalized)
    }
}

/// Strip the namespace prefix, mapping it onto the `job` root
///
/// `datax.job.x` becomes `job.x`; any other `datax.y` becomes `job.y`.
pub fn normalize(raw: &str, namespace: &str) -> (String, bool) {
    let Some(rest) = raw
        .strip_prefix(namespace)
        .and_then(|r| r.strip_prefix('.'))
    else {
        return (raw.to_string(), false);
    };

    let root_prefix = format!("{}.", ROOT_KEY);
    if rest.starts_with(&root_prefix) {
        (rest.to_string(), true)
    } else {
        (format!("{}{}", root_prefix, rest), true)
    }
}
