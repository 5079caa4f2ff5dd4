//! Template catalog and template loading collaborators
//!
//! The assembler never reads files or manifests on its own. It asks a
//! [`TemplateCatalog`] which template path serves a given reader/writer type
//! and which transformer tables exist, and a [`TemplateLoader`] for the text
//! behind a path. [`Manifest`] and [`MemoryTemplates`] are the in-memory
//! implementations; the CLI fills them from YAML and the filesystem.
//!
//! Copyright (c) 2025 x2conf Team
//! Licensed under the Apache-2.0 license

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Template fragment kinds assembled into one configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Env,
    Source,
    Sink,
}

impl TemplateKind {
    /// Fallback template used when the catalog has no entry for a type
    pub fn fallback_template(&self) -> &'static str {
        match self {
            TemplateKind::Env => "datax/env/batch-env.conf",
            TemplateKind::Source => "datax/sources/jdbc-source.conf",
            TemplateKind::Sink => "datax/sinks/hdfs-sink.conf",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKind::Env => write!(f, "env"),
            TemplateKind::Source => write!(f, "source"),
            TemplateKind::Sink => write!(f, "sink"),
        }
    }
}

/// Ordered substring table backing a transformer filter
///
/// Matching is a case-insensitive "contains" test; the first pattern in
/// declaration order wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformerTable {
    entries: Vec<(String, String)>,
}

impl TransformerTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pattern, keeping declaration order
    pub fn with_entry(mut self, pattern: impl Into<String>, mapped: impl Into<String>) -> Self {
        self.push(pattern, mapped);
        self
    }

    pub fn push(&mut self, pattern: impl Into<String>, mapped: impl Into<String>) {
        self.entries.push((pattern.into(), mapped.into()));
    }

    /// Look up the mapped value for `value`, if any pattern matches
    pub fn lookup(&self, value: &str) -> Option<&str> {
        let haystack = value.to_lowercase();
        self.entries
            .iter()
            .find(|(pattern, _)| haystack.contains(&pattern.to_lowercase()))
            .map(|(_, mapped)| mapped.as_str())
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: Into<String>, M: Into<String>> FromIterator<(P, M)> for TransformerTable {
    fn from_iter<I: IntoIterator<Item = (P, M)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(p, m)| (p.into(), m.into()))
                .collect(),
        }
    }
}

/// Read-only lookup of templates and transformers
pub trait TemplateCatalog {
    /// Template path for a fragment kind and a (case-insensitive) type name
    fn template_for(&self, kind: TemplateKind, type_name: &str) -> Option<&str>;

    /// Transformer table declared under `name`
    fn transformer(&self, name: &str) -> Option<&TransformerTable>;
}

/// Source of template text by path
pub trait TemplateLoader {
    fn load(&self, path: &str) -> Result<String>;
}

/// In-memory template catalog
///
/// Built once, then shared read-only; it holds no interior mutability and is
/// safe to share across threads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    source_mappings: HashMap<String, String>,
    sink_mappings: HashMap<String, String>,
    env_mappings: HashMap<String, String>,
    transformers: HashMap<String, TransformerTable>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template for a reader (`Source`), writer (`Sink`) or job type (`Env`)
    pub fn with_template(
        mut self,
        kind: TemplateKind,
        type_name: impl AsRef<str>,
        path: impl Into<String>,
    ) -> Self {
        self.insert_template(kind, type_name, path);
        self
    }

    pub fn insert_template(
        &mut self,
        kind: TemplateKind,
        type_name: impl AsRef<str>,
        path: impl Into<String>,
    ) {
        let key = type_name.as_ref().to_lowercase();
        self.mappings_mut(kind).insert(key, path.into());
    }

    /// Register a transformer table
    pub fn with_transformer(mut self, name: impl Into<String>, table: TransformerTable) -> Self {
        self.insert_transformer(name, table);
        self
    }

    pub fn insert_transformer(&mut self, name: impl Into<String>, table: TransformerTable) {
        self.transformers.insert(name.into(), table);
    }

    pub fn is_supported(&self, kind: TemplateKind, type_name: &str) -> bool {
        self.mappings(kind).contains_key(&type_name.to_lowercase())
    }

    /// Supported type names for a kind, sorted
    pub fn supported_types(&self, kind: TemplateKind) -> Vec<&str> {
        let mut names: Vec<&str> = self.mappings(kind).keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn transformer_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.transformers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn mappings(&self, kind: TemplateKind) -> &HashMap<String, String> {
        match kind {
            TemplateKind::Env => &self.env_mappings,
            TemplateKind::Source => &self.source_mappings,
            TemplateKind::Sink => &self.sink_mappings,
        }
    }

    fn mappings_mut(&mut self, kind: TemplateKind) -> &mut HashMap<String, String> {
        match kind {
            TemplateKind::Env => &mut self.env_mappings,
            TemplateKind::Source => &mut self.source_mappings,
            TemplateKind::Sink => &mut self.sink_mappings,
        }
    }
}

impl TemplateCatalog for Manifest {
    fn template_for(&self, kind: TemplateKind, type_name: &str) -> Option<&str> {
        self.mappings(kind)
            .get(&type_name.to_lowercase())
            .map(String::as_str)
    }

    fn transformer(&self, name: &str) -> Option<&TransformerTable> {
        self.transformers.get(name)
    }
}

/// In-memory template loader keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemoryTemplates {
    templates: HashMap<String, String>,
}

impl MemoryTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.templates.insert(path.into(), text.into());
    }
}

impl TemplateLoader for MemoryTemplates {
    fn load(&self, path: &str) -> Result<String> {
        self.templates
            .get(path)
            .cloned()
            .ok_or_else(|| Error::TemplateNotFound {
                path: path.to_string(),
            })
    }
}
