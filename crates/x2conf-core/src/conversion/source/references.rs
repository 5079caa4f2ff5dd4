//! Reference counting for meaningful source fields
//!
//! The table is built once per conversion from the source document, mutated
//! only through [`FieldReferenceTable::increment`], and read once at the end to
//! find fields no template consumed.

use crate::conversion::source::document::render_scalar;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry {
    pub path: String,
    pub value: String,
    pub count: usize,
}

/// Meaningful leaf path -> (original value, reference count)
#[derive(Debug, Clone, Default)]
pub struct FieldReferenceTable {
    entries: Vec<ReferenceEntry>,
    index: HashMap<String, usize>,
}

impl FieldReferenceTable {
    /// Walk `root` and keep only meaningful leaves, all counts starting at zero
    ///
    /// Arrays of scalars collapse into one entry keyed by the array path whose
    /// value is the index-ordered, comma-joined element text.
    pub fn build(root: &Value) -> Self {
        let mut table = Self::default();
        collect(root, String::new(), &mut table);
        debug!(fields = table.total(), "built field reference table");
        table
    }

    /// Increment `path`, propagating between an array and its elements
    pub fn increment(&mut self, path: &str) {
        self.bump(path);

        // Whole array referenced: every literal element key counts too
        let element_prefix = format!("{}[", path);
        let elements: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| is_element_key(&e.path, &element_prefix))
            .map(|(i, _)| i)
            .collect();
        for i in elements {
            self.entries[i].count += 1;
        }

        // Single element referenced: the parent array counts too
        if let Some(parent) = parent_array(path) {
            self.bump(parent);
        }
    }

    pub fn get(&self, path: &str) -> Option<&ReferenceEntry> {
        self.index.get(path).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Unreferenced entries as (path, original value), in table order
    pub fn unreferenced(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter(|e| e.count == 0)
            .map(|e| (e.path.as_str(), e.value.as_str()))
    }

    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    pub fn referenced_count(&self) -> usize {
        self.entries.iter().filter(|e| e.count > 0).count()
    }

    pub fn unreferenced_count(&self) -> usize {
        self.entries.iter().filter(|e| e.count == 0).count()
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    /// Set every count back to zero
    pub fn clear_counts(&mut self) {
        for entry in &mut self.entries {
            entry.count = 0;
        }
    }

    fn insert(&mut self, path: String, value: String) {
        if is_meaningful(&path) && !self.index.contains_key(&path) {
            trace!(path = %path, "meaningful field");
            self.index.insert(path.clone(), self.entries.len());
            self.entries.push(ReferenceEntry {
                path,
                value,
                count: 0,
            });
        }
    }

    fn bump(&mut self, path: &str) {
        if let Some(&i) = self.index.get(path) {
            self.entries[i].count += 1;
        }
    }
}

/// Reader/writer parameters under `content[...]`, or anything under `setting`
pub fn is_meaningful(path: &str) -> bool {
    (path.contains(".content[")
        && (path.contains(".reader.parameter.") || path.contains(".writer.parameter.")))
        || path.contains(".setting.")
}

fn collect(node: &Value, path: String, table: &mut FieldReferenceTable) {
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                collect(child, child_path, table);
            }
        }
        Value::Array(items) => {
            let scalars: Vec<String> = items
                .iter()
                .filter(|item| !item.is_object() && !item.is_array())
                .map(render_scalar)
                .collect();
            if !scalars.is_empty() {
                table.insert(path.clone(), scalars.join(","));
            }

            for (i, item) in items.iter().enumerate() {
                if item.is_object() || item.is_array() {
                    collect(item, format!("{}[{}]", path, i), table);
                }
            }
        }
        scalar => table.insert(path, render_scalar(scalar)),
    }
}

/// `x[3]` is an element key of prefix `x[`
fn is_element_key(candidate: &str, element_prefix: &str) -> bool {
    candidate
        .strip_prefix(element_prefix)
        .and_then(|rest| rest.strip_suffix(']'))
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// `x[3]` -> `x`
fn parent_array(path: &str) -> Option<&str> {
    let open = path.rfind('[')?;
    let digits = path[open + 1..].strip_suffix(']')?;
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        Some(&path[..open])
    } else {
        None
    }
}
