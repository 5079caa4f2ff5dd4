//! Structural path tracking from indentation and braces

use crate::conversion::template::expression::EXPRESSION_OPEN;

/// Stack of block names enclosing the current line
///
/// Depth follows indentation: before a line is handled the stack is cut down
/// to `indent / indent_unit` entries. Blank and comment lines never touch it.
#[derive(Debug, Clone)]
pub struct StructureStack {
    segments: Vec<String>,
    indent_unit: usize,
    tab_width: usize,
}

impl StructureStack {
    pub fn new(indent_unit: usize, tab_width: usize) -> Self {
        Self {
            segments: Vec::new(),
            indent_unit: indent_unit.max(1),
            tab_width,
        }
    }

    /// Update the stack for `line`
    pub fn observe(&mut self, line: &str) {
        let trimmed = line.trim();
        if is_blank_or_comment(trimmed) {
            return;
        }

        let depth = self.indent_width(line) / self.indent_unit;
        self.segments.truncate(depth);

        if let Some(head) = trimmed.strip_suffix('{') {
            let open = trimmed.find('{').unwrap_or(head.len());
            let key = trimmed[..open].trim().trim_end_matches('=').trim_end();
            if !key.is_empty() {
                self.segments.push(key.to_string());
            }
        }
    }

    /// Target field path of a line: the enclosing blocks plus its own key
    pub fn target_path(&self, trimmed: &str) -> String {
        let mut parts: Vec<&str> = self.segments.iter().map(String::as_str).collect();
        if let Some(key) = config_key(trimmed) {
            parts.push(key);
        }
        parts.join(".")
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Leading whitespace width, a tab counting as `tab_width` spaces
    pub fn indent_width(&self, line: &str) -> usize {
        line.chars()
            .map_while(|c| match c {
                ' ' => Some(1),
                '\t' => Some(self.tab_width),
                _ => None,
            })
            .sum()
    }
}

/// Key of a `key = value` line; the key may not itself contain an expression
pub fn config_key(trimmed: &str) -> Option<&str> {
    let (key, _) = trimmed.split_once('=')?;
    let key = key.trim();
    if key.is_empty() || key.contains(EXPRESSION_OPEN) {
        None
    } else {
        Some(key)
    }
}

pub fn is_blank_or_comment(trimmed: &str) -> bool {
    trimmed.is_empty() || trimmed.starts_with('#')
}
