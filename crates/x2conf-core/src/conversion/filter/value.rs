//! Value threaded through a filter chain

use std::fmt;

/// Either plain text or the list produced by `split`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    List(Vec<String>),
}

impl FilterValue {
    /// Text form of the value; a list renders as its comma-joined elements
    pub fn render(&self) -> String {
        match self {
            FilterValue::Text(text) => text.clone(),
            FilterValue::List(items) => items.join(","),
        }
    }

    pub fn into_text(self) -> String {
        match self {
            FilterValue::Text(text) => text,
            FilterValue::List(items) => items.join(","),
        }
    }

    /// Whether the rendered text is empty
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Text(text) => text.is_empty(),
            FilterValue::List(items) => items.len() <= 1 && items.iter().all(String::is_empty),
        }
    }
}

impl Default for FilterValue {
    fn default() -> Self {
        FilterValue::Text(String::new())
    }
}

impl From<String> for FilterValue {
    fn from(text: String) -> Self {
        FilterValue::Text(text)
    }
}

impl From<&str> for FilterValue {
    fn from(text: &str) -> Self {
        FilterValue::Text(text.to_string())
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}
