//! Filter chain parser
//!
//! Splits `f1 | f2(args) | f3('a|b', "c,d")` into invocations. Pipes and
//! commas inside quotes or parentheses never split.
//!
//! Copyright (c) 2025 x2conf Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Errors raised while parsing a filter chain
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterParseError {
    #[error("Empty filter name in '{input}'")]
    EmptyName { input: String },

    #[error("Invalid filter name '{name}'")]
    InvalidName { name: String },

    #[error("Unclosed parenthesis in filter '{stage}'")]
    UnclosedParen { stage: String },

    #[error("Unterminated quote in '{input}'")]
    UnterminatedQuote { input: String },
}

impl From<FilterParseError> for crate::Error {
    fn from(err: FilterParseError) -> Self {
        crate::Error::TemplateSyntax {
            message: err.to_string(),
            fragment: None,
        }
    }
}

/// One `name` or `name(args)` stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterInvocation {
    pub name: String,
    /// Text between the parentheses, untrimmed and still quoted
    pub raw_args: Option<String>,
}

impl FilterInvocation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw_args: None,
        }
    }

    pub fn with_args(name: impl Into<String>, raw_args: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw_args: Some(raw_args.into()),
        }
    }

    /// Parse a single stage
    pub fn parse(stage: &str) -> Result<Self, FilterParseError> {
        let stage = stage.trim();
        if stage.is_empty() {
            return Err(FilterParseError::EmptyName {
                input: stage.to_string(),
            });
        }

        let invocation = match stage.find('(') {
            None => Self::new(stage),
            Some(open) => {
                let close = matching_paren(stage, open).ok_or_else(|| {
                    FilterParseError::UnclosedParen {
                        stage: stage.to_string(),
                    }
                })?;
                if !stage[close + 1..].trim().is_empty() {
                    return Err(FilterParseError::InvalidName {
                        name: stage.to_string(),
                    });
                }
                Self::with_args(stage[..open].trim(), &stage[open + 1..close])
            }
        };

        if invocation.name.is_empty() {
            return Err(FilterParseError::EmptyName {
                input: stage.to_string(),
            });
        }

        Ok(invocation)
    }

    /// The whole argument, trimmed and with one pair of outer quotes removed
    pub fn argument(&self) -> Option<String> {
        self.raw_args.as_deref().map(|raw| unquote(raw.trim()).to_string())
    }

    /// Comma-separated arguments, each trimmed and unquoted
    pub fn arguments(&self) -> Vec<String> {
        let Some(raw) = self.raw_args.as_deref() else {
            return Vec::new();
        };
        if raw.trim().is_empty() {
            return Vec::new();
        }
        split_top_level(raw, ',')
            .map(|parts| parts.into_iter().map(|p| unquote(p.trim()).to_string()).collect())
            .unwrap_or_else(|_| vec![unquote(raw.trim()).to_string()])
    }
}

/// Ordered list of filter invocations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterChain {
    stages: Vec<FilterInvocation>,
}

impl FilterChain {
    /// Parse `f1 | f2(args) | ...`; an empty string is an empty chain
    pub fn parse(text: &str) -> Result<Self, FilterParseError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Self::from_stages(split_top_level(text, '|')?)
    }

    pub fn from_stages<'s, I>(stages: I) -> Result<Self, FilterParseError>
    where
        I: IntoIterator<Item = &'s str>,
    {
        let stages = stages
            .into_iter()
            .map(FilterInvocation::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { stages })
    }

    pub fn stages(&self) -> &[FilterInvocation] {
        &self.stages
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|s| s.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names().any(|n| n == name)
    }

    pub fn first(&self) -> Option<&FilterInvocation> {
        self.stages.first()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Split on `sep` outside quotes and parentheses
pub fn split_top_level(input: &str, sep: char) -> Result<Vec<&str>, FilterParseError> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                c if c == sep && depth == 0 => {
                    parts.push(&input[start..i]);
                    start = i + c.len_utf8();
                }
                _ => {}
            },
        }
    }

    if quote.is_some() {
        return Err(FilterParseError::UnterminatedQuote {
            input: input.to_string(),
        });
    }

    parts.push(&input[start..]);
    Ok(parts)
}

/// Byte offset of the `)` closing the `(` at `open`, skipping quoted text
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (i, c) in text[open..].char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(open + i);
                    }
                }
                _ => {}
            },
        }
    }
    None
}

/// Remove one pair of matching outer quotes
pub fn unquote(text: &str) -> &str {
    for q in ['\'', '"'] {
        if text.len() >= 2 && text.starts_with(q) && text.ends_with(q) {
            return &text[1..text.len() - 1];
        }
    }
    text
}
