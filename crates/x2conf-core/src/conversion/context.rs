//! Resolution context threaded through expression evaluation
//!
//! A [`ResolutionContext`] is an immutable value. Each line derives its own
//! context from the fragment's base context, and each expression derives one
//! from the line's, so nothing set while resolving one line can be observed by
//! the next.
//!
//! Copyright (c) 2025 x2conf Team
//! Licensed under the Apache-2.0 license

/// How a `default` filter guards the expression being evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultGuard {
    /// No `default` stage in the chain
    #[default]
    Unguarded,
    /// `default` is the first stage: the extraction itself is not recorded,
    /// the `default` stage records the outcome instead
    Leading,
    /// `default` appears later in the chain
    Trailing,
}

/// Transient state for one resolved expression
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionContext {
    target_path: Option<String>,
    source_path: Option<String>,
    guard: DefaultGuard,
    complex: bool,
}

impl ResolutionContext {
    /// Context with no target, used for `{% set %}` statements and fragment roots
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a context for a line whose expressions affect `target`
    pub fn for_target(&self, target: impl Into<String>) -> Self {
        let target = target.into();
        Self {
            target_path: if target.is_empty() { None } else { Some(target) },
            ..self.clone()
        }
    }

    /// Derive a context for a line classified as complex
    pub fn as_complex(&self, complex: bool) -> Self {
        Self {
            complex,
            ..self.clone()
        }
    }

    /// Derive a context for one expression reading `source`
    pub fn with_source(&self, source: impl Into<String>) -> Self {
        Self {
            source_path: Some(source.into()),
            ..self.clone()
        }
    }

    pub fn guarded_by(&self, guard: DefaultGuard) -> Self {
        Self {
            guard,
            ..self.clone()
        }
    }

    pub fn target_path(&self) -> Option<&str> {
        self.target_path.as_deref()
    }

    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    pub fn guard(&self) -> DefaultGuard {
        self.guard
    }

    pub fn is_complex(&self) -> bool {
        self.complex
    }

    /// Missing events are never recorded for a path guarded by `default`
    pub fn suppress_missing(&self) -> bool {
        self.guard != DefaultGuard::Unguarded
    }

    /// Whether a successful extraction records its own Direct event
    pub fn records_extraction(&self) -> bool {
        !self.complex && self.guard != DefaultGuard::Leading
    }

    /// Whether filter stages record their own events
    pub fn records_stages(&self) -> bool {
        !self.complex
    }
}
