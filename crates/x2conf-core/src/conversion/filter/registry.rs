//! Filter dispatch by name
//!
//! Built-ins resolve first; any other name is looked up as a transformer in
//! the catalog, when one is attached.

use crate::conversion::catalog::{TemplateCatalog, TransformerTable};
use crate::conversion::filter::builtin::BuiltinFilter;
use crate::conversion::filter::parser::FilterInvocation;
use crate::conversion::filter::value::FilterValue;
use tracing::debug;

/// A resolved filter implementation
#[derive(Debug, Clone, Copy)]
pub enum Filter<'a> {
    Builtin(BuiltinFilter),
    Transformer(&'a TransformerTable),
}

impl Filter<'_> {
    pub fn apply(&self, value: FilterValue, invocation: &FilterInvocation) -> FilterValue {
        match self {
            Filter::Builtin(builtin) => builtin.apply(value, invocation),
            Filter::Transformer(table) => {
                let text = value.into_text();
                match table.lookup(&text) {
                    Some(mapped) => {
                        debug!(transformer = %invocation.name, from = %text, to = mapped, "transformer matched");
                        FilterValue::Text(mapped.to_string())
                    }
                    None => FilterValue::Text(text),
                }
            }
        }
    }
}

#[derive(Clone, Copy, Default)]
pub struct FilterRegistry<'a> {
    catalog: Option<&'a dyn TemplateCatalog>,
}

impl<'a> FilterRegistry<'a> {
    /// Registry that knows only the built-in filters
    pub fn builtin_only() -> Self {
        Self { catalog: None }
    }

    /// Registry that also resolves transformers declared in `catalog`
    pub fn with_catalog(catalog: &'a dyn TemplateCatalog) -> Self {
        Self {
            catalog: Some(catalog),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Filter<'a>> {
        if let Some(builtin) = BuiltinFilter::from_name(name) {
            return Some(Filter::Builtin(builtin));
        }
        self.catalog
            .and_then(|catalog| catalog.transformer(name))
            .map(Filter::Transformer)
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}

impl std::fmt::Debug for FilterRegistry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("catalog", &self.catalog.is_some())
            .finish()
    }
}
