//! Conversion engine for turning job JSON into block-structured configuration
//!
//! A conversion run parses one source document, resolves template fragments
//! against it and records where every output value came from. The pieces:
//!
//! - [`source`]: path lookup and reference counting over the job JSON
//! - [`template`]: expression scanning, block structure tracking, resolution
//! - [`filter`]: filter chain parsing and evaluation
//! - [`provenance`]: the five mapping-event logs and their statistics
//! - [`assembler`]: env/source/sink fragment selection and assembly
//!
//! Copyright (c) 2025 x2conf Team
//! Licensed under the Apache-2.0 license

pub mod assembler;
pub mod catalog;
pub mod context;
pub mod filter;
pub mod provenance;
pub mod source;
pub mod state;
pub mod template;

use crate::Result;

pub use assembler::{Assembly, ConfigAssembler};
pub use catalog::{
    Manifest, MemoryTemplates, TemplateCatalog, TemplateKind, TemplateLoader, TransformerTable,
};
pub use context::{DefaultGuard, ResolutionContext};
pub use provenance::{MappingEvent, MappingKind, MappingResult, MappingStatistics, ProvenanceTracker};
pub use source::{FieldPath, FieldReferenceTable, SourceDocument};
pub use state::ConversionState;
pub use template::{ResolverOptions, TemplateResolver};

/// Convert job JSON with default resolver options
///
/// # Errors
///
/// Returns an error if:
/// - `json` is not valid JSON or lacks the required job structure
/// - A selected template cannot be loaded
/// - A selected template has a syntax error
pub fn convert(
    json: &str,
    catalog: &dyn TemplateCatalog,
    loader: &dyn TemplateLoader,
) -> Result<Assembly> {
    ConfigAssembler::new(catalog, loader).assemble_str(json)
}
