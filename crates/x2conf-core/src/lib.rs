//! x2conf Core - Template resolution and provenance tracking engine
//!
//! This crate converts ETL job descriptions (DataX-style JSON) into
//! block-structured configuration text by resolving templates against the
//! job, and reports the provenance of every target field.
//!
//! # Main Components
//!
//! - **Error Handling**: Fatal errors using `thiserror`, non-fatal resolution issues as events
//! - **Source Access**: Path lookup and reference counting over the job JSON
//! - **Template Engine**: Expressions, filter chains and block structure tracking
//! - **Provenance**: Direct, transform, default, missing and unmapped field logs
//!
//! # Example
//!
//! ```no_run
//! use x2conf_core::{convert, Manifest, MemoryTemplates, Result};
//!
//! fn example(json: &str) -> Result<()> {
//!     let manifest = Manifest::new();
//!     let templates = MemoryTemplates::new();
//!     let assembly = convert(json, &manifest, &templates)?;
//!     println!("{}", assembly.text);
//!     println!("{}", assembly.result.statistics());
//!     Ok(())
//! }
//! ```

pub mod conversion;
pub mod error;

// Re-export main types for convenience
pub use conversion::{
    // Entry points
    convert, Assembly, ConfigAssembler,

    // Collaborators
    Manifest, MemoryTemplates, TemplateCatalog, TemplateKind, TemplateLoader, TransformerTable,

    // Resolution
    ConversionState, ResolverOptions, SourceDocument, TemplateResolver,

    // Provenance
    MappingEvent, MappingKind, MappingResult, MappingStatistics,
};
pub use error::{Error, ResolutionIssue, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
