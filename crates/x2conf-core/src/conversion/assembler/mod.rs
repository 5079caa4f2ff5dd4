//! Template-driven configuration assembly
//!
//! The assembler picks an env, source and sink template for a job through
//! a [`TemplateCatalog`](crate::conversion::catalog::TemplateCatalog), loads
//! them through a [`TemplateLoader`](crate::conversion::catalog::TemplateLoader),
//! validates all three, then resolves them against one shared reference
//! table and tracker so unmapped detection covers the whole document.
//!
//! # Examples
//!
//! ```
//! use x2conf_core::conversion::assembler::ConfigAssembler;
//! use x2conf_core::conversion::catalog::{Manifest, MemoryTemplates, TemplateKind};
//! use chrono::{TimeZone, Utc};
//!
//! let manifest = Manifest::new()
//!     .with_template(TemplateKind::Env, "batch", "env.conf")
//!     .with_template(TemplateKind::Source, "mysqlreader", "mysql.conf")
//!     .with_template(TemplateKind::Sink, "hdfswriter", "hdfs.conf");
//! let templates = MemoryTemplates::new()
//!     .with("env.conf", "env {\n  parallelism = {{ datax.job.setting.speed.channel | default(1) }}\n}\n")
//!     .with("mysql.conf", "source {\n  Jdbc {\n    user = \"{{ datax.job.content[0].reader.parameter.username }}\"\n  }\n}\n")
//!     .with("hdfs.conf", "sink {\n  HdfsFile {\n    path = \"{{ datax.job.content[0].writer.parameter.path }}\"\n  }\n}\n");
//!
//! let json = r#"{"job": {
//!     "setting": {"speed": {"channel": 4}},
//!     "content": [{
//!         "reader": {"name": "mysqlreader", "parameter": {"username": "root"}},
//!         "writer": {"name": "hdfswriter", "parameter": {"path": "/tmp/out"}}
//!     }]
//! }}"#;
//!
//! let assembly = ConfigAssembler::new(&manifest, &templates)
//!     .with_timestamp(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
//!     .assemble_str(json)
//!     .unwrap();
//!
//! assert!(assembly.text.starts_with("# Generated by x2conf template engine\n# Generated at: 2025-01-01T00:00:00Z\n\n"));
//! assert!(assembly.text.contains("parallelism = 4"));
//! assert_eq!(assembly.result.direct.len(), 3);
//! assert!(assembly.result.unmapped.is_empty());
//! ```
//!
//! Copyright (c) 2025 x2conf Team
//! Licensed under the Apache-2.0 license

pub mod engine;

#[cfg(test)]
mod tests;

pub use engine::{Assembly, ConfigAssembler, ENV_JOB_TYPE, HEADER_BANNER};
