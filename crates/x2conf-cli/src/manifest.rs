//! YAML template manifest loading
//!
//! The manifest maps reader/writer/job types to template paths and declares
//! the transformer tables available to templates:
//!
//! ```yaml
//! datax:
//!   source_mappings:
//!     mysqlreader: "datax/sources/mysql-source.conf"
//!   sink_mappings:
//!     hdfswriter: "datax/sinks/hdfs-sink.conf"
//!   env_mappings:
//!     batch: "datax/env/batch-env.conf"
//! transformers:
//!   jdbc_driver_mapper:
//!     mysql: "com.mysql.cj.jdbc.Driver"
//! ```
//!
//! Transformer patterns keep their declaration order, which decides which
//! pattern wins when several match.

use crate::error::{Error, Result};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};
use x2conf_core::{Manifest, TemplateKind, TransformerTable};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ManifestFile {
    datax: DataxMappings,
    transformers: Mapping,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DataxMappings {
    source_mappings: BTreeMap<String, String>,
    sink_mappings: BTreeMap<String, String>,
    env_mappings: BTreeMap<String, String>,
}

/// Load a manifest from a YAML file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path)?;
    let manifest = parse_manifest(&content).map_err(|e| match e {
        Error::Yaml(yaml) => Error::manifest(path, yaml.to_string()),
        Error::Other { message } => Error::manifest(path, message),
        other => other,
    })?;

    info!(
        path = %path.display(),
        sources = manifest.supported_types(TemplateKind::Source).len(),
        sinks = manifest.supported_types(TemplateKind::Sink).len(),
        transformers = manifest.transformer_names().len(),
        "Loaded template manifest"
    );
    Ok(manifest)
}

/// Parse manifest YAML text
pub fn parse_manifest(content: &str) -> Result<Manifest> {
    let file: ManifestFile = if content.trim().is_empty() {
        ManifestFile::default()
    } else {
        serde_yaml::from_str(content)?
    };

    let mut manifest = Manifest::new();
    for (kind, mappings) in [
        (TemplateKind::Source, file.datax.source_mappings),
        (TemplateKind::Sink, file.datax.sink_mappings),
        (TemplateKind::Env, file.datax.env_mappings),
    ] {
        for (type_name, path) in mappings {
            debug!(%kind, type_name = %type_name, path = %path, "Registered template");
            manifest.insert_template(kind, type_name, path);
        }
    }

    for (name, patterns) in &file.transformers {
        let name = scalar_text(name)
            .ok_or_else(|| Error::other("transformer names must be strings"))?;
        let table = transformer_table(&name, patterns)?;
        manifest.insert_transformer(name, table);
    }

    Ok(manifest)
}

fn transformer_table(name: &str, patterns: &Value) -> Result<TransformerTable> {
    let Value::Mapping(patterns) = patterns else {
        return Err(Error::other(format!(
            "transformer '{}' must map patterns to values",
            name
        )));
    };

    patterns
        .iter()
        .map(|(pattern, mapped)| match (scalar_text(pattern), scalar_text(mapped)) {
            (Some(pattern), Some(mapped)) => Ok((pattern, mapped)),
            _ => Err(Error::other(format!(
                "transformer '{}' has a non-scalar pattern or value",
                name
            ))),
        })
        .collect()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
