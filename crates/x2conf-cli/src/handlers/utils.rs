//! Shared utilities for command handlers

use crate::cli::TemplateSourceArgs;
use crate::config::Config;
use crate::error::{Error, ErrorContext, Result};
use crate::loader::FsTemplates;
use crate::manifest::load_manifest;
use crate::report::ConversionReport;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use x2conf_core::{
    Assembly, ConfigAssembler, Manifest, MappingResult, ResolverOptions, SourceDocument,
    TemplateLoader,
};

/// The only job description format the converter understands
pub const SUPPORTED_SOURCE_TYPE: &str = "datax";

/// Reject source types other than DataX
pub fn ensure_source_type(source_type: &str) -> Result<()> {
    if source_type.eq_ignore_ascii_case(SUPPORTED_SOURCE_TYPE) {
        Ok(())
    } else {
        Err(Error::UnsupportedSourceType {
            name: source_type.to_string(),
        })
    }
}

/// Read a text file, reporting a missing file as such
pub fn read_text(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = content.len(), "Read file");
    Ok(content)
}

/// Write a text file, creating parent directories as needed
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(path = %path.display(), bytes = content.len(), "Wrote file");
    Ok(())
}

#[derive(Debug)]
struct CustomTemplate {
    path: PathBuf,
    text: String,
}

/// Everything needed to convert jobs: the manifest, the template loader,
/// the resolver options and an optional custom template
///
/// Built once per command and reused for every file; each conversion gets a
/// fresh assembler run, so no provenance carries over between files.
#[derive(Debug)]
pub struct Converter {
    manifest: Manifest,
    templates: FsTemplates,
    options: ResolverOptions,
    custom: Option<CustomTemplate>,
}

impl Converter {
    pub fn new(manifest: Manifest, templates: FsTemplates, options: ResolverOptions) -> Self {
        Self {
            manifest,
            templates,
            options,
            custom: None,
        }
    }

    /// Resolve the templates directory and manifest from the flags and config
    ///
    /// A manifest named explicitly must exist. When only the templates
    /// directory's default manifest is missing, every job uses the fallback
    /// templates.
    pub fn from_config(
        config: &Config,
        sources: &TemplateSourceArgs,
        custom_template: Option<&Path>,
    ) -> Result<Self> {
        let templates_dir = config.templates_dir(sources.templates_dir.as_deref());
        let explicit_manifest = sources.manifest.is_some() || config.paths.manifest.is_some();
        let manifest_path = config.manifest_path(sources.manifest.as_deref(), &templates_dir);

        let manifest = if explicit_manifest || manifest_path.exists() {
            load_manifest(&manifest_path)?
        } else {
            warn!(
                path = %manifest_path.display(),
                "No template manifest found, using fallback templates only"
            );
            Manifest::new()
        };

        let mut converter = Self::new(
            manifest,
            FsTemplates::new(templates_dir),
            config.conversion.resolver_options(),
        );
        if let Some(path) = custom_template {
            converter = converter.with_custom_template(path)?;
        }
        Ok(converter)
    }

    /// Resolve every job against this template instead of the manifest's fragments
    pub fn with_custom_template(mut self, path: &Path) -> Result<Self> {
        let text = read_text(path)?;
        self.custom = Some(CustomTemplate {
            path: path.to_path_buf(),
            text,
        });
        Ok(self)
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn custom_template(&self) -> Option<&Path> {
        self.custom.as_ref().map(|c| c.path.as_path())
    }

    /// Convert one job description
    pub fn convert(&self, json: &str) -> Result<Assembly> {
        let doc = SourceDocument::parse(json)?;
        let assembler =
            ConfigAssembler::new(&self.manifest, &self.templates).with_options(self.options.clone());

        let assembly = match &self.custom {
            Some(custom) => assembler.assemble_custom(&doc, &custom.text)?,
            None => assembler.assemble(&doc)?,
        };
        Ok(assembly)
    }

    /// Render the Markdown report for a conversion of `source`
    pub fn report(
        &self,
        result: &MappingResult,
        source: &Path,
        target: Option<&Path>,
        source_type: &str,
    ) -> String {
        let (source_text, sink_text) = match &self.custom {
            Some(custom) => (Some(custom.text.clone()), Some(custom.text.clone())),
            None => (
                self.template_text(result.source_template.as_deref()),
                self.template_text(result.sink_template.as_deref()),
            ),
        };

        ConversionReport::new(result, source, source_type)
            .with_target(target)
            .with_custom_template(self.custom_template())
            .with_templates(source_text.as_deref(), sink_text.as_deref())
            .render()
    }

    fn template_text(&self, path: Option<&str>) -> Option<String> {
        let path = path?;
        match self.templates.load(path) {
            Ok(text) => Some(text),
            Err(e) => {
                debug!(template = path, error = %e, "Template unavailable for report");
                None
            }
        }
    }
}
