//! Config assembly from env, source and sink fragments

use crate::conversion::catalog::{TemplateCatalog, TemplateKind, TemplateLoader};
use crate::conversion::filter::FilterRegistry;
use crate::conversion::provenance::MappingResult;
use crate::conversion::source::SourceDocument;
use crate::conversion::state::ConversionState;
use crate::conversion::template::{validate_template, ResolverOptions, TemplateResolver};
use crate::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use tracing::{debug, info, instrument};

/// Catalog key for the env fragment
pub const ENV_JOB_TYPE: &str = "batch";

/// First line of every assembled configuration
pub const HEADER_BANNER: &str = "# Generated by x2conf template engine";

/// Assembled configuration text and the provenance of every field in it
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub text: String,
    pub result: MappingResult,
}

/// A template chosen for one fragment, loaded and validated
#[derive(Debug)]
struct Fragment {
    kind: TemplateKind,
    path: String,
    text: String,
}

/// Builds one configuration from a source document
///
/// Templates come from the injected catalog and loader; the assembler holds
/// no state between runs, so one instance can serve a whole batch.
pub struct ConfigAssembler<'a> {
    catalog: &'a dyn TemplateCatalog,
    loader: &'a dyn TemplateLoader,
    options: ResolverOptions,
    timestamp: Option<DateTime<Utc>>,
}

impl<'a> ConfigAssembler<'a> {
    pub fn new(catalog: &'a dyn TemplateCatalog, loader: &'a dyn TemplateLoader) -> Self {
        Self {
            catalog,
            loader,
            options: ResolverOptions::default(),
            timestamp: None,
        }
    }

    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Pin the `Generated at` timestamp instead of using the current time
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Parse `json` and assemble it
    pub fn assemble_str(&self, json: &str) -> Result<Assembly> {
        let doc = SourceDocument::parse(json)?;
        self.assemble(&doc)
    }

    /// Assemble env, source and sink fragments for `doc`
    ///
    /// All three fragments are loaded and validated before any is resolved;
    /// a missing or malformed template fails the whole run with no output.
    #[instrument(skip_all, fields(reader = doc.reader_name(), writer = doc.writer_name()))]
    pub fn assemble(&self, doc: &SourceDocument) -> Result<Assembly> {
        let reader_type = doc.reader_name().unwrap_or_default();
        let writer_type = doc.writer_name().unwrap_or_default();
        let mut state = ConversionState::new(doc);

        let env_path = self.template_path(TemplateKind::Env, ENV_JOB_TYPE, "job", &mut state);
        let source_path = self.template_path(TemplateKind::Source, reader_type, "reader", &mut state);
        let sink_path = self.template_path(TemplateKind::Sink, writer_type, "writer", &mut state);

        let fragments = [
            self.load_fragment(TemplateKind::Env, &env_path)?,
            self.load_fragment(TemplateKind::Source, &source_path)?,
            self.load_fragment(TemplateKind::Sink, &sink_path)?,
        ];

        let resolver = TemplateResolver::new(
            doc,
            FilterRegistry::with_catalog(self.catalog),
            self.options.clone(),
        );

        let mut parts = Vec::with_capacity(fragments.len());
        for fragment in &fragments {
            debug!(kind = %fragment.kind, path = %fragment.path, "resolving fragment");
            let resolved = resolver.resolve(&fragment.text, &mut state)?;
            parts.push(resolved.trim_end_matches('\n').to_string());
        }

        let text = format!("{}{}\n", self.header(), parts.join("\n\n"));

        let mut result = state.finish();
        result.reader_type = Some(reader_type.to_string());
        result.writer_type = Some(writer_type.to_string());
        result.env_template = Some(env_path);
        result.source_template = Some(source_path);
        result.sink_template = Some(sink_path);

        info!(stats = %result.statistics(), "configuration assembled");
        Ok(Assembly { text, result })
    }

    /// Resolve one whole-file template against `doc`, without a header
    #[instrument(skip_all, fields(reader = doc.reader_name(), writer = doc.writer_name()))]
    pub fn assemble_custom(&self, doc: &SourceDocument, template: &str) -> Result<Assembly> {
        validate_template(template, Some("custom"))?;

        let mut state = ConversionState::new(doc);
        let resolver = TemplateResolver::new(
            doc,
            FilterRegistry::with_catalog(self.catalog),
            self.options.clone(),
        );
        let text = resolver.resolve(template, &mut state)?;

        let mut result = state.finish();
        result.reader_type = doc.reader_name().map(str::to_string);
        result.writer_type = doc.writer_name().map(str::to_string);

        info!(stats = %result.statistics(), "custom template resolved");
        Ok(Assembly { text, result })
    }

    /// Catalog path for `type_name`, or the kind's fallback
    ///
    /// An unsupported reader or writer type is recorded as an unmapped field.
    fn template_path(
        &self,
        kind: TemplateKind,
        type_name: &str,
        role: &str,
        state: &mut ConversionState,
    ) -> String {
        if let Some(path) = self.catalog.template_for(kind, type_name) {
            return path.to_string();
        }

        let fallback = kind.fallback_template();
        debug!(%kind, type_name, fallback, "no template mapping, using fallback");
        if kind != TemplateKind::Env {
            state.tracker_mut().record_unmapped(
                &format!("{}.name", role),
                (!type_name.is_empty()).then_some(type_name),
                &format!("No template mapping for {} type", role),
            );
        }
        fallback.to_string()
    }

    fn load_fragment(&self, kind: TemplateKind, path: &str) -> Result<Fragment> {
        let text = self.loader.load(path)?;
        validate_template(&text, Some(path))?;
        Ok(Fragment {
            kind,
            path: path.to_string(),
            text,
        })
    }

    fn header(&self) -> String {
        let timestamp = self.timestamp.unwrap_or_else(Utc::now);
        format!(
            "{}\n# Generated at: {}\n\n",
            HEADER_BANNER,
            timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

impl fmt::Debug for ConfigAssembler<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigAssembler")
            .field("options", &self.options)
            .field("timestamp", &self.timestamp)
            .finish_non_exhaustive()
    }
}
