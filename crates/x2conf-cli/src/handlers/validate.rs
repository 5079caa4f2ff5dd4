//! Validate command handler

use crate::cli::{ValidateArgs, ValidateKind};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::handlers::utils::read_text;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use serde::Serialize;
use std::path::Path;
use tracing::{error, info, instrument};
use x2conf_core::conversion::template::{analyze_field_mappings, validate_template};
use x2conf_core::SourceDocument;

#[derive(Debug, Serialize)]
struct ValidationSummary<'a> {
    file: &'a Path,
    kind: &'static str,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reader: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    writer: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expressions: Option<usize>,
}

/// Handle the validate command
#[instrument(skip(config, output), fields(file = %args.file.display(), kind = ?args.kind))]
pub async fn handle_validate(
    args: ValidateArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let _timer = Timer::with_details(
        "validate_command",
        &format!("file: {}", args.file.display()),
    );
    info!("Starting validation");

    let content = read_text(&args.file)?;
    let kind = match args.kind {
        ValidateKind::Auto => detect_kind(&args.file),
        other => other,
    };

    match kind {
        ValidateKind::Source => validate_source(&args.file, &content, output),
        _ => validate_template_file(&args.file, &content, config, output),
    }
}

/// `.json` files are job descriptions, everything else is a template
fn detect_kind(path: &Path) -> ValidateKind {
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => ValidateKind::Source,
        _ => ValidateKind::Template,
    }
}

fn validate_source(path: &Path, content: &str, output: &mut OutputWriter) -> Result<()> {
    output.info(&format!("Validating job description: {}", path.display()))?;

    let doc = SourceDocument::parse(content).map_err(|e| {
        error!(error = %e, "Job description is invalid");
        Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "DataX job".to_string(),
        }
    })?;

    output.success("✓ Job description is valid")?;
    if output.is_human() {
        output.writeln(&format!(
            "  Reader: {}",
            doc.reader_name().unwrap_or("(unnamed)")
        ))?;
        output.writeln(&format!(
            "  Writer: {}",
            doc.writer_name().unwrap_or("(unnamed)")
        ))?;
        Ok(())
    } else {
        output.data(&ValidationSummary {
            file: path,
            kind: "source",
            valid: true,
            reader: doc.reader_name(),
            writer: doc.writer_name(),
            expressions: None,
        })
    }
}

fn validate_template_file(
    path: &Path,
    content: &str,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    output.info(&format!("Validating template: {}", path.display()))?;

    let fragment = path.display().to_string();
    validate_template(content, Some(&fragment)).map_err(|e| {
        error!(error = %e, "Template is invalid");
        Error::Core(e)
    })?;

    let options = config.conversion.resolver_options();
    let targets = analyze_field_mappings(content, None, &options).len();

    output.success("✓ Template is valid")?;
    if output.is_human() {
        output.writeln(&format!("  {} target field(s) read from the source", targets))
    } else {
        output.data(&ValidationSummary {
            file: path,
            kind: "template",
            valid: true,
            reader: None,
            writer: None,
            expressions: Some(targets),
        })
    }
}
