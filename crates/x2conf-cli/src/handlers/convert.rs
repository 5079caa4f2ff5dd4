//! Convert command handler

use crate::cli::ConvertArgs;
use crate::config::Config;
use crate::error::Result;
use crate::handlers::utils::{ensure_source_type, read_text, write_text, Converter};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, error, info, instrument};
use x2conf_core::MappingResult;

/// Machine-readable summary of a conversion
#[derive(Debug, Serialize)]
struct ConvertSummary<'a> {
    source: &'a Path,
    target: Option<&'a Path>,
    report: Option<&'a Path>,
    /// Assembled configuration, only when no target file was written
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<&'a str>,
    result: &'a MappingResult,
}

/// Handle the convert command
#[instrument(skip(config, output), fields(
    source = %args.source.display(),
    custom_template = args.template.is_some()
))]
pub async fn handle_convert(
    args: ConvertArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let _timer = Timer::with_details(
        "convert_command",
        &format!("source: {}", args.source.display()),
    );
    info!("Starting convert command");

    ensure_source_type(&args.source_type)?;
    let json = read_text(&args.source)?;
    let converter = Converter::from_config(config, &args.templates, args.template.as_deref())?;

    let progress = output.spinner("Converting job description...");
    let converted = {
        let _conversion_timer = Timer::new("template_resolution");
        converter.convert(&json)
    };
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let assembly = match converted {
        Ok(assembly) => assembly,
        Err(e) => {
            error!(error = %e, "Conversion failed");
            if let Some(report_path) = &args.report {
                let failed = MappingResult::failed(e.to_string());
                let report = converter.report(
                    &failed,
                    &args.source,
                    args.target.as_deref(),
                    &args.source_type,
                );
                write_text(report_path, &report)?;
                debug!(report = %report_path.display(), "Wrote failure report");
            }
            return Err(e);
        }
    };

    if let Some(target) = &args.target {
        write_text(target, &assembly.text)?;
        output.success(&format!("✓ Configuration written to {}", target.display()))?;
    }

    if let Some(report_path) = &args.report {
        let report = converter.report(
            &assembly.result,
            &args.source,
            args.target.as_deref(),
            &args.source_type,
        );
        write_text(report_path, &report)?;
        output.success(&format!("✓ Report written to {}", report_path.display()))?;
    }

    if output.is_human() {
        match &args.target {
            // Keep stdout clean for the configuration itself
            None => output.write(&assembly.text)?,
            Some(_) => output.mapping_result(&assembly.result)?,
        }
    } else {
        output.data(&ConvertSummary {
            source: &args.source,
            target: args.target.as_deref(),
            report: args.report.as_deref(),
            config: args.target.is_none().then_some(assembly.text.as_str()),
            result: &assembly.result,
        })?;
    }

    info!(
        stats = %assembly.result.statistics(),
        "Convert command completed"
    );
    Ok(())
}
