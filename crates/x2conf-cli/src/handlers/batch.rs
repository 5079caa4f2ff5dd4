//! Batch command handler
//!
//! Converts every matching job under a directory tree. Relative paths are
//! mirrored into the output and report directories, so `jobs/a/b.json`
//! becomes `<output>/a/b.conf` and `<reports>/a/b.md`. A failing file is
//! recorded in the summary and the batch moves on.

use crate::cli::BatchArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::handlers::utils::{ensure_source_type, read_text, write_text, Converter};
use crate::log_with_request_id;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use crate::report::{BatchReport, BatchSuccess};
use glob::Pattern;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use walkdir::WalkDir;
use x2conf_core::MappingResult;

/// File name of the batch summary report
pub const SUMMARY_FILE_NAME: &str = "summary.md";

/// Machine-readable batch outcome
#[derive(Debug, Serialize)]
struct BatchSummary<'a> {
    total: usize,
    succeeded: usize,
    failed: usize,
    summary: &'a Path,
    successes: Vec<&'a Path>,
    failures: Vec<BatchFailure<'a>>,
}

#[derive(Debug, Serialize)]
struct BatchFailure<'a> {
    source: &'a Path,
    reason: &'a str,
}

/// Handle the batch command
#[instrument(skip(config, output), fields(
    directory = %args.directory.display(),
    pattern = %args.pattern
))]
pub async fn handle_batch(
    args: BatchArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let _timer = Timer::with_details(
        "batch_command",
        &format!("directory: {}", args.directory.display()),
    );
    info!("Starting batch command");

    if !args.directory.exists() {
        return Err(Error::FileNotFound {
            path: args.directory.clone(),
        });
    }
    if !args.directory.is_dir() {
        return Err(Error::invalid_args(format!(
            "{} is not a directory",
            args.directory.display()
        )));
    }

    ensure_source_type(&config.conversion.source_type)?;
    let patterns = parse_patterns(&args.pattern)?;
    let report_dir = args
        .report_dir
        .clone()
        .or_else(|| config.paths.report_dir.clone());
    let converter = Converter::from_config(config, &args.templates, args.template.as_deref())?;

    let sources = {
        let _scan_timer = Timer::new("source_discovery");
        discover_sources(&args.directory, &patterns)?
    };
    if sources.is_empty() {
        output.warning(&format!(
            "No files matching '{}' found in {}",
            args.pattern,
            args.directory.display()
        ))?;
    } else {
        output.info(&format!("Found {} file(s) to convert", sources.len()))?;
    }

    let mut batch = BatchReport::new(&args.directory, &args.output_dir, &args.pattern)
        .with_report_dir(report_dir.clone())
        .with_template(args.template.clone());
    let reports_root = report_dir.as_deref().unwrap_or(args.output_dir.as_path());

    let progress = output.progress_bar(sources.len() as u64, "Converting");
    for source in &sources {
        let relative = source.strip_prefix(&args.directory).unwrap_or(source.as_path());
        if let Some(pb) = &progress {
            pb.set_message(relative.display().to_string());
        }

        let target = args.output_dir.join(relative).with_extension("conf");
        let report = reports_root.join(relative).with_extension("md");

        match convert_one(&converter, &config.conversion.source_type, source, &target, &report) {
            Ok(()) => {
                debug!(source = %source.display(), "Converted");
                batch.record_success(BatchSuccess {
                    source: source.clone(),
                    target,
                    report,
                });
            }
            Err(e) => {
                log_with_request_id!(warn, source = %source.display(), error = %e, "Conversion failed");
                batch.record_failure(source.clone(), e.to_string());
            }
        }

        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    batch.finish();
    let summary_path = reports_root.join(SUMMARY_FILE_NAME);
    write_text(&summary_path, &batch.render())?;

    present(output, &batch, &summary_path)?;

    info!(
        total = batch.total(),
        failed = batch.failures().len(),
        "Batch command completed"
    );

    if batch.failures().is_empty() {
        Ok(())
    } else {
        Err(Error::BatchIncomplete {
            failed: batch.failures().len(),
            total: batch.total(),
        })
    }
}

/// Convert one file, writing its configuration and report
///
/// A file that fails to convert still gets a report describing the failure.
fn convert_one(
    converter: &Converter,
    source_type: &str,
    source: &Path,
    target: &Path,
    report: &Path,
) -> Result<()> {
    let json = read_text(source)?;

    match converter.convert(&json) {
        Ok(assembly) => {
            write_text(target, &assembly.text)?;
            let rendered = converter.report(&assembly.result, source, Some(target), source_type);
            write_text(report, &rendered)?;
            Ok(())
        }
        Err(e) => {
            let failed = MappingResult::failed(e.to_string());
            let rendered = converter.report(&failed, source, Some(target), source_type);
            if let Err(write_err) = write_text(report, &rendered) {
                debug!(report = %report.display(), error = %write_err, "Could not write failure report");
            }
            Err(e)
        }
    }
}

fn present(output: &mut OutputWriter, batch: &BatchReport, summary_path: &Path) -> Result<()> {
    if !output.is_human() {
        return output.data(&BatchSummary {
            total: batch.total(),
            succeeded: batch.successes().len(),
            failed: batch.failures().len(),
            summary: summary_path,
            successes: batch.successes().iter().map(|s| s.source.as_path()).collect(),
            failures: batch
                .failures()
                .iter()
                .map(|(source, reason)| BatchFailure {
                    source,
                    reason,
                })
                .collect(),
        });
    }

    output.section("Batch Conversion")?;
    output.info(&format!(
        "{} converted, {} failed ({} success rate)",
        batch.successes().len(),
        batch.failures().len(),
        batch.success_rate()
    ))?;

    if !batch.failures().is_empty() {
        let rows = batch
            .failures()
            .iter()
            .enumerate()
            .map(|(i, (source, reason))| {
                vec![
                    (i + 1).to_string(),
                    source.display().to_string(),
                    reason.clone(),
                ]
            })
            .collect();
        output.table(&["#", "Source File", "Reason"], rows)?;
    }

    output.success(&format!("✓ Summary written to {}", summary_path.display()))
}

/// Split a comma-separated pattern list into glob patterns
pub fn parse_patterns(patterns: &str) -> Result<Vec<Pattern>> {
    let parsed: Vec<Pattern> = patterns
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            Pattern::new(p)
                .map_err(|e| Error::invalid_args(format!("Invalid file pattern '{}': {}", p, e)))
        })
        .collect::<Result<_>>()?;

    if parsed.is_empty() {
        return Err(Error::invalid_args("File pattern must not be empty"));
    }
    Ok(parsed)
}

/// Files under `root` whose name or relative path matches any pattern, sorted
pub fn discover_sources(root: &Path, patterns: &[Pattern]) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::other(format!("Failed to scan {}: {}", root.display(), e)))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let name = entry.file_name().to_string_lossy();
        if patterns
            .iter()
            .any(|p| p.matches(&name) || p.matches_path(relative))
        {
            sources.push(path.to_path_buf());
        }
    }

    debug!(count = sources.len(), root = %root.display(), "Discovered source files");
    Ok(sources)
}
