//! Analyze command handler

use crate::cli::AnalyzeArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::handlers::utils::read_text;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use tracing::{debug, info, instrument};
use x2conf_core::conversion::template::{analyze_field_mappings, validate_template};

/// Prefixes matching the blocks an assembled configuration contains
const KNOWN_PREFIXES: &[&str] = &["env", "source", "sink"];

/// Handle the analyze command
#[instrument(skip(config, output), fields(template = %args.template.display()))]
pub async fn handle_analyze(
    args: AnalyzeArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let _timer = Timer::with_details(
        "analyze_command",
        &format!("template: {}", args.template.display()),
    );
    info!("Starting template analysis");

    if let Some(prefix) = args.prefix.as_deref() {
        if !KNOWN_PREFIXES.contains(&prefix) {
            output.warning(&format!(
                "Prefix '{}' is not one of {}",
                prefix,
                KNOWN_PREFIXES.join(", ")
            ))?;
        }
    }

    let text = read_text(&args.template)?;
    let fragment = args.template.display().to_string();
    validate_template(&text, Some(&fragment)).map_err(Error::Core)?;

    let options = config.conversion.resolver_options();
    let mappings = analyze_field_mappings(&text, args.prefix.as_deref(), &options);
    debug!(targets = mappings.len(), "Template analyzed");

    output.field_mappings(&mappings)
}
