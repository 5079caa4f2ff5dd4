//! Output formatting and writing utilities
//!
//! This module provides utilities for formatting and writing output
//! in various formats (JSON, YAML, human-readable), with specialized
//! support for mapping results, template analysis and progress indicators.

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::logging::redaction;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;
use tracing::{debug, trace};
use x2conf_core::conversion::template::FieldMapping;
use x2conf_core::{MappingEvent, MappingResult, MappingStatistics};

/// Trait for formatting output with specialized support for common types
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a mapping result with statistics and the fields needing attention
    fn format_mapping_result(&self, result: &MappingResult) -> Result<String>;

    /// Format the target-to-source analysis of a template
    fn format_field_mappings(&self, mappings: &[FieldMapping]) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Human => {
                // For human format, use pretty JSON as fallback
                Ok(serde_json::to_string_pretty(value)?)
            }
        }
    }

    fn format_mapping_result(&self, result: &MappingResult) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_mapping_result_human(result)),
            _ => self.format(result),
        }
    }

    fn format_field_mappings(&self, mappings: &[FieldMapping]) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_field_mappings_human(mappings)),
            _ => self.format(&mappings),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self {
            format,
            use_color,
            show_progress: !quiet && io::stdout().is_terminal(),
            quiet,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            show_progress: false, // No progress bars with custom writers
            quiet,
            writer,
        }
    }

    /// Turn progress indicators off regardless of the terminal
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Whether human-oriented messages are written at all
    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        debug!("Output info: {}", message);

        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write an error message
    pub fn error(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.red().to_string())
        } else {
            self.writeln(&format!("ERROR: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        // Create a redacted copy of the value for logging
        let mut value_json = serde_json::to_value(value)?;
        redaction::redact_json_value(&mut value_json);

        trace!(
            "Outputting data: {}",
            serde_json::to_string(&value_json)
                .unwrap_or_else(|_| "[failed to serialize]".to_string())
        );

        let formatted = self.format.format(value)?;

        if self.is_human() {
            self.writeln(&formatted)
        } else {
            // Machine formats: YAML already ends with a newline, JSON does not
            if formatted.ends_with('\n') {
                self.write(&formatted)
            } else {
                self.writeln(&formatted)
            }
        }
    }

    /// Write a mapping result with specialized formatting
    pub fn mapping_result(&mut self, result: &MappingResult) -> Result<()> {
        if self.quiet && self.is_human() {
            return Ok(());
        }
        let formatted = self.format.format_mapping_result(result)?;
        self.write_block(&formatted)
    }

    /// Write a template analysis with specialized formatting
    pub fn field_mappings(&mut self, mappings: &[FieldMapping]) -> Result<()> {
        let formatted = self.format.format_field_mappings(mappings)?;
        self.write_block(&formatted)
    }

    fn write_block(&mut self, formatted: &str) -> Result<()> {
        if formatted.ends_with('\n') {
            self.write(formatted)
        } else {
            self.writeln(formatted)
        }
    }

    /// Create a progress bar for long operations
    pub fn progress_bar(&self, length: u64, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new(length);
        pb.set_style(default_progress_style());
        pb.set_message(message.to_string());
        Some(pb)
    }

    /// Create a spinner for indeterminate progress
    pub fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(default_spinner_style());
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }

    /// Write a table (for human format)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        // Calculate column widths
        let mut widths = headers
            .iter()
            .map(|h| h.chars().count())
            .collect::<Vec<_>>();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        let header_row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" │ ");

        if self.use_color {
            self.writeln(&header_row.bold().to_string())?;
        } else {
            self.writeln(&header_row)?;
        }

        let separator = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        self.writeln(&separator)?;

        for row in rows {
            let row_str = row
                .iter()
                .enumerate()
                .map(|(i, cell)| match widths.get(i) {
                    Some(width) => format!("{:width$}", cell, width = *width),
                    None => cell.clone(),
                })
                .collect::<Vec<_>>()
                .join(" │ ");
            self.writeln(row_str.trim_end())?;
        }

        Ok(())
    }
}

/// Helper function to create a progress bar style
pub fn default_progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// Helper function to create a spinner style
pub fn default_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Format a mapping result for human reading
fn format_mapping_result_human(result: &MappingResult) -> String {
    let mut output = String::new();

    if !result.success {
        output.push_str("❌ Conversion failed\n");
        if let Some(message) = &result.error_message {
            output.push_str(&format!("  {}\n", message));
        }
        return output;
    }

    if let (Some(reader), Some(writer)) = (&result.reader_type, &result.writer_type) {
        output.push_str(&format!("🔧 {} → {}\n", reader, writer));
        for (label, template) in [
            ("Env template", &result.env_template),
            ("Source template", &result.source_template),
            ("Sink template", &result.sink_template),
        ] {
            if let Some(template) = template {
                output.push_str(&format!("  {}: {}\n", label, template));
            }
        }
        output.push('\n');
    }

    output.push_str(&format_statistics_human(&result.statistics()));

    if !result.missing.is_empty() {
        output.push_str("\n⚠️  Missing Fields (add manually):\n");
        for event in &result.missing {
            let target = event.target_path.as_deref().unwrap_or("-");
            let source = event.source_path.as_deref().unwrap_or("-");
            output.push_str(&format!("  • {} ← {}\n", target, source));
        }
    }

    if !result.unmapped.is_empty() {
        output.push_str("\n📋 Unmapped Source Fields:\n");
        for event in &result.unmapped {
            output.push_str(&format!(
                "  • {} = {}\n",
                event.source_path.as_deref().unwrap_or("-"),
                display_value(event)
            ));
        }
    }

    output
}

/// Format mapping statistics as an aligned count/percentage block
fn format_statistics_human(stats: &MappingStatistics) -> String {
    let mut output = String::from("📊 Mapping Statistics:\n");

    for (label, count) in [
        ("Direct", stats.direct),
        ("Transform", stats.transform),
        ("Default", stats.default),
        ("Missing", stats.missing),
        ("Unmapped", stats.unmapped),
    ] {
        output.push_str(&format!(
            "  {:<10} {:>4} ({:.1}%)\n",
            format!("{}:", label),
            count,
            stats.percent(count)
        ));
    }
    output.push_str(&format!("  {:<10} {:>4}\n", "Total:", stats.total()));

    output
}

/// Event value for terminal display, hiding credentials
fn display_value(event: &MappingEvent) -> String {
    let field = event
        .source_path
        .as_deref()
        .and_then(|path| path.rsplit('.').next())
        .unwrap_or_default();

    match event.value.as_deref() {
        Some(_) if redaction::is_sensitive_key(field) => "***".to_string(),
        Some(value) => redaction::redact_sensitive(value),
        None => String::new(),
    }
}

/// Format a template analysis for human reading
fn format_field_mappings_human(mappings: &[FieldMapping]) -> String {
    if mappings.is_empty() {
        return "No source field references found\n".to_string();
    }

    let mut output = format!("🔍 {} target field(s) read from the source:\n", mappings.len());
    for mapping in mappings {
        output.push_str(&format!(
            "  {} ← {}\n",
            mapping.target,
            mapping.sources.join(", ")
        ));
    }
    output
}
