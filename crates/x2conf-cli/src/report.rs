//! Markdown conversion reports
//!
//! Renders a [`MappingResult`] as a per-file Markdown report, and a batch run
//! as a summary report. Reports only read the result; nothing here affects
//! conversion.

use chrono::{DateTime, Local};
use regex::Regex;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;
use x2conf_core::{MappingEvent, MappingResult, MappingStatistics};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Inputs of a single-file conversion report
#[derive(Debug, Clone)]
pub struct ConversionReport<'a> {
    pub result: &'a MappingResult,
    pub source_file: &'a Path,
    pub target_file: Option<&'a Path>,
    pub source_type: &'a str,
    /// Custom template path, when one replaced the manifest selection
    pub custom_template: Option<&'a Path>,
    /// Text of the template that produced the `source` block
    pub source_template: Option<&'a str>,
    /// Text of the template that produced the `sink` block
    pub sink_template: Option<&'a str>,
    pub generated_at: DateTime<Local>,
}

impl<'a> ConversionReport<'a> {
    pub fn new(result: &'a MappingResult, source_file: &'a Path, source_type: &'a str) -> Self {
        Self {
            result,
            source_file,
            target_file: None,
            source_type,
            custom_template: None,
            source_template: None,
            sink_template: None,
            generated_at: Local::now(),
        }
    }

    pub fn with_target(mut self, target: Option<&'a Path>) -> Self {
        self.target_file = target;
        self
    }

    pub fn with_custom_template(mut self, template: Option<&'a Path>) -> Self {
        self.custom_template = template;
        self
    }

    pub fn with_templates(mut self, source: Option<&'a str>, sink: Option<&'a str>) -> Self {
        self.source_template = source;
        self.sink_template = sink;
        self
    }

    pub fn with_time(mut self, generated_at: DateTime<Local>) -> Self {
        self.generated_at = generated_at;
        self
    }

    /// Render the report as Markdown
    pub fn render(&self) -> String {
        let result = self.result;
        let source_type = self.source_type.to_uppercase();
        let time = self.generated_at.format(TIME_FORMAT).to_string();
        let mut out = String::new();

        out.push_str("# X2Conf Conversion Report\n\n");
        out.push_str("## 📋 Basic Information\n\n");
        out.push_str("| Item | Value |\n|------|-------|\n");
        let _ = writeln!(out, "| **Conversion Time** | {} |", time);
        let _ = writeln!(out, "| **Source File** | `{}` |", display_path(Some(self.source_file)));
        let _ = writeln!(out, "| **Target File** | `{}` |", display_path(self.target_file));
        let _ = writeln!(out, "| **Source Type** | {} |", source_type);
        let _ = writeln!(
            out,
            "| **Source Connector** | {} |",
            connector_type(self.source_template, "source", "Jdbc", result)
        );
        let _ = writeln!(
            out,
            "| **Sink Connector** | {} |",
            connector_type(self.sink_template, "sink", "HdfsFile", result)
        );
        let _ = writeln!(
            out,
            "| **Conversion Status** | {} |",
            if result.success { "✅ Success" } else { "❌ Failed" }
        );
        if let Some(template) = self.custom_template {
            let _ = writeln!(out, "| **Custom Template** | `{}` |", display_path(Some(template)));
        }
        out.push('\n');

        if !result.success {
            if let Some(message) = &result.error_message {
                let _ = writeln!(out, "### ⚠️ Error Information\n\n```\n{}\n```\n", message);
            }
        }

        out.push_str(&statistics_table(&result.statistics()));

        out.push_str("\n## ✅ Direct Mapped Fields\n\n");
        out.push_str(&direct_table(&result.direct, &source_type));
        out.push_str("\n## 🔧 Transform Mapped Fields\n\n");
        out.push_str(&transform_table(&result.transform, &source_type));
        out.push_str("\n## 🔄 Fields Using Default Values\n\n");
        out.push_str(&default_table(&result.defaults));
        out.push_str("\n## ❌ Missing Fields\n\n");
        out.push_str(&missing_table(&result.missing));
        out.push_str("\n## ⚠️ Unmapped Fields\n\n");
        out.push_str(&unmapped_table(&result.unmapped, &source_type));

        let _ = write!(out, "\n---\n*Report generated at: {}*\n", time);
        out
    }
}

fn statistics_table(stats: &MappingStatistics) -> String {
    let mut out = String::from("## 📊 Conversion Statistics\n\n");
    out.push_str("| Type | Count | Percentage |\n|------|-------|------------|\n");
    for (label, count) in [
        ("✅ **Direct Mapping**", stats.direct),
        ("🔧 **Transform Mapping**", stats.transform),
        ("🔄 **Default Values**", stats.default),
        ("❌ **Missing Fields**", stats.missing),
        ("⚠️ **Unmapped**", stats.unmapped),
    ] {
        let _ = writeln!(out, "| {} | {} | {} |", label, count, percent(stats, count));
    }
    let _ = writeln!(out, "| **Total** | {} | **100%** |", stats.total());
    out
}

fn percent(stats: &MappingStatistics, count: usize) -> String {
    if stats.total() == 0 {
        "0%".to_string()
    } else {
        format!("{:.1}%", stats.percent(count))
    }
}

fn direct_table(events: &[MappingEvent], source_type: &str) -> String {
    if events.is_empty() {
        return "*No direct mapped fields*\n".to_string();
    }

    let mut table = format!("| SeaTunnel Field | Value | {} Source Field |\n", source_type);
    table.push_str("|---------------|----|--------------|\n");
    for event in events {
        let _ = writeln!(
            table,
            "| `{}` | `{}` | `{}` |",
            cell(event.target_path.as_deref()),
            cell(event.value.as_deref()),
            cell(event.source_path.as_deref())
        );
    }
    table
}

fn transform_table(events: &[MappingEvent], source_type: &str) -> String {
    if events.is_empty() {
        return "*No transform mapped fields*\n".to_string();
    }

    let mut table = format!(
        "| SeaTunnel Field | Value | {} Source Field | Filter Used |\n",
        source_type
    );
    table.push_str("|---------------|----|--------------|-----------|\n");
    for event in events {
        let _ = writeln!(
            table,
            "| `{}` | `{}` | `{}` | {} |",
            cell(event.target_path.as_deref()),
            cell(event.value.as_deref()),
            cell(event.source_path.as_deref()),
            cell(Some(event.note.as_str()))
        );
    }
    table
}

fn default_table(events: &[MappingEvent]) -> String {
    if events.is_empty() {
        return "*No fields using default values*\n".to_string();
    }

    let mut table = String::from("| SeaTunnel Field | Default Value |\n|---------------|--------|\n");
    for event in events {
        let _ = writeln!(
            table,
            "| `{}` | `{}` |",
            cell(event.field()),
            cell(event.value.as_deref())
        );
    }
    table
}

fn missing_table(events: &[MappingEvent]) -> String {
    if events.is_empty() {
        return "*No missing fields* 🎉\n".to_string();
    }

    let mut table = String::from(
        "⚠️ **Note**: The following fields were not found in the source configuration, please add manually:\n\n",
    );
    table.push_str("| SeaTunnel Field |\n|---------------|\n");
    for event in events {
        let _ = writeln!(table, "| `{}` |", cell(event.field()));
    }
    table
}

fn unmapped_table(events: &[MappingEvent], source_type: &str) -> String {
    if events.is_empty() {
        return "*All fields are mapped* 🎉\n".to_string();
    }

    let mut table = format!("| {} Field | Value |\n|--------|------|\n", source_type);
    for event in events {
        let _ = writeln!(
            table,
            "| `{}` | `{}` |",
            cell(event.source_path.as_deref()),
            cell(event.value.as_deref())
        );
    }
    table
}

/// Escape a table cell: unescaped pipes get a backslash, line breaks become spaces
fn cell(text: Option<&str>) -> String {
    let text = text.unwrap_or_default();
    let mut escaped = String::with_capacity(text.len());
    let mut previous = None;
    for c in text.chars() {
        match c {
            '|' if previous != Some('\\') => escaped.push_str("\\|"),
            '\n' => escaped.push(' '),
            '\r' => {}
            other => escaped.push(other),
        }
        previous = Some(c);
    }
    escaped
}

fn display_path(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return "stdout".to_string();
    };

    let relative = std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf))
        .unwrap_or_else(|| path.to_path_buf());
    relative.display().to_string().replace('\\', "/")
}

/// Connector named by the first nested block inside `block {`
///
/// Jdbc connectors are qualified with the database type of the first direct
/// `*.url` mapping holding a JDBC URL, e.g. `Jdbc (mysql)`.
pub fn connector_type(
    template: Option<&str>,
    block: &str,
    default: &str,
    result: &MappingResult,
) -> String {
    static BLOCK_OPEN: OnceLock<Option<Regex>> = OnceLock::new();
    let block_open = BLOCK_OPEN
        .get_or_init(|| Regex::new(r"^(\w+)\s*\{$").ok())
        .as_ref();

    let Some(template) = template.filter(|t| !t.trim().is_empty()) else {
        return default.to_string();
    };

    let header = format!("{} {{", block);
    let mut inside = false;
    for line in template.lines() {
        let trimmed = line.trim();
        if trimmed == header {
            inside = true;
            continue;
        }
        if !inside {
            continue;
        }
        if trimmed == "}" && !line.starts_with(' ') && !line.starts_with('\t') {
            inside = false;
            continue;
        }

        let Some(name) = block_open
            .and_then(|re| re.captures(trimmed))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
        else {
            continue;
        };

        if name == "Jdbc" {
            if let Some(db) = jdbc_database_type(result) {
                return format!("{} ({})", name, db);
            }
        }
        return name.to_string();
    }

    debug!(block, default, "Connector type not found in template");
    default.to_string()
}

fn jdbc_database_type(result: &MappingResult) -> Option<String> {
    static JDBC_URL: OnceLock<Option<Regex>> = OnceLock::new();
    let jdbc_url = JDBC_URL
        .get_or_init(|| Regex::new(r"^jdbc:([^:]+):").ok())
        .as_ref()?;

    result
        .direct
        .iter()
        .filter(|e| {
            e.target_path
                .as_deref()
                .is_some_and(|target| target.contains(".url"))
        })
        .filter_map(|e| e.value.as_deref())
        .find_map(|value| {
            jdbc_url
                .captures(value)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
}

/// One successfully converted file of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSuccess {
    pub source: PathBuf,
    pub target: PathBuf,
    pub report: PathBuf,
}

/// Outcome of a batch run, rendered as `summary.md`
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub report_dir: Option<PathBuf>,
    pub pattern: String,
    pub template: Option<PathBuf>,
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
    successes: Vec<BatchSuccess>,
    failures: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn new(
        source_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        pattern: impl Into<String>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            report_dir: None,
            pattern: pattern.into(),
            template: None,
            started_at: Local::now(),
            finished_at: None,
            successes: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn with_report_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.report_dir = dir;
        self
    }

    pub fn with_template(mut self, template: Option<PathBuf>) -> Self {
        self.template = template;
        self
    }

    pub fn record_success(&mut self, success: BatchSuccess) {
        self.successes.push(success);
    }

    pub fn record_failure(&mut self, source: impl Into<PathBuf>, reason: impl Into<String>) {
        self.failures.push((source.into(), reason.into()));
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Local::now());
    }

    pub fn successes(&self) -> &[BatchSuccess] {
        &self.successes
    }

    pub fn failures(&self) -> &[(PathBuf, String)] {
        &self.failures
    }

    pub fn total(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Success rate such as `75.0%`, or `0%` for an empty batch
    pub fn success_rate(&self) -> String {
        match self.total() {
            0 => "0%".to_string(),
            total => format!("{:.1}%", self.successes.len() as f64 * 100.0 / total as f64),
        }
    }

    fn duration(&self) -> String {
        let Some(end) = self.finished_at else {
            return "Unknown".to_string();
        };
        let elapsed = (end - self.started_at).to_std().unwrap_or(Duration::ZERO);
        format_duration(elapsed)
    }

    /// Render the batch summary as Markdown
    pub fn render(&self) -> String {
        let mut out = String::from("# Batch Conversion Report\n\n## 📋 Conversion Overview\n\n");
        out.push_str("| Item | Value |\n|------|-------|\n");

        let end = self
            .finished_at
            .map(|t| t.format(TIME_FORMAT).to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        let _ = writeln!(out, "| **Start Time** | {} |", self.started_at.format(TIME_FORMAT));
        let _ = writeln!(out, "| **End Time** | {} |", end);
        let _ = writeln!(out, "| **Duration** | {} |", self.duration());
        let _ = writeln!(out, "| **Source Directory** | `{}` |", self.source_dir.display());
        let _ = writeln!(out, "| **Output Directory** | `{}` |", self.output_dir.display());
        let _ = writeln!(
            out,
            "| **Report Directory** | `{}` |",
            self.report_dir
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| "Not specified".to_string())
        );
        let _ = writeln!(out, "| **File Pattern** | `{}` |", self.pattern);
        let _ = writeln!(
            out,
            "| **Custom Template** | `{}` |",
            self.template
                .as_ref()
                .map(|t| t.display().to_string())
                .unwrap_or_else(|| "Default template".to_string())
        );
        let _ = writeln!(out, "| **Successful Conversions** | {} files |", self.successes.len());
        let _ = writeln!(out, "| **Failed Conversions** | {} files |", self.failures.len());
        let _ = writeln!(out, "| **Total** | {} files |", self.total());
        let _ = writeln!(out, "| **Success Rate** | {} |\n", self.success_rate());

        let _ = writeln!(out, "## ✅ Successful Conversions ({})\n", self.successes.len());
        if self.successes.is_empty() {
            out.push_str("*No successfully converted files*\n\n");
        } else {
            out.push_str("| # | Source File | Target File | Report File |\n");
            out.push_str("|---|-------------|-------------|-------------|\n");
            for (i, success) in self.successes.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "| {} | `{}` | `{}` | `{}` |",
                    i + 1,
                    success.source.display(),
                    success.target.display(),
                    success.report.display()
                );
            }
            out.push('\n');
        }

        let _ = writeln!(out, "## ❌ Failed Conversions ({})\n", self.failures.len());
        if self.failures.is_empty() {
            out.push_str("*No failed conversion files*\n\n");
        } else {
            out.push_str("| # | Source File | Failure Reason |\n");
            out.push_str("|---|-------------|----------------|\n");
            for (i, (source, reason)) in self.failures.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "| {} | `{}` | {} |",
                    i + 1,
                    source.display(),
                    cell(Some(reason.as_str()))
                );
            }
            out.push('\n');
        }

        let _ = writeln!(
            out,
            "---\n*Report generated at: {}*",
            Local::now().format(TIME_FORMAT)
        );
        let _ = writeln!(out, "*Tool version: x2conf v{}*", env!("CARGO_PKG_VERSION"));
        out
    }
}

/// `42 seconds`, `3 minutes 5 seconds` or `1 hours 0 minutes 7 seconds`
pub fn format_duration(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();
    if seconds < 60 {
        format!("{} seconds", seconds)
    } else if seconds < 3600 {
        format!("{} minutes {} seconds", seconds / 60, seconds % 60)
    } else {
        format!(
            "{} hours {} minutes {} seconds",
            seconds / 3600,
            (seconds % 3600) / 60,
            seconds % 60
        )
    }
}
