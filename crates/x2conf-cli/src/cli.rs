//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{Args, Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// x2conf CLI - Template-driven conversion of ETL job descriptions
///
/// Converts DataX job JSON into block-structured connector configuration,
/// and reports where every generated field came from.
#[derive(Parser, Debug)]
#[command(
    name = "x2conf",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "X2CONF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert one job description into a configuration file
    Convert(ConvertArgs),

    /// Convert every matching job description under a directory
    Batch(BatchArgs),

    /// Validate a template's syntax or a job description's structure
    Validate(ValidateArgs),

    /// Show which source fields feed which target fields of a template
    Analyze(AnalyzeArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Where templates and the template manifest are read from
#[derive(Args, Debug, Clone, Default)]
pub struct TemplateSourceArgs {
    /// Directory containing the template fragments
    #[arg(long, value_name = "DIR", env = "X2CONF_TEMPLATES_DIR")]
    pub templates_dir: Option<PathBuf>,

    /// Template manifest (YAML) mapping reader/writer types to templates
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,
}

/// Arguments for the convert command
#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Source job description file
    #[arg(short, long, value_name = "FILE")]
    pub source: PathBuf,

    /// Target configuration file (stdout if not specified)
    #[arg(short, long, value_name = "FILE")]
    pub target: Option<PathBuf>,

    /// Source job description type
    #[arg(long, default_value = "datax")]
    pub source_type: String,

    /// Custom template file resolved against the whole job
    #[arg(short = 'T', long, value_name = "FILE")]
    pub template: Option<PathBuf>,

    /// Write a Markdown conversion report to this file
    #[arg(short, long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    #[command(flatten)]
    pub templates: TemplateSourceArgs,
}

/// Arguments for the batch command
#[derive(Parser, Debug)]
pub struct BatchArgs {
    /// Directory searched recursively for job descriptions
    #[arg(short, long, value_name = "DIR")]
    pub directory: PathBuf,

    /// Directory receiving the generated configuration files
    #[arg(long, value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Directory receiving per-file reports and the batch summary
    #[arg(long, value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Comma-separated file name patterns
    #[arg(short, long, default_value = "*.json")]
    pub pattern: String,

    /// Custom template file resolved against every job
    #[arg(short = 'T', long, value_name = "FILE")]
    pub template: Option<PathBuf>,

    #[command(flatten)]
    pub templates: TemplateSourceArgs,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Template file or job description to validate
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// What kind of file is being validated
    #[arg(short, long, value_enum, default_value = "auto")]
    pub kind: ValidateKind,
}

/// Arguments for the analyze command
#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Template file to analyze
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Prefix for target field paths (env, source or sink)
    #[arg(short, long)]
    pub prefix: Option<String>,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// File kinds accepted by the validate command
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ValidateKind {
    /// Decide by file extension: `.json` is a job, anything else a template
    Auto,
    /// Template fragment
    Template,
    /// Job description
    Source,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
