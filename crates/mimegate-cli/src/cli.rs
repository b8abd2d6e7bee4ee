//! Command line arguments.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mimegate")]
#[command(author, version, about = "Content-sniffing file type gatekeeper for uploads", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ./mimegate.toml, then the user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Message locale (en, es, zh-CN)
    #[arg(long, global = true)]
    pub locale: Option<String>,

    /// Log debug output to stderr (overridden by MIMEGATE_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan files and directories against the configured policy
    Scan(ScanArgs),

    /// Print the detected media type of files without applying a policy
    Detect(DetectArgs),

    /// List the extensions registered for media types
    Extensions {
        /// Media types; each value may also be a semicolon-separated list
        #[arg(required = true)]
        types: Vec<String>,
    },

    /// Print the JSON schema for mimegate.toml
    Schema,

    /// Validate the configuration and report warnings
    CheckConfig,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Files or directories to scan
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Policy mode, overriding the config file ("allow" or "deny")
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Semicolon-separated media types, overriding the config file
    #[arg(short, long)]
    pub types: Option<String>,

    /// Name the uploader gave the file (single file scans only)
    #[arg(long)]
    pub filename: Option<String>,

    /// Remove rejected files
    #[arg(long)]
    pub delete_rejected: bool,

    /// Extra glob patterns to skip in directories
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Maximum number of files to scan
    #[arg(long)]
    pub max_files: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Files to inspect
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
