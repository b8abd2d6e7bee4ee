//! mimegate CLI - content-sniffing file type gatekeeper

rust_i18n::i18n!("locales", fallback = "en");

mod cli;
mod locale;
mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use mimegate_core::{
    ConfigError, FileReport, Gatekeeper, GatekeeperConfig, ScanOptions, ScanReport, extensions_for,
    generate_schema, join_extensions, parse_media_type_list, scan_paths,
};
use rust_i18n::t;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, DetectArgs, OutputFormat, ScanArgs};

/// Nothing was blocked.
const EXIT_OK: u8 = 0;
/// At least one file was rejected or could not be read.
const EXIT_BLOCKED: u8 = 1;
/// Usage or configuration error.
const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{}: {:#}", t!("cli.error").red().bold(), e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("MIMEGATE_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<u8> {
    let config = load_config(cli.config.as_ref())?;
    let locale = locale::init(cli.locale.as_deref(), config.locale.as_deref());
    debug!(locale, "selected locale");

    match cli.command {
        Commands::Scan(args) => scan(config, args),
        Commands::Detect(args) => detect(config, args),
        Commands::Extensions { types } => extensions(&config, &types),
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&generate_schema())?);
            Ok(EXIT_OK)
        }
        Commands::CheckConfig => check_config(&config),
    }
}

/// Load an explicit config (errors are fatal), or a discovered one, or the
/// defaults.
fn load_config(explicit: Option<&PathBuf>) -> Result<GatekeeperConfig> {
    let path = match explicit {
        Some(path) => Some(path.clone()),
        None => {
            let cwd = std::env::current_dir().context("cannot determine current directory")?;
            GatekeeperConfig::discover(&cwd)
        }
    };
    let Some(path) = path else {
        return Ok(GatekeeperConfig::default());
    };
    debug!(path = %path.display(), "loading config");
    GatekeeperConfig::load(&path).with_context(|| {
        t!("cli.config.load_failed", path = path.display().to_string()).to_string()
    })
}

fn print_warnings(config: &GatekeeperConfig) -> usize {
    let warnings = config.validate();
    for warning in &warnings {
        eprintln!("{}", output::format_warning(warning));
    }
    warnings.len()
}

fn scan(mut config: GatekeeperConfig, args: ScanArgs) -> Result<u8> {
    if let Some(mode) = args.mode {
        config.scanmode = Some(mode);
    }
    if let Some(types) = args.types {
        config.mimetypes = types;
    }
    if args.delete_rejected {
        config.delete_rejected = true;
    }
    config.exclude.extend(args.exclude);
    if args.max_files.is_some() {
        config.max_files = args.max_files;
    }

    print_warnings(&config);
    let gatekeeper = Gatekeeper::new(config);
    if !gatekeeper.policy().is_configured() {
        eprintln!("{}", t!("cli.scan.not_configured").yellow());
    }

    let report = match (&args.filename, args.paths.as_slice()) {
        (Some(filename), [path]) => scan_single(&gatekeeper, path, filename),
        (Some(_), _) => anyhow::bail!("--filename can only be used with a single file"),
        (None, paths) => {
            let options = ScanOptions::from_config(gatekeeper.config());
            scan_paths(paths, &gatekeeper, &options)?
        }
    };

    match args.format {
        OutputFormat::Text => print!("{}", output::format_scan_text(&report)),
        OutputFormat::Json => {
            let json = output::scan_json(&report);
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    Ok(if report.has_blocked() { EXIT_BLOCKED } else { EXIT_OK })
}

/// Scan one file under the name its uploader gave it.
fn scan_single(gatekeeper: &Gatekeeper, path: &Path, filename: &str) -> ScanReport {
    let start = Instant::now();
    let (detection, outcome) = gatekeeper.scan_detailed(path, filename);
    let file = FileReport {
        path: path.to_path_buf(),
        detection,
        outcome,
    };
    let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    ScanReport::new(vec![file], elapsed_ms)
}

fn detect(config: GatekeeperConfig, args: DetectArgs) -> Result<u8> {
    let gatekeeper = Gatekeeper::new(config);
    let mut results = Vec::new();
    let mut failed = false;

    for path in &args.paths {
        match gatekeeper.detect(path, "") {
            Ok(detection) => match args.format {
                OutputFormat::Text => {
                    println!("{}", output::format_detection_text(path, &detection))
                }
                OutputFormat::Json => results.push(output::detection_json(path, &detection)),
            },
            Err(e) => {
                failed = true;
                eprintln!("{}: {}", t!("cli.error").red().bold(), e);
            }
        }
    }

    if args.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }
    Ok(if failed { EXIT_BLOCKED } else { EXIT_OK })
}

fn extensions(config: &GatekeeperConfig, types: &[String]) -> Result<u8> {
    let registry = config.registry();
    let types: Vec<_> = types
        .iter()
        .flat_map(|arg| parse_media_type_list(arg))
        .collect();
    let extensions = extensions_for(&types, &registry);
    if extensions.is_empty() {
        eprintln!("{}", t!("cli.extensions.none"));
        return Ok(EXIT_BLOCKED);
    }
    println!("{}", join_extensions(&extensions));
    Ok(EXIT_OK)
}

fn check_config(config: &GatekeeperConfig) -> Result<u8> {
    match config.check() {
        Ok(()) => {
            println!("{}", t!("cli.config.valid").green());
            Ok(EXIT_OK)
        }
        Err(ConfigError::ValidationFailed(warnings)) => {
            for warning in &warnings {
                eprintln!("{}", output::format_warning(warning));
            }
            Ok(EXIT_BLOCKED)
        }
        Err(e) => {
            eprintln!("{}: {}", t!("cli.config.warning").yellow().bold(), e);
            Ok(EXIT_BLOCKED)
        }
    }
}
