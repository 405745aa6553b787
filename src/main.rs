// SPDX-License-Identifier: PMPL-1.0-or-later
//! auditbot CLI - accessibility audit engine

use anyhow::Context as _;
use auditbot::config::{self, Config};
use auditbot::report::{export_csv, generate_criteria_listing, generate_report};
use auditbot::validate::{self, CreateAuditRequest, ResultUpdate};
use auditbot::{
    read_document, selector, AuditError, AuditSnapshot, AuditType, Aggregator, OutputFormat,
    Referential, ScanReport,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::{fmt, EnvFilter};

/// auditbot: accessibility audit engine
///
/// Selects the criteria an RGAA, RAWEB or RAAM audit must test, aggregates
/// audit results into report figures and converts automated scan reports.
#[derive(Parser)]
#[command(name = "auditbot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error), overrides the config
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the required criteria of a referential
    Criteria {
        /// Referential (rgaa, raweb, raam)
        #[arg(short, long)]
        referential: Referential,

        /// Only list one audit type (fast, complementary, full)
        #[arg(short, long)]
        audit_type: Option<AuditType>,

        /// Output format (text, json)
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Aggregate an audit snapshot into report figures
    Aggregate {
        /// Audit snapshot (JSON, or YAML by extension)
        snapshot: PathBuf,

        /// Output format (text, json)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the status of an audit snapshot
    Status {
        /// Audit snapshot (JSON, or YAML by extension)
        snapshot: PathBuf,
    },

    /// Export the criterion × page matrix as CSV
    Export {
        /// Audit snapshot (JSON, or YAML by extension)
        snapshot: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a scan report into audit results for one page
    Normalize {
        /// Scan report (JSON)
        report: PathBuf,

        /// Page the report was produced for
        #[arg(short, long)]
        page_id: i64,

        /// Fail on the first malformed criterion key
        #[arg(long)]
        strict: bool,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate user input
    Validate {
        #[command(subcommand)]
        target: ValidateTarget,
    },

    /// Initialize configuration file
    Init {
        /// Output format (yaml, toml)
        #[arg(long, default_value = "yaml")]
        format: String,
    },

    /// Show current configuration
    Show,
}

#[derive(Subcommand)]
enum ValidateTarget {
    /// Check an audit creation request
    Audit {
        /// Request document (JSON, or YAML by extension)
        request: PathBuf,
    },

    /// Check result updates against an audit snapshot
    Results {
        /// Audit snapshot (JSON, or YAML by extension)
        snapshot: PathBuf,

        /// Update list (JSON, or YAML by extension)
        updates: PathBuf,

        /// Print the snapshot results with the updates applied
        #[arg(long)]
        apply: bool,
    },
}

fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_new(format!("auditbot={}", level))
        .unwrap_or_else(|_| EnvFilter::new("auditbot=info"));

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        "json" => builder.json().init(),
        "compact" => builder.compact().init(),
        _ => builder.init(),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let config = match config::load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let level = if cli.verbose {
        "debug".to_string()
    } else {
        cli.log_level.clone().unwrap_or_else(|| config.log.level.clone())
    };
    init_logging(&level, &config.log.format);
    debug!(path = %config_path.display(), "Configuration resolved");

    let outcome = match cli.command {
        Command::Criteria { referential, audit_type, format } => {
            handle_criteria(&config, referential, audit_type, format)
        }
        Command::Aggregate { snapshot, format, output } => {
            handle_aggregate(&config, &snapshot, format, output.as_deref())
        }
        Command::Status { snapshot } => handle_status(&config, &snapshot),
        Command::Export { snapshot, output } => handle_export(&config, &snapshot, output.as_deref()),
        Command::Normalize { report, page_id, strict, output } => {
            handle_normalize(&config, &report, page_id, strict, output.as_deref())
        }
        Command::Validate { target } => handle_validate(&config, target),
        Command::Init { format } => handle_init(&config_path, &format),
        Command::Show => handle_show(&config),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn write_output(content: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", content),
    }
    Ok(())
}

fn load_snapshot(path: &Path) -> anyhow::Result<AuditSnapshot> {
    read_document(path).with_context(|| format!("Failed to read audit snapshot {}", path.display()))
}

fn handle_criteria(
    config: &Config,
    referential: Referential,
    audit_type: Option<AuditType>,
    format: Option<OutputFormat>,
) -> anyhow::Result<ExitCode> {
    let catalog = config.load_catalog()?;
    let format = format.unwrap_or(config.report.format);

    let content = match audit_type {
        Some(audit_type) => {
            let criteria = selector::select(&catalog, referential, audit_type);
            match format {
                OutputFormat::Json => serde_json::to_string_pretty(&criteria)?,
                OutputFormat::Text => criteria
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n"),
            }
        }
        None => {
            let criteria = selector::criteria_by_audit_type(&catalog, referential);
            generate_criteria_listing(referential, &criteria, format)
        }
    };

    write_output(&content, None)?;
    Ok(ExitCode::SUCCESS)
}

fn handle_aggregate(
    config: &Config,
    snapshot_path: &Path,
    format: Option<OutputFormat>,
    output: Option<&Path>,
) -> anyhow::Result<ExitCode> {
    let catalog = config.load_catalog()?;
    let snapshot = load_snapshot(snapshot_path)?;
    let report = auditbot::audit_report(&snapshot, &catalog, config);

    let content = generate_report(&report, format.unwrap_or(config.report.format));
    write_output(&content, output)?;
    Ok(ExitCode::SUCCESS)
}

fn handle_status(config: &Config, snapshot_path: &Path) -> anyhow::Result<ExitCode> {
    let catalog = config.load_catalog()?;
    let snapshot = load_snapshot(snapshot_path)?;
    let status = Aggregator::new(&catalog).snapshot_status(&snapshot);
    println!("{}", status);
    Ok(ExitCode::SUCCESS)
}

fn handle_export(config: &Config, snapshot_path: &Path, output: Option<&Path>) -> anyhow::Result<ExitCode> {
    let catalog = config.load_catalog()?;
    let snapshot = load_snapshot(snapshot_path)?;
    let matrix = Aggregator::new(&catalog)
        .snapshot_export(&snapshot)
        .context("Cannot export an audit with missing results")?;

    write_output(&export_csv(&matrix), output)?;
    Ok(ExitCode::SUCCESS)
}

fn handle_normalize(
    config: &Config,
    report_path: &Path,
    page_id: i64,
    strict: bool,
    output: Option<&Path>,
) -> anyhow::Result<ExitCode> {
    let content = std::fs::read_to_string(report_path)
        .with_context(|| format!("Failed to read scan report {}", report_path.display()))?;
    let report = ScanReport::from_json(&content)?;

    let mut config = config.clone();
    config.normalize.strict |= strict;
    let results = auditbot::normalize_report(&report, page_id, &config)?;

    write_output(&serde_json::to_string_pretty(&results)?, output)?;
    Ok(ExitCode::SUCCESS)
}

fn handle_validate(config: &Config, target: ValidateTarget) -> anyhow::Result<ExitCode> {
    let outcome = match target {
        ValidateTarget::Audit { request } => {
            let request: CreateAuditRequest = read_document(&request)?;
            validate::validate_create_audit(&request)
                .and_then(|audit| Ok(serde_json::to_string_pretty(&audit)?))
        }
        ValidateTarget::Results { snapshot, updates, apply } => {
            let catalog = config.load_catalog()?;
            let snapshot = load_snapshot(&snapshot)?;
            let updates: Vec<ResultUpdate> = read_document(&updates)?;
            validate::validate_result_updates(
                &catalog,
                snapshot.audit.referential,
                &snapshot.pages,
                &updates,
            )
            .and_then(|()| {
                if apply {
                    let merged = validate::apply_updates(&snapshot.results, &updates);
                    Ok(serde_json::to_string_pretty(&merged)?)
                } else {
                    Ok(format!("{} update(s) are valid", updates.len()))
                }
            })
        }
    };

    match outcome {
        Ok(content) => {
            write_output(&content, None)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(AuditError::Validation(errors)) => {
            eprintln!("Validation failed with {} issue(s):", errors.len());
            for issue in &errors.issues {
                eprintln!("  - {}", issue);
            }
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

fn handle_init(config_path: &Path, format: &str) -> anyhow::Result<ExitCode> {
    let path = if format == "toml" {
        config_path.with_extension("toml")
    } else {
        config_path.to_path_buf()
    };

    config::write_default_config(&path)?;
    println!("Created configuration file: {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn handle_show(config: &Config) -> anyhow::Result<ExitCode> {
    println!("\nCurrent Configuration:");
    println!("======================\n");

    println!("Catalog:");
    match &config.catalog.dir {
        Some(dir) => println!("  Directory: {}", dir.display()),
        None => println!("  Directory: (embedded)"),
    }
    println!();

    println!("Aggregation:");
    println!("  Blocking: {:?}", config.aggregation.blocking);
    println!();

    println!("Normalize:");
    println!("  Strict: {}", config.normalize.strict);
    println!();

    println!("Report:");
    println!("  Format: {}", config.report.format);
    println!();

    println!("Log:");
    println!("  Level: {}", config.log.level);
    println!("  Format: {}", config.log.format);

    Ok(ExitCode::SUCCESS)
}
