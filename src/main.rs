// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Takein: path intake for show/shot pipelines
//!
//! Paste paths on stdin (or pass a file holding them), review where each one
//! would go, then link or copy them into place.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use takein::intake::{date_stamp, preview_destination};
use takein::report::{render_materialization, render_plan};
use takein::{IntakeConfig, IntakePlan, IntakeSession, MaterializationReport, Method, TakeinError};

/// Takein CLI - pasted path intake
#[derive(Parser, Debug)]
#[command(name = "takein")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version)]
#[command(about = "Group pasted file paths by a destination pattern and link or copy them", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides for the configured tokenizer rules and destination
#[derive(Args, Debug, Default)]
struct RuleArgs {
    /// Separators for the full path (whitespace-separated)
    #[arg(long)]
    path_seps: Option<String>,

    /// Keys for the full path (`_` discards, `...` divides)
    #[arg(long)]
    path_keys: Option<String>,

    /// Separators for the base name
    #[arg(long)]
    name_seps: Option<String>,

    /// Keys for the base name
    #[arg(long)]
    name_keys: Option<String>,

    /// Destination directory pattern, e.g. /shows/${SHOW}/${SEQ}
    #[arg(long)]
    dest: Option<String>,
}

impl RuleArgs {
    fn apply(self, config: &mut IntakeConfig) {
        if let Some(v) = self.path_seps {
            config.path_separators = v;
        }
        if let Some(v) = self.path_keys {
            config.path_keys = v;
        }
        if let Some(v) = self.name_seps {
            config.name_separators = v;
        }
        if let Some(v) = self.name_keys {
            config.name_keys = v;
        }
        if let Some(v) = self.dest {
            config.destination = v;
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show where each pasted path would go
    Analyze {
        /// File holding the pasted paths (default: stdin)
        input: Option<PathBuf>,

        #[command(flatten)]
        rules: RuleArgs,
    },

    /// Analyze, then link or copy every valid source into place
    Run {
        /// File holding the pasted paths (default: stdin)
        input: Option<PathBuf>,

        /// How files reach their destination
        #[arg(short, long, default_value = "link", value_parser = ["link", "copy"])]
        method: String,

        /// Save the effective settings after a successful run
        #[arg(long)]
        save: bool,

        #[command(flatten)]
        rules: RuleArgs,
    },

    /// Show the destination of the first pasted path without touching disk
    Preview {
        /// File holding the pasted paths (default: stdin)
        input: Option<PathBuf>,

        #[command(flatten)]
        rules: RuleArgs,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Write the default configuration
    Generate {
        /// Output file path (default: the configuration path)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate configuration file
    Validate,

    /// Print the configuration file location
    Path,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli
        .config
        .clone()
        .or_else(IntakeConfig::default_path)
        .unwrap_or_else(|| PathBuf::from("takein.json"));
    let mut config = IntakeConfig::load(&config_path)?;

    match cli.command {
        Commands::Analyze { input, rules } => {
            rules.apply(&mut config);
            run_analyze(&config, input.as_deref(), &cli.format)
        }
        Commands::Run { input, method, save, rules } => {
            rules.apply(&mut config);
            let method: Method = method.parse()?;
            run_intake(&config, input.as_deref(), method, &cli.format)?;
            if save {
                config.save(&config_path)?;
                info!("Saved settings to {:?}", config_path);
            }
            Ok(())
        }
        Commands::Preview { input, rules } => {
            rules.apply(&mut config);
            run_preview(&config, input.as_deref())
        }
        Commands::Config { action } => run_config_command(config, action, &config_path),
    }
}

/// Read pasted text from a file or stdin
fn read_input(input: Option<&Path>) -> anyhow::Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

fn print_output<T: Serialize>(format: &str, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text());
    }
    Ok(())
}

/// Analyze only
fn run_analyze(config: &IntakeConfig, input: Option<&Path>, format: &str) -> anyhow::Result<()> {
    config.validate()?;
    let text = read_input(input)?;
    let plan = takein::analyze(&text, config)?;
    print_output(format, &plan, || render_plan(&plan))
}

/// Analyze and materialize
fn run_intake(config: &IntakeConfig, input: Option<&Path>, method: Method, format: &str) -> anyhow::Result<()> {
    config.validate()?;
    let text = read_input(input)?;

    let mut session = IntakeSession::new();
    let plan = session.analyze(&text, config)?.clone();
    if format == "text" {
        print!("{}", render_plan(&plan));
    }

    let report = if plan.is_empty() {
        warn!("Nothing to take in");
        session.revert()?;
        None
    } else {
        Some(session.materialize(method)?)
    };

    let output = RunOutput {
        plan: &plan,
        report: report.as_ref(),
    };
    print_output(format, &output, || {
        report.as_ref().map(render_materialization).unwrap_or_default()
    })?;

    if report.is_some() {
        session.finish();
    }
    Ok(())
}

/// JSON shape of `run`: the analyzed plan and, if anything was
/// materialized, the report
#[derive(Serialize, Debug)]
struct RunOutput<'a> {
    plan: &'a IntakePlan,
    report: Option<&'a MaterializationReport>,
}

/// Sample destination for the first path
fn run_preview(config: &IntakeConfig, input: Option<&Path>) -> anyhow::Result<()> {
    config.validate()?;
    let text = read_input(input)?;
    match preview_destination(&text, config, &date_stamp())? {
        Some((sample, dest)) => println!("{} -> {}", sample, dest),
        None => println!("filepath not found"),
    }
    Ok(())
}

/// Run config commands
fn run_config_command(config: IntakeConfig, action: ConfigCommands, config_path: &Path) -> anyhow::Result<()> {
    match action {
        ConfigCommands::Show => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommands::Generate { output, force } => {
            let output = output.unwrap_or_else(|| config_path.to_path_buf());
            if output.exists() && !force {
                return Err(TakeinError::Config(format!(
                    "{} already exists. Use --force to overwrite",
                    output.display()
                ))
                .into());
            }
            IntakeConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            config.validate()?;
            println!("Configuration at {:?} is valid", config_path);
            println!("  Path rule: [{}] split by [{}]", config.path_keys, config.path_separators);
            println!("  Name rule: [{}] split by [{}]", config.name_keys, config.name_separators);
            println!("  Destination: {}", config.destination);
        }
        ConfigCommands::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}
