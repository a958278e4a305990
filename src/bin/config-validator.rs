//! # Accessify Configuration Validator
//!
//! Command-line tool that loads an Accessify configuration overlay on top of the
//! built-in defaults and prints the advisory validation report together with
//! the resulting feature-flag set.

use accessify_core::config::{ConfigurationManager, FEATURE_FLAGS};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::process;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "config-validator")]
#[command(about = "Validate Accessify configuration files")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// YAML or JSON overlay applied over the defaults
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Environment whose sibling overlay (`<name>.<env>.<ext>`) is merged in
    #[arg(short, long)]
    environment: Option<String>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format (table, json)
    #[arg(long, default_value = "table")]
    format: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate the configuration and list feature flags
    Validate,

    /// Show every feature flag with its configuration path and state
    Features,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let _subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .try_init();

    if let Some(environment) = &cli.environment {
        std::env::set_var("ACCESSIFY_ENV", environment);
    }

    let result = load(&cli).and_then(|manager| match &cli.command {
        Some(Commands::Features) => show_features(&cli, &manager),
        Some(Commands::Validate) | None => validate(&cli, &manager),
    });

    match result {
        Ok(true) => {
            info!("Configuration validation completed successfully");
            process::exit(0);
        }
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("Configuration validation failed: {}", e);
            eprintln!("Failed to load configuration: {e}");
            process::exit(2);
        }
    }
}

fn load(cli: &Cli) -> accessify_core::Result<ConfigurationManager> {
    match &cli.file {
        Some(path) => ConfigurationManager::from_file(path),
        None => Ok(ConfigurationManager::new()),
    }
}

fn validate(cli: &Cli, manager: &ConfigurationManager) -> accessify_core::Result<bool> {
    let report = manager.validate();
    let enabled = manager.get_enabled_features();
    let disabled = manager.get_disabled_features();

    if cli.format == "json" {
        let output = json!({
            "valid": report.valid,
            "errors": report.errors,
            "enabledFeatures": enabled,
            "disabledFeatures": disabled,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(report.valid);
    }

    println!("Validating Accessify Configuration");
    match &cli.file {
        Some(path) => println!("Overlay: {}", path.display()),
        None => println!("Overlay: (defaults only)"),
    }
    println!();

    if report.valid {
        println!("Configuration is valid");
    } else {
        println!("Configuration has {} error(s):", report.errors.len());
        for message in &report.errors {
            println!("  - {message}");
        }
    }

    println!();
    println!("Enabled features ({}): {}", enabled.len(), enabled.join(", "));
    println!("Disabled features ({}): {}", disabled.len(), disabled.join(", "));

    Ok(report.valid)
}

fn show_features(cli: &Cli, manager: &ConfigurationManager) -> accessify_core::Result<bool> {
    if cli.format == "json" {
        let flags: Vec<_> = FEATURE_FLAGS
            .iter()
            .map(|flag| {
                json!({
                    "name": flag.name,
                    "path": flag.path,
                    "enabled": manager.is_feature_enabled(flag.name),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&flags)?);
        return Ok(true);
    }

    println!("{:<24} {:<28} STATE", "FEATURE", "PATH");
    for flag in FEATURE_FLAGS {
        let state = if manager.is_feature_enabled(flag.name) {
            "enabled"
        } else {
            "disabled"
        };
        println!("{:<24} {:<28} {}", flag.name, flag.path, state);
    }
    Ok(true)
}
