//! S/MIME signature inspection CLI
//!
//! Verifies the detached S/MIME signatures of a stored message and prints the
//! banner each signed part would be annotated with.

use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};
use smime_verify::infra::config::{validate_config, ExportFormat};
use smime_verify::{
    ConfigManager, EmlMessage, InspectReport, InspectWorkflow, VerifierConfiguration,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "smime-verify")]
#[command(about = "Verify S/MIME signatures of stored email messages")]
#[command(long_about = "
smime-verify - detached S/MIME signature verification

EXAMPLES:
    # Verify a message and print its banners
    smime-verify inspect message.eml

    # Full verdicts as JSON
    smime-verify inspect message.eml --json

    # Trust a private CA bundle
    smime-verify inspect message.eml --ca-file corp-ca.pem --no-system-roots

ENVIRONMENT VARIABLES:
    RUST_LOG        Logging level (debug, info, warn, error)
")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify the signatures of an RFC 822 message file
    Inspect {
        /// Message file (.eml)
        #[arg(value_name = "MESSAGE_FILE")]
        message: PathBuf,

        /// Additional PEM bundle of trusted CA certificates
        #[arg(long, value_name = "FILE")]
        ca_file: Option<PathBuf>,

        /// Do not load the system trust store
        #[arg(long)]
        no_system_roots: bool,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show {
        #[arg(long, value_enum, default_value = "toml")]
        format: FormatArg,
    },
    /// Write a default configuration file if none exists
    Init,
    /// Replace the configuration with the contents of FILE
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long, value_enum, default_value = "toml")]
        format: FormatArg,
    },
    /// Print the configuration file path
    Path,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Toml,
    Json,
    Yaml,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Toml => ExportFormat::Toml,
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Yaml => ExportFormat::Yaml,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };

    match cli.command {
        Commands::Inspect {
            message,
            ca_file,
            no_system_roots,
            json,
        } => {
            let mut config = manager.load_or_default()?;
            if ca_file.is_some() {
                config.trust.ca_file = ca_file;
            }
            if no_system_roots {
                config.trust.use_system_roots = false;
            }
            handle_inspect_command(config, &message, json)?;
        }

        Commands::Config(ConfigCommands::Show { format }) => {
            println!("{}", manager.export_config(format.into())?);
        }

        Commands::Config(ConfigCommands::Init) => {
            manager.load_or_create_default()?;
            println!("{}", manager.config_path().display());
        }

        Commands::Config(ConfigCommands::Import { file, format }) => {
            let content = std::fs::read_to_string(&file).into_diagnostic()?;
            manager.import_config(&content, format.into())?;
            println!("Imported {} into {}", file.display(), manager.config_path().display());
        }

        Commands::Config(ConfigCommands::Path) => {
            println!("{}", manager.config_path().display());
        }
    }

    Ok(())
}

fn handle_inspect_command(
    config: VerifierConfiguration,
    path: &Path,
    json: bool,
) -> Result<()> {
    validate_config(&config)?;
    let message = EmlMessage::open(path)?;
    let report = InspectWorkflow::new(config).run(&message)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).into_diagnostic()?
        );
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &InspectReport) {
    if report.verdicts.is_empty() {
        println!("{}: no S/MIME signatures", report.message_id);
        return;
    }

    for part in &report.parts {
        if let Some(banner) = &part.banner {
            println!("[{}] {} ({})", part.part_id, banner.text, part.media_type);
        }
    }

    for verdict in &report.verdicts {
        for diagnostic in verdict.diagnostics() {
            println!(
                "  {} {}: {}",
                verdict.container_id(),
                diagnostic.stage,
                diagnostic.message.replace('\n', "\n    ")
            );
        }
    }
}
