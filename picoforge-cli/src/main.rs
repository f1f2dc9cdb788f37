//! PicoForge CLI - inspect pico-fido device responses and configuration changes.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::debug;

mod commands;
mod config;
mod exit_codes;
mod logging;
mod utils;

use config::{CliConfig, OutputFormat};
use exit_codes::ExitCode;

const EXIT_CODES_HELP: &str = "\
Exit codes:
  0   Success
  1   General error
  64  Usage error (malformed hex argument)
  65  Data error (response or configuration could not be decoded/encoded)
  66  Input file missing or unreadable
  74  Output could not be written";

#[derive(Parser)]
#[command(name = "picoforge")]
#[command(author, version, about = "pico-fido device data inspector", long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode captured device responses
    #[command(subcommand)]
    Decode(DecodeCommand),

    /// Show the changes between two configurations and the payload that applies them
    Diff {
        /// Current configuration (DeviceConfig or DeviceStatus JSON)
        #[arg(value_name = "CURRENT")]
        current: PathBuf,

        /// Edited configuration (DeviceConfig or DeviceStatus JSON)
        #[arg(value_name = "EDITED")]
        edited: PathBuf,
    },

    /// Encode a change set into the configuration write payload
    Encode {
        /// Change set JSON (any subset of DeviceConfig fields)
        #[arg(value_name = "CHANGES")]
        changes: PathBuf,

        /// Current configuration, used for fields packed together with changed ones.
        /// Without it those fields are taken as all off, which also disables
        /// power cycle on reset when any LED option is changed
        #[arg(long, value_name = "CURRENT")]
        current: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum DecodeCommand {
    /// Decode rescue applet responses into a full device status
    Status(StatusArgs),

    /// Decode an authenticatorGetInfo response
    Fido {
        /// Response bytes as hex, or @FILE to read hex from a file
        #[arg(value_name = "HEX")]
        response: String,
    },
}

/// Each response is hex (spaces, ':' and a 0x prefix allowed) or @FILE.
#[derive(Args)]
struct StatusArgs {
    /// Applet select response
    #[arg(long, value_name = "HEX")]
    select: String,

    /// Flash info response
    #[arg(long, value_name = "HEX")]
    flash: String,

    /// PHY configuration response
    #[arg(long, value_name = "HEX")]
    phy: String,

    /// Secure boot status response (reported as disabled when omitted)
    #[arg(long, value_name = "HEX")]
    secure: Option<String>,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    logging::init(cli.verbose, cli.quiet);

    let mut config = CliConfig::from_env();
    if cli.json {
        config.output = OutputFormat::Json;
    }
    config.apply_color();
    debug!(?config, "Loaded CLI configuration");

    match run(cli.command, &config) {
        Ok(()) => ExitCode::success().into(),
        Err(err) => {
            let exit = ExitCode::from_anyhow(&err);
            if let Some(message) = &exit.message {
                eprintln!("Error: {message}");
            }
            exit.into()
        }
    }
}

fn run(command: Commands, config: &CliConfig) -> Result<()> {
    match command {
        Commands::Decode(DecodeCommand::Status(args)) => commands::decode::status(
            &args.select,
            &args.flash,
            args.secure.as_deref(),
            &args.phy,
            config,
        ),
        Commands::Decode(DecodeCommand::Fido { response }) => {
            commands::decode::fido(&response, config)
        }
        Commands::Diff { current, edited } => commands::diff::execute(&current, &edited, config),
        Commands::Encode { changes, current } => {
            commands::encode::execute(&changes, current.as_deref(), config)
        }
    }
}
