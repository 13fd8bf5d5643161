use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chkpatch::PatcherConfig;
use clap::{ArgAction, Parser, Subcommand};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "chkpatch")]
#[command(version, about = "Patches the checksum check out of a game executable")]
struct Cli {
    /// TOML config file (defaults are used when omitted)
    #[arg(short, long, global = true, env = "CHKPATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Write a patched copy of the game executable (default)
    Patch {
        /// Executable to patch; located via --game-dir when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Game install directory
        #[arg(short, long)]
        game_dir: Option<PathBuf>,

        /// Directory for the patched executable
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// File stem of the patched executable
        #[arg(long)]
        output_name: Option<String>,

        /// Also write hex dumps of the original and patched images here
        #[arg(long)]
        dump_hex: Option<PathBuf>,
    },
    /// Report whether the executable is patchable, without writing anything
    Scan {
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[arg(short, long)]
        game_dir: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a hex dump of a file
    Hexdump {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Bytes per line
        #[arg(long)]
        chunk_size: Option<usize>,
    },
    /// Print the resolved game executable path
    Locate {
        #[arg(short, long)]
        game_dir: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("Failed to initialize logging: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(format!("chkpatch={level}").parse()?),
        )
        .init();
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<PatcherConfig> {
    match path {
        Some(path) => {
            let config = PatcherConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            debug!("Loaded config from {}", path.display());
            Ok(config)
        }
        None => Ok(PatcherConfig::default()),
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;

    let command = cli.command.unwrap_or(Command::Patch {
        input: None,
        game_dir: None,
        output_dir: None,
        output_name: None,
        dump_hex: None,
    });

    let success = match command {
        Command::Patch {
            input,
            game_dir,
            output_dir,
            output_name,
            dump_hex,
        } => commands::patch::run(
            config,
            commands::patch::PatchArgs {
                input,
                game_dir,
                output_dir,
                output_name,
                dump_hex,
            },
        )?,
        Command::Scan {
            input,
            game_dir,
            json,
        } => commands::scan::run(&config, input, game_dir, json)?,
        Command::Hexdump {
            input,
            output,
            chunk_size,
        } => {
            let chunk_size = chunk_size.unwrap_or(config.export.chunk_size);
            commands::hexdump::run(&input, &output, chunk_size)?;
            true
        }
        Command::Locate { game_dir } => commands::locate::run(&config, game_dir)?,
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
