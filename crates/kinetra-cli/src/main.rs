//! Kinetra CLI — simulation, checkpointing, and export.

use clap::{Parser, Subcommand};

mod commands;
mod scenarios;

#[derive(Parser)]
#[command(name = "kinetra")]
#[command(version, about = "Kinetra — constraint-based multibody dynamics engine")]
struct Cli {
    /// Increase log verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a built-in scenario with a config file.
    Simulate {
        /// Path to simulation config (TOML). Defaults apply if absent.
        #[arg(short, long)]
        config: Option<String>,

        /// Which scenario to run (pendulum, gear_train, conveyor).
        #[arg(short, long, default_value = "pendulum")]
        scenario: String,

        /// Write a checkpoint of the final state here.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Read a checkpoint and rewrite it, validating every record.
    Checkpoint {
        /// Input checkpoint path.
        input: String,
        /// Output checkpoint path.
        output: String,
    },

    /// Export a checkpoint as a POV-Ray scene listing.
    Export {
        /// Input checkpoint path.
        input: String,
        /// Output scene file path.
        output: String,
    },

    /// Inspect a checkpoint file.
    Inspect {
        /// Path to checkpoint file.
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let result = match cli.command {
        Commands::Simulate {
            config,
            scenario,
            output,
        } => commands::simulate(config.as_deref(), &scenario, output.as_deref()),
        Commands::Checkpoint { input, output } => commands::checkpoint(&input, &output),
        Commands::Export { input, output } => commands::export(&input, &output),
        Commands::Inspect { path } => commands::inspect(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
