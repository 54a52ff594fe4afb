//! QChomp CLI - Train, play and evaluate Q-learning agents for Chomp
//!
//! This CLI provides a unified interface for:
//! - Training an agent through self-play
//! - Playing against a trained agent in the terminal
//! - Evaluating a model against baseline opponents
//! - Inspecting saved models

use anyhow::Result;
use clap::{Parser, Subcommand};
use qchomp::cli::{commands, output::init_logging};

#[derive(Parser)]
#[command(name = "qchomp")]
#[command(version, about = "Chomp with a tabular Q-learning agent", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train an agent through self-play and save the model
    Train(Box<commands::train::TrainArgs>),

    /// Play against a trained agent
    Play(Box<commands::play::PlayArgs>),

    /// Evaluate a trained model against a baseline opponent
    Evaluate(commands::evaluate::EvaluateArgs),

    /// Print model metadata and preferred opening moves
    Inspect(commands::inspect::InspectArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Train(args) => commands::train::execute(*args),
        Commands::Play(args) => commands::play::execute(*args),
        Commands::Evaluate(args) => commands::evaluate::execute(args),
        Commands::Inspect(args) => commands::inspect::execute(args),
    }
}
