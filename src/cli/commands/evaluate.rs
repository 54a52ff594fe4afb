//! Evaluate command - Evaluate a trained model against baseline opponents

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};

use crate::{
    app::App,
    cli::output::{print_kv, print_section},
    pipeline::{EvaluationResult, Opponent, evaluate},
};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpponentKind {
    /// Uniformly random legal moves
    Random,
    /// A second greedy agent loaded from `--opponent-model`
    Greedy,
}

#[derive(Parser, Debug)]
#[command(about = "Evaluate a trained model")]
pub struct EvaluateArgs {
    /// Path to the trained model file
    pub model: PathBuf,

    /// Opponent to evaluate against
    #[arg(long, value_enum, default_value_t = OpponentKind::Random)]
    pub opponent: OpponentKind,

    /// Model played by a greedy opponent (defaults to the evaluated model)
    #[arg(long)]
    pub opponent_model: Option<PathBuf>,

    /// Number of evaluation games
    #[arg(long, short = 'g', default_value_t = 100)]
    pub games: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Load the model(s) named by `args` and play the evaluation games.
pub fn run_evaluation(app: &App, args: &EvaluateArgs) -> Result<EvaluationResult> {
    let mut loaded = app.load_model(&args.model)?;
    let grid = *loaded.state.config();

    let opponent = match args.opponent {
        OpponentKind::Random => Opponent::Random,
        OpponentKind::Greedy => {
            let path = args.opponent_model.as_ref().unwrap_or(&args.model);
            let other = app.load_model(path)?;
            if other.state.config() != &grid {
                bail!(
                    "opponent model was trained on a {}x{} grid, expected {}x{}",
                    other.state.height(),
                    other.state.width(),
                    grid.height,
                    grid.width
                );
            }
            Opponent::Greedy(Box::new(other.agent))
        }
    };

    Ok(evaluate(
        &mut loaded.agent,
        grid,
        args.games,
        opponent,
        args.seed,
    )?)
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    println!("Loading trained model from: {}", args.model.display());
    let app = App::new();
    let result = run_evaluation(&app, &args)?;

    print_section("Evaluation Results");
    print_kv("Opponent", &format!("{:?}", args.opponent));
    print_kv("Games", &result.games.to_string());
    print_kv(
        "Agent wins",
        &format!("{} ({:.1}%)", result.agent_wins, 100.0 * result.win_rate),
    );
    print_kv("Opponent wins", &result.opponent_wins.to_string());
    print_kv("Wins moving first", &result.wins_as_first.to_string());
    print_kv("Wins moving second", &result.wins_as_second.to_string());

    Ok(())
}
