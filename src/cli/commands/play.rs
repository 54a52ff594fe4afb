//! Play command - Play Chomp against a trained agent in the terminal

use std::{
    io::{self, BufRead, Write},
    num::NonZeroUsize,
    path::PathBuf,
};

use anyhow::{Result, bail};
use clap::Parser;

use crate::{
    Error,
    app::{App, GridConfig},
    chomp::{GameState, Player, format_grid, format_move, parse_move},
    cli::{
        commands::train::{TrainPlan, run_training},
        config::{AgentArgs, GridArgs},
        output::print_section,
    },
    pipeline::TrainingConfig,
    q_learning::QAgent,
};

/// Number of moves listed by `--hints`
const HINT_COUNT: usize = 3;

#[derive(Parser, Debug)]
#[command(about = "Play against the agent (you move first)")]
pub struct PlayArgs {
    /// Trained model to play against; without it an agent is trained first
    #[arg(long, short = 'm')]
    pub model: Option<PathBuf>,

    #[command(flatten)]
    pub grid: GridArgs,

    #[command(flatten)]
    pub agent: AgentArgs,

    /// Self-play games for the inline training run
    #[arg(long, short = 'n', default_value_t = 5000)]
    pub iterations: usize,

    /// Move area limit for the inline training run
    #[arg(long)]
    pub move_area_limit: Option<NonZeroUsize>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Show the agent's valuation of your options before each move
    #[arg(long)]
    pub hints: bool,
}

impl PlayArgs {
    fn has_training_flags(&self) -> bool {
        let grid = &self.grid;
        grid.height.is_some()
            || grid.width.is_some()
            || grid.poisoned_row.is_some()
            || grid.poisoned_col.is_some()
            || self.agent.alpha.is_some()
            || self.agent.epsilon.is_some()
            || self.move_area_limit.is_some()
    }
}

/// Play one game on `game`, reading human moves from `input`.
///
/// The human is Player1 and the agent answers greedily as Player2. Returns
/// the winner, or `None` when the human quits with `q`.
pub fn play_session<R: BufRead, W: Write>(
    agent: &mut QAgent,
    game: &mut GameState,
    mut input: R,
    out: &mut W,
    hints: bool,
) -> Result<Option<Player>> {
    let mut line = String::new();
    while game.winner().is_none() {
        writeln!(out, "\n{}", format_grid(game.grid()))?;

        let action = if game.current_player() == Player::Player1 {
            if hints {
                let top: Vec<String> = agent
                    .action_values(game.grid())
                    .into_iter()
                    .take(HINT_COUNT)
                    .map(|(action, value)| format!("{} ({value:+.3})", format_move(action)))
                    .collect();
                writeln!(out, "Hints: {}", top.join(", "))?;
            }
            write!(out, "Your move (e.g. B3, q to quit): ")?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                bail!("input closed before the game finished");
            }
            let text = line.trim();
            if text.eq_ignore_ascii_case("q") || text.eq_ignore_ascii_case("quit") {
                return Ok(None);
            }
            match parse_move(text, game.grid()) {
                Ok(action) => action,
                Err(e) => {
                    writeln!(out, "✗ {e}")?;
                    continue;
                }
            }
        } else {
            let action = agent
                .choose_action(game.grid(), false, None)
                .ok_or(Error::NoValidMoves)?;
            writeln!(out, "AI plays {}", format_move(action))?;
            action
        };

        if let Err(e) = game.apply_move(action) {
            writeln!(out, "✗ {e}")?;
        }
    }

    writeln!(out, "\n{}", format_grid(game.grid()))?;
    let winner = game.winner();
    match winner {
        Some(Player::Player1) => writeln!(out, "You win!")?,
        Some(Player::Player2) => writeln!(out, "The AI wins.")?,
        None => {}
    }
    Ok(winner)
}

pub fn execute(args: PlayArgs) -> Result<()> {
    let app = App::new();

    let (mut agent, mut game) = match &args.model {
        Some(path) => {
            if args.has_training_flags() {
                bail!("board and training flags cannot be combined with --model");
            }
            let model = app.load_model(path)?;
            println!("Loaded model trained for {} games", model.iterations);
            (model.agent, model.state)
        }
        None => {
            let plan = TrainPlan {
                grid: args.grid.resolve(GridConfig::default())?,
                agent: args.agent.resolve(Default::default())?,
                training: TrainingConfig {
                    iterations: args.iterations,
                    move_area_limit: args.move_area_limit,
                    seed: args.seed,
                    ..Default::default()
                },
            };
            plan.training.validate()?;
            print_section("Training opponent");
            let outcome = run_training(&app, &plan, true)?;
            (outcome.agent, app.new_game(plan.grid)?)
        }
    };
    if let Some(seed) = args.seed {
        agent.reseed(seed);
    }

    print_section("Chomp");
    println!("Avoid the poisoned cell (*). Used cells are marked with /.");
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    play_session(&mut agent, &mut game, stdin.lock(), &mut stdout, args.hints)?;
    Ok(())
}
