//! Train command - Train a Q-learning agent through self-play

use std::{num::NonZeroUsize, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    app::{AgentConfig, App, GridConfig},
    cli::{
        config::{AgentArgs, GridArgs, TrainFileConfig},
        output::{format_number, print_kv, print_section},
    },
    pipeline::{ProgressObserver, StatsHandle, StatsObserver, TrainingConfig, TrainingResult},
    q_learning::QAgent,
};

#[derive(Parser, Debug)]
#[command(about = "Train an agent through self-play")]
pub struct TrainArgs {
    #[command(flatten)]
    pub grid: GridArgs,

    #[command(flatten)]
    pub agent: AgentArgs,

    /// Number of self-play games
    #[arg(long, short = 'n')]
    pub iterations: Option<usize>,

    /// Largest number of cells a move may take outside the endgame
    #[arg(long)]
    pub move_area_limit: Option<NonZeroUsize>,

    /// Multiplicative epsilon decay per game, in (0, 1]
    #[arg(long)]
    pub epsilon_decay: Option<f64>,

    /// Floor for decayed epsilon
    #[arg(long)]
    pub min_epsilon: Option<f64>,

    /// Games between training statistics records
    #[arg(long)]
    pub stats_interval: Option<usize>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output file for the trained model
    /// (defaults to `{height}_{width}_{iterations}_model.json`)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Write training statistics to this file (`.csv` or JSON)
    #[arg(long)]
    pub stats: Option<PathBuf>,

    /// JSON configuration file; explicit flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Fully resolved settings of a training run
#[derive(Debug, Clone, PartialEq)]
pub struct TrainPlan {
    pub grid: GridConfig,
    pub agent: AgentConfig,
    pub training: TrainingConfig,
}

impl TrainArgs {
    /// Merge the optional config file with the command-line flags.
    pub fn plan(&self) -> Result<TrainPlan> {
        let file = match &self.config {
            Some(path) => TrainFileConfig::load(path)?,
            None => TrainFileConfig::default(),
        };

        let grid = self.grid.resolve(file.grid())?;
        let agent = self.agent.resolve(file.agent())?;
        let base = file.training();
        let training = TrainingConfig {
            iterations: self.iterations.unwrap_or(base.iterations),
            move_area_limit: self.move_area_limit.or(base.move_area_limit),
            epsilon_decay: self.epsilon_decay.unwrap_or(base.epsilon_decay),
            min_epsilon: self.min_epsilon.unwrap_or(base.min_epsilon),
            stats_interval: self.stats_interval.unwrap_or(base.stats_interval),
            seed: self.seed.or(base.seed),
        };
        training.validate()?;

        Ok(TrainPlan {
            grid,
            agent,
            training,
        })
    }
}

/// Outcome of [`run_training`]
pub struct TrainOutcome {
    pub agent: QAgent,
    pub result: TrainingResult,
    pub stats: StatsHandle,
}

/// Train a fresh agent according to `plan`.
pub fn run_training(app: &App, plan: &TrainPlan, progress: bool) -> Result<TrainOutcome> {
    let mut agent = app.create_agent(plan.agent)?;
    let stats_observer = StatsObserver::new(plan.training.stats_interval);
    let stats = stats_observer.handle();

    let mut pipeline = app
        .training_pipeline(plan.grid, plan.training)
        .with_observer(Box::new(stats_observer));
    if progress {
        pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
    }

    let result = pipeline.run(&mut agent)?;
    Ok(TrainOutcome {
        agent,
        result,
        stats,
    })
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let plan = args.plan()?;
    let app = App::new();

    print_section("Training");
    print_kv(
        "Grid",
        &format!(
            "{}x{}, poisoned {}",
            plan.grid.height, plan.grid.width, plan.grid.poisoned
        ),
    );
    print_kv("Games", &format_number(plan.training.iterations));
    print_kv(
        "Alpha / epsilon",
        &format!("{} / {}", plan.agent.alpha, plan.agent.epsilon),
    );
    if let Some(limit) = plan.training.move_area_limit {
        print_kv("Move area limit", &limit.to_string());
    }

    let outcome = run_training(&app, &plan, !args.no_progress)?;
    let result = &outcome.result;

    print_section("Training Complete");
    print_kv("Transitions", &format_number(result.transitions));
    print_kv(
        "First player wins",
        &format!(
            "{} ({:.1}%)",
            format_number(result.player1_wins),
            100.0 * result.player1_wins as f64 / result.games as f64
        ),
    );
    print_kv(
        "Average game length",
        &format!("{:.2} moves", result.average_game_length),
    );
    print_kv("Final epsilon", &format!("{:.4}", result.final_epsilon));

    let game = app.new_game(plan.grid)?;
    let saved = app
        .save_model(
            &outcome.agent,
            &game,
            result.games as u64,
            args.output.as_deref(),
        )
        .context("failed to save trained model")?;
    println!("\n✓ Model saved to: {}", saved.display());

    if let Some(stats_path) = &args.stats {
        outcome
            .stats
            .write(stats_path)
            .with_context(|| format!("failed to write stats to {}", stats_path.display()))?;
        println!("✓ Training stats written to: {}", stats_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chomp::Action;

    #[test]
    fn test_parse_defaults() {
        let args = TrainArgs::parse_from(["train"]);
        let plan = args.plan().unwrap();
        assert_eq!(plan.grid, GridConfig::default());
        assert_eq!(plan.training, TrainingConfig::default());
        assert!(!args.no_progress);
    }

    #[test]
    fn test_parse_flags() {
        let args = TrainArgs::parse_from([
            "train",
            "--height",
            "4",
            "--width",
            "5",
            "--poisoned-col",
            "2",
            "-n",
            "300",
            "--alpha",
            "0.3",
            "--move-area-limit",
            "4",
            "--seed",
            "9",
            "--no-progress",
        ]);
        let plan = args.plan().unwrap();
        assert_eq!(plan.grid, GridConfig::new(4, 5, Action::new(0, 2)).unwrap());
        assert_eq!(plan.agent.alpha, 0.3);
        assert_eq!(plan.training.iterations, 300);
        assert_eq!(plan.training.move_area_limit, NonZeroUsize::new(4));
        assert_eq!(plan.training.seed, Some(9));
        assert!(args.no_progress);
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.json");
        std::fs::write(
            &path,
            r#"{ "grid": { "height": 3, "width": 3 }, "training": { "iterations": 77, "seed": 1 } }"#,
        )
        .unwrap();

        let args = TrainArgs::parse_from([
            "train",
            "--config",
            path.to_str().unwrap(),
            "--width",
            "4",
        ]);
        let plan = args.plan().unwrap();
        assert_eq!((plan.grid.height, plan.grid.width), (3, 4));
        assert_eq!(plan.training.iterations, 77);
        assert_eq!(plan.training.seed, Some(1));
    }

    #[test]
    fn test_invalid_flags_rejected() {
        assert!(TrainArgs::parse_from(["train", "-n", "0"]).plan().is_err());
        assert!(TrainArgs::try_parse_from(["train", "--move-area-limit", "0"]).is_err());
        assert!(
            TrainArgs::parse_from(["train", "--epsilon", "1.5"])
                .plan()
                .is_err()
        );
    }

    #[test]
    fn test_execute_writes_model_and_stats() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("model.json");
        let stats = dir.path().join("stats.csv");
        let args = TrainArgs::parse_from([
            "train",
            "--height",
            "3",
            "--width",
            "4",
            "-n",
            "50",
            "--stats-interval",
            "10",
            "--seed",
            "3",
            "--no-progress",
            "--output",
            model.to_str().unwrap(),
            "--stats",
            stats.to_str().unwrap(),
        ]);
        execute(args).unwrap();

        assert!(model.exists());
        let rows = std::fs::read_to_string(&stats).unwrap();
        // Header plus one row per interval
        assert_eq!(rows.lines().count(), 6);
    }
}
