//! Inspect command - Show what a saved model has learned

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::{
    app::App,
    chomp::{Action, format_grid, format_move},
    cli::output::{format_number, print_kv, print_section, print_subsection},
    q_learning::LoadedModel,
};

#[derive(Parser, Debug)]
#[command(about = "Print model metadata and its preferred opening moves")]
pub struct InspectArgs {
    /// Path to the trained model file
    pub model: PathBuf,

    /// Number of opening moves to list
    #[arg(long, default_value_t = 5)]
    pub top: usize,
}

/// Best `top` opening moves of a loaded model, highest value first.
pub fn top_openings(model: &LoadedModel, top: usize) -> Vec<(Action, f64)> {
    let mut values = model.agent.action_values(model.state.grid());
    values.truncate(top);
    values
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let app = App::new();
    let model = app.load_model(&args.model)?;
    let config = model.state.config();
    let table = model.agent.q_table();

    print_section(&format!("Model: {}", args.model.display()));
    print_kv("Grid", &format!("{}x{}", config.height, config.width));
    print_kv("Poisoned cell", &format_move(config.poisoned));
    print_kv("Games trained", &model.iterations.to_string());
    print_kv("Learning rate", &model.agent.learning_rate().to_string());
    print_kv("Epsilon", &model.agent.epsilon().to_string());
    print_kv("Q-values", &format_number(table.size()));
    print_kv("Distinct states", &format_number(table.state_count()));

    print_subsection("Starting board");
    print!("{}", format_grid(model.state.grid()));

    print_subsection("Preferred opening moves");
    for (rank, (action, value)) in top_openings(&model, args.top).into_iter().enumerate() {
        println!("  {:>2}. {:<4} {value:+.4}", rank + 1, format_move(action));
    }

    Ok(())
}
