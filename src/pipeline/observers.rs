//! Observer pattern for training pipelines
//!
//! Observers allow composable data collection during training without coupling
//! training logic to specific output formats.

use std::{
    fs::File,
    io::BufWriter,
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    chomp::Player,
    pipeline::training::{GameSummary, TrainingResult},
    ports::Observer,
};

/// Progress bar observer - Shows training progress and table growth
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self { progress_bar: None }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_games: usize) -> Result<()> {
        let pb = ProgressBar::new(total_games as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} games ({msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_game_end(&mut self, summary: &GameSummary) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.set_position(summary.game_num as u64 + 1);
            pb.set_message(format!("{} transitions", summary.transitions));
        }
        Ok(())
    }

    fn on_training_end(&mut self, result: &TrainingResult) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(format!("{} transitions", result.transitions));
        }
        Ok(())
    }
}

/// Metrics observer - Tracks win counts and game lengths
#[derive(Debug, Default)]
pub struct MetricsObserver {
    player1_wins: usize,
    player2_wins: usize,
    move_counts: Vec<usize>,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_games(&self) -> usize {
        self.move_counts.len()
    }

    /// Fraction of games won by the player who moved first
    pub fn first_player_win_rate(&self) -> f64 {
        if self.move_counts.is_empty() {
            0.0
        } else {
            self.player1_wins as f64 / self.move_counts.len() as f64
        }
    }

    /// Get average game length
    pub fn avg_game_length(&self) -> f64 {
        if self.move_counts.is_empty() {
            0.0
        } else {
            self.move_counts.iter().sum::<usize>() as f64 / self.move_counts.len() as f64
        }
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_games: self.total_games(),
            player1_wins: self.player1_wins,
            player2_wins: self.player2_wins,
            first_player_win_rate: self.first_player_win_rate(),
            avg_game_length: self.avg_game_length(),
        }
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_games: usize,
    pub player1_wins: usize,
    pub player2_wins: usize,
    pub first_player_win_rate: f64,
    pub avg_game_length: f64,
}

impl Observer for MetricsObserver {
    fn on_game_end(&mut self, summary: &GameSummary) -> Result<()> {
        match summary.winner {
            Player::Player1 => self.player1_wins += 1,
            Player::Player2 => self.player2_wins += 1,
        }
        self.move_counts.push(summary.plies);
        Ok(())
    }
}

/// Periodic record of table growth during training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingStats {
    /// Games played so far
    pub iteration: usize,
    /// Values added since the previous record
    pub new_transitions: usize,
    /// Total values in the table
    pub transitions: usize,
    pub epsilon: f64,
}

/// Shared view of the records a [`StatsObserver`] collects.
///
/// The pipeline takes ownership of its observers, so callers keep this handle
/// to read or export the statistics after training.
#[derive(Debug, Clone, Default)]
pub struct StatsHandle {
    records: Arc<Mutex<Vec<TrainingStats>>>,
}

impl StatsHandle {
    fn lock(&self) -> MutexGuard<'_, Vec<TrainingStats>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the records collected so far
    pub fn records(&self) -> Vec<TrainingStats> {
        self.lock().clone()
    }

    /// Write the records to `path`: CSV for a `.csv` extension, JSON otherwise.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let records = self.records();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        if is_csv {
            let mut writer = csv::Writer::from_path(path)?;
            for record in &records {
                writer.serialize(record)?;
            }
            writer.flush()?;
        } else {
            let file = File::create(path)?;
            serde_json::to_writer_pretty(BufWriter::new(file), &records)?;
        }
        Ok(())
    }
}

/// Statistics observer - Records a [`TrainingStats`] row every `interval` games
pub struct StatsObserver {
    interval: usize,
    last_transitions: usize,
    handle: StatsHandle,
}

impl StatsObserver {
    /// Create a stats observer; an `interval` of 0 is treated as 1.
    pub fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
            last_transitions: 0,
            handle: StatsHandle::default(),
        }
    }

    /// Handle that stays valid after the observer is moved into a pipeline
    pub fn handle(&self) -> StatsHandle {
        self.handle.clone()
    }

    fn push(&mut self, record: TrainingStats) {
        self.last_transitions = record.transitions;
        self.handle.lock().push(record);
    }
}

impl Observer for StatsObserver {
    fn on_game_end(&mut self, summary: &GameSummary) -> Result<()> {
        let games_played = summary.game_num + 1;
        if games_played.is_multiple_of(self.interval) {
            self.push(TrainingStats {
                iteration: games_played,
                new_transitions: summary.transitions.saturating_sub(self.last_transitions),
                transitions: summary.transitions,
                epsilon: summary.epsilon,
            });
        }
        Ok(())
    }

    fn on_training_end(&mut self, result: &TrainingResult) -> Result<()> {
        // Final partial interval
        if !result.games.is_multiple_of(self.interval) {
            self.push(TrainingStats {
                iteration: result.games,
                new_transitions: result.transitions.saturating_sub(self.last_transitions),
                transitions: result.transitions,
                epsilon: result.final_epsilon,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(game_num: usize, winner: Player, plies: usize, transitions: usize) -> GameSummary {
        GameSummary {
            game_num,
            winner,
            plies,
            transitions,
            epsilon: 0.1,
        }
    }

    #[test]
    fn test_metrics_observer() {
        let mut observer = MetricsObserver::new();
        assert_eq!(observer.first_player_win_rate(), 0.0);

        observer.on_game_end(&summary(0, Player::Player1, 3, 3)).unwrap();
        observer.on_game_end(&summary(1, Player::Player2, 5, 7)).unwrap();
        observer.on_game_end(&summary(2, Player::Player1, 4, 9)).unwrap();

        let metrics = observer.summary();
        assert_eq!(metrics.total_games, 3);
        assert_eq!(metrics.player1_wins, 2);
        assert_eq!(metrics.player2_wins, 1);
        assert_eq!(metrics.avg_game_length, 4.0);
        assert!((metrics.first_player_win_rate - 0.666).abs() < 0.01);
    }

    #[test]
    fn test_stats_observer_intervals() {
        let mut observer = StatsObserver::new(2);
        let handle = observer.handle();
        for (game, transitions) in [(0, 4), (1, 6), (2, 9), (3, 10), (4, 15)] {
            observer
                .on_game_end(&summary(game, Player::Player1, 2, transitions))
                .unwrap();
        }
        observer
            .on_training_end(&TrainingResult {
                games: 5,
                player1_wins: 5,
                player2_wins: 0,
                transitions: 15,
                average_game_length: 2.0,
                final_epsilon: 0.1,
            })
            .unwrap();

        let records = handle.records();
        let rows: Vec<(usize, usize, usize)> = records
            .iter()
            .map(|r| (r.iteration, r.new_transitions, r.transitions))
            .collect();
        assert_eq!(rows, vec![(2, 6, 6), (4, 4, 10), (5, 5, 15)]);
    }

    #[test]
    fn test_stats_export_formats() {
        let dir = tempfile::tempdir().unwrap();
        let mut observer = StatsObserver::new(1);
        let handle = observer.handle();
        observer
            .on_game_end(&summary(0, Player::Player2, 1, 1))
            .unwrap();

        let csv_path = dir.path().join("stats.csv");
        handle.write(&csv_path).unwrap();
        let csv_text = std::fs::read_to_string(&csv_path).unwrap();
        assert!(csv_text.starts_with("iteration,newTransitions,transitions,epsilon"));

        let json_path = dir.path().join("stats.json");
        handle.write(&json_path).unwrap();
        let parsed: Vec<TrainingStats> =
            serde_json::from_reader(File::open(&json_path).unwrap()).unwrap();
        assert_eq!(parsed, handle.records());
    }
}
