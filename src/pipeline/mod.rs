//! Training and evaluation pipeline abstractions
//!
//! This module provides composable pipelines for:
//! - Training an agent through self-play
//! - Evaluating learned policies against baselines
//! - Recording observations during training

pub mod evaluation;
pub mod observers;
pub mod training;

pub use evaluation::{EvaluationResult, Opponent, evaluate};
// Re-export observer implementations (adapters)
pub use observers::{
    MetricsObserver, MetricsSummary, ProgressObserver, StatsHandle, StatsObserver, TrainingStats,
};
pub use training::{
    GameSummary, LOSS_REWARD, TrainingConfig, TrainingPipeline, TrainingResult, WIN_REWARD,
};

pub use crate::ports::Observer;
