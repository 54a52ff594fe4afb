//! CLI infrastructure for the QChomp toolkit
//!
//! This module provides the command-line interface for training agents,
//! playing against them, evaluating them, and inspecting saved models.

pub mod commands;
pub mod config;
pub mod output;
