//! Subcommands of the `qchomp` binary

pub mod evaluate;
pub mod inspect;
pub mod play;
pub mod train;
