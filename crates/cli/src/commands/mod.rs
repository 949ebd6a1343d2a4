//! Subcommand implementations

pub mod crop;
pub mod health;
pub mod water_use;
