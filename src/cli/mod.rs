//! CLI command handlers

pub mod commands;

pub use commands::{inspect, load_settings, run};
