//! CLI library components for the observation table tool.

pub mod cli;
pub mod commands;
pub mod config;
pub mod import;
pub mod logging;
pub mod report;
pub mod summary;
