//! Core translation engine module

pub mod audit;
pub mod config;
pub mod errors;
pub mod models;
pub mod orchestrator;
pub mod quotes;
pub mod settings;
pub mod usage;
