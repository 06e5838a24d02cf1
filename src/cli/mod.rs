//! Command-line interface definitions and handlers

pub mod commands;
