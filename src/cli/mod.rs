//! Command-line interface for breathwork.

pub mod args;
pub mod commands;
