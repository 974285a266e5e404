//! Storage layer for breathwork.
//!
//! `SQLite` persistence for finished breath sessions.

mod database;
mod migrations;

pub use database::Database;
