//! Command implementations for breathwork.
//!
//! Each command returns the text to print, already formatted for the
//! selected output format.

mod config;
mod session;
mod shell;
mod train;

pub use config::config;
pub use session::{delete, history, paces, report, show};
pub use shell::{completion_install_instructions, completions, generate_completions, shell_from_str};
pub use train::{resolve_settings, train};
