use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "breathwork")]
#[command(about = "A guided breath-hold trainer for the terminal")]
#[command(long_about = "breathwork - A guided breath-hold trainer

Paced breathing followed by an exhale hold and a recovery inhale hold,
repeated for a number of cycles. Every finished session is saved so you
can look back at your holds and build a streak.

QUICK START:
  breathwork train                  Start a session with your configured defaults
  breathwork train --pace slow      Breathe 5s in, 5s out
  breathwork history                List recent sessions
  breathwork report --period month  Summarize the last month

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting

For more information on a specific command, run:
  breathwork <command> --help")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Use 'pretty' for human-readable colored output, or 'json' for
    /// machine-readable output suitable for scripting. Defaults to the
    /// `general.default_output` config setting.
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a guided breathing session
    ///
    /// Opens the full-screen trainer. Each cycle is paced breathing, then
    /// an exhale hold and an inhale hold that you end with Space.
    ///
    /// # Keys
    ///
    ///   Space/Enter   Start a session, end a hold, resume
    ///   p             Pause or resume
    ///   Esc           End the session (press twice)
    ///   q             Quit, saving an active session
    ///
    /// # Examples
    ///
    ///   breathwork train
    ///   breathwork train --pace fast --breaths 30 --cycles 4
    ///   breathwork train --inhale 4s --exhale 6s
    ///   breathwork train --reduced-motion
    #[command(alias = "t")]
    Train(TrainArgs),

    /// List recent sessions
    ///
    /// Shows the most recent sessions, newest first.
    ///
    /// # Examples
    ///
    ///   breathwork history
    ///   breathwork history -n 25
    ///   breathwork history -o json
    #[command(alias = "ls")]
    History {
        /// Number of sessions to show
        #[arg(long, short = 'n', default_value = "10")]
        limit: usize,
    },

    /// Show one session with its cycles
    ///
    /// Accepts a full session ID or a unique prefix, as printed by
    /// `breathwork history`.
    ///
    /// # Examples
    ///
    ///   breathwork show 3f2a9c1e
    Show {
        /// Session ID or unique prefix
        id: String,
    },

    /// Delete a session
    ///
    /// # Examples
    ///
    ///   breathwork delete 3f2a9c1e
    #[command(alias = "rm")]
    Delete {
        /// Session ID or unique prefix
        id: String,
    },

    /// Generate a breathing report
    ///
    /// Totals, best and average holds, recent days and your streak.
    ///
    /// # Examples
    ///
    ///   breathwork report
    ///   breathwork report --period today
    ///   breathwork report -p all -o json
    Report {
        /// Time period (today, week, month, all)
        #[arg(long, short = 'p', default_value = "week")]
        period: String,
    },

    /// List the available pace presets
    Paces,

    /// Manage configuration
    ///
    /// Configuration lives in ~/.breathwork/config.yaml.
    ///
    /// # Examples
    ///
    ///   breathwork config show
    ///   breathwork config init
    ///   breathwork config path
    Config(ConfigArgs),

    /// Generate shell completions
    ///
    /// Outputs completion script for the specified shell.
    /// Redirect to a file or source directly.
    ///
    /// # Examples
    ///
    ///   breathwork completions bash > ~/.bash_completion.d/breathwork
    ///   breathwork completions zsh --install
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,

        /// Show installation instructions
        #[arg(long, short = 'i')]
        install: bool,
    },
}

/// Arguments for a training session.
///
/// Anything left unset comes from the `breath` section of the config.
#[derive(Args, Debug, Default)]
pub struct TrainArgs {
    /// Pace preset (slow, medium, fast, custom)
    #[arg(long, short = 'p')]
    pub pace: Option<String>,

    /// Inhale length, e.g. 4s, 4.5s, 1500ms (implies a custom pace)
    #[arg(long)]
    pub inhale: Option<String>,

    /// Exhale length, e.g. 6s, 6000ms (implies a custom pace)
    #[arg(long)]
    pub exhale: Option<String>,

    /// Breaths per cycle
    #[arg(long, short = 'b')]
    pub breaths: Option<u32>,

    /// Number of cycles
    #[arg(long, short = 'c')]
    pub cycles: Option<u32>,

    /// Show text instead of animated progress bars
    #[arg(long)]
    pub reduced_motion: bool,
}

/// Arguments for configuration management.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Configuration subcommands.
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Print the configuration file path
    Path,
}
