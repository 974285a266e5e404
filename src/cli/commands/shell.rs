//! Shell completion commands.

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::args::Cli;
use crate::error::BreathError;

/// Execute the completions command.
///
/// # Errors
///
/// Returns `BreathError::Parse` for an unknown shell.
pub fn completions(shell: &str, install: bool) -> Result<String, BreathError> {
    let shell_type = shell_from_str(shell).ok_or_else(|| {
        BreathError::Parse(format!(
            "Unknown shell: {shell}. Supported: bash, zsh, fish, powershell, elvish"
        ))
    })?;

    if install {
        Ok(completion_install_instructions(shell_type))
    } else {
        generate_completions(shell_type)
    }
}

/// Generate the completion script for `shell`.
///
/// # Errors
///
/// Returns an error if the generated script is not valid UTF-8.
pub fn generate_completions(shell: Shell) -> Result<String, BreathError> {
    let mut cmd = Cli::command();
    let mut buf = Vec::new();
    clap_complete::generate(shell, &mut cmd, "breathwork", &mut buf);
    String::from_utf8(buf).map_err(|e| BreathError::Parse(format!("UTF-8 error: {e}")))
}

/// Get shell from string name.
#[must_use]
pub fn shell_from_str(s: &str) -> Option<Shell> {
    match s.to_lowercase().as_str() {
        "bash" => Some(Shell::Bash),
        "zsh" => Some(Shell::Zsh),
        "fish" => Some(Shell::Fish),
        "powershell" | "ps" | "pwsh" => Some(Shell::PowerShell),
        "elvish" => Some(Shell::Elvish),
        _ => None,
    }
}

/// Get installation instructions for shell completions.
#[must_use]
pub fn completion_install_instructions(shell: Shell) -> String {
    match shell {
        Shell::Bash => r"# Add to ~/.bashrc:
source <(breathwork completions bash)
"
        .to_string(),
        Shell::Zsh => r"# Save to your fpath, then run compinit:
breathwork completions zsh > ~/.zsh/completions/_breathwork
"
        .to_string(),
        Shell::Fish => r"breathwork completions fish > ~/.config/fish/completions/breathwork.fish
"
        .to_string(),
        Shell::PowerShell => r"# Add to your PowerShell profile ($PROFILE):
breathwork completions powershell | Out-String | Invoke-Expression
"
        .to_string(),
        _ => format!("breathwork completions {shell} > <completions dir>\n"),
    }
}
