//! Completions command.

use std::io::Write;

use clap::CommandFactory;
use clap_complete::{generate, Shell as CompletionShell};

use crate::cli::{Cli, Shell};
use crate::error::Result;

impl From<Shell> for CompletionShell {
    fn from(shell: Shell) -> Self {
        match shell {
            Shell::Bash => CompletionShell::Bash,
            Shell::Zsh => CompletionShell::Zsh,
            Shell::Fish => CompletionShell::Fish,
            Shell::PowerShell => CompletionShell::PowerShell,
        }
    }
}

/// Write a completion script for `shell` to stdout.
pub fn execute(shell: Shell) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    write_script(shell, &mut stdout);
    stdout.flush()?;
    Ok(())
}

fn write_script(shell: Shell, out: &mut dyn Write) {
    generate(CompletionShell::from(shell), &mut Cli::command(), "envdeck", out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_lists_subcommands() {
        let mut buf = Vec::new();
        write_script(Shell::Fish, &mut buf);
        let script = String::from_utf8(buf).unwrap();

        assert!(script.contains("envdeck"));
        assert!(script.contains("publish"));
        assert!(script.contains("snapshot"));
    }
}
