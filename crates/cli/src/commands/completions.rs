//! completions command - Print a shell completion script
//!
//! `ydg completions zsh > ~/.zfunc/_ydg`

use clap::CommandFactory;
use clap_complete::{Generator, Shell};

use super::Cli;
use crate::exit_code::ExitCode;

/// Arguments for the completions command
#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Generate shell completions and print to stdout
pub fn execute(args: CompletionsArgs) -> ExitCode {
    write_completions(args.shell, &mut std::io::stdout());
    ExitCode::Success
}

fn write_completions<G: Generator>(generator: G, out: &mut dyn std::io::Write) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(generator, &mut cmd, name, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_bash() {
        let mut cmd = Cli::command();
        let mut buf = Vec::new();
        clap_complete::generate(Shell::Bash, &mut cmd, "ydg", &mut buf);
        let output = String::from_utf8(buf).unwrap();
        assert!(output.contains("ydg"));
        assert!(output.contains("complete"));
    }

    #[test]
    fn test_completions_zsh() {
        let mut cmd = Cli::command();
        let mut buf = Vec::new();
        clap_complete::generate(Shell::Zsh, &mut cmd, "ydg", &mut buf);
        let output = String::from_utf8(buf).unwrap();
        assert!(output.contains("ydg"));
        assert!(output.contains("compdef"));
    }

    #[test]
    fn test_completions_list_actions() {
        let mut buf = Vec::new();
        write_completions(Shell::Bash, &mut buf);
        let output = String::from_utf8(buf).unwrap();
        for action in ["upload", "download", "rename", "delete", "list", "exec"] {
            assert!(output.contains(action), "missing {action}");
        }
    }

    #[test]
    fn test_completions_fish() {
        let mut cmd = Cli::command();
        let mut buf = Vec::new();
        clap_complete::generate(Shell::Fish, &mut cmd, "ydg", &mut buf);
        let output = String::from_utf8(buf).unwrap();
        assert!(output.contains("ydg"));
        assert!(output.contains("complete"));
    }

    #[test]
    fn test_completions_powershell() {
        let mut cmd = Cli::command();
        let mut buf = Vec::new();
        clap_complete::generate(Shell::PowerShell, &mut cmd, "ydg", &mut buf);
        let output = String::from_utf8(buf).unwrap();
        assert!(output.contains("ydg"));
        assert!(output.contains("Register-ArgumentCompleter"));
    }
}
