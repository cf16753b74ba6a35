//! Shell completions command

use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::io;

use crate::Cli;

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,

    /// Command name the script completes
    #[arg(long, default_value = "pipegraph")]
    pub bin_name: String,
}

pub fn run(args: &CompletionsArgs) -> anyhow::Result<()> {
    tracing::debug!("Generating {} completions", args.shell);
    write_completions(args.shell, &args.bin_name, &mut io::stdout());
    Ok(())
}

fn write_completions(shell: Shell, bin_name: &str, out: &mut dyn io::Write) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, bin_name, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_bash_completions_mention_subcommands() {
        let mut buf = Vec::new();
        write_completions(Shell::Bash, "pipegraph", &mut buf);
        let script = String::from_utf8(buf).unwrap();

        assert!(script.contains("pipegraph"));
        assert!(script.contains("query"));
        assert!(script.contains("vertex"));
    }
}
