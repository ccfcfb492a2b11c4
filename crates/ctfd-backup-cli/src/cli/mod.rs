//! CLI for the CTFd backup tool.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

use commands::{run_backup, run_completions, BackupArgs};

/// Top-level CLI for the CTFd backup tool.
#[derive(Debug, Parser)]
#[command(name = "ctfd-backup", version)]
#[command(about = "Back up challenges, teams, users and the scoreboard of a CTFd instance", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Back up a CTFd instance into `{output}/{ctf_name}_backup`.
    Backup(BackupArgs),

    /// Print a shell completion script to stdout.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Parses the command line and runs it. Returns the process exit code.
    pub async fn run_from_args() -> Result<i32> {
        let cli = Cli::parse();
        match cli.command {
            CliCommand::Backup(args) => run_backup(args).await,
            CliCommand::Completions { shell } => {
                run_completions(shell);
                Ok(0)
            }
        }
    }
}

#[cfg(test)]
mod tests;
