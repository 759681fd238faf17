//! reposmith CLI.
//!
//! Scaffolds new repositories and keeps their GitHub configuration
//! converged: repository settings, branch protection, vulnerability
//! alerts, and the standard label set.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use reposmith_cli::commands::{NewCommand, SyncCommand};

/// Repository scaffolding with idempotent GitHub reconciliation.
#[derive(Parser)]
#[command(
    name = "reposmith",
    version,
    about = "Scaffold repositories and keep their GitHub configuration converged",
    long_about = "Scaffold new repositories and converge their GitHub configuration.\n\n\
                  Every remote operation is a create-or-update reconcile, so re-running\n\
                  the same command against an existing repository is safe and brings it\n\
                  back to the desired state."
)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold a new project and its GitHub repository.
    ///
    /// Renders starter files into the destination, creates or updates the
    /// repository with branch protection, vulnerability alerts, and the
    /// standard labels, then makes the initial commit.
    New(NewCommand),

    /// Converge an existing repository's GitHub configuration.
    ///
    /// Applies the standard settings, branch protection, vulnerability
    /// alerts, and labels without touching any local files.
    Sync(SyncCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info,scm=debug,scaffold=debug,reposmith_cli=debug")
    } else {
        EnvFilter::new("warn,scm=info,scaffold=info,reposmith_cli=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::New(cmd) => cmd.run().await,
        Commands::Sync(cmd) => cmd.run().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
