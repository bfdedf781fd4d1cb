use clap::{Args, Subcommand};

mod issue;
mod revoke;

#[derive(Debug, Args)]
pub(crate) struct SessionCommand {
    #[command(subcommand)]
    command: SessionSubcommand,
}

#[derive(Debug, Subcommand)]
enum SessionSubcommand {
    /// Issue a bearer token for a dealer or driver
    Issue(issue::IssueSessionArgs),

    /// Revoke a bearer token
    Revoke(revoke::RevokeSessionArgs),
}

pub(crate) async fn run(command: SessionCommand) -> Result<(), String> {
    match command.command {
        SessionSubcommand::Issue(args) => issue::run(args).await,
        SessionSubcommand::Revoke(args) => revoke::run(args).await,
    }
}
