use clap::{Args, Subcommand};

mod archive;

#[derive(Debug, Args)]
pub(crate) struct JobsCommand {
    #[command(subcommand)]
    command: JobsSubcommand,
}

#[derive(Debug, Subcommand)]
enum JobsSubcommand {
    /// Archive a dealer's completed jobs
    ArchiveCompleted(archive::ArchiveCompletedArgs),
}

pub(crate) async fn run(command: JobsCommand) -> Result<(), String> {
    match command.command {
        JobsSubcommand::ArchiveCompleted(args) => archive::run(args).await,
    }
}
