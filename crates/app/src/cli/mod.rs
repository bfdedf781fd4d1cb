use clap::{Parser, Subcommand};
use haulage_app::database::{self, Db};

mod db;
mod jobs;
mod session;

#[derive(Debug, Parser)]
#[command(name = "haulage-app", about = "Haulage CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Session(session::SessionCommand),
    Jobs(jobs::JobsCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Session(command) => session::run(command).await,
            Commands::Jobs(command) => jobs::run(command).await,
        }
    }
}

async fn connect(database_url: &str) -> Result<Db, String> {
    database::connect(database_url)
        .await
        .map(Db::new)
        .map_err(|error| format!("failed to connect to database: {error}"))
}
