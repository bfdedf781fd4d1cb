use clap::Args;
use haulage_app::{
    domain::jobs::{JobsService, PgJobsService},
    realtime::RealtimeHub,
    session::{DealerUuid, Session},
};
use jiff::Timestamp;
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct ArchiveCompletedArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Dealer whose jobs are archived
    #[arg(long)]
    dealer: Uuid,

    /// Only archive jobs completed before this timestamp (RFC 3339); defaults to now
    #[arg(long)]
    before: Option<Timestamp>,
}

pub(crate) async fn run(args: ArchiveCompletedArgs) -> Result<(), String> {
    let db = crate::cli::connect(&args.database_url).await?;
    let session = Session::dealer(DealerUuid::from_uuid(args.dealer));
    let ended_before = args.before.unwrap_or_else(Timestamp::now);

    // Nothing subscribes from the CLI; the hub only satisfies the service.
    let archived = PgJobsService::new(db, RealtimeHub::default())
        .archive_completed(&session, ended_before)
        .await
        .map_err(|error| format!("failed to archive jobs: {error}"))?;

    for job in &archived {
        println!("archived: {}", job.uuid);
    }

    println!("archived_count: {}", archived.len());

    Ok(())
}
