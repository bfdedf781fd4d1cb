use clap::Args;
use haulage_app::domain::sessions::{PgSessionsService, SessionsService};

#[derive(Debug, Args)]
pub(crate) struct RevokeSessionArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Raw bearer token to revoke
    #[arg(long, env = "HAULAGE_TOKEN", hide_env_values = true)]
    token: String,
}

pub(crate) async fn run(args: RevokeSessionArgs) -> Result<(), String> {
    let db = crate::cli::connect(&args.database_url).await?;

    let record = PgSessionsService::new(db)
        .revoke(&args.token)
        .await
        .map_err(|error| format!("failed to revoke session: {error}"))?;

    println!("session_uuid: {}", record.uuid);

    if let Some(revoked_at) = record.revoked_at {
        println!("revoked_at: {revoked_at}");
    }

    Ok(())
}
