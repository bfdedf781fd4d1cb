use clap::Args;
use haulage_app::{
    domain::sessions::{PgSessionsService, SessionsService},
    session::{Actor, Role},
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct IssueSessionArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Role the token acts as (`dealer` or `driver`)
    #[arg(long)]
    role: Role,

    /// Dealer or driver UUID; generated when omitted
    #[arg(long)]
    actor: Option<Uuid>,
}

pub(crate) async fn run(args: IssueSessionArgs) -> Result<(), String> {
    let db = crate::cli::connect(&args.database_url).await?;
    let actor = Actor::from_parts(args.role, args.actor.unwrap_or_else(Uuid::now_v7));

    let issued = PgSessionsService::new(db)
        .issue(actor)
        .await
        .map_err(|error| format!("failed to issue session: {error}"))?;

    println!("session_uuid: {}", issued.record.uuid);
    println!("role: {}", issued.record.actor.role().as_str());
    println!("actor_uuid: {}", issued.record.actor.uuid());
    println!("token: {}", issued.token.expose());
    println!("store this token now; it is only shown once");

    Ok(())
}
