//! Grants the default menu permissions to the seeded roles.

use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mountain::{bootstrap, config::Config, db, services::PermissionService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mountain=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let db = db::connect(&config.database_url).await?;
    db::migrate(&db).await?;
    bootstrap::run(&db).await?;

    let added = PermissionService::new(db).grant_default_permissions().await?;
    println!("Permissions initialised ({added} grant(s) added)");

    Ok(())
}
