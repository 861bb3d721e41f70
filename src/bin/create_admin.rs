//! Creates the first `admin` account and prints its generated password once.

use std::env;

use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mountain::{auth::JwtService, bootstrap, config::Config, db, services::BackendUserService};

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
    let username = env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let email = env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());

    let db = db::connect(&config.database_url).await?;
    db::migrate(&db).await?;
    bootstrap::run(&db).await?;

    let jwt = JwtService::new(&config.jwt_secret, config.jwt_expiration_hours);
    let users = BackendUserService::new(db, jwt, config.password_scheme);

    match users.ensure_admin(&username, &email).await? {
        Some(created) => {
            info!(user_id = created.user.user.id, "admin account created");
            println!("Admin account created");
            println!("  username: {}", created.user.user.username);
            println!("  email:    {}", created.user.user.email);
            println!("  password: {}", created.password);
            println!("Store this password now; it cannot be shown again.");
        }
        None => println!("An admin account already exists, nothing to do"),
    }

    Ok(())
}
