use std::sync::Arc;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mountain::{
    api::{self, AppState},
    auth::JwtService,
    bootstrap,
    config::Config,
    db,
    services::WechatClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mountain=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!(
        password_scheme = config.password_scheme.as_str(),
        "starting mountain"
    );

    let db = db::connect(&config.database_url).await?;
    db::migrate(&db).await?;
    bootstrap::run(&db).await?;

    let jwt = JwtService::new(&config.jwt_secret, config.jwt_expiration_hours);
    let sessions = Arc::new(WechatClient::new(config.wechat.clone()));
    let state = AppState::new(
        db,
        jwt,
        config.password_scheme,
        sessions,
        &config.upload_dir,
    );

    let app = api::app(state, &config);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("server running on http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
