use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::info;

pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url);
    options.sqlx_logging(false);
    // An in-memory SQLite database lives and dies with its single connection.
    if database_url.starts_with("sqlite") && database_url.contains(":memory:") {
        options.max_connections(1).min_connections(1);
    }

    let db = Database::connect(options).await?;
    info!(backend = ?db.get_database_backend(), "database connected");
    Ok(db)
}

pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    Migrator::up(db, None).await?;
    info!("migrations applied");
    Ok(())
}
