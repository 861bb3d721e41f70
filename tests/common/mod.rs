//! Shared fixtures: in-memory SQLite databases and service wiring.
#![allow(dead_code)]

use std::sync::Arc;

use mountain::{
    api::AppState,
    auth::{JwtService, PasswordScheme},
    bootstrap, db,
    entities::menu,
    error::AppResult,
    services::{MenuInput, MenuService, SessionExchange, WechatSession},
};
use sea_orm::DatabaseConnection;

pub const JWT_SECRET: &str = "integration-test-secret";

/// Migrated, empty database.
pub async fn bare_db() -> DatabaseConnection {
    let db = db::connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");
    db::migrate(&db).await.expect("failed to run migrations");
    db
}

/// Migrated database with the default roles and menus seeded.
pub async fn seeded_db() -> DatabaseConnection {
    let db = bare_db().await;
    bootstrap::run(&db).await.expect("bootstrap failed");
    db
}

pub fn jwt() -> JwtService {
    JwtService::new(JWT_SECRET, 24)
}

/// Session exchange that maps every code to `openid-<code>`.
pub struct FakeSessions;

#[async_trait::async_trait]
impl SessionExchange for FakeSessions {
    async fn exchange(&self, code: &str) -> AppResult<WechatSession> {
        Ok(WechatSession {
            openid: format!("openid-{code}"),
            ..Default::default()
        })
    }
}

pub fn app_state(db: DatabaseConnection) -> AppState {
    let upload_dir = std::env::temp_dir().join(format!("mountain-test-{}", uuid::Uuid::new_v4()));
    AppState::new(
        db,
        jwt(),
        PasswordScheme::Sha256,
        Arc::new(FakeSessions),
        &upload_dir.to_string_lossy(),
    )
}

pub fn menu_input(parent_id: i32, name: &str, sort: i32) -> MenuInput {
    MenuInput {
        parent_id,
        name: name.to_string(),
        title: name.to_uppercase(),
        path: format!("/{name}"),
        component: String::new(),
        icon: String::new(),
        sort,
        kind: None,
        status: None,
    }
}

pub async fn add_menu(menus: &MenuService, parent_id: i32, name: &str, sort: i32) -> menu::Model {
    menus
        .create(menu_input(parent_id, name, sort))
        .await
        .expect("menu creation failed")
}
