//! REST surface: route table, shared state and cross-cutting layers.

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{
        HeaderName, HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    routing::{get, post, put},
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use tower_http::{
    cors::CorsLayer, services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer,
};
use tracing::warn;

use crate::auth::{JwtService, PasswordScheme, auth_middleware};
use crate::config::Config;
use crate::services::{
    ArticleService, BackendUserService, ColumnService, MenuService, MpUserService,
    PermissionService, RoleService, SessionExchange, UploadKind, UploadService,
};

pub mod articles;
pub mod auth;
pub mod backend_users;
pub mod columns;
pub mod extract;
pub mod health;
pub mod menus;
pub mod mp;
pub mod roles;
pub mod upload;
pub mod users;

#[derive(Clone)]
pub struct AppState {
    pub jwt: JwtService,
    pub roles: RoleService,
    pub menus: MenuService,
    pub permissions: PermissionService,
    pub backend_users: BackendUserService,
    pub columns: ColumnService,
    pub articles: ArticleService,
    pub mp_users: MpUserService,
    pub uploads: UploadService,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        jwt: JwtService,
        scheme: PasswordScheme,
        sessions: Arc<dyn SessionExchange>,
        upload_dir: &str,
    ) -> Self {
        Self {
            roles: RoleService::new(db.clone()),
            menus: MenuService::new(db.clone()),
            permissions: PermissionService::new(db.clone()),
            backend_users: BackendUserService::new(db.clone(), jwt.clone(), scheme),
            columns: ColumnService::new(db.clone()),
            articles: ArticleService::new(db.clone()),
            mp_users: MpUserService::new(db, sessions),
            uploads: UploadService::new(upload_dir),
            jwt,
        }
    }
}

const MULTIPART_SLACK: usize = 64 * 1024;

/// Body of every `PUT /{id}/status` route.
#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: i32,
}

/// Application routes, without serving-layer concerns.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/admin/auth/login", post(auth::login))
        .route("/api/mp/users/register", post(mp::register))
        .route("/api/mp/users/login", post(mp::wechat_login))
        .route("/api/mp/columns", get(mp::list_columns))
        .route("/api/mp/articles/column/{column_id}", get(mp::list_articles))
        .route("/api/mp/articles/{id}", get(mp::get_article));

    // Each upload route accepts its file cap plus room for the multipart framing.
    let body_limit = |kind: UploadKind| DefaultBodyLimit::max(kind.max_bytes() + MULTIPART_SLACK);

    let protected = Router::new()
        .route("/api/admin/auth/change-password", put(auth::change_password))
        .route("/api/admin/roles", get(roles::list).post(roles::create))
        .route(
            "/api/admin/roles/{id}",
            get(roles::get).put(roles::update).delete(roles::delete),
        )
        .route("/api/admin/roles/{id}/status", put(roles::set_status))
        .route(
            "/api/admin/roles/{id}/menus",
            get(roles::menu_ids).put(roles::replace_menus),
        )
        .route("/api/admin/menus", get(menus::list).post(menus::create))
        .route("/api/admin/menus/tree", get(menus::tree))
        .route(
            "/api/admin/menus/{id}",
            get(menus::get).put(menus::update).delete(menus::delete),
        )
        .route("/api/admin/menus/{id}/status", put(menus::set_status))
        .route(
            "/api/admin/backend-users",
            get(backend_users::list).post(backend_users::create),
        )
        .route(
            "/api/admin/backend-users/current/menus",
            get(backend_users::current_menus),
        )
        .route(
            "/api/admin/backend-users/{id}",
            get(backend_users::get)
                .put(backend_users::update)
                .delete(backend_users::delete),
        )
        .route(
            "/api/admin/backend-users/{id}/status",
            put(backend_users::set_status),
        )
        .route(
            "/api/admin/backend-users/{id}/reset-password",
            put(backend_users::reset_password),
        )
        .route("/api/admin/columns", get(columns::list).post(columns::create))
        .route(
            "/api/admin/columns/{id}",
            get(columns::get).put(columns::update).delete(columns::delete),
        )
        .route("/api/admin/articles", get(articles::list).post(articles::create))
        .route(
            "/api/admin/articles/{id}",
            get(articles::get).put(articles::update).delete(articles::delete),
        )
        .route("/api/admin/articles/{id}/status", put(articles::set_status))
        .route("/api/admin/users", get(users::list))
        .route(
            "/api/admin/users/{id}",
            get(users::get).put(users::update).delete(users::delete),
        )
        .route(
            "/api/admin/upload/image",
            post(upload::image).layer(body_limit(UploadKind::Image)),
        )
        .route(
            "/api/admin/upload/video",
            post(upload::video).layer(body_limit(UploadKind::Video)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .merge(public)
        .merge(protected)
        .with_state(state)
}

/// Full server: routes plus static uploads, CORS, tracing and request timeout.
pub fn app(state: AppState, config: &Config) -> Router {
    let uploads = ServeDir::new(state.uploads.root().to_path_buf());

    router(state)
        .nest_service("/uploads", uploads)
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
}

fn cors_layer(origins: &str) -> CorsLayer {
    if origins.trim() == "*" {
        warn!("CORS set to accept any origin (*), only use in development");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true)
}
