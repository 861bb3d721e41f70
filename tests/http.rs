mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use mountain::{
    api::router,
    auth::PasswordScheme,
    services::{BackendUserService, PermissionService},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{app_state, jwt, seeded_db};

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Router over a seeded database with one admin account, plus its password.
async fn app_with_admin() -> (Router, String) {
    let db = seeded_db().await;
    PermissionService::new(db.clone())
        .grant_default_permissions()
        .await
        .unwrap();
    let admin = BackendUserService::new(db.clone(), jwt(), PasswordScheme::Sha256)
        .ensure_admin("admin", "admin@example.com")
        .await
        .unwrap()
        .unwrap();
    (router(app_state(db)), admin.password)
}

async fn login(app: &Router, password: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/admin/auth/login",
            None,
            json!({ "username": "admin", "password": password }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let (app, _) = app_with_admin().await;
    let response = app.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let (app, _) = app_with_admin().await;

    let (status, body) = send(&app, get("/api/admin/roles", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "invalid credentials" }));

    let (status, _) = send(&app, get("/api/admin/roles", Some("garbage.token.value"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_then_fetch_current_menus() {
    let (app, password) = app_with_admin().await;
    let token = login(&app, &password).await;

    let request = get("/api/admin/backend-users/current/menus", Some(&token));
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["articles", "columns", "mp-users", "backend-users", "roles", "menus"]
    );
    assert_eq!(body[0]["type"], 1);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let (app, _) = app_with_admin().await;
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/admin/auth/login",
            None,
            json!({ "username": "admin", "password": "wrong-password" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid credentials");
}

#[tokio::test]
async fn role_endpoints_map_errors_to_statuses() {
    let (app, password) = app_with_admin().await;
    let token = login(&app, &password).await;

    let (status, body) = send(
        &app,
        json_request("POST", "/api/admin/roles", Some(&token), json!({ "name": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, created) = send(
        &app,
        json_request(
            "POST",
            "/api/admin/roles",
            Some(&token),
            json!({ "name": "auditor", "display_name": "Auditor" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/admin/roles/{id}/menus"),
            Some(&token),
            json!({ "menu_ids": [1, 2] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let request = get(&format!("/api/admin/roles/{id}/menus"), Some(&token));
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "menu_ids": [1, 2] }));

    let (status, body) = send(&app, get("/api/admin/roles?page=1&page_size=2", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);
    assert_eq!(body["page_size"], 2);
    assert_eq!(body["list"].as_array().unwrap().len(), 2);

    // The admin role is held by the logged-in account.
    let (status, _) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri("/api/admin/roles/1")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, get("/api/admin/roles/9999", Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, get("/api/admin/roles/abc", Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn out_of_range_paging_falls_back_to_defaults() {
    let (app, password) = app_with_admin().await;
    let token = login(&app, &password).await;

    for uri in [
        "/api/admin/roles?page=-1&page_size=-5",
        "/api/admin/roles?page=&page_size=",
        "/api/admin/roles?page=abc",
        "/api/admin/articles?page=-2&page_size=0",
    ] {
        let (status, body) = send(&app, get(uri, Some(&token))).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["page"], 1, "{uri}");
        assert_eq!(body["page_size"], 20, "{uri}");
    }

    let (status, body) = send(&app, get("/api/mp/articles/column/1?page=-1", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page_size"], 10);
}

fn multipart_upload(uri: &str, token: &str, filename: &str, data: &[u8]) -> Request<Body> {
    let boundary = "mountain-test-boundary";
    let disposition = format!("form-data; name=\"file\"; filename=\"{filename}\"");
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: {disposition}\r\n\
         Content-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn image_route_stops_reading_past_the_image_cap() {
    let (app, password) = app_with_admin().await;
    let token = login(&app, &password).await;

    let (status, stored) = send(
        &app,
        multipart_upload("/api/admin/upload/image", &token, "logo.png", b"png-bytes"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(stored["url"].as_str().unwrap().starts_with("/uploads/images/"));

    // Well under the video cap, but past the image cap plus framing.
    let oversized = vec![0u8; 5 * 1024 * 1024 + 256 * 1024];
    let (status, body) = send(
        &app,
        multipart_upload("/api/admin/upload/image", &token, "huge.png", &oversized),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Request payload is too large");
}

#[tokio::test]
async fn created_user_password_appears_only_in_creation_response() {
    let (app, password) = app_with_admin().await;
    let token = login(&app, &password).await;

    let (status, created) = send(
        &app,
        json_request(
            "POST",
            "/api/admin/backend-users",
            Some(&token),
            json!({ "username": "writer", "email": "writer@example.com", "role_id": 2 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["password"].as_str().unwrap().len(), 8);
    let id = created["user"]["id"].as_i64().unwrap();

    let request = get(&format!("/api/admin/backend-users/{id}"), Some(&token));
    let (status, fetched) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(fetched.get("password").is_none());
    assert_eq!(fetched["role_display"], "Editor");
}

#[tokio::test]
async fn change_password_with_wrong_secret_is_bad_request() {
    let (app, password) = app_with_admin().await;
    let token = login(&app, &password).await;

    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            "/api/admin/auth/change-password",
            Some(&token),
            json!({ "old_password": "incorrect", "new_password": "another-secret" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            "/api/admin/auth/change-password",
            Some(&token),
            json!({ "old_password": password, "new_password": "another-secret" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    login(&app, "another-secret").await;
}

#[tokio::test]
async fn mini_program_surface_is_public() {
    let (app, _) = app_with_admin().await;

    let (status, body) = send(&app, get("/api/mp/columns", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = send(
        &app,
        json_request("POST", "/api/mp/users/login", None, json!({ "code": "c0de" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["openid"], "openid-c0de");

    let (status, _) = send(&app, get("/api/mp/articles/1", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
