mod common;

use std::time::Duration;

use mountain::{
    auth::{GENERATED_PASSWORD_LENGTH, PasswordScheme, sha256_hex, verify},
    entities::prelude::*,
    error::AppError,
    pagination::PageQuery,
    services::{BackendUserInput, BackendUserService, RoleService},
};
use sea_orm::{DatabaseConnection, EntityTrait};

use common::{JWT_SECRET, jwt, seeded_db};

fn service(db: &DatabaseConnection) -> BackendUserService {
    BackendUserService::new(db.clone(), jwt(), PasswordScheme::Sha256)
}

fn input(username: &str, role_id: i32) -> BackendUserInput {
    BackendUserInput {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        role_id,
    }
}

async fn stored_hash(db: &DatabaseConnection, id: i32) -> String {
    BackendUser::find_by_id(id)
        .one(db)
        .await
        .unwrap()
        .expect("user row missing")
        .password
}

#[tokio::test]
async fn secret_is_returned_once_and_stored_as_sha256_hex() {
    let db = seeded_db().await;
    let users = service(&db);

    let created = users.create(input("alice", 2)).await.unwrap();
    assert_eq!(created.password.len(), GENERATED_PASSWORD_LENGTH);
    assert!(created.password.chars().all(|c| c.is_ascii_alphanumeric()));

    let id = created.user.user.id;
    assert_eq!(stored_hash(&db, id).await, sha256_hex(&created.password));

    let creation_json = serde_json::to_value(&created).unwrap();
    assert_eq!(creation_json["password"], created.password.as_str());
    assert!(creation_json["user"].get("password").is_none());

    let fetched = serde_json::to_value(users.get(id).await.unwrap()).unwrap();
    assert!(fetched.get("password").is_none());
    assert_eq!(fetched["username"], "alice");
    assert_eq!(fetched["role_name"], "editor");

    let listed = serde_json::to_value(users.list(PageQuery::default()).await.unwrap()).unwrap();
    assert_eq!(listed["total"], 1);
    assert!(listed["list"][0].get("password").is_none());
}

#[tokio::test]
async fn reset_issues_a_fresh_secret() {
    let db = seeded_db().await;
    let users = service(&db);

    let created = users.create(input("bob", 2)).await.unwrap();
    let id = created.user.user.id;

    let reset = users.reset_password(id).await.unwrap();
    assert_eq!(reset.id, id);
    assert_eq!(reset.password.len(), GENERATED_PASSWORD_LENGTH);
    assert_eq!(stored_hash(&db, id).await, sha256_hex(&reset.password));

    assert!(users.login("bob", &reset.password).await.is_ok());
    assert!(matches!(
        users.reset_password(999).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let db = seeded_db().await;
    let users = service(&db);

    let created = users.create(input("carol", 1)).await.unwrap();
    let id = created.user.user.id;

    let wrong_password = users.login("carol", "nope-nope").await.unwrap_err();
    let unknown_user = users.login("nobody", &created.password).await.unwrap_err();
    users.set_status(id, 0).await.unwrap();
    let disabled = users.login("carol", &created.password).await.unwrap_err();

    for err in [wrong_password, unknown_user, disabled] {
        assert!(matches!(err, AppError::Unauthorized));
        assert_eq!(err.to_string(), "invalid credentials");
    }
}

#[tokio::test]
async fn login_issues_token_with_role_claims() {
    let db = seeded_db().await;
    let users = service(&db);

    let created = users.create(input("dave", 1)).await.unwrap();
    let response = users.login("dave", &created.password).await.unwrap();

    assert_eq!(response.user.username, "dave");
    assert_eq!(response.user.role, "admin");
    assert_eq!(response.user.role_display, "Administrator");

    let now = chrono::Utc::now().timestamp();
    let claims = verify(&response.token, JWT_SECRET.as_bytes(), now).unwrap();
    assert_eq!(claims.user_id, created.user.user.id);
    assert_eq!(claims.username, "dave");
    assert_eq!(claims.role_id, 1);
    assert_eq!(claims.role_name, "admin");
    assert!(claims.exp > now + 23 * 3600);
}

#[tokio::test]
async fn change_password_checks_current_secret() {
    let db = seeded_db().await;
    let users = service(&db);

    let created = users.create(input("erin", 2)).await.unwrap();
    let id = created.user.user.id;
    let before = BackendUser::find_by_id(id).one(&db).await.unwrap().unwrap();

    let err = users
        .change_password(id, "not-the-secret", "brand-new-secret")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadInput(_)));
    assert_eq!(stored_hash(&db, id).await, before.password);

    let err = users
        .change_password(id, &created.password, "short")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadInput(_)));
    assert_eq!(stored_hash(&db, id).await, before.password);

    tokio::time::sleep(Duration::from_millis(20)).await;
    users
        .change_password(id, &created.password, "brand-new-secret")
        .await
        .unwrap();

    let after = BackendUser::find_by_id(id).one(&db).await.unwrap().unwrap();
    assert_eq!(after.password, sha256_hex("brand-new-secret"));
    assert!(after.updated_at > before.updated_at);
    assert!(users.login("erin", "brand-new-secret").await.is_ok());
}

#[tokio::test]
async fn bcrypt_scheme_hashes_new_secrets_and_still_verifies() {
    let db = seeded_db().await;
    let users = BackendUserService::new(db.clone(), jwt(), PasswordScheme::Bcrypt);

    let created = users.create(input("fay", 2)).await.unwrap();
    assert!(stored_hash(&db, created.user.user.id).await.starts_with("$2"));
    assert!(users.login("fay", &created.password).await.is_ok());
}

#[tokio::test]
async fn accounts_require_an_enabled_role_and_unique_identity() {
    let db = seeded_db().await;
    let users = service(&db);
    let roles = RoleService::new(db.clone());

    assert!(matches!(
        users.create(input("gus", 99)).await,
        Err(AppError::Conflict(_))
    ));

    roles.set_status(3, 0).await.unwrap();
    assert!(matches!(
        users.create(input("gus", 3)).await,
        Err(AppError::Conflict(_))
    ));

    let gus = users.create(input("gus", 2)).await.unwrap();
    assert!(matches!(
        users.create(input("gus", 2)).await,
        Err(AppError::Conflict(_))
    ));

    let mut bad_email = input("hal", 2);
    bad_email.email = "not-an-email".into();
    assert!(matches!(users.create(bad_email).await, Err(AppError::BadInput(_))));

    // Updating keeps its own username and email without tripping uniqueness.
    let updated = users.update(gus.user.user.id, input("gus", 1)).await.unwrap();
    assert_eq!(updated.user.role_id, 1);
    assert_eq!(updated.role_name.as_deref(), Some("admin"));

    assert!(matches!(users.get(4242).await, Err(AppError::NotFound(_))));
    assert!(matches!(users.set_status(gus.user.user.id, 7).await, Err(AppError::BadInput(_))));
}

#[tokio::test]
async fn deleted_account_is_gone() {
    let db = seeded_db().await;
    let users = service(&db);

    let created = users.create(input("ivy", 2)).await.unwrap();
    let id = created.user.user.id;

    users.delete(id).await.unwrap();
    assert!(matches!(users.get(id).await, Err(AppError::NotFound(_))));
    assert!(matches!(users.delete(id).await, Err(AppError::NotFound(_))));
    assert!(users.login("ivy", &created.password).await.is_err());
}

#[tokio::test]
async fn ensure_admin_creates_only_once() {
    let db = seeded_db().await;
    let users = service(&db);

    let first = users
        .ensure_admin("root", "root@example.com")
        .await
        .unwrap()
        .expect("admin should be created");
    assert_eq!(first.user.role_name.as_deref(), Some("admin"));

    assert!(users.ensure_admin("root2", "root2@example.com").await.unwrap().is_none());
}
