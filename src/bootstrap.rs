//! First-run seed data, applied once at startup after migrations.
//!
//! Every step only writes into an empty table, so running it again is a no-op.

use chrono::NaiveDateTime;
use migration::SchemaManager;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryResult, Set, Statement, TransactionTrait,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::entities::{backend_user, menu, prelude::*, role};
use crate::services::{MenuKind, Status};

pub const LEGACY_USERS_TABLE: &str = "legacy_backend_users";
/// Role given to legacy accounts whose role text matches no known role.
const LEGACY_FALLBACK_ROLE: &str = "editor";

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("database error during bootstrap: {0}")]
    Database(#[from] DbErr),
    #[error("fallback role '{0}' is missing")]
    MissingFallbackRole(&'static str),
}

struct SeedRole {
    name: &'static str,
    display_name: &'static str,
    description: &'static str,
}

const DEFAULT_ROLES: [SeedRole; 3] = [
    SeedRole {
        name: "admin",
        display_name: "Administrator",
        description: "Full access",
    },
    SeedRole {
        name: "editor",
        display_name: "Editor",
        description: "Edits articles and columns",
    },
    SeedRole {
        name: "viewer",
        display_name: "Viewer",
        description: "Read-only access",
    },
];

struct SeedMenu {
    name: &'static str,
    title: &'static str,
    path: &'static str,
    component: &'static str,
    icon: &'static str,
}

const DEFAULT_MENUS: [SeedMenu; 6] = [
    SeedMenu {
        name: "articles",
        title: "Articles",
        path: "/admin/articles",
        component: "ArticleList",
        icon: "Document",
    },
    SeedMenu {
        name: "columns",
        title: "Columns",
        path: "/admin/columns",
        component: "ColumnList",
        icon: "Menu",
    },
    SeedMenu {
        name: "mp-users",
        title: "Mini-program users",
        path: "/admin/users",
        component: "UserList",
        icon: "User",
    },
    SeedMenu {
        name: "backend-users",
        title: "Backend users",
        path: "/admin/backend-users",
        component: "BackendUserList",
        icon: "UserFilled",
    },
    SeedMenu {
        name: "roles",
        title: "Roles",
        path: "/admin/roles",
        component: "RoleList",
        icon: "Key",
    },
    SeedMenu {
        name: "menus",
        title: "Menus",
        path: "/admin/menus",
        component: "MenuList",
        icon: "Grid",
    },
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapReport {
    pub roles_seeded: usize,
    pub menus_seeded: usize,
    pub users_imported: usize,
}

pub async fn run(db: &DatabaseConnection) -> Result<BootstrapReport, BootstrapError> {
    let report = BootstrapReport {
        roles_seeded: seed_roles(db).await?,
        menus_seeded: seed_menus(db).await?,
        users_imported: import_legacy_users(db).await?,
    };
    info!(
        roles = report.roles_seeded,
        menus = report.menus_seeded,
        legacy_users = report.users_imported,
        "bootstrap complete"
    );
    Ok(report)
}

async fn seed_roles(db: &DatabaseConnection) -> Result<usize, BootstrapError> {
    if Role::find().count(db).await? > 0 {
        return Ok(0);
    }

    let tx = db.begin().await?;
    let now = crate::services::now();
    for seed in &DEFAULT_ROLES {
        role::ActiveModel {
            name: Set(seed.name.to_string()),
            display_name: Set(seed.display_name.to_string()),
            description: Set(seed.description.to_string()),
            status: Set(Status::Enabled.as_i32()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&tx)
        .await?;
    }
    tx.commit().await?;

    info!(count = DEFAULT_ROLES.len(), "seeded default roles");
    Ok(DEFAULT_ROLES.len())
}

async fn seed_menus(db: &DatabaseConnection) -> Result<usize, BootstrapError> {
    if Menu::find().count(db).await? > 0 {
        return Ok(0);
    }

    let tx = db.begin().await?;
    let now = crate::services::now();
    for (sort, seed) in (1..).zip(DEFAULT_MENUS.iter()) {
        menu::ActiveModel {
            parent_id: Set(0),
            name: Set(seed.name.to_string()),
            title: Set(seed.title.to_string()),
            path: Set(seed.path.to_string()),
            component: Set(seed.component.to_string()),
            icon: Set(seed.icon.to_string()),
            sort: Set(sort),
            kind: Set(MenuKind::Page.as_i32()),
            status: Set(Status::Enabled.as_i32()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&tx)
        .await?;
    }
    tx.commit().await?;

    info!(count = DEFAULT_MENUS.len(), "seeded default menus");
    Ok(DEFAULT_MENUS.len())
}

/// Copy accounts from the pre-role table, where the role was a free-text name.
///
/// An absent legacy table is skipped. Unknown role names fall back to `editor`.
/// Any other failure, including a legacy table with missing columns, aborts.
async fn import_legacy_users(db: &DatabaseConnection) -> Result<usize, BootstrapError> {
    if BackendUser::find().count(db).await? > 0 {
        return Ok(0);
    }
    if !SchemaManager::new(db).has_table(LEGACY_USERS_TABLE).await? {
        info!(table = LEGACY_USERS_TABLE, "no legacy users to import");
        return Ok(0);
    }

    let select = Statement::from_string(
        db.get_database_backend(),
        format!("SELECT * FROM {LEGACY_USERS_TABLE} ORDER BY id"),
    );
    let rows = db.query_all(select).await?;
    if rows.is_empty() {
        return Ok(0);
    }

    let fallback = Role::find()
        .filter(role::Column::Name.eq(LEGACY_FALLBACK_ROLE))
        .one(db)
        .await?
        .ok_or(BootstrapError::MissingFallbackRole(LEGACY_FALLBACK_ROLE))?;

    let tx = db.begin().await?;
    let now = crate::services::now();
    let mut imported = 0;
    for row in rows {
        let legacy = LegacyUser::from_row(&row)?;

        let role_id = match Role::find()
            .filter(role::Column::Name.eq(legacy.role.as_str()))
            .one(&tx)
            .await?
        {
            Some(role) => role.id,
            None => {
                warn!(
                    username = %legacy.username,
                    role = %legacy.role,
                    fallback = LEGACY_FALLBACK_ROLE,
                    "legacy role not found, using fallback"
                );
                fallback.id
            }
        };

        let created_at = legacy.created_at.unwrap_or(now);
        backend_user::ActiveModel {
            username: Set(legacy.username),
            email: Set(legacy.email),
            password: Set(legacy.password),
            role_id: Set(role_id),
            status: Set(legacy.status),
            created_at: Set(created_at),
            updated_at: Set(legacy.updated_at.unwrap_or(created_at)),
            ..Default::default()
        }
        .insert(&tx)
        .await?;
        imported += 1;
    }
    tx.commit().await?;

    info!(count = imported, "imported legacy backend users");
    Ok(imported)
}

struct LegacyUser {
    username: String,
    email: String,
    password: String,
    role: String,
    status: i32,
    created_at: Option<NaiveDateTime>,
    updated_at: Option<NaiveDateTime>,
}

impl LegacyUser {
    fn from_row(row: &QueryResult) -> Result<Self, DbErr> {
        Ok(Self {
            username: row.try_get("", "username")?,
            email: row.try_get("", "email")?,
            password: row.try_get("", "password")?,
            role: row.try_get::<Option<String>>("", "role")?.unwrap_or_default(),
            status: row
                .try_get::<Option<i32>>("", "status")?
                .unwrap_or(Status::Enabled.as_i32()),
            // Older dumps may predate the timestamp columns.
            created_at: row.try_get::<Option<NaiveDateTime>>("", "created_at").ok().flatten(),
            updated_at: row.try_get::<Option<NaiveDateTime>>("", "updated_at").ok().flatten(),
        })
    }
}
