//! Resolves the menu forest a user may see, and seeds default grants.

use std::collections::HashSet;

use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use tracing::{info, warn};

use crate::entities::{menu, prelude::*, role, role_menu};
use crate::error::{AppError, AppResult};
use crate::services::menu_tree::{MenuNode, build_tree};
use crate::services::status::Status;

/// Menus the `editor` role is granted by default.
pub const EDITOR_DEFAULT_MENUS: [&str; 2] = ["articles", "columns"];

#[derive(Clone)]
pub struct PermissionService {
    db: DatabaseConnection,
}

impl PermissionService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The user's role grants, restricted to enabled menus, as a forest.
    ///
    /// A granted menu whose parent is not granted surfaces as a root. A role
    /// with no grants, or one that no longer exists, yields an empty forest.
    pub async fn resolve_user_menus(&self, user_id: i32) -> AppResult<Vec<MenuNode>> {
        let user = BackendUser::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))?;

        let menus = Menu::find()
            .inner_join(RoleMenu)
            .filter(role_menu::Column::RoleId.eq(user.role_id))
            .filter(menu::Column::Status.eq(Status::Enabled.as_i32()))
            .order_by_asc(menu::Column::Sort)
            .order_by_asc(menu::Column::Id)
            .all(&self.db)
            .await?;

        Ok(build_tree(menus))
    }

    /// Grant every enabled menu to `admin` and the content menus to `editor`.
    ///
    /// Existing grants are left alone. Returns the number of grants added.
    pub async fn grant_default_permissions(&self) -> AppResult<u64> {
        let tx = self.db.begin().await?;

        let admin = Role::find()
            .filter(role::Column::Name.eq("admin"))
            .one(&tx)
            .await?
            .ok_or_else(|| AppError::not_found("admin role not found"))?;

        let enabled: Vec<i32> = Menu::find()
            .select_only()
            .column(menu::Column::Id)
            .filter(menu::Column::Status.eq(Status::Enabled.as_i32()))
            .order_by_asc(menu::Column::Id)
            .into_tuple()
            .all(&tx)
            .await?;
        let mut added = grant_missing(&tx, admin.id, &enabled).await?;

        let editor = Role::find()
            .filter(role::Column::Name.eq("editor"))
            .one(&tx)
            .await?;
        match editor {
            Some(editor) => {
                let mut editor_menus = Vec::new();
                for name in EDITOR_DEFAULT_MENUS {
                    match Menu::find().filter(menu::Column::Name.eq(name)).one(&tx).await? {
                        Some(menu) => editor_menus.push(menu.id),
                        None => warn!(menu = name, "default menu missing, skipping"),
                    }
                }
                added += grant_missing(&tx, editor.id, &editor_menus).await?;
            }
            None => warn!("editor role missing, skipping its default grants"),
        }

        tx.commit().await?;
        info!(added, "default permissions granted");
        Ok(added)
    }
}

async fn grant_missing<C: ConnectionTrait>(
    db: &C,
    role_id: i32,
    menu_ids: &[i32],
) -> AppResult<u64> {
    let existing: HashSet<i32> = RoleMenu::find()
        .select_only()
        .column(role_menu::Column::MenuId)
        .filter(role_menu::Column::RoleId.eq(role_id))
        .into_tuple::<i32>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    let missing: Vec<role_menu::ActiveModel> = menu_ids
        .iter()
        .filter(|id| !existing.contains(id))
        .map(|&menu_id| role_menu::ActiveModel {
            role_id: Set(role_id),
            menu_id: Set(menu_id),
        })
        .collect();

    if missing.is_empty() {
        return Ok(0);
    }
    let count = missing.len() as u64;
    RoleMenu::insert_many(missing).exec_without_returning(db).await?;
    Ok(count)
}
