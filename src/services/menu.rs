use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::info;

use crate::entities::{menu, prelude::*, role_menu};
use crate::error::{AppError, AppResult};
use crate::services::menu_tree::{MenuNode, build_tree};
use crate::services::now;
use crate::services::status::{MenuKind, Status, require_non_empty};

#[derive(Debug, Clone, Deserialize)]
pub struct MenuInput {
    #[serde(default)]
    pub parent_id: i32,
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub component: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub sort: i32,
    #[serde(rename = "type")]
    pub kind: Option<i32>,
    pub status: Option<i32>,
}

#[derive(Clone)]
pub struct MenuService {
    db: DatabaseConnection,
}

impl MenuService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All menus, flat, in display order.
    pub async fn list(&self) -> AppResult<Vec<menu::Model>> {
        Ok(Menu::find()
            .order_by_asc(menu::Column::Sort)
            .order_by_asc(menu::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Enabled menus as a nested forest.
    pub async fn tree(&self) -> AppResult<Vec<MenuNode>> {
        let menus = Menu::find()
            .filter(menu::Column::Status.eq(Status::Enabled.as_i32()))
            .order_by_asc(menu::Column::Sort)
            .order_by_asc(menu::Column::Id)
            .all(&self.db)
            .await?;
        Ok(build_tree(menus))
    }

    pub async fn get(&self, id: i32) -> AppResult<menu::Model> {
        Menu::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("menu not found"))
    }

    pub async fn create(&self, input: MenuInput) -> AppResult<menu::Model> {
        require_non_empty("name", &input.name)?;
        require_non_empty("title", &input.title)?;
        let kind = input.kind.map(MenuKind::parse).transpose()?.unwrap_or_default();
        let status = input.status.map(Status::parse).transpose()?.unwrap_or(Status::Enabled);
        self.ensure_parent_exists(input.parent_id).await?;

        let now = now();
        let menu = menu::ActiveModel {
            parent_id: Set(input.parent_id),
            name: Set(input.name),
            title: Set(input.title),
            path: Set(input.path),
            component: Set(input.component),
            icon: Set(input.icon),
            sort: Set(input.sort),
            kind: Set(kind.as_i32()),
            status: Set(status.as_i32()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(menu_id = menu.id, parent_id = menu.parent_id, "menu created");
        Ok(menu)
    }

    pub async fn update(&self, id: i32, input: MenuInput) -> AppResult<menu::Model> {
        require_non_empty("name", &input.name)?;
        require_non_empty("title", &input.title)?;
        let kind = input.kind.map(MenuKind::parse).transpose()?;
        let status = input.status.map(Status::parse).transpose()?;

        let existing = self.get(id).await?;
        if input.parent_id != 0 {
            self.ensure_parent_exists(input.parent_id).await?;
            self.ensure_no_cycle(id, input.parent_id).await?;
        }

        let mut active: menu::ActiveModel = existing.into();
        active.parent_id = Set(input.parent_id);
        active.name = Set(input.name);
        active.title = Set(input.title);
        active.path = Set(input.path);
        active.component = Set(input.component);
        active.icon = Set(input.icon);
        active.sort = Set(input.sort);
        if let Some(kind) = kind {
            active.kind = Set(kind.as_i32());
        }
        if let Some(status) = status {
            active.status = Set(status.as_i32());
        }
        active.updated_at = Set(now());

        let menu = active.update(&self.db).await?;
        info!(menu_id = id, "menu updated");
        Ok(menu)
    }

    pub async fn set_status(&self, id: i32, status: i32) -> AppResult<menu::Model> {
        let status = Status::parse(status)?;
        let existing = self.get(id).await?;

        let mut active: menu::ActiveModel = existing.into();
        active.status = Set(status.as_i32());
        active.updated_at = Set(now());

        let menu = active.update(&self.db).await?;
        info!(menu_id = id, status = menu.status, "menu status changed");
        Ok(menu)
    }

    /// Delete a leaf menu together with every grant that references it.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let tx = self.db.begin().await?;

        if Menu::find_by_id(id).one(&tx).await?.is_none() {
            return Err(AppError::not_found("menu not found"));
        }

        let children = Menu::find()
            .filter(menu::Column::ParentId.eq(id))
            .count(&tx)
            .await?;
        if children > 0 {
            return Err(AppError::conflict("menu has child menus and cannot be deleted"));
        }

        RoleMenu::delete_many()
            .filter(role_menu::Column::MenuId.eq(id))
            .exec(&tx)
            .await?;
        Menu::delete_by_id(id).exec(&tx).await?;

        tx.commit().await?;
        info!(menu_id = id, "menu deleted");
        Ok(())
    }

    async fn ensure_parent_exists(&self, parent_id: i32) -> AppResult<()> {
        if parent_id == 0 {
            return Ok(());
        }
        if Menu::find_by_id(parent_id).one(&self.db).await?.is_none() {
            return Err(AppError::bad_input(format!("parent menu {parent_id} does not exist")));
        }
        Ok(())
    }

    /// Reject re-parenting `id` under itself or one of its descendants.
    async fn ensure_no_cycle(&self, id: i32, new_parent: i32) -> AppResult<()> {
        let parents: HashMap<i32, i32> = Menu::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| (m.id, m.parent_id))
            .collect();

        if creates_cycle(&parents, id, new_parent) {
            return Err(AppError::bad_input("menu cannot be its own ancestor"));
        }
        Ok(())
    }
}

fn creates_cycle(parents: &HashMap<i32, i32>, id: i32, new_parent: i32) -> bool {
    let mut current = new_parent;
    // Bounded walk; an existing loop in stored rows cannot spin forever.
    for _ in 0..=parents.len() {
        if current == 0 {
            return false;
        }
        if current == id {
            return true;
        }
        match parents.get(&current) {
            Some(&next) => current = next,
            None => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_self_and_descendant_parents() {
        // 1 -> 2 -> 3
        let parents = HashMap::from([(1, 0), (2, 1), (3, 2)]);

        assert!(creates_cycle(&parents, 1, 1));
        assert!(creates_cycle(&parents, 1, 3));
        assert!(!creates_cycle(&parents, 3, 1));
        assert!(!creates_cycle(&parents, 2, 0));
    }
}
