use std::collections::BTreeSet;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::info;

use crate::entities::{backend_user, menu, prelude::*, role, role_menu};
use crate::error::{AppError, AppResult};
use crate::pagination::{Page, PageQuery};
use crate::services::now;
use crate::services::status::{Status, require_non_empty};

#[derive(Debug, Clone, Deserialize)]
pub struct RoleInput {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub status: Option<i32>,
}

#[derive(Clone)]
pub struct RoleService {
    db: DatabaseConnection,
}

impl RoleService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, query: PageQuery) -> AppResult<Page<role::Model>> {
        let page_size = query.page_size();
        let paginator = Role::find()
            .order_by_asc(role::Column::Id)
            .paginate(&self.db, page_size);

        let total = paginator.num_items().await?;
        let list = paginator.fetch_page(query.page() - 1).await?;
        Ok(Page::new(list, total, query.page(), page_size))
    }

    pub async fn create(&self, input: RoleInput) -> AppResult<role::Model> {
        require_non_empty("name", &input.name)?;
        require_non_empty("display_name", &input.display_name)?;
        let status = match input.status {
            Some(value) => Status::parse(value)?,
            None => Status::Enabled,
        };

        if self.find_by_name(&input.name).await?.is_some() {
            return Err(AppError::conflict(format!("role '{}' already exists", input.name)));
        }

        let now = now();
        let role = role::ActiveModel {
            name: Set(input.name.trim().to_string()),
            display_name: Set(input.display_name),
            description: Set(input.description),
            status: Set(status.as_i32()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(role_id = role.id, name = %role.name, "role created");
        Ok(role)
    }

    pub async fn get(&self, id: i32) -> AppResult<role::Model> {
        Role::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("role not found"))
    }

    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<role::Model>> {
        Ok(Role::find()
            .filter(role::Column::Name.eq(name.trim()))
            .one(&self.db)
            .await?)
    }

    pub async fn update(&self, id: i32, input: RoleInput) -> AppResult<role::Model> {
        require_non_empty("name", &input.name)?;
        require_non_empty("display_name", &input.display_name)?;
        let status = input.status.map(Status::parse).transpose()?;

        let existing = self.get(id).await?;
        if let Some(other) = self.find_by_name(&input.name).await? {
            if other.id != id {
                return Err(AppError::conflict(format!("role '{}' already exists", input.name)));
            }
        }

        let mut active: role::ActiveModel = existing.into();
        active.name = Set(input.name.trim().to_string());
        active.display_name = Set(input.display_name);
        active.description = Set(input.description);
        if let Some(status) = status {
            active.status = Set(status.as_i32());
        }
        active.updated_at = Set(now());

        let role = active.update(&self.db).await?;
        info!(role_id = id, "role updated");
        Ok(role)
    }

    pub async fn set_status(&self, id: i32, status: i32) -> AppResult<role::Model> {
        let status = Status::parse(status)?;
        let existing = self.get(id).await?;

        let mut active: role::ActiveModel = existing.into();
        active.status = Set(status.as_i32());
        active.updated_at = Set(now());

        let role = active.update(&self.db).await?;
        info!(role_id = id, status = role.status, "role status changed");
        Ok(role)
    }

    /// Delete a role and its grants. Fails while any account references it.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let tx = self.db.begin().await?;

        if Role::find_by_id(id).one(&tx).await?.is_none() {
            return Err(AppError::not_found("role not found"));
        }

        let users = BackendUser::find()
            .filter(backend_user::Column::RoleId.eq(id))
            .count(&tx)
            .await?;
        if users > 0 {
            return Err(AppError::conflict(format!(
                "role is assigned to {users} user(s) and cannot be deleted"
            )));
        }

        RoleMenu::delete_many()
            .filter(role_menu::Column::RoleId.eq(id))
            .exec(&tx)
            .await?;
        Role::delete_by_id(id).exec(&tx).await?;

        tx.commit().await?;
        info!(role_id = id, "role deleted");
        Ok(())
    }

    /// Menu ids granted to the role, ascending.
    pub async fn menu_ids(&self, role_id: i32) -> AppResult<Vec<i32>> {
        self.get(role_id).await?;

        let ids = RoleMenu::find()
            .select_only()
            .column(role_menu::Column::MenuId)
            .filter(role_menu::Column::RoleId.eq(role_id))
            .order_by_asc(role_menu::Column::MenuId)
            .into_tuple::<i32>()
            .all(&self.db)
            .await?;
        Ok(ids)
    }

    /// Replace the role's whole grant set with `menu_ids`. Last writer wins.
    pub async fn replace_menus(&self, role_id: i32, menu_ids: Vec<i32>) -> AppResult<Vec<i32>> {
        let wanted: Vec<i32> = menu_ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect();

        let tx = self.db.begin().await?;

        if Role::find_by_id(role_id).one(&tx).await?.is_none() {
            return Err(AppError::not_found("role not found"));
        }

        if !wanted.is_empty() {
            let known = Menu::find()
                .filter(menu::Column::Id.is_in(wanted.clone()))
                .count(&tx)
                .await?;
            if known != wanted.len() as u64 {
                return Err(AppError::bad_input("menu_ids contains unknown menu"));
            }
        }

        RoleMenu::delete_many()
            .filter(role_menu::Column::RoleId.eq(role_id))
            .exec(&tx)
            .await?;

        if !wanted.is_empty() {
            let grants = wanted.iter().map(|&menu_id| role_menu::ActiveModel {
                role_id: Set(role_id),
                menu_id: Set(menu_id),
            });
            RoleMenu::insert_many(grants).exec_without_returning(&tx).await?;
        }

        tx.commit().await?;
        info!(role_id, grants = wanted.len(), "role menus replaced");
        Ok(wanted)
    }
}
