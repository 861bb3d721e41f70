use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use tracing::info;

use crate::entities::{mp_user, prelude::*};
use crate::error::{AppError, AppResult};
use crate::pagination::{Page, PageQuery};
use crate::services::now;
use crate::services::status::require_non_empty;
use crate::services::wechat::SessionExchange;

#[derive(Debug, Clone, Deserialize)]
pub struct MpUserInput {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub openid: String,
    #[serde(default)]
    pub name: String,
}

/// Mini-program end users.
#[derive(Clone)]
pub struct MpUserService {
    db: DatabaseConnection,
    sessions: Arc<dyn SessionExchange>,
}

impl MpUserService {
    pub fn new(db: DatabaseConnection, sessions: Arc<dyn SessionExchange>) -> Self {
        Self { db, sessions }
    }

    pub async fn register(&self, input: MpUserInput) -> AppResult<mp_user::Model> {
        require_non_empty("phone", &input.phone)?;

        let now = now();
        let user = mp_user::ActiveModel {
            phone: Set(input.phone),
            open_id: Set(input.openid),
            name: Set(input.name),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(user_id = user.id, "mini-program user registered");
        Ok(user)
    }

    /// Exchange a login code, then find or create the user by openid.
    pub async fn wechat_login(&self, code: &str) -> AppResult<mp_user::Model> {
        require_non_empty("code", code)?;
        let session = self.sessions.exchange(code).await?;

        let existing = MpUser::find()
            .filter(mp_user::Column::OpenId.eq(session.openid.as_str()))
            .one(&self.db)
            .await?;
        if let Some(user) = existing {
            return Ok(user);
        }

        let now = now();
        let user = mp_user::ActiveModel {
            phone: Set(String::new()),
            open_id: Set(session.openid),
            name: Set(String::new()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(user_id = user.id, "mini-program user created from wechat login");
        Ok(user)
    }

    pub async fn list(&self, query: PageQuery) -> AppResult<Page<mp_user::Model>> {
        let page_size = query.page_size();
        let paginator = MpUser::find()
            .order_by_desc(mp_user::Column::CreatedAt)
            .order_by_desc(mp_user::Column::Id)
            .paginate(&self.db, page_size);

        let total = paginator.num_items().await?;
        let list = paginator.fetch_page(query.page() - 1).await?;
        Ok(Page::new(list, total, query.page(), page_size))
    }

    pub async fn get(&self, id: i32) -> AppResult<mp_user::Model> {
        MpUser::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))
    }

    pub async fn update(&self, id: i32, input: MpUserInput) -> AppResult<mp_user::Model> {
        let existing = self.get(id).await?;

        let mut active: mp_user::ActiveModel = existing.into();
        active.phone = Set(input.phone);
        active.open_id = Set(input.openid);
        active.name = Set(input.name);
        active.updated_at = Set(now());

        Ok(active.update(&self.db).await?)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = MpUser::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("user not found"));
        }
        info!(user_id = id, "mini-program user deleted");
        Ok(())
    }
}
