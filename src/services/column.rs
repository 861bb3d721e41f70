use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::entities::{article, column, prelude::*};
use crate::error::{AppError, AppResult};
use crate::services::now;
use crate::services::status::require_non_empty;

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sort_order: i32,
}

/// Column as listed to the mini-program.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub id: i32,
    pub name: String,
    pub description: String,
}

#[derive(Clone)]
pub struct ColumnService {
    db: DatabaseConnection,
}

impl ColumnService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> AppResult<Vec<column::Model>> {
        Ok(ContentColumn::find()
            .order_by_asc(column::Column::SortOrder)
            .order_by_asc(column::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn list_summaries(&self) -> AppResult<Vec<ColumnSummary>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .map(|c| ColumnSummary {
                id: c.id,
                name: c.name,
                description: c.description,
            })
            .collect())
    }

    pub async fn get(&self, id: i32) -> AppResult<column::Model> {
        ContentColumn::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("column not found"))
    }

    pub async fn create(&self, input: ColumnInput) -> AppResult<column::Model> {
        require_non_empty("name", &input.name)?;

        let now = now();
        let column = column::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            sort_order: Set(input.sort_order),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(column_id = column.id, "column created");
        Ok(column)
    }

    pub async fn update(&self, id: i32, input: ColumnInput) -> AppResult<column::Model> {
        require_non_empty("name", &input.name)?;
        let existing = self.get(id).await?;

        let mut active: column::ActiveModel = existing.into();
        active.name = Set(input.name);
        active.description = Set(input.description);
        active.sort_order = Set(input.sort_order);
        active.updated_at = Set(now());

        Ok(active.update(&self.db).await?)
    }

    /// Delete a column that no article references.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let tx = self.db.begin().await?;

        if ContentColumn::find_by_id(id).one(&tx).await?.is_none() {
            return Err(AppError::not_found("column not found"));
        }

        let articles = Article::find()
            .filter(article::Column::ColumnId.eq(id))
            .count(&tx)
            .await?;
        if articles > 0 {
            return Err(AppError::conflict(format!(
                "column has {articles} article(s) and cannot be deleted"
            )));
        }

        ContentColumn::delete_by_id(id).exec(&tx).await?;
        tx.commit().await?;

        info!(column_id = id, "column deleted");
        Ok(())
    }
}
