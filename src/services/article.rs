use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::entities::{article, column, prelude::*};
use crate::error::{AppError, AppResult};
use crate::pagination::{Page, PageQuery, lenient_page_number};
use crate::services::now;
use crate::services::status::{ArticleStatus, require_non_empty};

pub const MP_PAGE_SIZE: u64 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct ArticleInput {
    pub column_id: i32,
    pub title: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: String,
    pub status: Option<i32>,
}

/// Admin list filters. Absent filters match everything.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ArticleListQuery {
    #[serde(default, deserialize_with = "lenient_page_number")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "lenient_page_number")]
    pub page_size: Option<u64>,
    pub column_id: Option<i32>,
    pub status: Option<i32>,
}

impl ArticleListQuery {
    pub fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleView {
    #[serde(flatten)]
    pub article: article::Model,
    pub column_name: Option<String>,
}

impl From<(article::Model, Option<column::Model>)> for ArticleView {
    fn from((article, column): (article::Model, Option<column::Model>)) -> Self {
        Self {
            article,
            column_name: column.map(|c| c.name),
        }
    }
}

/// Published article as listed to the mini-program, without its body.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleSummary {
    pub id: i32,
    pub title: String,
    pub thumbnail: String,
    pub author: String,
    pub view_count: i32,
    pub created_at: chrono::NaiveDateTime,
}

impl From<article::Model> for ArticleSummary {
    fn from(a: article::Model) -> Self {
        Self {
            id: a.id,
            title: a.title,
            thumbnail: a.thumbnail,
            author: a.author,
            view_count: a.view_count,
            created_at: a.created_at,
        }
    }
}

#[derive(Clone)]
pub struct ArticleService {
    db: DatabaseConnection,
}

impl ArticleService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, query: ArticleListQuery) -> AppResult<Page<ArticleView>> {
        let paging = query.page_query();
        let page_size = paging.page_size();

        let mut select = Article::find().find_also_related(ContentColumn);
        if let Some(column_id) = query.column_id.filter(|id| *id > 0) {
            select = select.filter(article::Column::ColumnId.eq(column_id));
        }
        if let Some(status) = query.status {
            let status = ArticleStatus::parse(status)?.as_i32();
            select = select.filter(article::Column::Status.eq(status));
        }

        let paginator = select
            .order_by_desc(article::Column::CreatedAt)
            .order_by_desc(article::Column::Id)
            .paginate(&self.db, page_size);

        let total = paginator.num_items().await?;
        let list = paginator
            .fetch_page(paging.page() - 1)
            .await?
            .into_iter()
            .map(ArticleView::from)
            .collect();
        Ok(Page::new(list, total, paging.page(), page_size))
    }

    pub async fn get(&self, id: i32) -> AppResult<ArticleView> {
        Article::find_by_id(id)
            .find_also_related(ContentColumn)
            .one(&self.db)
            .await?
            .map(ArticleView::from)
            .ok_or_else(|| AppError::not_found("article not found"))
    }

    pub async fn create(&self, input: ArticleInput) -> AppResult<article::Model> {
        require_non_empty("title", &input.title)?;
        let status = input.status.map(ArticleStatus::parse).transpose()?.unwrap_or_default();
        self.ensure_column(input.column_id).await?;

        let now = now();
        let article = article::ActiveModel {
            column_id: Set(input.column_id),
            title: Set(input.title),
            thumbnail: Set(input.thumbnail),
            content: Set(input.content),
            author: Set(input.author),
            status: Set(status.as_i32()),
            view_count: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(article_id = article.id, column_id = article.column_id, "article created");
        Ok(article)
    }

    pub async fn update(&self, id: i32, input: ArticleInput) -> AppResult<article::Model> {
        require_non_empty("title", &input.title)?;
        let status = input.status.map(ArticleStatus::parse).transpose()?;
        let existing = self.find(id).await?;
        self.ensure_column(input.column_id).await?;

        let mut active: article::ActiveModel = existing.into();
        active.column_id = Set(input.column_id);
        active.title = Set(input.title);
        active.thumbnail = Set(input.thumbnail);
        active.content = Set(input.content);
        active.author = Set(input.author);
        if let Some(status) = status {
            active.status = Set(status.as_i32());
        }
        active.updated_at = Set(now());

        let article = active.update(&self.db).await?;
        info!(article_id = id, "article updated");
        Ok(article)
    }

    pub async fn set_status(&self, id: i32, status: i32) -> AppResult<article::Model> {
        let status = ArticleStatus::parse(status)?;
        let existing = self.find(id).await?;

        let mut active: article::ActiveModel = existing.into();
        active.status = Set(status.as_i32());
        active.updated_at = Set(now());

        let article = active.update(&self.db).await?;
        info!(article_id = id, status = article.status, "article status changed");
        Ok(article)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = Article::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("article not found"));
        }
        info!(article_id = id, "article deleted");
        Ok(())
    }

    /// Published articles of one column, newest first.
    pub async fn list_published(
        &self,
        column_id: i32,
        query: PageQuery,
    ) -> AppResult<Page<ArticleSummary>> {
        let page_size = query.page_size_or(MP_PAGE_SIZE);
        let paginator = Article::find()
            .filter(article::Column::ColumnId.eq(column_id))
            .filter(article::Column::Status.eq(ArticleStatus::Published.as_i32()))
            .order_by_desc(article::Column::CreatedAt)
            .order_by_desc(article::Column::Id)
            .paginate(&self.db, page_size);

        let total = paginator.num_items().await?;
        let list = paginator
            .fetch_page(query.page() - 1)
            .await?
            .into_iter()
            .map(ArticleSummary::from)
            .collect();
        Ok(Page::new(list, total, query.page(), page_size))
    }

    /// A published article; each read counts as one view.
    pub async fn read_published(&self, id: i32) -> AppResult<ArticleView> {
        let published = ArticleStatus::Published.as_i32();

        let result = Article::update_many()
            .col_expr(
                article::Column::ViewCount,
                Expr::col(article::Column::ViewCount).add(1),
            )
            .filter(article::Column::Id.eq(id))
            .filter(article::Column::Status.eq(published))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("article not found"));
        }

        Article::find_by_id(id)
            .filter(article::Column::Status.eq(published))
            .find_also_related(ContentColumn)
            .one(&self.db)
            .await?
            .map(ArticleView::from)
            .ok_or_else(|| AppError::not_found("article not found"))
    }

    async fn find(&self, id: i32) -> AppResult<article::Model> {
        Article::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("article not found"))
    }

    async fn ensure_column(&self, column_id: i32) -> AppResult<()> {
        if ContentColumn::find_by_id(column_id).one(&self.db).await?.is_none() {
            return Err(AppError::bad_input(format!("column {column_id} does not exist")));
        }
        Ok(())
    }
}
