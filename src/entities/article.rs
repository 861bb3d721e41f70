//! `SeaORM` Entity, article

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "articles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub column_id: i32,
    pub title: String,
    pub thumbnail: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub author: String,
    /// 0 draft, 1 published
    pub status: i32,
    pub view_count: i32,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::column::Entity",
        from = "Column::ColumnId",
        to = "super::column::Column::Id"
    )]
    Column,
}

impl Related<super::column::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Column.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
