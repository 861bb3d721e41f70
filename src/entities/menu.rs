//! `SeaORM` Entity, navigation menu node

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menus")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// 0 for root nodes
    pub parent_id: i32,
    pub name: String,
    pub title: String,
    pub path: String,
    pub component: String,
    pub icon: String,
    pub sort: i32,
    /// 1 page, 2 action button
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub kind: i32,
    pub status: i32,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::role_menu::Entity")]
    RoleMenu,
}

impl Related<super::role_menu::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoleMenu.def()
    }
}

impl Related<super::role::Entity> for Entity {
    fn to() -> RelationDef {
        super::role_menu::Relation::Role.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::role_menu::Relation::Menu.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
