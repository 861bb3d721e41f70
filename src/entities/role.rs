//! `SeaORM` Entity, RBAC Role

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub status: i32,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::backend_user::Entity")]
    BackendUser,
    #[sea_orm(has_many = "super::role_menu::Entity")]
    RoleMenu,
}

impl Related<super::backend_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BackendUser.def()
    }
}

impl Related<super::role_menu::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoleMenu.def()
    }
}

impl Related<super::menu::Entity> for Entity {
    fn to() -> RelationDef {
        super::role_menu::Relation::Menu.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::role_menu::Relation::Role.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
