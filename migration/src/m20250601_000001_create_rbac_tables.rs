use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(pk_auto(Roles::Id))
                    .col(string(Roles::Name).unique_key())
                    .col(string(Roles::DisplayName))
                    .col(string(Roles::Description).default(""))
                    .col(integer(Roles::Status).default(1)) // 0 disabled, 1 enabled
                    .col(date_time(Roles::CreatedAt))
                    .col(date_time(Roles::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Menus form a parent-pointer forest; parent_id = 0 marks a root.
        manager
            .create_table(
                Table::create()
                    .table(Menus::Table)
                    .if_not_exists()
                    .col(pk_auto(Menus::Id))
                    .col(integer(Menus::ParentId).default(0))
                    .col(string(Menus::Name))
                    .col(string(Menus::Title))
                    .col(string(Menus::Path).default(""))
                    .col(string(Menus::Component).default(""))
                    .col(string(Menus::Icon).default(""))
                    .col(integer(Menus::Sort).default(0))
                    .col(integer(Menus::Type).default(1)) // 1 page, 2 action
                    .col(integer(Menus::Status).default(1))
                    .col(date_time(Menus::CreatedAt))
                    .col(date_time(Menus::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-menus-parent-id")
                    .table(Menus::Table)
                    .col(Menus::ParentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RoleMenus::Table)
                    .if_not_exists()
                    .col(integer(RoleMenus::RoleId))
                    .col(integer(RoleMenus::MenuId))
                    .primary_key(
                        Index::create()
                            .name("pk-role-menus")
                            .col(RoleMenus::RoleId)
                            .col(RoleMenus::MenuId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BackendUsers::Table)
                    .if_not_exists()
                    .col(pk_auto(BackendUsers::Id))
                    .col(string(BackendUsers::Username).unique_key())
                    .col(string(BackendUsers::Email).unique_key())
                    .col(string(BackendUsers::Password))
                    .col(integer(BackendUsers::RoleId))
                    .col(integer(BackendUsers::Status).default(1))
                    .col(date_time(BackendUsers::CreatedAt))
                    .col(date_time(BackendUsers::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-backend-users-role-id")
                    .table(BackendUsers::Table)
                    .col(BackendUsers::RoleId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BackendUsers::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(RoleMenus::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Menus::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Roles {
    Table,
    Id,
    Name,
    DisplayName,
    Description,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Menus {
    Table,
    Id,
    ParentId,
    Name,
    Title,
    Path,
    Component,
    Icon,
    Sort,
    Type,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum RoleMenus {
    Table,
    RoleId,
    MenuId,
}

#[derive(DeriveIden)]
enum BackendUsers {
    Table,
    Id,
    Username,
    Email,
    Password,
    RoleId,
    Status,
    CreatedAt,
    UpdatedAt,
}
