use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Columns::Table)
                    .if_not_exists()
                    .col(pk_auto(Columns::Id))
                    .col(string(Columns::Name))
                    .col(string(Columns::Description).default(""))
                    .col(integer(Columns::SortOrder).default(0))
                    .col(date_time(Columns::CreatedAt))
                    .col(date_time(Columns::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Articles::Table)
                    .if_not_exists()
                    .col(pk_auto(Articles::Id))
                    .col(integer(Articles::ColumnId))
                    .col(string(Articles::Title))
                    .col(string(Articles::Thumbnail).default(""))
                    .col(text(Articles::Content).default(""))
                    .col(string(Articles::Author).default(""))
                    .col(integer(Articles::Status).default(0)) // 0 draft, 1 published
                    .col(integer(Articles::ViewCount).default(0))
                    .col(date_time(Articles::CreatedAt))
                    .col(date_time(Articles::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-articles-column-status")
                    .table(Articles::Table)
                    .col(Articles::ColumnId)
                    .col(Articles::Status)
                    .to_owned(),
            )
            .await?;

        // Mini-program end users
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Phone).default(""))
                    .col(string(Users::OpenId).default(""))
                    .col(string(Users::Name).default(""))
                    .col(date_time(Users::CreatedAt))
                    .col(date_time(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-open-id")
                    .table(Users::Table)
                    .col(Users::OpenId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Articles::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Columns::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Columns {
    Table,
    Id,
    Name,
    Description,
    SortOrder,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Articles {
    Table,
    Id,
    ColumnId,
    Title,
    Thumbnail,
    Content,
    Author,
    Status,
    ViewCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Phone,
    OpenId,
    Name,
    CreatedAt,
    UpdatedAt,
}
