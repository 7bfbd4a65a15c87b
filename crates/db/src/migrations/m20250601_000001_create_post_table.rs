//! Create post table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Post::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Post::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Post::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Post::Description).text().not_null())
                    .col(ColumnDef::new(Post::MediaId).big_integer().not_null())
                    .col(ColumnDef::new(Post::TotalLikes).integer().not_null().default(0))
                    .col(ColumnDef::new(Post::TotalUnlikes).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Post::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Post::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (user_id, created_at) for per-user listings
        manager
            .create_index(
                Index::create()
                    .name("idx_post_user_id_created_at")
                    .table(Post::Table)
                    .col(Post::UserId)
                    .col(Post::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Post::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Post {
    Table,
    Id,
    UserId,
    Description,
    MediaId,
    TotalLikes,
    TotalUnlikes,
    CreatedAt,
    UpdatedAt,
}
