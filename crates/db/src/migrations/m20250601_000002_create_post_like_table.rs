//! Create post_like table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // No foreign key and no unique (user_id, post_id) constraint: one like per
        // user and post is enforced by the like service under a per-post lock.
        manager
            .create_table(
                Table::create()
                    .table(PostLike::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PostLike::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PostLike::UserId).big_integer().not_null())
                    .col(ColumnDef::new(PostLike::PostId).big_integer().not_null())
                    .col(ColumnDef::new(PostLike::Polarity).string_len(16).not_null())
                    .col(
                        ColumnDef::new(PostLike::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(PostLike::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (user_id, post_id) for the upsert lookup
        manager
            .create_index(
                Index::create()
                    .name("idx_post_like_user_post")
                    .table(PostLike::Table)
                    .col(PostLike::UserId)
                    .col(PostLike::PostId)
                    .to_owned(),
            )
            .await?;

        // Index: post_id (recount and cascade delete)
        manager
            .create_index(
                Index::create()
                    .name("idx_post_like_post_id")
                    .table(PostLike::Table)
                    .col(PostLike::PostId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostLike::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PostLike {
    Table,
    Id,
    UserId,
    PostId,
    Polarity,
    CreatedAt,
    UpdatedAt,
}
