//! Migration: Create the likes_dislikes table.
//!
//! One row per (user, post) pair. Rows disappear with their post.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;
use super::m20240101_000002_create_posts_table::Posts;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LikesDislikes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(LikesDislikes::UserId).string().not_null())
                    .col(ColumnDef::new(LikesDislikes::PostId).string().not_null())
                    .col(ColumnDef::new(LikesDislikes::Polarity).string_len(16).not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_likes_dislikes")
                            .col(LikesDislikes::UserId)
                            .col(LikesDislikes::PostId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_likes_dislikes_user")
                            .from(LikesDislikes::Table, LikesDislikes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_likes_dislikes_post")
                            .from(LikesDislikes::Table, LikesDislikes::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index for per-post cleanup
        manager
            .create_index(
                Index::create()
                    .name("idx_likes_dislikes_post_id")
                    .table(LikesDislikes::Table)
                    .col(LikesDislikes::PostId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LikesDislikes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum LikesDislikes {
    Table,
    UserId,
    PostId,
    Polarity,
}
