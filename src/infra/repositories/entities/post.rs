//! Post database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::Post;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub creator_id: String,
    pub content: String,
    pub likes: i32,
    pub dislikes: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatorId",
        to = "super::user::Column::Id"
    )]
    Creator,
    #[sea_orm(has_many = "super::like_dislike::Entity")]
    LikeDislike,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::like_dislike::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LikeDislike.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity.
/// Negative stored counters are corrupt data and fail the conversion.
impl TryFrom<Model> for Post {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let likes = u32::try_from(model.likes)
            .map_err(|_| corrupt_counter(&model.id, "likes", model.likes))?;
        let dislikes = u32::try_from(model.dislikes)
            .map_err(|_| corrupt_counter(&model.id, "dislikes", model.dislikes))?;

        Ok(Post {
            id: model.id,
            creator_id: model.creator_id,
            content: model.content,
            likes,
            dislikes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Convert domain entity to a fully-set active model
impl TryFrom<&Post> for ActiveModel {
    type Error = AppError;

    fn try_from(post: &Post) -> Result<Self, Self::Error> {
        let likes = i32::try_from(post.likes).map_err(|_| out_of_range(&post.id, "likes"))?;
        let dislikes =
            i32::try_from(post.dislikes).map_err(|_| out_of_range(&post.id, "dislikes"))?;

        Ok(ActiveModel {
            id: Set(post.id.clone()),
            creator_id: Set(post.creator_id.clone()),
            content: Set(post.content.clone()),
            likes: Set(likes),
            dislikes: Set(dislikes),
            created_at: Set(post.created_at),
            updated_at: Set(post.updated_at),
        })
    }
}

fn corrupt_counter(post_id: &str, column: &str, value: i32) -> AppError {
    AppError::internal(format!(
        "post {} has negative {} counter ({})",
        post_id, column, value
    ))
}

fn out_of_range(post_id: &str, column: &str) -> AppError {
    AppError::internal(format!(
        "{} counter of post {} exceeds the column range",
        column, post_id
    ))
}
