//! Post entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Owning user ID
    #[sea_orm(indexed)]
    pub user_id: i64,

    /// Free-text description
    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Media object held by the media service
    pub media_id: i64,

    /// Positive like count (denormalized)
    #[sea_orm(default_value = 0)]
    pub total_likes: i32,

    /// Negative like count (denormalized)
    #[sea_orm(default_value = 0)]
    pub total_unlikes: i32,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::like::Entity")]
    Like,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
}

impl Related<super::like::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Like.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
