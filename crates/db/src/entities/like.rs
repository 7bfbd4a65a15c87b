//! Like entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Like polarity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// "liked your post"
    #[sea_orm(string_value = "positive")]
    Positive,
    /// "disliked your post"
    #[sea_orm(string_value = "negative")]
    Negative,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "post_like")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// User who liked
    #[sea_orm(indexed)]
    pub user_id: i64,

    /// Liked post
    #[sea_orm(indexed)]
    pub post_id: i64,

    pub polarity: Polarity,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id"
    )]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
