//! SeaORM Entity for tweets table

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tweets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub parent_id: Option<i32>,
    pub is_retweet: bool,
    pub content: String,
    pub link_preview_id: Option<i32>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Parent,
    #[sea_orm(
        belongs_to = "super::link_previews::Entity",
        from = "Column::LinkPreviewId",
        to = "super::link_previews::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    LinkPreview,
    #[sea_orm(has_many = "super::tweet_images::Entity")]
    Images,
}

impl Related<super::link_previews::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LinkPreview.def()
    }
}

impl Related<super::tweet_images::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
