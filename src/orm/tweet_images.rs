//! SeaORM Entity for tweet_images table

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tweet_images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub tweet_id: i32,
    /// Content-addressed storage key (blake3 hex + extension)
    pub filename: String,
    pub original_name: String,
    pub size: i64,
    /// Crop rectangle as "x1,y1,x2,y2"
    pub cropping: Option<String>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tweets::Entity",
        from = "Column::TweetId",
        to = "super::tweets::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Tweet,
}

impl Related<super::tweets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tweet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
