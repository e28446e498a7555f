//! Persistence for link previews, one row per URL.

use super::extract::PreviewFields;
use super::PreviewRecord;
use crate::orm::link_previews;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sea_orm::{
    entity::*, ActiveValue::Unchanged, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter,
};

/// Record-level storage used by the resolver. Each call is atomic on its own.
#[async_trait]
pub trait PreviewStore: Send + Sync {
    async fn find_by_url(&self, url: &str) -> Result<Option<PreviewRecord>, DbErr>;

    async fn create(
        &self,
        url: &str,
        fields: PreviewFields,
        fetched_at: NaiveDateTime,
    ) -> Result<PreviewRecord, DbErr>;

    async fn update(
        &self,
        record: &PreviewRecord,
        fields: PreviewFields,
        fetched_at: NaiveDateTime,
    ) -> Result<PreviewRecord, DbErr>;
}

/// sea-orm backed store over the `link_previews` table.
#[derive(Clone)]
pub struct DbPreviewStore {
    db: DatabaseConnection,
}

impl DbPreviewStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn update_by_id(
        &self,
        id: i32,
        fields: PreviewFields,
        fetched_at: NaiveDateTime,
    ) -> Result<PreviewRecord, DbErr> {
        let model = link_previews::ActiveModel {
            id: Unchanged(id),
            title: Set(fields.title),
            description: Set(fields.description),
            image: Set(fields.image),
            fetched_at: Set(fetched_at),
            ..Default::default()
        }
        .update(&self.db)
        .await?;

        Ok(model.into())
    }
}

#[async_trait]
impl PreviewStore for DbPreviewStore {
    async fn find_by_url(&self, url: &str) -> Result<Option<PreviewRecord>, DbErr> {
        Ok(link_previews::Entity::find()
            .filter(link_previews::Column::Url.eq(url))
            .one(&self.db)
            .await?
            .map(PreviewRecord::from))
    }

    async fn create(
        &self,
        url: &str,
        fields: PreviewFields,
        fetched_at: NaiveDateTime,
    ) -> Result<PreviewRecord, DbErr> {
        let insert = link_previews::ActiveModel {
            url: Set(url.to_owned()),
            title: Set(fields.title.clone()),
            description: Set(fields.description.clone()),
            image: Set(fields.image.clone()),
            fetched_at: Set(fetched_at),
            ..Default::default()
        }
        .insert(&self.db)
        .await;

        match insert {
            Ok(model) => Ok(model.into()),
            Err(err) => {
                // Another request created the row between our lookup and
                // insert. Overwrite it: last writer wins.
                match self.find_by_url(url).await? {
                    Some(existing) => {
                        log::debug!("link preview for {} created concurrently, overwriting", url);
                        self.update(&existing, fields, fetched_at).await
                    }
                    None => Err(err),
                }
            }
        }
    }

    async fn update(
        &self,
        record: &PreviewRecord,
        fields: PreviewFields,
        fetched_at: NaiveDateTime,
    ) -> Result<PreviewRecord, DbErr> {
        let id = match record.id {
            Some(id) => id,
            None => return self.create(&record.url, fields, fetched_at).await,
        };

        match self.update_by_id(id, fields.clone(), fetched_at).await {
            Ok(updated) => Ok(updated),
            // The row may have been deleted or replaced since it was read.
            Err(err) => match self.find_by_url(&record.url).await? {
                None => {
                    log::debug!("link preview {} vanished during refresh, recreating", id);
                    self.create(&record.url, fields, fetched_at).await
                }
                Some(current) => match current.id {
                    Some(current_id) if current_id != id => {
                        self.update_by_id(current_id, fields, fetched_at).await
                    }
                    _ => Err(err),
                },
            },
        }
    }
}
