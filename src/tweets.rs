//! Tweet creation: content checks, link preview, images. Also retweets and
//! quotes, which point at another tweet through `parent_id`.

use crate::app_config::LimitsConfig;
use crate::links::first_url;
use crate::media::{self, MediaError, UploadedImage};
use crate::orm::{link_previews, tweet_images, tweets};
use crate::preview::{LinkPreviewResolver, PageFetcher, PreviewRecord, PreviewStore};
use crate::storage::{StorageBackend, StorageError};
use chrono::Utc;
use sea_orm::{
    entity::*, query::*, ActiveValue::Set, DatabaseConnection, DbErr, TransactionTrait,
};
use serde::Serialize;

/// Width of `tweet_images.original_name`, in characters.
const MAX_ORIGINAL_NAME: usize = 255;

/// Input for a new tweet.
pub struct NewTweet {
    pub user_id: i32,
    pub content: String,
    pub images: Vec<UploadedImage>,
}

#[derive(Debug)]
pub enum TweetError {
    EmptyContent,
    TooLong { length: usize, max: usize },
    Media(MediaError),
    Storage(StorageError),
    Database(DbErr),
    /// Referenced tweet does not exist
    NotFound(i32),
}

impl std::fmt::Display for TweetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TweetError::EmptyContent => write!(f, "Tweet cannot be empty"),
            TweetError::TooLong { length, max } => {
                write!(f, "Tweet is {} characters long, max is {}", length, max)
            }
            TweetError::Media(e) => write!(f, "{}", e),
            TweetError::Storage(e) => write!(f, "Storage error: {}", e),
            TweetError::Database(e) => write!(f, "Database error: {}", e),
            TweetError::NotFound(id) => write!(f, "Tweet {} not found", id),
        }
    }
}

impl std::error::Error for TweetError {}

impl From<MediaError> for TweetError {
    fn from(e: MediaError) -> Self {
        TweetError::Media(e)
    }
}

impl From<StorageError> for TweetError {
    fn from(e: StorageError) -> Self {
        TweetError::Storage(e)
    }
}

impl From<DbErr> for TweetError {
    fn from(e: DbErr) -> Self {
        TweetError::Database(e)
    }
}

impl TweetError {
    /// Errors caused by the submitted form rather than the server.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            TweetError::EmptyContent | TweetError::TooLong { .. } | TweetError::Media(_)
        )
    }
}

/// A tweet with its preview and images, as served by `GET /tweets/{id}`.
#[derive(Debug, Serialize)]
pub struct TweetView {
    pub id: i32,
    pub user_id: i32,
    pub parent_id: Option<i32>,
    pub is_retweet: bool,
    pub content: String,
    pub created_at: chrono::NaiveDateTime,
    pub link_preview: Option<PreviewRecord>,
    pub images: Vec<TweetImageView>,
}

#[derive(Debug, Serialize)]
pub struct TweetImageView {
    pub filename: String,
    pub original_name: String,
    pub size: i64,
    pub cropping: Option<String>,
}

/// Check content length and keep at most `max_images` valid images.
///
/// Extra images past the limit are dropped; any invalid kept image rejects
/// the whole tweet.
pub fn validate_new_tweet(
    new: &NewTweet,
    limits: &LimitsConfig,
) -> Result<Vec<UploadedImage>, TweetError> {
    if new.content.trim().is_empty() {
        return Err(TweetError::EmptyContent);
    }

    let length = new.content.chars().count();
    if length > limits.max_tweet_length {
        return Err(TweetError::TooLong {
            length,
            max: limits.max_tweet_length,
        });
    }

    if new.images.len() > limits.max_images {
        log::debug!(
            "dropping {} images over the limit of {}",
            new.images.len() - limits.max_images,
            limits.max_images
        );
    }

    let images: Vec<UploadedImage> = new
        .images
        .iter()
        .take(limits.max_images)
        .cloned()
        .collect();
    for image in &images {
        media::validate_image(image, limits)?;
    }

    Ok(images)
}

/// Create a tweet. Nothing is written unless every check passes.
pub async fn create_tweet<S, F>(
    db: &DatabaseConnection,
    resolver: &LinkPreviewResolver<S, F>,
    storage: &dyn StorageBackend,
    limits: &LimitsConfig,
    new: NewTweet,
) -> Result<tweets::Model, TweetError>
where
    S: PreviewStore,
    F: PageFetcher,
{
    let images = validate_new_tweet(&new, limits)?;
    publish(db, resolver, storage, new, images, None).await
}

/// Quote tweet `parent_id`: a new tweet with its own content pointing at it.
pub async fn quote_tweet<S, F>(
    db: &DatabaseConnection,
    resolver: &LinkPreviewResolver<S, F>,
    storage: &dyn StorageBackend,
    limits: &LimitsConfig,
    parent_id: i32,
    new: NewTweet,
) -> Result<tweets::Model, TweetError>
where
    S: PreviewStore,
    F: PageFetcher,
{
    let images = validate_new_tweet(&new, limits)?;
    tweets::Entity::find_by_id(parent_id)
        .one(db)
        .await?
        .ok_or(TweetError::NotFound(parent_id))?;

    publish(db, resolver, storage, new, images, Some(parent_id)).await
}

/// Retweet `tweet_id` as `user_id`.
///
/// A user retweets a tweet at most once; repeating returns the existing
/// retweet.
pub async fn retweet(
    db: &DatabaseConnection,
    user_id: i32,
    tweet_id: i32,
) -> Result<tweets::Model, TweetError> {
    tweets::Entity::find_by_id(tweet_id)
        .one(db)
        .await?
        .ok_or(TweetError::NotFound(tweet_id))?;

    let existing = tweets::Entity::find()
        .filter(tweets::Column::UserId.eq(user_id))
        .filter(tweets::Column::ParentId.eq(tweet_id))
        .filter(tweets::Column::IsRetweet.eq(true))
        .one(db)
        .await?;
    if let Some(existing) = existing {
        return Ok(existing);
    }

    let tweet = tweets::ActiveModel {
        user_id: Set(user_id),
        parent_id: Set(Some(tweet_id)),
        is_retweet: Set(true),
        content: Set(String::new()),
        link_preview_id: Set(None),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    log::info!("user {} retweeted {}", user_id, tweet_id);
    Ok(tweet)
}

async fn publish<S, F>(
    db: &DatabaseConnection,
    resolver: &LinkPreviewResolver<S, F>,
    storage: &dyn StorageBackend,
    new: NewTweet,
    images: Vec<UploadedImage>,
    parent_id: Option<i32>,
) -> Result<tweets::Model, TweetError>
where
    S: PreviewStore,
    F: PageFetcher,
{
    let link_preview_id = match first_url(&new.content) {
        Some(url) => resolver.resolve(url).await.id,
        None => None,
    };

    // Objects this call created, removed again if the tweet is not saved.
    let mut written: Vec<String> = Vec::new();
    let mut keys = Vec::with_capacity(images.len());
    for image in &images {
        let key = media::storage_key(image);
        match store_image(storage, image, &key).await {
            Ok(true) => written.push(key.clone()),
            Ok(false) => {}
            Err(e) => {
                discard_objects(storage, &written).await;
                return Err(e.into());
            }
        }
        keys.push(key);
    }

    let tweet = match insert_rows(db, &new, &images, keys, link_preview_id, parent_id).await {
        Ok(tweet) => tweet,
        Err(e) => {
            discard_objects(storage, &written).await;
            return Err(e.into());
        }
    };

    log::info!(
        "tweet {} created by user {} with {} images",
        tweet.id,
        tweet.user_id,
        images.len()
    );

    Ok(tweet)
}

/// Write one image unless identical content is already stored.
async fn store_image(
    storage: &dyn StorageBackend,
    image: &UploadedImage,
    key: &str,
) -> Result<bool, StorageError> {
    if storage.exists(key).await? {
        return Ok(false);
    }
    storage.put_object(image.data.clone(), key).await?;
    Ok(true)
}

async fn discard_objects(storage: &dyn StorageBackend, keys: &[String]) {
    for key in keys {
        if let Err(e) = storage.delete_object(key).await {
            log::warn!("failed to remove orphaned upload {}: {}", key, e);
        }
    }
}

async fn insert_rows(
    db: &DatabaseConnection,
    new: &NewTweet,
    images: &[UploadedImage],
    keys: Vec<String>,
    link_preview_id: Option<i32>,
    parent_id: Option<i32>,
) -> Result<tweets::Model, DbErr> {
    let now = Utc::now().naive_utc();
    let txn = db.begin().await?;

    let tweet = tweets::ActiveModel {
        user_id: Set(new.user_id),
        parent_id: Set(parent_id),
        is_retweet: Set(false),
        content: Set(new.content.clone()),
        link_preview_id: Set(link_preview_id),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for (image, key) in images.iter().zip(keys) {
        tweet_images::ActiveModel {
            tweet_id: Set(tweet.id),
            filename: Set(key),
            original_name: Set(image.filename.chars().take(MAX_ORIGINAL_NAME).collect()),
            size: Set(image.data.len() as i64),
            cropping: Set(image
                .cropping
                .as_deref()
                .and_then(|c| media::CropBox::parse(c).ok().flatten())
                .map(|c| c.to_field())),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    Ok(tweet)
}

/// Load a tweet with its preview and images.
pub async fn find_tweet(db: &DatabaseConnection, id: i32) -> Result<Option<TweetView>, DbErr> {
    let (tweet, preview) = match tweets::Entity::find_by_id(id)
        .find_also_related(link_previews::Entity)
        .one(db)
        .await?
    {
        Some(row) => row,
        None => return Ok(None),
    };

    let images = tweet_images::Entity::find()
        .filter(tweet_images::Column::TweetId.eq(tweet.id))
        .order_by_asc(tweet_images::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|i| TweetImageView {
            filename: i.filename,
            original_name: i.original_name,
            size: i.size,
            cropping: i.cropping,
        })
        .collect();

    Ok(Some(TweetView {
        id: tweet.id,
        user_id: tweet.user_id,
        parent_id: tweet.parent_id,
        is_retweet: tweet.is_retweet,
        content: tweet.content,
        created_at: tweet.created_at,
        link_preview: preview.map(PreviewRecord::from),
        images,
    }))
}
