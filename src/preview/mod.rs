//! Link preview acquisition and caching.
//!
//! A preview is fetched the first time a URL appears in a tweet and cached in
//! `link_previews` for 24 hours. Expiry is checked lazily on lookup; nothing
//! refreshes previews in the background.
//!
//! The resolver never fails. A page that cannot be fetched yields either the
//! previous (stale) preview or a placeholder. Two requests resolving the same
//! uncached URL at once will both fetch it and the last write wins.

pub mod extract;
pub mod fetch;
pub mod store;

pub use extract::{extract_preview, PreviewFields};
pub use fetch::{FetchError, HttpFetcher, PageFetcher};
pub use store::{DbPreviewStore, PreviewStore};

use crate::app_config::PreviewConfig;
use crate::orm::link_previews;
use chrono::{Duration, NaiveDateTime, Utc};
use serde::Serialize;

/// Title of a preview synthesized when the page could not be fetched.
pub const PLACEHOLDER_TITLE: &str = "(link unavailable)";
/// Description of a preview synthesized when the page could not be fetched.
pub const PLACEHOLDER_DESCRIPTION: &str = "could not fetch preview";

/// Resolver used by the running application.
pub type DefaultResolver = LinkPreviewResolver<DbPreviewStore, HttpFetcher>;

/// Cached metadata for one URL.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PreviewRecord {
    /// Row id; `None` only when the record could not be persisted.
    pub id: Option<i32>,
    pub url: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub fetched_at: NaiveDateTime,
}

impl PreviewRecord {
    fn unsaved(url: &str, fields: PreviewFields, fetched_at: NaiveDateTime) -> Self {
        Self {
            id: None,
            url: url.to_owned(),
            title: fields.title,
            description: fields.description,
            image: fields.image,
            fetched_at,
        }
    }

    /// True when older than `max_age` at `now`. Exactly `max_age` is still fresh.
    pub fn is_stale(&self, now: NaiveDateTime, max_age: Duration) -> bool {
        now - self.fetched_at > max_age
    }
}

impl From<link_previews::Model> for PreviewRecord {
    fn from(model: link_previews::Model) -> Self {
        Self {
            id: Some(model.id),
            url: model.url,
            title: model.title,
            description: model.description,
            image: model.image,
            fetched_at: model.fetched_at,
        }
    }
}

fn placeholder_fields() -> PreviewFields {
    PreviewFields {
        title: PLACEHOLDER_TITLE.to_owned(),
        description: PLACEHOLDER_DESCRIPTION.to_owned(),
        image: String::new(),
    }
}

pub struct LinkPreviewResolver<S, F> {
    store: S,
    fetcher: F,
    max_age: Duration,
}

impl<S: PreviewStore, F: PageFetcher> LinkPreviewResolver<S, F> {
    pub fn new(store: S, fetcher: F, max_age: Duration) -> Self {
        Self {
            store,
            fetcher,
            max_age,
        }
    }

    pub fn from_config(store: S, fetcher: F, config: &PreviewConfig) -> Self {
        Self::new(store, fetcher, Duration::hours(config.cache_hours))
    }

    /// Return the cached preview for `url`, fetching it when missing or stale.
    pub async fn resolve(&self, url: &str) -> PreviewRecord {
        self.resolve_at(url, Utc::now().naive_utc()).await
    }

    pub async fn resolve_at(&self, url: &str, now: NaiveDateTime) -> PreviewRecord {
        let cached = match self.store.find_by_url(url).await {
            Ok(cached) => cached,
            Err(e) => {
                log::warn!("link preview lookup failed for {}: {}", url, e);
                None
            }
        };

        if let Some(record) = &cached {
            if !record.is_stale(now, self.max_age) {
                log::debug!("link preview cache hit: {}", url);
                return record.clone();
            }
        }

        let fields = match self.fetcher.fetch(url).await {
            Ok(body) => extract_preview(&body),
            Err(e) => {
                log::debug!("link preview fetch failed for {}: {}", url, e);
                return match cached {
                    Some(stale) => stale,
                    None => self.save(None, url, placeholder_fields(), now).await,
                };
            }
        };

        self.save(cached.as_ref(), url, fields, now).await
    }

    async fn save(
        &self,
        existing: Option<&PreviewRecord>,
        url: &str,
        fields: PreviewFields,
        now: NaiveDateTime,
    ) -> PreviewRecord {
        let result = match existing {
            Some(record) => self.store.update(record, fields.clone(), now).await,
            None => self.store.create(url, fields.clone(), now).await,
        };

        result.unwrap_or_else(|e| {
            log::warn!("failed to persist link preview for {}: {}", url, e);
            let mut record = PreviewRecord::unsaved(url, fields, now);
            record.id = existing.and_then(|r| r.id);
            record
        })
    }
}
