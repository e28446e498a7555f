//! Test fixtures for creating test data
#![allow(dead_code)]

use actix_web::{web, App, HttpResponse};
use chrono::{Duration, NaiveDateTime, Utc};
use sea_orm::{entity::*, ActiveValue::Set, DatabaseConnection, DbErr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use twittor::app_config::PreviewConfig;
use twittor::orm::{link_previews, tweets};
use twittor::preview::{DbPreviewStore, DefaultResolver, HttpFetcher};

pub const OG_PAGE: &str = r#"<!DOCTYPE html>
<html><head>
<meta property="og:title" content="Example">
<title>Example Domain</title>
</head><body><p>Example</p></body></html>"#;

pub const PLAIN_PAGE: &str = "<html><head><title>Plain</title></head><body></body></html>";

/// A local web server with a fixed set of pages that counts its hits.
pub struct TestSite {
    pub server: actix_test::TestServer,
    hits: Arc<AtomicUsize>,
}

impl TestSite {
    pub fn url(&self, path: &str) -> String {
        self.server.url(path)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn og_page(hits: web::Data<Arc<AtomicUsize>>) -> HttpResponse {
    hits.fetch_add(1, Ordering::SeqCst);
    HttpResponse::Ok().content_type("text/html").body(OG_PAGE)
}

async fn plain_page(hits: web::Data<Arc<AtomicUsize>>) -> HttpResponse {
    hits.fetch_add(1, Ordering::SeqCst);
    HttpResponse::Ok().content_type("text/html").body(PLAIN_PAGE)
}

async fn long_title_page(hits: web::Data<Arc<AtomicUsize>>) -> HttpResponse {
    hits.fetch_add(1, Ordering::SeqCst);
    HttpResponse::Ok().content_type("text/html").body(format!(
        r#"<html><head><meta property="og:title" content="{}"></head></html>"#,
        "T".repeat(300)
    ))
}

async fn broken_page(hits: web::Data<Arc<AtomicUsize>>) -> HttpResponse {
    hits.fetch_add(1, Ordering::SeqCst);
    HttpResponse::InternalServerError().finish()
}

/// Serves `/og` (Open Graph page), `/plain` (title only), `/long` (300
/// character og:title) and `/broken` (500).
pub fn start_test_site() -> TestSite {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    let server = actix_test::start(move || {
        App::new()
            .app_data(web::Data::new(counter.clone()))
            .route("/og", web::get().to(og_page))
            .route("/plain", web::get().to(plain_page))
            .route("/long", web::get().to(long_title_page))
            .route("/broken", web::get().to(broken_page))
    });

    TestSite { server, hits }
}

/// Resolver backed by the test database and a real HTTP client.
pub fn create_resolver(db: &DatabaseConnection) -> DefaultResolver {
    let config = PreviewConfig::default();
    DefaultResolver::from_config(
        DbPreviewStore::new(db.clone()),
        HttpFetcher::new(&config).expect("Failed to build HTTP client"),
        &config,
    )
}

/// Insert a preview row fetched `age` ago.
pub async fn create_test_preview(
    db: &DatabaseConnection,
    url: &str,
    title: &str,
    age: Duration,
) -> Result<link_previews::Model, DbErr> {
    link_previews::ActiveModel {
        url: Set(url.to_string()),
        title: Set(title.to_string()),
        description: Set("Cached description".to_string()),
        image: Set("https://cdn.example/cached.png".to_string()),
        fetched_at: Set(Utc::now().naive_utc() - age),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Insert a tweet directly, bypassing validation.
pub async fn create_test_tweet(
    db: &DatabaseConnection,
    user_id: i32,
    content: &str,
    link_preview_id: Option<i32>,
    created_at: NaiveDateTime,
) -> Result<tweets::Model, DbErr> {
    tweets::ActiveModel {
        user_id: Set(user_id),
        parent_id: Set(None),
        is_retweet: Set(false),
        content: Set(content.to_string()),
        link_preview_id: Set(link_preview_id),
        created_at: Set(created_at),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// A tiny valid PNG (1x1).
pub fn small_png() -> Vec<u8> {
    b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\x00\x00\x00\x01\x00\x00\x00\x01\x08\x06\x00\x00\x00\x1f\x15\xc4\x89\x00\x00\x00\x0cIDATx\xdacd\xf8\x0f\x00\x01\x01\x01\x00\x18\xdd\x8f\xb1\x00\x00\x00\x00IEND\xaeB`\x82".to_vec()
}
