//! Link preview lookup.
//!
//! Returns the cached Open Graph metadata for a URL, fetching it when the
//! cache has nothing fresh. Used by the compose box to show a card before the
//! tweet is posted.

use crate::preview::DefaultResolver;
use actix_web::{error, get, web, Error, HttpResponse};
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(get_link_preview);
}

#[derive(Deserialize)]
pub struct LinkPreviewQuery {
    url: String,
}

/// Parse `url` and accept only http(s).
pub fn validate_preview_url(url: &str) -> Result<url::Url, Error> {
    let parsed = url::Url::parse(url).map_err(|_| error::ErrorBadRequest("Invalid URL"))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(error::ErrorBadRequest("Only HTTP/HTTPS URLs are supported")),
    }
}

#[get("/api/link-preview")]
async fn get_link_preview(
    resolver: web::Data<DefaultResolver>,
    query: web::Query<LinkPreviewQuery>,
) -> Result<HttpResponse, Error> {
    validate_preview_url(&query.url)?;

    let preview = resolver.resolve(&query.url).await;
    Ok(HttpResponse::Ok().json(preview))
}
