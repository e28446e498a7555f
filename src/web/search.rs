//! Tweet search.

use crate::app_config;
use crate::orm::tweets;
use crate::search::{normalize_query, search_tweets};
use actix_web::{error, get, web, Error, Responder};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(search);
}

#[derive(Template)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub query: Option<String>,
    pub tweets: Vec<tweets::Model>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
}

/// GET /search?q=query - Tweets containing the query, newest first
#[get("/search")]
pub async fn search(
    db: web::Data<DatabaseConnection>,
    query: web::Query<SearchQuery>,
) -> Result<impl Responder, Error> {
    let q = match query.q.as_deref().and_then(normalize_query) {
        Some(q) => q.to_owned(),
        None => {
            return Ok(SearchTemplate {
                query: None,
                tweets: Vec::new(),
            }
            .to_response())
        }
    };

    let limit = app_config::limits().search_results;
    let tweets = search_tweets(db.get_ref(), &q, limit).await.map_err(|e| {
        log::error!("search failed for {:?}: {}", q, e);
        error::ErrorInternalServerError("Could not search tweets")
    })?;

    Ok(SearchTemplate {
        query: Some(q),
        tweets,
    }
    .to_response())
}
