use crate::app_config;
use crate::hashtags::tweets_with_tag;
use crate::orm::tweets;
use actix_web::{error, get, web, Error, Responder};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::DatabaseConnection;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_tag);
}

#[derive(Template)]
#[template(path = "tag.html")]
pub struct TagTemplate {
    pub tag: String,
    pub tweets: Vec<tweets::Model>,
}

/// GET /tags/{tag} - Tweets mentioning #tag
#[get("/tags/{tag}")]
pub async fn view_tag(
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
) -> Result<impl Responder, Error> {
    let tag = path.into_inner();
    let limit = app_config::limits().tweets_per_tag_page;

    let tweets = tweets_with_tag(db.get_ref(), &tag, limit)
        .await
        .map_err(|e| {
            log::error!("tag query failed for {}: {}", tag, e);
            error::ErrorInternalServerError("Could not load tweets")
        })?;

    Ok(TagTemplate { tag, tweets }.to_response())
}
