use crate::trending::{trending_links, TrendingLinks, TRENDING_WINDOW_HOURS};
use actix_web::{error, get, web, Error, Responder};
use askama_actix::{Template, TemplateToResponse};
use chrono::Utc;
use sea_orm::DatabaseConnection;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_trending);
}

#[derive(Template)]
#[template(path = "trending.html")]
pub struct TrendingTemplate {
    pub trending: TrendingLinks,
    pub window_hours: i64,
}

/// GET /trending - Most shared domains over the last day
#[get("/trending")]
pub async fn view_trending(db: web::Data<DatabaseConnection>) -> Result<impl Responder, Error> {
    let trending = trending_links(db.get_ref(), Utc::now().naive_utc())
        .await
        .map_err(|e| {
            log::error!("trending links query failed: {}", e);
            error::ErrorInternalServerError("Could not load trending links")
        })?;

    Ok(TrendingTemplate {
        trending,
        window_hours: TRENDING_WINDOW_HOURS,
    }
    .to_response())
}
