use crate::app_config::{self, LimitsConfig};
use crate::media::UploadedImage;
use crate::preview::DefaultResolver;
use crate::storage::StorageBackend;
use crate::tweets::{create_tweet, find_tweet, quote_tweet, retweet, NewTweet, TweetError};
use actix_multipart::{Field, Multipart};
use actix_web::{error, get, post, web, Error, HttpResponse};
use futures::{StreamExt, TryStreamExt};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(post_tweet)
        .service(post_quote)
        .service(post_retweet)
        .service(view_tweet);
}

/// Session key holding the logged-in user's id.
pub const SESSION_USER_ID: &str = "user_id";

/// Read a whole field, keeping at most `cap` bytes.
///
/// The rest of the field is drained so the next field can be read.
async fn read_field(field: &mut Field, cap: usize) -> Result<Vec<u8>, Error> {
    let mut buf: Vec<u8> = Vec::new();
    while let Some(chunk) = field.next().await {
        let bytes = chunk.map_err(|e| {
            log::error!("post_tweet: multipart read error: {}", e);
            error::ErrorBadRequest("Error interpreting user input.")
        })?;
        let room = cap.saturating_sub(buf.len());
        buf.extend_from_slice(&bytes[..bytes.len().min(room)]);
    }
    Ok(buf)
}

/// Capped text fields may end mid-character; keep what decodes.
fn read_text(buf: Vec<u8>) -> String {
    String::from_utf8_lossy(&buf).into_owned()
}

/// Longest accepted `cropping` value, matching `tweet_images.cropping`.
const MAX_CROPPING_LENGTH: usize = 64;

fn session_user(session: &actix_session::Session) -> Result<i32, Error> {
    session
        .get::<i32>(SESSION_USER_ID)
        .map_err(error::ErrorBadRequest)?
        .ok_or_else(|| error::ErrorUnauthorized("You must be logged in to do that."))
}

fn tweet_error(e: TweetError) -> Error {
    match e {
        TweetError::NotFound(_) => error::ErrorNotFound("Tweet not found."),
        e if e.is_user_error() => error::ErrorBadRequest(e.to_string()),
        e => {
            log::error!("tweet write failed: {}", e);
            error::ErrorInternalServerError("Could not create tweet.")
        }
    }
}

/// Read the compose form: `content`, repeated `images` files, and optional
/// `cropping` values.
///
/// The n-th `cropping` belongs to the n-th `images` part, counting parts
/// left empty by the browser.
async fn read_tweet_form(
    payload: &mut Multipart,
    limits: &LimitsConfig,
) -> Result<(String, Vec<UploadedImage>), Error> {
    // One byte over the limit is enough to reject the upload.
    let image_cap = limits.max_image_size_bytes() as usize + 1;
    let text_cap = limits.max_tweet_length * 4 + 1;

    let mut content = String::new();
    let mut slots: Vec<Option<UploadedImage>> = Vec::new();
    let mut croppings: Vec<String> = Vec::new();

    while let Some(mut field) = payload.try_next().await.map_err(|e| {
        log::error!("read_tweet_form: multipart error: {}", e);
        error::ErrorBadRequest("Error interpreting user input.")
    })? {
        let disposition = field.content_disposition();
        let name = disposition.get_name().unwrap_or_default().to_owned();
        let filename = disposition.get_filename().map(|f| f.to_owned());

        match name.as_str() {
            "content" => content = read_text(read_field(&mut field, text_cap).await?),
            "cropping" => {
                let buf = read_field(&mut field, MAX_CROPPING_LENGTH + 1).await?;
                if buf.len() > MAX_CROPPING_LENGTH {
                    return Err(error::ErrorBadRequest("Cropping value is too long."));
                }
                croppings.push(read_text(buf));
            }
            "images" => {
                let data = read_field(&mut field, image_cap).await?;
                slots.push(match filename {
                    // An empty file input still sends a part
                    Some(filename) if !filename.is_empty() || !data.is_empty() => {
                        Some(UploadedImage {
                            filename,
                            data,
                            cropping: None,
                        })
                    }
                    _ => None,
                });
            }
            _ => {
                return Err(error::ErrorBadRequest(format!(
                    "Unknown field '{}'",
                    name
                )))
            }
        }
    }

    let mut croppings = croppings.into_iter();
    let images = slots
        .into_iter()
        .filter_map(|slot| {
            let cropping = croppings.next().filter(|c| !c.trim().is_empty());
            slot.map(|image| UploadedImage { cropping, ..image })
        })
        .collect();

    Ok((content, images))
}

/// POST /tweets - Publish a tweet with optional images
#[post("/tweets")]
pub async fn post_tweet(
    session: actix_session::Session,
    db: web::Data<DatabaseConnection>,
    resolver: web::Data<DefaultResolver>,
    storage: web::Data<Arc<dyn StorageBackend>>,
    mut payload: Multipart,
) -> Result<HttpResponse, Error> {
    let user_id = session_user(&session)?;
    let limits = app_config::limits();
    let (content, images) = read_tweet_form(&mut payload, &limits).await?;

    let tweet = create_tweet(
        db.get_ref(),
        resolver.get_ref(),
        storage.get_ref().as_ref(),
        &limits,
        NewTweet {
            user_id,
            content,
            images,
        },
    )
    .await
    .map_err(tweet_error)?;

    Ok(see_tweet(tweet.id))
}

/// POST /tweets/{id}/quote - Publish a tweet quoting another
#[post("/tweets/{id}/quote")]
pub async fn post_quote(
    session: actix_session::Session,
    db: web::Data<DatabaseConnection>,
    resolver: web::Data<DefaultResolver>,
    storage: web::Data<Arc<dyn StorageBackend>>,
    path: web::Path<i32>,
    mut payload: Multipart,
) -> Result<HttpResponse, Error> {
    let user_id = session_user(&session)?;
    let limits = app_config::limits();
    let (content, images) = read_tweet_form(&mut payload, &limits).await?;

    let tweet = quote_tweet(
        db.get_ref(),
        resolver.get_ref(),
        storage.get_ref().as_ref(),
        &limits,
        path.into_inner(),
        NewTweet {
            user_id,
            content,
            images,
        },
    )
    .await
    .map_err(tweet_error)?;

    Ok(see_tweet(tweet.id))
}

/// POST /tweets/{id}/retweet - Retweet, once per user
#[post("/tweets/{id}/retweet")]
pub async fn post_retweet(
    session: actix_session::Session,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let user_id = session_user(&session)?;

    let tweet = retweet(db.get_ref(), user_id, path.into_inner())
        .await
        .map_err(tweet_error)?;

    Ok(see_tweet(tweet.id))
}

fn see_tweet(id: i32) -> HttpResponse {
    HttpResponse::SeeOther()
        .append_header(("Location", format!("/tweets/{}", id)))
        .finish()
}

/// GET /tweets/{id} - A tweet with its link preview and images
#[get("/tweets/{id}")]
pub async fn view_tweet(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let tweet = find_tweet(db.get_ref(), path.into_inner())
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Tweet not found."))?;

    Ok(HttpResponse::Ok().json(tweet))
}
