use actix_session::{config::PersistentSession, storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Key, SameSite};
use actix_web::http::header;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use env_logger::Env;
use rand::{distributions::Alphanumeric, Rng};
use std::path::PathBuf;
use std::sync::Arc;
use twittor::db::{get_db_pool, init_db};
use twittor::preview::{DbPreviewStore, DefaultResolver, HttpFetcher};
use twittor::storage::{local::LocalStorage, StorageBackend};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_lib_mods();
    twittor::app_config::init();
    init_db(std::env::var("DATABASE_URL").expect("DATABASE_URL must be set.")).await;

    let config = twittor::app_config::get_config();

    let fetcher = HttpFetcher::new(&config.preview).expect("HTTP client failed to initialize.");
    let resolver = Data::new(DefaultResolver::from_config(
        DbPreviewStore::new(get_db_pool().clone()),
        fetcher,
        &config.preview,
    ));

    let storage: Arc<dyn StorageBackend> = Arc::new(
        LocalStorage::new(PathBuf::from(&config.storage.local_path))
            .expect("Upload storage failed to initialize."),
    );

    let secret_key = match std::env::var("SECRET_KEY") {
        Ok(key) if key.len() >= 64 => Key::from(key.as_bytes()),
        other => {
            let random_string: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(128)
                .map(char::from)
                .collect();
            log::warn!(
                "SECRET_KEY was invalid ({:?}). Session cookies will be invalidated on every restart. A secret key must be at least 64 bytes.",
                other.map(|k| k.len())
            );
            Key::from(random_string.as_bytes())
        }
    };

    let bind_address = config.site.bind_address.clone();
    log::info!("Listening on {}", bind_address);

    HttpServer::new(move || {
        // Order of middleware IS IMPORTANT and is in REVERSE EXECUTION ORDER.
        App::new()
            .app_data(Data::new(get_db_pool().clone()))
            .app_data(resolver.clone())
            .app_data(Data::new(storage.clone()))
            .wrap(
                DefaultHeaders::new()
                    .add((header::X_FRAME_OPTIONS, "DENY"))
                    .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
                    .add(("Referrer-Policy", "strict-origin-when-cross-origin")),
            )
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_same_site(SameSite::Lax)
                    .cookie_secure(false) // Allow HTTP for development
                    .session_lifecycle(PersistentSession::default())
                    .build(),
            )
            .wrap(Logger::new("%a %{User-Agent}i"))
            .configure(twittor::web::configure)
    })
    .bind(bind_address)?
    .run()
    .await
}

/// Initialize third party crates we rely on but don't have control over.
pub fn init_lib_mods() {
    if let Err(e) = dotenv::dotenv() {
        eprintln!("No .env file loaded: {}", e);
    }
    env_logger::Builder::from_env(Env::default().default_filter_or("debug")).init();
}
