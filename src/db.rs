//! Global database pool.

use once_cell::sync::OnceCell;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

static DB_POOL: OnceCell<DatabaseConnection> = OnceCell::new();

/// Connect to the database and store the pool globally.
///
/// Panics if the connection cannot be established.
pub async fn init_db(database_url: String) {
    let mut opts = ConnectOptions::new(database_url);
    opts.connect_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(false);

    let pool = Database::connect(opts)
        .await
        .expect("Failed to connect to database.");

    if DB_POOL.set(pool).is_err() {
        log::warn!("init_db called more than once; keeping the existing pool");
    }
}

/// Returns the global pool.
///
/// Panics if `init_db` has not been called.
pub fn get_db_pool() -> &'static DatabaseConnection {
    DB_POOL
        .get()
        .expect("Database pool accessed before init_db was called.")
}
