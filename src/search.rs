//! Substring search over tweet content.

use crate::hashtags::escape_like;
use crate::orm::tweets;
use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, EntityTrait, Statement};

/// Normalize a raw query. Blank queries search nothing.
pub fn normalize_query(q: &str) -> Option<&str> {
    let q = q.trim();
    if q.is_empty() {
        None
    } else {
        Some(q)
    }
}

/// Newest tweets whose content contains `q`, ignoring case, at most `limit`.
pub async fn search_tweets(
    db: &DatabaseConnection,
    q: &str,
    limit: u64,
) -> Result<Vec<tweets::Model>, DbErr> {
    let q = match normalize_query(q) {
        Some(q) => q,
        None => return Ok(Vec::new()),
    };

    let sql = r#"
        SELECT * FROM tweets
        WHERE content ILIKE $1
        ORDER BY created_at DESC, id DESC
        LIMIT $2
    "#;
    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        sql,
        vec![
            format!("%{}%", escape_like(q)).into(),
            (limit as i64).into(),
        ],
    );

    tweets::Entity::find().from_raw_sql(stmt).all(db).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("  rust  "), Some("rust"));
        assert_eq!(normalize_query("   "), None);
        assert_eq!(normalize_query(""), None);
    }
}
