//! Hashtags in tweet content and tag lookups.

use crate::orm::tweets;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, EntityTrait, Statement};

static HASHTAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#(\w+)").expect("Invalid hashtag regex"));

/// Lowercased tags in order of first appearance, without duplicates.
pub fn extract_hashtags(content: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for cap in HASHTAG_REGEX.captures_iter(content) {
        let tag = cap[1].to_lowercase();
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

/// Whether `content` carries `#tag` as a standalone word, ignoring case.
///
/// The hash must start the content or follow whitespace, and the tag must end
/// at a word boundary, so `#rust` does not match `#rustacean` or `a#rust`.
pub fn mentions_tag(content: &str, tag: &str) -> bool {
    let tag = tag.trim_start_matches('#');
    if tag.is_empty() {
        return false;
    }

    let pattern = format!(r"(?i)(^|\s)#{}\b", regex::escape(tag));
    match Regex::new(&pattern) {
        Ok(re) => re.is_match(content),
        Err(e) => {
            log::warn!("invalid tag pattern for {:?}: {}", tag, e);
            false
        }
    }
}

/// Newest tweets mentioning `tag`, at most `limit`.
pub async fn tweets_with_tag(
    db: &DatabaseConnection,
    tag: &str,
    limit: u64,
) -> Result<Vec<tweets::Model>, DbErr> {
    let tag = tag.trim_start_matches('#');
    if tag.is_empty() {
        return Ok(Vec::new());
    }

    // ILIKE narrows the candidates; the regex enforces word boundaries.
    let sql = r#"
        SELECT * FROM tweets
        WHERE content ILIKE $1
        ORDER BY created_at DESC, id DESC
    "#;
    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        sql,
        vec![format!("%#{}%", escape_like(tag)).into()],
    );

    let candidates = tweets::Entity::find()
        .from_raw_sql(stmt)
        .all(db)
        .await?;

    Ok(candidates
        .into_iter()
        .filter(|t| mentions_tag(&t.content, tag))
        .take(limit as usize)
        .collect())
}

/// Escape `LIKE` wildcards so `s` matches literally.
pub(crate) fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
