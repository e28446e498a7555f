//! Most shared link domains over the last day.

use crate::links::url_domain;
use crate::orm::{link_previews, tweets};
use chrono::{Duration, NaiveDateTime};
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};
use serde::Serialize;
use std::collections::HashMap;

/// How far back tweets count towards trending.
pub const TRENDING_WINDOW_HOURS: i64 = 24;

/// How many domains are reported.
pub const TRENDING_LIMIT: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TrendingDomain {
    pub domain: String,
    pub count: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TrendingLinks {
    pub domains: Vec<TrendingDomain>,
    /// Links counted across all domains, not just the reported ones
    pub total_links: usize,
}

/// Count links per domain, most shared first, ties by domain name.
pub fn rank_domains<'a, I>(urls: I) -> TrendingLinks
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for url in urls {
        if let Some(domain) = url_domain(url) {
            *counts.entry(domain).or_insert(0) += 1;
        }
    }

    let total_links = counts.values().sum();
    let mut domains: Vec<TrendingDomain> = counts
        .into_iter()
        .map(|(domain, count)| TrendingDomain { domain, count })
        .collect();
    domains.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.domain.cmp(&b.domain)));
    domains.truncate(TRENDING_LIMIT);

    TrendingLinks {
        domains,
        total_links,
    }
}

/// Rank the previews attached to tweets created within the window before `now`.
pub async fn trending_links(
    db: &DatabaseConnection,
    now: NaiveDateTime,
) -> Result<TrendingLinks, DbErr> {
    let since = now - Duration::hours(TRENDING_WINDOW_HOURS);

    let rows = tweets::Entity::find()
        .filter(tweets::Column::CreatedAt.gte(since))
        .filter(tweets::Column::LinkPreviewId.is_not_null())
        .find_also_related(link_previews::Entity)
        .all(db)
        .await?;

    Ok(rank_domains(
        rows.iter()
            .filter_map(|(_, preview)| preview.as_ref())
            .map(|p| p.url.as_str()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_domains() {
        let trending = rank_domains(vec![
            "https://www.example.com/a",
            "https://example.com/b",
            "https://rust-lang.org/",
            "https://blog.rust-lang.org/2024",
            "https://rust-lang.org/learn",
            "garbage",
        ]);

        assert_eq!(trending.total_links, 5);
        assert_eq!(
            trending.domains,
            vec![
                TrendingDomain {
                    domain: "example.com".to_string(),
                    count: 2
                },
                TrendingDomain {
                    domain: "rust-lang.org".to_string(),
                    count: 2
                },
                TrendingDomain {
                    domain: "blog.rust-lang.org".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_rank_domains_caps_at_limit() {
        let urls: Vec<String> = (0..15)
            .map(|i| format!("https://site{:02}.example/", i))
            .collect();
        let trending = rank_domains(urls.iter().map(|s| s.as_str()));
        assert_eq!(trending.domains.len(), TRENDING_LIMIT);
        assert_eq!(trending.total_links, 15);
        assert_eq!(trending.domains[0].domain, "site00.example");
    }

    #[test]
    fn test_rank_domains_empty() {
        assert_eq!(rank_domains(Vec::<&str>::new()), TrendingLinks::default());
    }
}
