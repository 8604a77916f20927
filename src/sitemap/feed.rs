//! Paginated JSON feed discovery
//!
//! An alternate URL source for sites that expose their posts through a
//! WordPress-style REST endpoint (`?per_page=k&page=n`, each page a JSON
//! array of `{date, link}` objects). Pages are requested in order until one
//! comes back empty or fails.

use crate::sitemap::resolver::dedup_by_loc;
use crate::sitemap::xml::normalize_last_mod;
use crate::storage::UrlRecord;
use crate::sync::Fetcher;
use crate::{ConfigError, MirrorError};
use regex::Regex;
use serde::Deserialize;
use std::sync::{Arc, OnceLock};
use url::Url;

/// Upper bound on requested pages, in case a feed never returns an empty page
pub const MAX_PAGES: u32 = 10_000;

/// A paginated JSON endpoint listing pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    pub url: String,
    pub per_page: Option<u32>,
    /// Identity override sent with every page request
    pub user_agent: Option<String>,
}

impl FeedSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            per_page: None,
            user_agent: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FeedPost {
    #[serde(default)]
    date: String,
    #[serde(default)]
    link: String,
}

/// Walks a paginated feed and turns its posts into URL records
#[derive(Clone)]
pub struct FeedDiscovery {
    fetcher: Arc<dyn Fetcher>,
    max_pages: u32,
}

impl FeedDiscovery {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            max_pages: MAX_PAGES,
        }
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Collects URL records from every page of `feed`
    ///
    /// Pagination stops at the first empty page, failed request, or
    /// undecodable page; none of these is an error. Posts whose date carries
    /// no valid `YYYY-MM-DD` token are skipped with a warning.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<UrlRecord>)` - Everything discovered before pagination stopped
    /// * `Err(MirrorError::Config)` - The feed URL itself is invalid
    pub async fn discover(&self, feed: &FeedSource) -> Result<Vec<UrlRecord>, MirrorError> {
        let mut records = Vec::new();

        for page in 1..=self.max_pages {
            let page_url = page_url(&feed.url, page, feed.per_page)?;
            tracing::info!(url = %page_url, "Getting urls from feed page");

            let body = match self
                .fetcher
                .get(&page_url, feed.user_agent.as_deref())
                .await
            {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(url = %page_url, error = %e, "Feed request failed, stopping");
                    break;
                }
            };

            let posts: Vec<FeedPost> = match serde_json::from_str(&body) {
                Ok(posts) => posts,
                Err(e) => {
                    tracing::warn!(url = %page_url, error = %e, "Feed page is not a post array, stopping");
                    break;
                }
            };

            tracing::debug!(url = %page_url, count = posts.len(), "Found posts");
            if posts.is_empty() {
                break;
            }

            records.extend(posts.into_iter().filter_map(|post| post_record(feed, post)));

            if page == self.max_pages {
                tracing::warn!(feed = %feed.url, max_pages = self.max_pages, "Feed page limit reached");
            }
        }

        Ok(dedup_by_loc(records))
    }
}

fn post_record(feed: &FeedSource, post: FeedPost) -> Option<UrlRecord> {
    let link = post.link.trim();
    if link.is_empty() {
        tracing::warn!(feed = %feed.url, "Skipping post without link");
        return None;
    }

    let Some(last_mod) = date_token(&post.date) else {
        tracing::warn!(
            feed = %feed.url,
            link,
            date = %post.date,
            "Skipping post with unparsable date"
        );
        return None;
    };

    Some(UrlRecord::new(link, feed.url.as_str()).with_last_mod(last_mod))
}

/// Extracts the first `YYYY-MM-DD` token of `raw` and normalizes it to
/// midnight UTC; `None` if there is no such token or it is not a real date
pub fn date_token(raw: &str) -> Option<String> {
    static DATE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = DATE
        .get_or_init(|| Regex::new(r"\d{4}-\d{2}-\d{2}").ok())
        .as_ref()?;

    let token = re.find(raw)?.as_str();
    chrono::NaiveDate::parse_from_str(token, "%Y-%m-%d").ok()?;
    normalize_last_mod(token)
}

/// Builds the URL of one feed page, replacing any `page`/`per_page` pairs
/// already present on `base`
pub fn page_url(base: &str, page: u32, per_page: Option<u32>) -> Result<String, MirrorError> {
    let mut url = Url::parse(base).map_err(|e| {
        MirrorError::Config(ConfigError::InvalidUrl(format!(
            "Invalid feed URL '{}': {}",
            base, e
        )))
    })?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "page" && !(per_page.is_some() && k == "per_page"))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        if let Some(per_page) = per_page {
            pairs.append_pair("per_page", &per_page.to_string());
        }
        pairs.append_pair("page", &page.to_string());
    }

    Ok(url.to_string())
}
