//! Sitemap resolution
//!
//! Turns one sitemap entry point into a flat, de-duplicated list of URL
//! records. A leaf `<urlset>` is returned as is; a `<sitemapindex>` is
//! expanded one level by fetching each child sequentially with a politeness
//! delay in between.

use crate::sitemap::xml::{parse_index, parse_urlset};
use crate::storage::UrlRecord;
use crate::sync::Fetcher;
use crate::MirrorError;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Default pause before each index child fetch
pub const DEFAULT_POLITENESS_DELAY: Duration = Duration::from_secs(1);

/// Resolves sitemap entry points into URL records
#[derive(Clone)]
pub struct SitemapResolver {
    fetcher: Arc<dyn Fetcher>,
    politeness_delay: Duration,
}

impl SitemapResolver {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            politeness_delay: DEFAULT_POLITENESS_DELAY,
        }
    }

    pub fn with_politeness_delay(mut self, delay: Duration) -> Self {
        self.politeness_delay = delay;
        self
    }

    /// Resolves `entry_url` into the flat set of URL records it lists
    ///
    /// # Resolution
    ///
    /// 1. Fetch the entry and parse it both as an index and as a url-set
    /// 2. A successful url-set parse wins: the entry is a leaf
    /// 3. Otherwise each index child is fetched in order, after the politeness
    ///    delay, and must itself parse as a url-set
    /// 4. The first child fetch or parse failure aborts the whole resolve
    ///
    /// Only one level of indirection is supported; an index child that is
    /// itself an index fails the url-set parse.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<UrlRecord>)` - Records without duplicate `loc`, first occurrence kept
    /// * `Err(MirrorError::NotASitemap)` - The entry is neither an index nor a url-set
    /// * `Err(MirrorError)` - A fetch or child parse failed
    pub async fn resolve(&self, entry_url: &str) -> Result<Vec<UrlRecord>, MirrorError> {
        let data = self.fetcher.fetch(entry_url).await?;

        let index = parse_index(&data);
        let urlset = parse_urlset(&data, entry_url);

        let records = match (urlset, index) {
            (Ok(records), _) => {
                tracing::debug!(entry_url, count = records.len(), "Resolved leaf sitemap");
                records
            }
            (Err(_), Ok(children)) => {
                tracing::debug!(
                    entry_url,
                    children = children.len(),
                    "Expanding sitemap index"
                );
                self.expand_index(children.iter().map(|c| c.loc.as_str()))
                    .await?
            }
            (Err(_), Err(_)) => {
                return Err(MirrorError::NotASitemap {
                    url: entry_url.to_string(),
                })
            }
        };

        Ok(dedup_by_loc(records))
    }

    async fn expand_index<'a>(
        &self,
        children: impl Iterator<Item = &'a str>,
    ) -> Result<Vec<UrlRecord>, MirrorError> {
        let mut merged = Vec::new();

        for child_url in children {
            tokio::time::sleep(self.politeness_delay).await;

            let data = self.fetcher.fetch(child_url).await?;
            let records =
                parse_urlset(&data, child_url).map_err(|message| MirrorError::SitemapParse {
                    url: child_url.to_string(),
                    message,
                })?;

            tracing::debug!(child_url, count = records.len(), "Merged child sitemap");
            merged.extend(records);
        }

        Ok(merged)
    }
}

/// Drops records whose `loc` was already seen, keeping input order
pub fn dedup_by_loc(records: Vec<UrlRecord>) -> Vec<UrlRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|r| seen.insert(r.loc.clone()))
        .collect()
}
