use serde::Deserialize;

/// Main configuration structure for Sitemirror
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub sitemap: Vec<SitemapEntry>,
    #[serde(default)]
    pub feed: Vec<FeedEntry>,
}

/// Sync engine behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Upper bound on concurrently in-flight fetch/extract/upsert operations
    #[serde(rename = "max-concurrent-operations", default = "default_max_concurrent")]
    pub max_concurrent_operations: u32,

    /// Pause between sequential child fetches of a sitemap index (milliseconds)
    #[serde(rename = "politeness-delay", default = "default_politeness_delay")]
    pub politeness_delay: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Only sync content for the N most recently modified URLs
    #[serde(rename = "content-limit", default)]
    pub content_limit: Option<usize>,

    /// Report progress every N completed content syncs
    #[serde(rename = "progress-interval", default = "default_progress_interval")]
    pub progress_interval: usize,

    /// Refresh the stored lastmod of already-known URLs during source sync
    #[serde(rename = "refresh-last-mod", default)]
    pub refresh_last_mod: bool,

    /// What to do with the stored change marker when content is unchanged
    #[serde(rename = "gate-policy", default)]
    pub gate_policy: GatePolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_concurrent_operations: default_max_concurrent(),
            politeness_delay: default_politeness_delay(),
            request_timeout: default_request_timeout(),
            content_limit: None,
            progress_interval: default_progress_interval(),
            refresh_last_mod: false,
            gate_policy: GatePolicy::default(),
        }
    }
}

fn default_max_concurrent() -> u32 {
    20
}

fn default_politeness_delay() -> u64 {
    1000
}

fn default_request_timeout() -> u64 {
    10
}

fn default_progress_interval() -> usize {
    100
}

/// Policy for the stored `last_modified` value when re-extracted content is identical
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatePolicy {
    /// Advance the stored marker so the next run can skip the fetch
    #[default]
    Refresh,
    /// Leave the stored marker at its last-write value
    Keep,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default)]
    pub crawler_version: Option<String>,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email", default)]
    pub contact_email: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: None,
            contact_url: None,
            contact_email: None,
        }
    }
}

fn default_crawler_name() -> String {
    "Crawler".to_string()
}

impl UserAgentConfig {
    /// Formats the identity as `Name/Version (+ContactURL; ContactEmail)`,
    /// leaving out whichever parts are not configured
    pub fn header_value(&self) -> String {
        let mut value = self.crawler_name.clone();
        if let Some(version) = &self.crawler_version {
            value.push('/');
            value.push_str(version);
        }

        let contact: Vec<String> = [
            self.contact_url.as_ref().map(|u| format!("+{}", u)),
            self.contact_email.clone(),
        ]
        .into_iter()
        .flatten()
        .collect();

        if !contact.is_empty() {
            value.push_str(&format!(" ({})", contact.join("; ")));
        }
        value
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Optional file that receives a copy of every warning and error
    #[serde(rename = "error-log", default)]
    pub error_log: Option<String>,
}

/// CSS selector lists used by the HTML extractor; the first selector
/// yielding a non-empty value wins
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    #[serde(default = "default_title_selectors")]
    pub title: Vec<String>,
    #[serde(default = "default_content_selectors")]
    pub content: Vec<String>,
    #[serde(default)]
    pub summary: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            title: default_title_selectors(),
            content: default_content_selectors(),
            summary: Vec::new(),
        }
    }
}

fn default_title_selectors() -> Vec<String> {
    vec!["h1".to_string(), "title".to_string()]
}

fn default_content_selectors() -> Vec<String> {
    vec![
        "article".to_string(),
        "main".to_string(),
        "meta[name='description']".to_string(),
    ]
}

/// A sitemap (or sitemap index) entry point
#[derive(Debug, Clone, Deserialize)]
pub struct SitemapEntry {
    pub url: String,
}

/// A paginated JSON feed used as an alternate URL source
#[derive(Debug, Clone, Deserialize)]
pub struct FeedEntry {
    /// Feed endpoint (e.g. `https://example.com/wp-json/wp/v2/posts`)
    pub url: String,

    /// Page size requested through `per_page`
    #[serde(rename = "per-page", default)]
    pub per_page: Option<u32>,

    /// Identity override for this feed only
    #[serde(rename = "user-agent", default)]
    pub user_agent: Option<String>,
}
