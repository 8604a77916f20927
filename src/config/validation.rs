use crate::config::types::{
    Config, ExtractConfig, FeedEntry, OutputConfig, SitemapEntry, SyncConfig, UserAgentConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_sync_config(&config.sync)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_extract_config(&config.extract)?;
    validate_sources(&config.sitemap, &config.feed)?;
    Ok(())
}

/// Validates sync engine configuration
fn validate_sync_config(config: &SyncConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_operations < 1 || config.max_concurrent_operations > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_operations must be between 1 and 100, got {}",
            config.max_concurrent_operations
        )));
    }

    if config.request_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout must be >= 1s, got {}s",
            config.request_timeout
        )));
    }

    if config.progress_interval < 1 {
        return Err(ConfigError::Validation(
            "progress_interval must be >= 1".to_string(),
        ));
    }

    if config.content_limit == Some(0) {
        return Err(ConfigError::Validation(
            "content_limit must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    if let Some(email) = &config.contact_email {
        validate_email(email)?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if matches!(&config.error_log, Some(path) if path.is_empty()) {
        return Err(ConfigError::Validation(
            "error_log cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates that every extraction selector parses
fn validate_extract_config(config: &ExtractConfig) -> Result<(), ConfigError> {
    for selector in config
        .title
        .iter()
        .chain(&config.content)
        .chain(&config.summary)
    {
        Selector::parse(selector)
            .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))?;
    }
    Ok(())
}

/// Validates sitemap and feed entry points
fn validate_sources(sitemaps: &[SitemapEntry], feeds: &[FeedEntry]) -> Result<(), ConfigError> {
    if sitemaps.is_empty() && feeds.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[sitemap]] or [[feed]] entry is required".to_string(),
        ));
    }

    for entry in sitemaps {
        validate_source_url("sitemap", &entry.url)?;
    }

    for entry in feeds {
        validate_source_url("feed", &entry.url)?;

        if entry.per_page == Some(0) {
            return Err(ConfigError::Validation(format!(
                "Feed '{}' per-page must be >= 1",
                entry.url
            )));
        }

        if matches!(&entry.user_agent, Some(ua) if ua.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "Feed '{}' user-agent cannot be blank",
                entry.url
            )));
        }
    }

    Ok(())
}

fn validate_source_url(kind: &str, raw: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} URL '{}': {}", kind, raw, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::Validation(format!(
            "{} URL '{}' must use http or https",
            kind, raw
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    // Basic email format check: must contain @ and have text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    // Domain part should contain at least one dot
    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
