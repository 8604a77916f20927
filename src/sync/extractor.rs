//! HTML field extraction
//!
//! This module turns a fetched page into a candidate `ContentRecord`:
//! - Title and summary are taken as trimmed text
//! - Content is taken as trimmed inner HTML
//! - A `<meta>` match contributes its `content` attribute instead
//! - The raw page is kept as the record body

use crate::config::ExtractConfig;
use crate::storage::ContentRecord;
use crate::{ConfigError, MirrorError};
use scraper::{ElementRef, Html, Selector};

/// Produces a content record from a page's HTML
pub trait ContentExtractor: Send + Sync {
    /// Extracts the fields of `url` from `html`
    ///
    /// A field that cannot be found is left `None`; only a page that cannot
    /// be used at all is an error.
    fn extract(&self, url: &str, html: &str) -> Result<ContentRecord, MirrorError>;
}

/// How a matched element is turned into a field value
#[derive(Debug, Clone, Copy)]
enum Capture {
    Text,
    InnerHtml,
}

/// CSS-selector driven extractor
///
/// Each field has an ordered list of selectors; the first one that yields a
/// non-empty value wins.
#[derive(Debug)]
pub struct HtmlExtractor {
    title: Vec<Selector>,
    content: Vec<Selector>,
    summary: Vec<Selector>,
}

impl HtmlExtractor {
    /// Compiles the selector lists of `config`
    ///
    /// # Returns
    ///
    /// * `Ok(HtmlExtractor)` - Every selector compiled
    /// * `Err(ConfigError::InvalidSelector)` - A selector is not valid CSS
    pub fn new(config: &ExtractConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            title: compile(&config.title)?,
            content: compile(&config.content)?,
            summary: compile(&config.summary)?,
        })
    }
}

impl Default for HtmlExtractor {
    fn default() -> Self {
        // the built-in selector lists are known to compile
        Self::new(&ExtractConfig::default()).unwrap_or(Self {
            title: Vec::new(),
            content: Vec::new(),
            summary: Vec::new(),
        })
    }
}

fn compile(selectors: &[String]) -> Result<Vec<Selector>, ConfigError> {
    selectors
        .iter()
        .map(|s| {
            Selector::parse(s)
                .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", s, e)))
        })
        .collect()
}

impl ContentExtractor for HtmlExtractor {
    fn extract(&self, url: &str, html: &str) -> Result<ContentRecord, MirrorError> {
        if html.trim().is_empty() {
            return Err(MirrorError::Extract {
                url: url.to_string(),
                message: "empty document".to_string(),
            });
        }

        let document = Html::parse_document(html);

        let mut record = ContentRecord::new(url);
        record.title = first_match(&document, &self.title, Capture::Text);
        record.content = first_match(&document, &self.content, Capture::InnerHtml);
        record.summary = first_match(&document, &self.summary, Capture::Text);
        record.body = Some(html.to_string());

        for (field, value, wanted) in [
            ("title", &record.title, !self.title.is_empty()),
            ("content", &record.content, !self.content.is_empty()),
            ("summary", &record.summary, !self.summary.is_empty()),
        ] {
            if wanted && value.is_none() {
                tracing::warn!(url, field, "Field not found on page");
            }
        }

        Ok(record)
    }
}

fn first_match(document: &Html, selectors: &[Selector], capture: Capture) -> Option<String> {
    selectors.iter().find_map(|selector| {
        document
            .select(selector)
            .find_map(|element| capture_value(element, capture))
    })
}

fn capture_value(element: ElementRef<'_>, capture: Capture) -> Option<String> {
    let raw = if element.value().name() == "meta" {
        element.value().attr("content")?.to_string()
    } else {
        match capture {
            Capture::Text => element.text().collect::<String>(),
            Capture::InnerHtml => element.inner_html(),
        }
    };

    let value = raw.trim();
    (!value.is_empty()).then(|| value.to_string())
}
