//! Structural parsing of sitemap documents
//!
//! A payload is parsed as a `<sitemapindex>` and as a `<urlset>` independently;
//! each parse checks the root element and then deserializes the children.

use crate::storage::UrlRecord;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;

/// One `<sitemap>` child of a sitemap index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub loc: String,
    pub last_mod: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SitemapIndexXml {
    #[serde(rename = "sitemap", default)]
    sitemaps: Vec<SitemapXml>,
}

#[derive(Debug, Deserialize)]
struct SitemapXml {
    #[serde(default)]
    loc: Option<String>,
    #[serde(default)]
    lastmod: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UrlSetXml {
    #[serde(rename = "url", default)]
    urls: Vec<UrlXml>,
}

#[derive(Debug, Deserialize)]
struct UrlXml {
    #[serde(default)]
    loc: Option<String>,
    #[serde(default)]
    lastmod: Option<String>,
    #[serde(default)]
    changefreq: Option<String>,
    #[serde(default)]
    priority: Option<String>,
}

/// Parses `xml` as a `<sitemapindex>` document
pub fn parse_index(xml: &str) -> Result<Vec<IndexEntry>, String> {
    let xml = strip_bom(xml);
    expect_root(xml, "sitemapindex")?;

    let index: SitemapIndexXml = quick_xml::de::from_str(xml).map_err(|e| e.to_string())?;

    Ok(index
        .sitemaps
        .into_iter()
        .filter_map(|s| {
            let loc = non_empty(s.loc)?;
            Some(IndexEntry {
                loc,
                last_mod: s.lastmod.as_deref().and_then(normalize_last_mod),
            })
        })
        .collect())
}

/// Parses `xml` as a `<urlset>` document, tagging each record with `sitemap_url`
pub fn parse_urlset(xml: &str, sitemap_url: &str) -> Result<Vec<UrlRecord>, String> {
    let xml = strip_bom(xml);
    expect_root(xml, "urlset")?;

    let set: UrlSetXml = quick_xml::de::from_str(xml).map_err(|e| e.to_string())?;

    let mut records = Vec::with_capacity(set.urls.len());
    for url in set.urls {
        let Some(loc) = non_empty(url.loc) else {
            tracing::debug!(sitemap_url, "Skipping <url> without <loc>");
            continue;
        };

        records.push(UrlRecord {
            loc,
            sitemap_url: sitemap_url.to_string(),
            last_mod: url.lastmod.as_deref().and_then(normalize_last_mod),
            change_freq: non_empty(url.changefreq),
            priority: url.priority.and_then(|p| p.trim().parse::<f32>().ok()),
        });
    }

    Ok(records)
}

/// Normalizes a source-declared change marker
///
/// RFC 3339 / W3C datetimes become RFC 3339 UTC with second precision, bare
/// dates become midnight UTC, blank values become `None`, and anything else
/// is kept verbatim as an opaque token.
pub fn normalize_last_mod(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(format_utc(dt.with_timezone(&Utc)));
    }

    // W3C datetime without seconds
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%:z") {
        return Some(format_utc(dt.with_timezone(&Utc)));
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Some(format_utc(midnight.and_utc()));
        }
    }

    Some(raw.to_string())
}

fn format_utc(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, false)
}

fn strip_bom(xml: &str) -> &str {
    xml.trim_start_matches('\u{feff}')
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Checks the local name of the document's root element
fn expect_root(xml: &str, expected: &str) -> Result<(), String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let name = e.local_name();
                let name = String::from_utf8_lossy(name.as_ref());
                return if name == expected {
                    Ok(())
                } else {
                    Err(format!("expected <{}> root, found <{}>", expected, name))
                };
            }
            Ok(Event::Eof) => return Err("document has no root element".to_string()),
            Err(e) => return Err(e.to_string()),
            _ => {}
        }
    }
}
