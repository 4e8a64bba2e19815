//! Scraping matching links off the source page.

use std::collections::HashSet;

use scraper::{Html, Selector};

use crate::http;

/// Links scraped from one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedLinks {
    /// Matching links in first-seen order, duplicates removed.
    pub links: Vec<String>,
    /// How many duplicate anchors were dropped.
    pub duplicates_removed: usize,
}

/// Fetches `source_url` and extracts every matching link from it.
///
/// # Errors
///
/// Returns an error if the page cannot be fetched or answers with a
/// non-success status. Callers treat this as "no links", not as a fatal
/// condition.
pub async fn scrape_links(
    client: &reqwest::Client,
    source_url: &str,
    prefix: &str,
) -> crate::Result<ScrapedLinks> {
    let response = http::get_checked(client, source_url).await?;
    let body = response.text().await?;
    Ok(extract_links(&body, prefix))
}

/// Collects the href of every anchor starting with `prefix`.
///
/// The prefix match is case-sensitive. Duplicates keep their first
/// position; later occurrences are dropped and counted.
#[must_use]
pub fn extract_links(html: &str, prefix: &str) -> ScrapedLinks {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").expect("valid selector");

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    let mut duplicates_removed = 0;

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if !href.starts_with(prefix) {
            continue;
        }
        if seen.insert(href.to_string()) {
            links.push(href.to_string());
        } else {
            duplicates_removed += 1;
        }
    }

    ScrapedLinks {
        links,
        duplicates_removed,
    }
}
