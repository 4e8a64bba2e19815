//! Resolving pending page links into downloadable files.
//!
//! Each intermediary page names its file in a `meta[name="title"]` tag and
//! hides the direct URL inside an inline `function download` script that
//! calls `window.open`. Resolution fetches the page and pulls both out.

use std::sync::LazyLock;

use chrono::Local;
use regex::Regex;
use scraper::{Html, Selector};

use crate::error::ResolveError;
use crate::event::{EventSink, Severity};
use crate::filename;
use crate::http;

static WINDOW_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"window\.open\(["'](https?://[^\s"')]+)"#).expect("valid regex"));

/// A pending link resolved to a downloadable file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Display name, sanitized for the filesystem.
    pub name: String,
    /// Direct download URL.
    pub url: String,
    /// The page link this file came from. Keys the pending-link list when
    /// the download later succeeds.
    pub page_link: String,
}

/// Resolves one pending link into a [`DiscoveredFile`].
///
/// `index` is the link's position in the pending list and only feeds the
/// synthesized name used when the page carries no title.
///
/// # Errors
///
/// Returns a [`ResolveError`] describing why this link yielded no file.
/// Failures are per-link; callers log them and continue with the rest.
pub async fn resolve_file(
    client: &reqwest::Client,
    page_link: &str,
    index: usize,
    sink: &dyn EventSink,
) -> Result<DiscoveredFile, ResolveError> {
    let response = http::get_checked(client, page_link).await?;
    let body = response.text().await.map_err(crate::Error::from)?;

    let name = match page_title(&body) {
        Some(title) => filename::sanitize(&title),
        None => {
            let fallback = fallback_name(index);
            sink.log_detail(
                Severity::Warning,
                "Could not find meta title, using default filename",
                &fallback,
            );
            fallback
        }
    };

    let url = find_download_url(&body)?;
    Ok(DiscoveredFile {
        name,
        url,
        page_link: page_link.to_string(),
    })
}

/// Reads the display name from the page's `meta[name="title"]` tag.
#[must_use]
pub fn page_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"meta[name="title"]"#).expect("valid selector");
    document
        .select(&selector)
        .find_map(|element| element.value().attr("content"))
        .filter(|content| !content.is_empty())
        .map(str::to_string)
}

/// Extracts the direct download URL from the page's scripts.
///
/// Only the first script containing `function download` is considered;
/// within it, the first `window.open` call with a quoted http(s) argument
/// wins.
///
/// # Errors
///
/// [`ResolveError::NoDownloadFunction`] when no script carries the marker,
/// [`ResolveError::NoDownloadUrl`] when the marked script has no usable URL.
pub fn find_download_url(html: &str) -> Result<String, ResolveError> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script").expect("valid selector");

    let script = document
        .select(&selector)
        .map(|element| element.text().collect::<String>())
        .find(|body| body.contains("function download"))
        .ok_or(ResolveError::NoDownloadFunction)?;

    let captures = WINDOW_OPEN_RE
        .captures(&script)
        .ok_or(ResolveError::NoDownloadUrl)?;
    Ok(captures[1].to_string())
}

fn fallback_name(index: usize) -> String {
    format!("download_{}_{index}", Local::now().format("%Y%m%d%H%M%S"))
}
