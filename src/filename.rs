//! Deriving safe output file names.
//!
//! The final name for a download comes from, in order: the
//! `content-disposition` header, the last URL path segment, the display
//! name resolved from the page. Whatever wins is sanitized for the
//! filesystem.

use std::sync::LazyLock;

use regex::Regex;

static CONTENT_DISPOSITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"filename="?([^"]+)"?"#).expect("valid regex"));

/// Replaces characters that are invalid in file names with underscores.
#[must_use]
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c => c,
        })
        .collect()
}

/// Extracts the file name from a `content-disposition` header value.
#[must_use]
pub fn from_content_disposition(header: &str) -> Option<String> {
    CONTENT_DISPOSITION_RE
        .captures(header)
        .map(|caps| caps[1].to_string())
}

/// Extracts the trailing path segment of a URL, ignoring query and fragment.
#[must_use]
pub fn from_url(url: &str) -> Option<String> {
    let path = match url.find(['?', '#']) {
        Some(i) => &url[..i],
        None => url,
    };
    let segment = match path.rfind('/') {
        Some(i) => &path[i + 1..],
        None => path,
    };
    (!segment.is_empty()).then(|| segment.to_string())
}

/// Picks the output file name for a download.
///
/// Returns the sanitized name and whether the `_download` fallback had to
/// be used (callers log a warning in that case). A name that sanitizes to
/// nothing, or to something ending in a dot, is unusable on common
/// filesystems.
#[must_use]
pub fn resolve_output_name(
    content_disposition: Option<&str>,
    url: &str,
    label: &str,
) -> (String, bool) {
    let raw = content_disposition
        .and_then(from_content_disposition)
        .or_else(|| from_url(url))
        .unwrap_or_else(|| label.to_string());

    let name = sanitize(&raw);
    if name.is_empty() || name.ends_with('.') {
        (format!("{}_download", sanitize(label)), true)
    } else {
        (name, false)
    }
}
