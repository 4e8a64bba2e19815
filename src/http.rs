//! Shared HTTP client setup.
//!
//! Every request carries a fixed browser-like header set; the target hosts
//! answer bot-looking clients with 403s. The values are part of the scraping
//! contract and change together with the sites they imitate.

use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue, REFERER, USER_AGENT};

const ACCEPT_VALUE: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.5";
const REFERER_VALUE: &str = "https://fitgirl-repacks.site/";
const SEC_CH_UA_VALUE: &str = "\"Brave\";v=\"131\", \"Chromium\";v=\"131\", \"Not_A Brand\";v=\"24\"";
const SEC_CH_UA_MOBILE_VALUE: &str = "?0";
const SEC_CH_UA_PLATFORM_VALUE: &str = "\"Windows\"";
const USER_AGENT_VALUE: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Returns the browser-imitating header set sent with every request.
#[must_use]
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));
    headers.insert(REFERER, HeaderValue::from_static(REFERER_VALUE));
    headers.insert(
        HeaderName::from_static("sec-ch-ua"),
        HeaderValue::from_static(SEC_CH_UA_VALUE),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua-mobile"),
        HeaderValue::from_static(SEC_CH_UA_MOBILE_VALUE),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua-platform"),
        HeaderValue::from_static(SEC_CH_UA_PLATFORM_VALUE),
    );
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
    headers
}

/// Builds the HTTP client shared by the scrape, resolve, and download phases.
///
/// `timeout` bounds connection setup and socket inactivity, not whole
/// transfers; large downloads take as long as they take.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn build_client(timeout: Duration) -> crate::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .default_headers(default_headers())
        .connect_timeout(timeout)
        .read_timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(60))
        .pool_max_idle_per_host(8)
        .tcp_keepalive(Duration::from_secs(30))
        .build()?;
    Ok(client)
}

/// Sends a GET request and checks the status code.
///
/// # Errors
///
/// Returns [`Error::Http`](crate::Error::Http) on transport failure and
/// [`Error::Status`](crate::Error::Status) on a non-success response.
pub async fn get_checked(client: &reqwest::Client, url: &str) -> crate::Result<reqwest::Response> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(crate::Error::Status {
            status,
            url: url.to_string(),
        });
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_cover_browser_profile() {
        let headers = default_headers();
        assert_eq!(headers.get(USER_AGENT).unwrap(), USER_AGENT_VALUE);
        assert_eq!(headers.get(REFERER).unwrap(), REFERER_VALUE);
        assert_eq!(headers.get("sec-ch-ua-platform").unwrap(), "\"Windows\"");
        assert_eq!(headers.len(), 7);
    }

    #[test]
    fn client_builds() {
        assert!(build_client(Duration::from_secs(5)).is_ok());
    }
}
