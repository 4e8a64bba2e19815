//! The scrape, resolve, download pipeline.
//!
//! [`Pipeline::run`] drives one complete pass for a source URL: load or
//! scrape the pending-link list, resolve each link to a file, let the user
//! pick, download the picks. The pending list is persisted through a
//! [`SessionStore`] and shrinks after every successful download, so an
//! interrupted run picks up where it left off.

use std::time::Duration;

use crate::config::Config;
use crate::download;
use crate::error::ResolveError;
use crate::event::{EventSink, FileCandidate, FileSelector, RunOutcome, Severity};
use crate::http;
use crate::resolve::{self, DiscoveredFile};
use crate::scrape;
use crate::state::SessionStore;

/// Runs the discovery and download pipeline for one source URL at a time.
pub struct Pipeline {
    config: Config,
    client: reqwest::Client,
}

impl Pipeline {
    /// Creates a pipeline with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: Config) -> crate::Result<Self> {
        let client = http::build_client(Duration::from_secs(config.request_timeout_secs))?;
        Ok(Self { config, client })
    }

    /// The configuration this pipeline runs with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs one complete pass for `source_url`.
    ///
    /// Phase errors (a page that will not fetch, a link that will not
    /// resolve, a file that will not download) are reported through `sink`
    /// and absorbed; the run carries on with the remaining work.
    ///
    /// # Errors
    ///
    /// Only unexpected failures surface here, such as the session file
    /// refusing to be deleted. Callers report them as fatal and return the
    /// interface to idle.
    pub async fn run(
        &self,
        source_url: &str,
        sink: &dyn EventSink,
        selector: &dyn FileSelector,
    ) -> crate::Result<RunOutcome> {
        let store = SessionStore::for_url(&self.config.download_dir, source_url);
        let state_name = state_file_name(&store);

        let mut pending = self.load_session(&store, &state_name, sink);

        if pending.is_empty() {
            sink.log_detail(
                Severity::Info,
                "No previous session found. Starting fresh scrape...",
                source_url,
            );
            pending = self.scrape_phase(source_url, sink).await;
            if pending.is_empty() {
                sink.log(Severity::Warning, "No matching links found to process.");
                return Ok(RunOutcome::NoLinksFound);
            }
            sink.log_detail(
                Severity::Info,
                &format!("Scrape complete. Found {} links.", pending.len()),
                "Saving state...",
            );
            self.save_pending(&store, &pending, sink);
        }

        let discovered = self.discover_phase(&pending, sink).await;

        if discovered.is_empty() {
            sink.log(Severity::Error, "Discovery finished, but no valid files were found.");
            store.delete()?;
            sink.log(Severity::Warning, "Removed state file due to discovery failure.");
            return Ok(RunOutcome::NothingResolved);
        }

        sink.log_detail(
            Severity::Done,
            &format!("Discovery complete. Found {} valid files.", discovered.len()),
            "Waiting for user selection...",
        );

        let candidates: Vec<FileCandidate> = discovered
            .iter()
            .map(|file| FileCandidate {
                name: file.name.clone(),
                url: file.url.clone(),
            })
            .collect();
        let selected = selector.select(&candidates);

        if selected.is_empty() {
            sink.log_detail(
                Severity::Warning,
                "Download cancelled by user.",
                "State file with remaining links is preserved.",
            );
            return Ok(RunOutcome::Cancelled);
        }

        sink.log(
            Severity::Info,
            &format!(
                "User selected {} of {} files to download.",
                selected.len(),
                discovered.len(),
            ),
        );

        let (downloaded, failed, bytes) = self
            .download_phase(&selected, &discovered, &store, &state_name, &mut pending, sink)
            .await;

        sink.log(Severity::Done, "Processing complete for selected files.");

        if pending.is_empty() {
            sink.log_detail(Severity::Done, "All links in session processed.", "Removing session file.");
            if let Err(e) = store.delete() {
                sink.log_detail(Severity::Warning, "Could not remove session file.", &e.to_string());
            }
        } else {
            sink.log_detail(
                Severity::Info,
                &format!("{} links remain in session file for next time.", pending.len()),
                &state_name,
            );
        }

        Ok(RunOutcome::Completed {
            downloaded,
            failed,
            remaining: pending.len(),
            bytes,
        })
    }

    /// Reads the session file if one exists. Empty and unreadable files
    /// both come back as an empty list, which makes the caller re-scrape.
    fn load_session(&self, store: &SessionStore, state_name: &str, sink: &dyn EventSink) -> Vec<String> {
        if !store.exists() {
            return Vec::new();
        }
        match store.load() {
            Ok(links) if !links.is_empty() => {
                sink.log_detail(
                    Severity::Info,
                    &format!("Resuming previous session. Found {} remaining links.", links.len()),
                    state_name,
                );
                links
            }
            Ok(_) => {
                sink.log_detail(
                    Severity::Warning,
                    "State file was empty. Starting fresh scrape.",
                    state_name,
                );
                Vec::new()
            }
            Err(e) => {
                sink.log_detail(
                    Severity::Error,
                    &format!("Error reading state file '{state_name}'. Starting fresh scrape."),
                    &e.to_string(),
                );
                Vec::new()
            }
        }
    }

    /// Scrapes the source page. Fetch failures are logged and come back as
    /// an empty list; scraping never kills the run.
    async fn scrape_phase(&self, source_url: &str, sink: &dyn EventSink) -> Vec<String> {
        sink.log_detail(Severity::Info, "Scraping URL for links", source_url);

        let scraped =
            match scrape::scrape_links(&self.client, source_url, &self.config.link_prefix).await {
                Ok(scraped) => scraped,
                Err(e) => {
                    sink.log_detail(
                        Severity::Error,
                        "Failed to retrieve webpage for scraping",
                        &e.to_string(),
                    );
                    return Vec::new();
                }
            };

        if scraped.links.is_empty() {
            sink.log_detail(
                Severity::Warning,
                "No matching links found on the page with prefix",
                &self.config.link_prefix,
            );
        } else {
            let found = scraped.links.len() + scraped.duplicates_removed;
            sink.log(Severity::Success, &format!("Found {found} matching links"));
            if scraped.duplicates_removed > 0 {
                sink.log(
                    Severity::Info,
                    &format!("Removed {} duplicate links.", scraped.duplicates_removed),
                );
            }
        }

        scraped.links
    }

    /// Resolves every pending link, keeping the ones that yield a file.
    async fn discover_phase(&self, pending: &[String], sink: &dyn EventSink) -> Vec<DiscoveredFile> {
        sink.log(
            Severity::Info,
            &format!("Discovering file details for {} links...", pending.len()),
        );

        let mut discovered = Vec::new();
        for (i, link) in pending.iter().enumerate() {
            sink.log_detail(
                Severity::Info,
                &format!("Discovering file {}/{}...", i + 1, pending.len()),
                &preview(link),
            );
            match resolve::resolve_file(&self.client, link, i, sink).await {
                Ok(file) => discovered.push(file),
                Err(ResolveError::Fetch(crate::Error::Status { status, url })) => {
                    sink.log_detail(
                        Severity::Error,
                        "Failed To Fetch Page",
                        &format!("Status: {} for {url}", status.as_u16()),
                    );
                }
                Err(ResolveError::NoDownloadUrl) => {
                    sink.log_detail(
                        Severity::Error,
                        "No Download URL Found in download function for",
                        link,
                    );
                }
                Err(ResolveError::NoDownloadFunction) => {
                    sink.log_detail(Severity::Error, "Download Function Not Found on page", link);
                }
                Err(ResolveError::Fetch(e)) => {
                    sink.log_detail(
                        Severity::Error,
                        &format!("Error discovering link {link}"),
                        &e.to_string(),
                    );
                }
            }
        }
        discovered
    }

    /// Downloads the selected files, trimming the pending list and
    /// rewriting the session file after each success.
    async fn download_phase(
        &self,
        selected: &[usize],
        discovered: &[DiscoveredFile],
        store: &SessionStore,
        state_name: &str,
        pending: &mut Vec<String>,
        sink: &dyn EventSink,
    ) -> (usize, usize, u64) {
        let mut downloaded = 0;
        let mut failed = 0;
        let mut bytes: u64 = 0;

        for (i, &index) in selected.iter().enumerate() {
            let Some(file) = discovered.get(index) else {
                sink.log(Severity::Warning, &format!("Ignoring unknown selection index {index}."));
                continue;
            };

            sink.log_detail(
                Severity::Info,
                &format!("Downloading file {}/{}...", i + 1, selected.len()),
                &file.name,
            );

            let result = download::download_file(
                &self.client,
                &file.url,
                &self.config.download_dir,
                &file.name,
                sink,
            )
            .await;

            match result {
                Ok(done) => {
                    downloaded += 1;
                    bytes += done.bytes;
                    sink.log_detail(
                        Severity::Info,
                        "Updating session file (removing downloaded link)...",
                        state_name,
                    );
                    if let Some(pos) = pending.iter().position(|link| *link == file.page_link) {
                        pending.remove(pos);
                        self.save_pending(store, pending, sink);
                    } else {
                        sink.log_detail(
                            Severity::Warning,
                            "Link not in state list (already processed?)",
                            &file.page_link,
                        );
                    }
                }
                Err(_) => {
                    // download_file already reported the failure.
                    failed += 1;
                }
            }
        }

        (downloaded, failed, bytes)
    }

    /// Persists the pending list. A failed save is reported but does not
    /// stop the run; the worst case is re-downloading a file next time.
    fn save_pending(&self, store: &SessionStore, pending: &[String], sink: &dyn EventSink) {
        if let Err(e) = store.save(pending) {
            sink.log_detail(
                Severity::Error,
                "Failed to save state file!",
                &format!("{}: {e}", state_file_name(store)),
            );
        }
    }
}

fn state_file_name(store: &SessionStore) -> String {
    store
        .path()
        .file_name()
        .map_or_else(String::new, |name| name.to_string_lossy().into_owned())
}

/// First 50 characters of a link, for compact log lines.
fn preview(link: &str) -> String {
    let head: String = link.chars().take(50).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_long_links() {
        let link = "https://files.example/".to_string() + &"x".repeat(100);
        let p = preview(&link);
        assert_eq!(p.chars().count(), 53);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn preview_keeps_short_links_with_marker() {
        assert_eq!(preview("https://a/b"), "https://a/b...");
    }

    #[test]
    fn state_file_name_is_the_basename() {
        let store = SessionStore::for_url(std::path::Path::new("/dl"), "https://example.com/page");
        let name = state_file_name(&store);
        assert!(name.starts_with(".download_state_"));
        assert!(name.ends_with(".json"));
    }
}
