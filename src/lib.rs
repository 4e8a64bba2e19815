//! fastget - A library for scraping file links off a page and downloading
//! them with resumable session state.
//!
//! The pipeline runs in three phases: scrape the source page for matching
//! links, resolve each link to a direct download URL, then download the
//! files the user picked. The pending links are persisted next to the
//! downloads, so an interrupted batch resumes where it stopped. The core
//! is interface-agnostic: it reports everything through [`PipelineEvent`]s
//! and asks for choices through a [`FileSelector`].
//!
//! # Example
//!
//! ```no_run
//! use fastget::{Config, Pipeline, NullSink, SelectAll};
//!
//! # async fn example() -> fastget::Result<()> {
//! // Configure where downloads and session state go
//! let config = Config::new().with_download_dir("downloads");
//!
//! // Run one pass: scrape, resolve, download everything found
//! let pipeline = Pipeline::new(config)?;
//! let outcome = pipeline
//!     .run("https://example.com/release-page", &NullSink, &SelectAll)
//!     .await?;
//! println!("run finished: {outcome:?}");
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod event;
pub mod filename;
pub mod format;
pub mod http;
pub mod pipeline;
pub mod resolve;
pub mod scrape;
pub mod state;
pub mod worker;

// Re-export main types for convenience
pub use config::Config;
pub use download::DownloadedFile;
pub use error::{Error, ResolveError, Result};
pub use event::{
    ChannelSelector, ChannelSink, EventSink, FileCandidate, FileSelector, LogLine, NullSink,
    PipelineEvent, RunOutcome, SelectAll, Severity,
};
pub use pipeline::Pipeline;
pub use resolve::DiscoveredFile;
pub use scrape::ScrapedLinks;
pub use state::SessionStore;
pub use worker::WorkerHandle;
