//! Running the pipeline on a background worker thread.
//!
//! The interface thread stays responsive by never touching the network or
//! the disk itself. [`spawn`] starts one pipeline run on a dedicated
//! thread that owns its own Tokio runtime; everything the interface needs
//! to show arrives as [`PipelineEvent`]s over the handle's channel, and
//! the file-selection request carries its own reply channel back.

use std::sync::mpsc;
use std::thread;

use crate::config::Config;
use crate::event::{ChannelSelector, ChannelSink, EventSink, PipelineEvent, RunOutcome, Severity};
use crate::pipeline::Pipeline;

/// Handle to a pipeline run executing on its own thread.
pub struct WorkerHandle {
    events: mpsc::Receiver<PipelineEvent>,
    join: thread::JoinHandle<()>,
}

impl WorkerHandle {
    /// The event stream. Ends after a [`PipelineEvent::Finished`].
    #[must_use]
    pub fn events(&self) -> &mpsc::Receiver<PipelineEvent> {
        &self.events
    }

    /// Waits for the worker thread to exit.
    pub fn join(self) {
        if self.join.join().is_err() {
            log::error!("pipeline worker thread panicked");
        }
    }
}

/// Spawns one pipeline run for `source_url` on a background thread.
///
/// The final event is always [`PipelineEvent::Finished`]; if the run died
/// on an unexpected error, it is preceded by an error log line and an
/// [`PipelineEvent::Alert`], and the outcome is [`RunOutcome::Failed`].
#[must_use]
pub fn spawn(config: Config, source_url: String) -> WorkerHandle {
    let (tx, rx) = mpsc::channel();

    let join = thread::spawn(move || run_worker(config, &source_url, &tx));

    WorkerHandle { events: rx, join }
}

fn run_worker(config: Config, source_url: &str, tx: &mpsc::Sender<PipelineEvent>) {
    let sink = ChannelSink::new(tx.clone());
    let selector = ChannelSelector::new(tx.clone());

    let outcome = match run_pipeline(config, source_url, &sink, &selector) {
        Ok(outcome) => outcome,
        Err(e) => {
            sink.log_detail(
                Severity::Error,
                "An unexpected error occurred in the worker thread",
                &e.to_string(),
            );
            sink.emit(PipelineEvent::Alert {
                title: "Worker Thread Error".to_string(),
                message: format!("An error occurred: {e}"),
            });
            RunOutcome::Failed
        }
    };

    sink.emit(PipelineEvent::Finished { outcome });
}

fn run_pipeline(
    config: Config,
    source_url: &str,
    sink: &ChannelSink,
    selector: &ChannelSelector,
) -> crate::Result<RunOutcome> {
    let pipeline = Pipeline::new(config)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(pipeline.run(source_url, sink, selector))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_source_ends_with_no_links() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new()
            .with_download_dir(dir.path())
            .with_request_timeout_secs(5);

        // Port 1 refuses connections immediately.
        let handle = spawn(config, "http://127.0.0.1:1/".to_string());

        let mut saw_scrape_failure = false;
        let mut outcome = None;
        for event in handle.events().iter() {
            match event {
                PipelineEvent::Log(line)
                    if line.message == "Failed to retrieve webpage for scraping" =>
                {
                    saw_scrape_failure = true;
                }
                PipelineEvent::Finished { outcome: o } => {
                    outcome = Some(o);
                    break;
                }
                _ => {}
            }
        }

        assert!(saw_scrape_failure);
        assert_eq!(outcome, Some(RunOutcome::NoLinksFound));
        handle.join();
    }
}
