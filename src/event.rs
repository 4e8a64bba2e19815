//! Events and traits forming the boundary between the pipeline and an
//! interface.
//!
//! The pipeline knows nothing about how it is presented. It emits
//! [`PipelineEvent`]s through an [`EventSink`] and asks for file choices
//! through a [`FileSelector`]; a frontend supplies both. Channel-backed
//! implementations are provided for running the pipeline on a worker
//! thread.

use std::fmt;
use std::sync::mpsc;

use chrono::{DateTime, Local};

/// Severity of a log line, used by frontends for coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Routine progress information.
    Info,
    /// A step finished successfully.
    Success,
    /// Something unexpected that did not stop the run.
    Warning,
    /// A failure; the run may still continue with remaining work.
    Error,
    /// A phase or the whole run completed.
    Done,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Done => "done",
        };
        write!(f, "{label}")
    }
}

/// One timestamped entry for an append-only log view.
#[derive(Debug, Clone)]
pub struct LogLine {
    /// Wall-clock time the line was emitted.
    pub at: DateTime<Local>,
    /// Primary message.
    pub message: String,
    /// Optional second part, highlighted by frontends.
    pub detail: Option<String>,
    /// Severity tag.
    pub severity: Severity,
}

impl LogLine {
    /// Creates a line stamped with the current local time.
    #[must_use]
    pub fn new(severity: Severity, message: &str, detail: Option<&str>) -> Self {
        Self {
            at: Local::now(),
            message: message.to_string(),
            detail: detail.map(str::to_string),
            severity,
        }
    }

    /// Formats the timestamp the way log views display it.
    #[must_use]
    pub fn timestamp(&self) -> String {
        self.at.format("%H:%M:%S").to_string()
    }
}

/// A resolved file offered to the user for selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    /// Display name.
    pub name: String,
    /// Direct download URL.
    pub url: String,
}

/// How a pipeline run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The page yielded no matching links.
    NoLinksFound,
    /// No pending link could be resolved; session state was cleared.
    NothingResolved,
    /// The user declined the selection; session state was preserved.
    Cancelled,
    /// The download phase ran to the end.
    Completed {
        /// Files downloaded successfully.
        downloaded: usize,
        /// Files that failed to download.
        failed: usize,
        /// Links still pending after the run.
        remaining: usize,
        /// Bytes written across all successful downloads.
        bytes: u64,
    },
    /// An unexpected error ended the run early.
    Failed,
}

/// Everything the pipeline tells an interface.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// Append a line to the log view.
    Log(LogLine),
    /// Update the transfer indicator. `total_bytes == 0` means the size
    /// is unknown and the indicator should show activity only.
    Progress {
        /// Bytes received so far for the current file.
        bytes_so_far: u64,
        /// Expected size, or 0 when the server did not say.
        total_bytes: u64,
        /// Name of the file being transferred.
        label: String,
    },
    /// Reset the transfer indicator to idle.
    ProgressClear,
    /// Ask the user which files to download. The answer is a list of
    /// indices into `candidates` sent over `reply`; an empty list (or a
    /// dropped sender) cancels the download phase.
    SelectFiles {
        /// Files available for download.
        candidates: Vec<FileCandidate>,
        /// One-shot reply channel.
        reply: mpsc::Sender<Vec<usize>>,
    },
    /// Show a blocking error dialog.
    Alert {
        /// Dialog title.
        title: String,
        /// Dialog body.
        message: String,
    },
    /// The run ended; no further events follow.
    Finished {
        /// Final result of the run.
        outcome: RunOutcome,
    },
}

/// Receives pipeline events.
///
/// All methods other than [`emit`](Self::emit) are conveniences that wrap
/// the event construction; implementors only provide `emit`.
pub trait EventSink: Send + Sync {
    /// Delivers one event.
    fn emit(&self, event: PipelineEvent);

    /// Emits a log line.
    fn log(&self, severity: Severity, message: &str) {
        self.emit(PipelineEvent::Log(LogLine::new(severity, message, None)));
    }

    /// Emits a log line with a highlighted detail part.
    fn log_detail(&self, severity: Severity, message: &str, detail: &str) {
        self.emit(PipelineEvent::Log(LogLine::new(severity, message, Some(detail))));
    }

    /// Emits a transfer progress update.
    fn progress(&self, bytes_so_far: u64, total_bytes: u64, label: &str) {
        self.emit(PipelineEvent::Progress {
            bytes_so_far,
            total_bytes,
            label: label.to_string(),
        });
    }

    /// Resets the transfer indicator.
    fn progress_clear(&self) {
        self.emit(PipelineEvent::ProgressClear);
    }
}

/// Sink that discards every event, for tests and headless use.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: PipelineEvent) {}
}

/// Sink that forwards events over a channel to another thread.
///
/// A disconnected receiver drops the event; the pipeline keeps running
/// and finishes on its own.
pub struct ChannelSink {
    tx: mpsc::Sender<PipelineEvent>,
}

impl ChannelSink {
    /// Wraps a channel sender.
    #[must_use]
    pub const fn new(tx: mpsc::Sender<PipelineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: PipelineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Answers the pipeline's file-selection request.
///
/// The call blocks the pipeline until a choice is made. The returned
/// indices refer to positions in `candidates`; an empty list cancels the
/// download phase and leaves session state untouched.
pub trait FileSelector: Send + Sync {
    /// Picks which of `candidates` to download.
    fn select(&self, candidates: &[FileCandidate]) -> Vec<usize>;
}

/// Selector that picks every candidate, for non-interactive runs.
pub struct SelectAll;

impl FileSelector for SelectAll {
    fn select(&self, candidates: &[FileCandidate]) -> Vec<usize> {
        (0..candidates.len()).collect()
    }
}

/// Selector that asks the interface thread over the event channel and
/// blocks until it answers.
pub struct ChannelSelector {
    events: mpsc::Sender<PipelineEvent>,
}

impl ChannelSelector {
    /// Wraps the event channel sender shared with a [`ChannelSink`].
    #[must_use]
    pub const fn new(events: mpsc::Sender<PipelineEvent>) -> Self {
        Self { events }
    }
}

impl FileSelector for ChannelSelector {
    fn select(&self, candidates: &[FileCandidate]) -> Vec<usize> {
        let (reply_tx, reply_rx) = mpsc::channel();
        let request = PipelineEvent::SelectFiles {
            candidates: candidates.to_vec(),
            reply: reply_tx,
        };
        if self.events.send(request).is_err() {
            // Interface is gone; treat as cancellation.
            return Vec::new();
        }
        reply_rx.recv().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<FileCandidate> {
        vec![
            FileCandidate {
                name: "a.bin".to_string(),
                url: "https://host/a".to_string(),
            },
            FileCandidate {
                name: "b.bin".to_string(),
                url: "https://host/b".to_string(),
            },
            FileCandidate {
                name: "c.bin".to_string(),
                url: "https://host/c".to_string(),
            },
        ]
    }

    #[test]
    fn select_all_returns_every_index() {
        assert_eq!(SelectAll.select(&candidates()), vec![0, 1, 2]);
    }

    #[test]
    fn channel_sink_forwards_log_lines() {
        let (tx, rx) = mpsc::channel();
        let sink = ChannelSink::new(tx);
        sink.log_detail(Severity::Success, "saved", "file.bin");

        match rx.recv().unwrap() {
            PipelineEvent::Log(line) => {
                assert_eq!(line.message, "saved");
                assert_eq!(line.detail.as_deref(), Some("file.bin"));
                assert_eq!(line.severity, Severity::Success);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn channel_selector_round_trip() {
        let (tx, rx) = mpsc::channel();
        let selector = ChannelSelector::new(tx);

        let answerer = std::thread::spawn(move || match rx.recv().unwrap() {
            PipelineEvent::SelectFiles { candidates, reply } => {
                assert_eq!(candidates.len(), 3);
                reply.send(vec![0, 2]).unwrap();
            }
            other => panic!("unexpected event: {other:?}"),
        });

        assert_eq!(selector.select(&candidates()), vec![0, 2]);
        answerer.join().unwrap();
    }

    #[test]
    fn dropped_reply_counts_as_cancel() {
        let (tx, rx) = mpsc::channel();
        let selector = ChannelSelector::new(tx);

        let answerer = std::thread::spawn(move || match rx.recv().unwrap() {
            PipelineEvent::SelectFiles { reply, .. } => drop(reply),
            other => panic!("unexpected event: {other:?}"),
        });

        assert!(selector.select(&candidates()).is_empty());
        answerer.join().unwrap();
    }

    #[test]
    fn disconnected_interface_counts_as_cancel() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let selector = ChannelSelector::new(tx);
        assert!(selector.select(&candidates()).is_empty());
    }

    #[test]
    fn severity_labels() {
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!(Severity::Done.to_string(), "done");
    }
}
