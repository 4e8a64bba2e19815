//! Progress bar and summary reporting for CLI downloads.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::event::FileCandidate;
use crate::format::{format_bytes, format_duration};

const SEPARATOR: &str = "────────────────────────────────────────────────────────────";

/// Creates a progress bar for a single file transfer.
///
/// A `size` of 0 means the server did not report a length; the bar then
/// shows received bytes and throughput without a completion fraction.
pub fn make_transfer_bar(size: u64, name: &str) -> ProgressBar {
    let bar = if size > 0 {
        let bar = ProgressBar::new(size);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} [{bar:40.cyan/blue}] {bytes}/{total_bytes} @ {bytes_per_sec} - {msg}",
            )
            .expect("progress template is valid")
            .progress_chars("━━╌"),
        );
        bar
    } else {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {bytes} @ {bytes_per_sec} - {msg}")
                .expect("progress template is valid"),
        );
        bar
    };
    bar.set_message(name.to_string());
    bar
}

/// Prints the numbered list of resolved files offered for download.
pub fn print_file_list(candidates: &[FileCandidate]) {
    println!("\n{SEPARATOR}");
    println!("Files ready to download:");
    println!("{SEPARATOR}");

    for (i, candidate) in candidates.iter().enumerate() {
        println!("  {:>3}. {}", i + 1, candidate.name);
    }

    println!("{SEPARATOR}");
    println!("  {} file(s)", candidates.len());
    println!("{SEPARATOR}\n");
}

/// Prints a summary of the finished download phase.
pub fn print_summary(
    downloaded: usize,
    failed: usize,
    remaining: usize,
    bytes: u64,
    elapsed: Duration,
) {
    if downloaded == 0 && failed == 0 {
        return;
    }

    println!("\n{SEPARATOR}");
    println!("Download Summary");
    println!("{SEPARATOR}");

    println!("  Files downloaded:  {downloaded}");
    if downloaded > 0 {
        println!("  Total size:        {}", format_bytes(bytes));
    }
    println!("  Total time:        {}", format_duration(elapsed));
    if failed > 0 {
        println!("  Files failed:      {failed}");
    }
    if remaining > 0 {
        println!("  Links remaining:   {remaining}");
    }

    println!("{SEPARATOR}");
}
