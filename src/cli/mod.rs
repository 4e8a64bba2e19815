//! CLI mode for fastget - terminal frontend for the download pipeline.

mod progress;

use std::io::{self, Write};
use std::time::{Duration, Instant};

use console::style;
use indicatif::ProgressBar;

use crate::config::Config;
use crate::event::{LogLine, PipelineEvent, RunOutcome, Severity};
use crate::worker;

use progress::{make_transfer_bar, print_file_list, print_summary};

/// Runs one pipeline pass for `source_url` and renders its events.
///
/// With `assume_yes` every resolved file is downloaded without asking.
/// Returns the process exit code: 0 for a clean finish, 1 when the run
/// failed or any selected file failed to download.
pub fn run(config: Config, source_url: String, assume_yes: bool) -> i32 {
    let started = Instant::now();
    print_log(None, &LogLine::new(Severity::Info, "Starting processing...", None));

    let handle = worker::spawn(config, source_url);

    let mut transfer_bar: Option<ProgressBar> = None;
    let mut code = 0;

    for event in handle.events().iter() {
        match event {
            PipelineEvent::Log(line) => print_log(transfer_bar.as_ref(), &line),
            PipelineEvent::Progress {
                bytes_so_far,
                total_bytes,
                label,
            } => {
                let bar = transfer_bar.get_or_insert_with(|| {
                    let bar = make_transfer_bar(total_bytes, &label);
                    bar.enable_steady_tick(Duration::from_millis(250));
                    bar
                });
                bar.set_position(bytes_so_far);
            }
            PipelineEvent::ProgressClear => {
                if let Some(bar) = transfer_bar.take() {
                    bar.finish_and_clear();
                }
            }
            PipelineEvent::SelectFiles { candidates, reply } => {
                print_file_list(&candidates);
                let picked = if assume_yes {
                    (0..candidates.len()).collect()
                } else {
                    prompt_selection(candidates.len())
                };
                let _ = reply.send(picked);
            }
            PipelineEvent::Alert { title, message } => {
                eprintln!("{}", style(format!("{title}: {message}")).red().bold());
            }
            PipelineEvent::Finished { outcome } => {
                if let Some(bar) = transfer_bar.take() {
                    bar.finish_and_clear();
                }
                code = print_outcome(outcome, started.elapsed());
                break;
            }
        }
    }

    handle.join();
    code
}

/// Prints one log line, routing through the bar when one is active so
/// the line lands above it instead of tearing it.
fn print_log(bar: Option<&ProgressBar>, line: &LogLine) {
    let message = match line.severity {
        Severity::Info => style(&line.message),
        Severity::Success => style(&line.message).green(),
        Severity::Warning => style(&line.message).yellow(),
        Severity::Error => style(&line.message).red(),
        Severity::Done => style(&line.message).cyan().bold(),
    };

    let rendered = match &line.detail {
        Some(detail) => format!("[{}] {} {}", line.timestamp(), message, style(detail).dim()),
        None => format!("[{}] {}", line.timestamp(), message),
    };

    match bar {
        Some(bar) => bar.println(rendered),
        None => println!("{rendered}"),
    }
}

/// Asks which of the listed files to download, looping until the answer
/// parses. EOF on stdin cancels.
fn prompt_selection(count: usize) -> Vec<usize> {
    loop {
        print!("Download which files? [all, none, or list like 1,3-5] (default all): ");
        let _ = io::stdout().flush();

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) | Err(_) => return Vec::new(),
            Ok(_) => {}
        }

        match parse_selection(&input, count) {
            Some(picked) => return picked,
            None => println!("Invalid selection, try again."),
        }
    }
}

/// Parses a selection answer into zero-based indices.
///
/// Accepts `all` (or an empty answer), `none`, and comma-separated
/// one-based numbers or `lo-hi` ranges. Repeated numbers collapse to the
/// first occurrence. Returns `None` when the answer does not parse or
/// references a number out of range.
fn parse_selection(input: &str, count: usize) -> Option<Vec<usize>> {
    let input = input.trim();
    if input.is_empty() || input.eq_ignore_ascii_case("all") {
        return Some((0..count).collect());
    }
    if input.eq_ignore_ascii_case("none") {
        return Some(Vec::new());
    }

    let mut picked = Vec::new();
    for part in input.split(',') {
        let part = part.trim();
        let (lo, hi) = match part.split_once('-') {
            Some((lo, hi)) => (
                lo.trim().parse::<usize>().ok()?,
                hi.trim().parse::<usize>().ok()?,
            ),
            None => {
                let n = part.parse::<usize>().ok()?;
                (n, n)
            }
        };
        if lo == 0 || hi > count || lo > hi {
            return None;
        }
        for n in lo..=hi {
            if !picked.contains(&(n - 1)) {
                picked.push(n - 1);
            }
        }
    }
    Some(picked)
}

/// Renders the final outcome and maps it to an exit code.
fn print_outcome(outcome: RunOutcome, elapsed: Duration) -> i32 {
    match outcome {
        RunOutcome::NoLinksFound | RunOutcome::NothingResolved | RunOutcome::Cancelled => 0,
        RunOutcome::Completed {
            downloaded,
            failed,
            remaining,
            bytes,
        } => {
            print_summary(downloaded, failed, remaining, bytes, elapsed);
            i32::from(failed > 0)
        }
        RunOutcome::Failed => 1,
    }
}
