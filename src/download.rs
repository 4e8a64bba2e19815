//! Streaming file downloads with atomic `.part` file semantics.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::event::{EventSink, Severity};
use crate::filename;
use crate::http;

/// Capacity of the `.part` file write buffer.
const WRITE_BUFFER_SIZE: usize = 8192;

/// A file that finished downloading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    /// Final path on disk.
    pub path: PathBuf,
    /// Bytes written.
    pub bytes: u64,
}

/// Returns the `.part` file path for a given final name.
fn part_path(dir: &Path, file_name: &str) -> PathBuf {
    dir.join(format!("{file_name}.part"))
}

/// Downloads `url` into `dest_dir` using atomic `.part` file semantics.
///
/// The final name comes from the `content-disposition` header, the URL
/// path, or `label`, in that order. Data streams into `<name>.part` and is
/// renamed to `<name>` only once the body completes, so the committed path
/// never holds a partial file; on error the `.part` file is removed.
/// Progress and the success or failure log line are reported through
/// `sink`, and the transfer indicator is cleared either way.
///
/// # Errors
///
/// Returns an error on a non-success status (nothing is written), or when
/// the transfer or a disk operation fails. A failed download never aborts
/// the caller's batch; the error is for counting.
pub async fn download_file(
    client: &reqwest::Client,
    url: &str,
    dest_dir: &Path,
    label: &str,
    sink: &dyn EventSink,
) -> crate::Result<DownloadedFile> {
    let result = transfer(client, url, dest_dir, label, sink).await;
    if let Err(e) = &result {
        match e {
            crate::Error::Status { status, .. } => sink.log_detail(
                Severity::Error,
                &format!("Failed To Download File (Status: {})", status.as_u16()),
                &format!("{label} from {url}"),
            ),
            other => sink.log_detail(
                Severity::Error,
                &format!("Failed To Download File '{label}'"),
                &other.to_string(),
            ),
        }
        sink.progress_clear();
    }
    result
}

async fn transfer(
    client: &reqwest::Client,
    url: &str,
    dest_dir: &Path,
    label: &str,
    sink: &dyn EventSink,
) -> crate::Result<DownloadedFile> {
    let response = http::get_checked(client, url).await?;

    let content_disposition = response
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let (file_name, used_fallback) =
        filename::resolve_output_name(content_disposition.as_deref(), url, label);
    if used_fallback {
        sink.log_detail(
            Severity::Warning,
            "Could not determine filename, using label",
            &file_name,
        );
    }

    let total_bytes = response.content_length().unwrap_or(0);
    tokio::fs::create_dir_all(dest_dir).await?;
    let output_path = dest_dir.join(&file_name);
    let partial = part_path(dest_dir, &file_name);

    sink.progress(0, total_bytes, &file_name);

    match write_body(response, &partial, total_bytes, &file_name, sink).await {
        Ok(bytes) => match tokio::fs::rename(&partial, &output_path).await {
            Ok(()) => {
                sink.log_detail(Severity::Success, "Successfully Downloaded File", &file_name);
                sink.progress_clear();
                Ok(DownloadedFile {
                    path: output_path,
                    bytes,
                })
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                Err(e.into())
            }
        },
        Err(e) => {
            let _ = tokio::fs::remove_file(&partial).await;
            Err(e)
        }
    }
}

/// Streams the response body into `partial`, emitting progress per chunk.
/// Owns the file handle, so it is closed before the caller touches the file.
async fn write_body(
    response: reqwest::Response,
    partial: &Path,
    total_bytes: u64,
    file_name: &str,
    sink: &dyn EventSink,
) -> crate::Result<u64> {
    let file = tokio::fs::File::create(partial).await?;
    let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
    let mut stream = response.bytes_stream();
    let mut bytes_so_far: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        writer.write_all(&chunk).await?;
        bytes_so_far += chunk.len() as u64;
        sink.progress(bytes_so_far, total_bytes, file_name);
    }

    writer.flush().await?;
    Ok(bytes_so_far)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_path_appends_extension() {
        assert_eq!(
            part_path(Path::new("dl"), "movie.mkv"),
            PathBuf::from("dl/movie.mkv.part"),
        );
        assert_eq!(
            part_path(Path::new("/data"), "archive.tar.gz"),
            PathBuf::from("/data/archive.tar.gz.part"),
        );
    }
}
