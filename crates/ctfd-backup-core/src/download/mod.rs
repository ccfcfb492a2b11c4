//! Streamed attachment downloads.
//!
//! The body is written to disk as it arrives, in reads of at most
//! [`CHUNK_SIZE`] bytes, so memory stays bounded regardless of attachment
//! size. The SHA-256 is computed over the same chunks. On failure the
//! destination is left as it is (possibly partial) and the failure is
//! reported, never raised: sibling downloads are unaffected.

mod progress;

pub use progress::ProgressTracker;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::client::{ApiClient, FetchError, RequestKind};

/// Size of one read from the transfer.
pub const CHUNK_SIZE: usize = 8192;
/// A progress line is logged each time this many more bytes have arrived.
pub const PROGRESS_STEP: u64 = 5 * 1024 * 1024;

const MIB: f64 = 1024.0 * 1024.0;

/// Per-file outcome, recorded next to the attachment in `challenge.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadReport {
    pub ok: bool,
    /// Bytes written to disk (partial on failure).
    pub bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Streams `url` to `dest`. Logs and reports failures instead of returning them.
pub fn download_file(client: &ApiClient, url: &str, dest: &Path) -> DownloadReport {
    let label = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| url.to_string());
    let mut progress = ProgressTracker::new(PROGRESS_STEP);

    match stream_to_file(client, url, dest, &label, &mut progress) {
        Ok(digest) => {
            let bytes = progress.downloaded();
            if bytes as f64 > MIB {
                tracing::info!(file = %label, "downloaded ({:.1} MB)", bytes as f64 / MIB);
            } else {
                tracing::debug!(file = %label, bytes, "downloaded");
            }
            DownloadReport {
                ok: true,
                bytes,
                sha256: Some(digest),
                error: None,
            }
        }
        Err(e) => {
            tracing::warn!(file = %label, url, "download failed: {}", e);
            DownloadReport {
                ok: false,
                bytes: progress.downloaded(),
                sha256: None,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Writes `data` to `dest`, creating the file on the first chunk.
fn write_chunk(out: &mut Option<File>, dest: &Path, data: &[u8]) -> io::Result<()> {
    if out.is_none() {
        *out = Some(File::create(dest)?);
    }
    match out {
        Some(file) => file.write_all(data),
        None => Ok(()),
    }
}

/// Performs the transfer; returns the hex SHA-256 of the body.
fn stream_to_file(
    client: &ApiClient,
    url: &str,
    dest: &Path,
    label: &str,
    progress: &mut ProgressTracker,
) -> Result<String, FetchError> {
    let mut out: Option<File> = None;
    let mut write_error: Option<io::Error> = None;
    let mut hasher = Sha256::new();

    let mut easy = client.handle(url, RequestKind::File)?;
    let performed = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            if let Err(e) = write_chunk(&mut out, dest, data) {
                write_error = Some(e);
                // Short count aborts the transfer with a write error.
                return Ok(0);
            }
            hasher.update(data);
            if let Some(done) = progress.advance(data.len()) {
                tracing::info!(file = %label, "{:.1} MB", done as f64 / MIB);
            }
            Ok(data.len())
        })?;
        transfer.perform()
    };

    if let Err(e) = performed {
        if e.is_write_error() {
            if let Some(io_err) = write_error.take() {
                return Err(FetchError::Storage(io_err));
            }
        }
        if e.is_http_returned_error() {
            return Err(FetchError::Http(easy.response_code()?));
        }
        return Err(FetchError::Curl(e));
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(FetchError::Http(code));
    }
    // Empty body: no chunk ever arrived.
    if out.is_none() {
        File::create(dest)?;
    }
    Ok(hex::encode(hasher.finalize()))
}
