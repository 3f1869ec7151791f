//! Blocking HTTP helpers for episode listings and remote audio.

use crate::constants::{MAX_DOWNLOAD_BYTES, REMOTE_SCHEMES};
use std::error::Error;
use std::io::{self, Read};
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(60);
const CHUNK_SIZE: usize = 64 * 1024;

/// Returns true when `source` should be fetched over HTTP rather than read from disk.
pub fn is_remote(source: &str) -> bool {
    let lower = source.trim().to_ascii_lowercase();
    REMOTE_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}

fn agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(CONNECT_TIMEOUT)
        .timeout_read(READ_TIMEOUT)
        .build()
}

fn describe(url: &str, err: ureq::Error) -> String {
    match err {
        ureq::Error::Status(status, _) => format!("GET {url} failed: HTTP status {status}"),
        ureq::Error::Transport(transport) => format!("GET {url} failed: {transport}"),
    }
}

pub fn fetch_text(url: &str) -> Result<String, Box<dyn Error>> {
    log::debug!("Fetching text from {url}");
    let response = agent().get(url).call().map_err(|e| describe(url, e))?;
    Ok(response.into_string()?)
}

/// Download `url`, giving up as soon as `keep_going` returns false.
pub fn fetch_bytes(url: &str, keep_going: impl Fn() -> bool) -> Result<Vec<u8>, Box<dyn Error>> {
    log::debug!("Fetching bytes from {url}");
    let response = agent().get(url).call().map_err(|e| describe(url, e))?;

    let bytes = read_capped(response.into_reader(), MAX_DOWNLOAD_BYTES, keep_going)?;

    log::info!("Downloaded {} bytes from {url}", bytes.len());
    Ok(bytes)
}

/// Read `reader` to the end in chunks.
///
/// Fails once more than `limit` bytes arrive, or when `keep_going` returns
/// false between chunks.
pub fn read_capped<R: Read>(
    mut reader: R,
    limit: u64,
    keep_going: impl Fn() -> bool,
) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut bytes = Vec::new();
    let mut chunk = vec![0u8; CHUNK_SIZE];

    loop {
        if !keep_going() {
            return Err("Download cancelled".into());
        }
        let read = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        if (bytes.len() + read) as u64 > limit {
            return Err(format!("Audio file is larger than the {limit} byte limit").into());
        }
        bytes.extend_from_slice(&chunk[..read]);
    }

    Ok(bytes)
}
