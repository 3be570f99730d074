//! Extraction of server logs from the diagnostics bundle.
//!
//! The diagnostics endpoint returns a zip archive containing every server
//! log. Tool output only ever needs the tail of the main log.

use std::io::{Cursor, Read};

use crate::domain::error::PlexError;

/// File name of the primary server log inside the bundle.
pub const MAIN_LOG_NAME: &str = "Plex Media Server.log";

/// Pull one log file out of the downloaded bundle. Matching is by file name
/// suffix since some server versions nest logs under a directory.
pub fn extract_log(bundle: &[u8], file_name: &str) -> Result<String, PlexError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bundle))
        .map_err(|e| PlexError::Decode(format!("log bundle is not a zip archive: {e}")))?;

    let index = (0..archive.len()).find(|&i| {
        archive
            .by_index(i)
            .map(|entry| entry.name().ends_with(file_name))
            .unwrap_or(false)
    });
    let Some(index) = index else {
        return Err(PlexError::not_found("log file", file_name));
    };

    let mut entry = archive
        .by_index(index)
        .map_err(|e| PlexError::Decode(format!("log bundle entry unreadable: {e}")))?;
    let mut raw = Vec::new();
    entry
        .read_to_end(&mut raw)
        .map_err(|e| PlexError::Decode(format!("log bundle entry unreadable: {e}")))?;
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

/// Last `lines` lines of a log, oldest first.
pub fn tail(text: &str, lines: usize) -> Vec<String> {
    let all: Vec<&str> = text.lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].iter().map(|s| s.to_string()).collect()
}
