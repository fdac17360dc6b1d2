//! Easy2 Handler for one request of a transfer.
//! Tracks the status line and `Location` header, and streams the body of a
//! 200 response into the destination file.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str;

const WRITE_BUF_SIZE: usize = 64 * 1024;

pub(super) struct ResponseHandler {
    destination: PathBuf,
    pub(super) status: Option<u32>,
    pub(super) location: Option<String>,
    /// Opened lazily on the first body byte of a 200 response.
    writer: Option<BufWriter<File>>,
    pub(super) bytes_written: u64,
    /// Set when writing to disk failed; the transfer is aborted afterwards.
    pub(super) write_error: Option<io::Error>,
}

impl ResponseHandler {
    pub(super) fn new(destination: &Path) -> Self {
        Self {
            destination: destination.to_path_buf(),
            status: None,
            location: None,
            writer: None,
            bytes_written: 0,
            write_error: None,
        }
    }

    /// True once the destination file has been created.
    pub(super) fn started_writing(&self) -> bool {
        self.writer.is_some()
    }

    fn writer(&mut self) -> io::Result<&mut BufWriter<File>> {
        let writer = match self.writer.take() {
            Some(w) => w,
            None => BufWriter::with_capacity(WRITE_BUF_SIZE, File::create(&self.destination)?),
        };
        Ok(self.writer.insert(writer))
    }

    /// Flushes the body to disk and closes the file. Creates the file for an empty body.
    /// Returns the number of body bytes written.
    pub(super) fn finish(&mut self) -> io::Result<u64> {
        let writer = self.writer()?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        self.writer = None;
        Ok(self.bytes_written)
    }
}

impl curl::easy::Handler for ResponseHandler {
    fn header(&mut self, data: &[u8]) -> bool {
        if let Ok(s) = str::from_utf8(data) {
            let line = s.trim_end();
            if line.starts_with("HTTP/") {
                // Each status line starts a new response (1xx, proxy CONNECT, final).
                self.status = parse_status_line(line);
                self.location = None;
            } else if let Some((name, value)) = line.split_once(':') {
                if name.trim().eq_ignore_ascii_case("location") {
                    self.location = Some(value.trim().to_string());
                }
            }
        }
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, curl::easy::WriteError> {
        if self.status != Some(200) {
            // Redirect and error bodies are drained, never written.
            return Ok(data.len());
        }
        let result = self.writer().and_then(|w| w.write_all(data));
        match result {
            Ok(()) => {
                self.bytes_written += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                tracing::warn!("writing {} failed: {}", self.destination.display(), e);
                self.write_error = Some(e);
                Ok(0) // abort transfer
            }
        }
    }
}

/// Status code from a line like `HTTP/1.1 200 OK` or `HTTP/2 404`.
fn parse_status_line(line: &str) -> Option<u32> {
    line.split_whitespace().nth(1)?.parse().ok()
}
