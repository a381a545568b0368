//! Line-oriented append-only file transport.
//!
//! Every mailbox file has exactly one writer and either one or many
//! readers; appends are assumed atomic at line granularity. Readers track a
//! byte cursor and resume from there on the next call: a seek-and-`read_line`
//! tail, driven by discrete ticks instead of a poll loop.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Tails an append-only file, yielding only the lines appended since the
/// last call. A missing file reads as empty, with no retry.
pub struct LineTailReader {
    path: PathBuf,
    byte_offset: u64,
}

impl LineTailReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            byte_offset: 0,
        }
    }

    /// Read whatever new, complete (newline-terminated) lines are available
    /// since the last call. A trailing partial line — the writer has not
    /// yet flushed its terminating `\n` — is left for the next call.
    pub fn read_new_lines(&mut self) -> io::Result<Vec<String>> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };
        file.seek(SeekFrom::Start(self.byte_offset))?;
        let mut reader = BufReader::new(file);

        let mut lines = Vec::new();
        loop {
            let mut raw = String::new();
            let bytes_read = reader.read_line(&mut raw)?;
            if bytes_read == 0 {
                break;
            }
            if !raw.ends_with('\n') {
                break;
            }
            self.byte_offset += bytes_read as u64;
            let trimmed = raw.trim_end_matches(['\n', '\r']);
            if !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
        }
        Ok(lines)
    }
}

/// Appends whole lines to a file, creating it on first use.
pub struct LineAppender {
    path: PathBuf,
}

impl LineAppender {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append_line(&self, line: &str) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{line}")
    }

    /// Create the file if it doesn't exist yet, without writing anything.
    /// Lets a node's outbox exist before its first emission so a controller
    /// polling early ticks sees an empty file rather than a missing one.
    pub fn touch(&self) -> io::Result<()> {
        OpenOptions::new().create(true).append(true).open(&self.path)?;
        Ok(())
    }
}
