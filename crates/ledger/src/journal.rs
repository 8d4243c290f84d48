//! JSONL transaction journal - append-only mirror of the transaction log
//!
//! One file per UTC day, rotated on date change. The journal is an
//! audit artifact: writes are flushed eagerly, and a failed write never
//! fails the ledger operation that produced the entry.

use crate::audit::TransactionEntry;
use chrono::Utc;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Journal I/O errors
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("Journal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Journal serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Append-only JSONL writer for transaction entries
pub struct TransactionJournal {
    base_path: PathBuf,
    current_file: Option<BufWriter<File>>,
    current_date: Option<String>,
}

impl TransactionJournal {
    /// Create a journal rooted at the given directory
    pub fn new(base_path: impl AsRef<Path>) -> Result<Self, JournalError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;

        Ok(Self {
            base_path,
            current_file: None,
            current_date: None,
        })
    }

    /// Append a transaction entry as one JSON line
    pub fn append(&mut self, entry: &TransactionEntry) -> Result<(), JournalError> {
        let date = entry.recorded_at.format("%Y-%m-%d").to_string();

        if self.current_date.as_ref() != Some(&date) {
            self.rotate_file(&date)?;
        }

        if let Some(ref mut writer) = self.current_file {
            let json = serde_json::to_string(entry)?;
            writeln!(writer, "{}", json)?;
            writer.flush()?;
        }

        Ok(())
    }

    fn rotate_file(&mut self, date: &str) -> Result<(), JournalError> {
        if let Some(ref mut writer) = self.current_file {
            writer.flush()?;
        }

        let file_path = self.base_path.join(format!("{}.jsonl", date));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)?;

        self.current_file = Some(BufWriter::new(file));
        self.current_date = Some(date.to_string());

        Ok(())
    }

    /// Path of the file the next append would land in
    pub fn today_file_path(&self) -> PathBuf {
        let date = Utc::now().format("%Y-%m-%d").to_string();
        self.base_path.join(format!("{}.jsonl", date))
    }

    /// Flush and close the current file
    pub fn close(&mut self) -> Result<(), JournalError> {
        if let Some(ref mut writer) = self.current_file {
            writer.flush()?;
        }
        self.current_file = None;
        self.current_date = None;
        Ok(())
    }
}

impl Drop for TransactionJournal {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Sequential journal reader for audit replay
pub struct JournalReader {
    files: Vec<PathBuf>,
}

impl JournalReader {
    /// Create a reader over all `.jsonl` files in a directory
    pub fn from_directory(path: impl AsRef<Path>) -> Result<Self, JournalError> {
        let path = path.as_ref();
        let mut files = Vec::new();

        if path.exists() {
            for entry in fs::read_dir(path)? {
                let entry = entry?;
                let file_path = entry.path();
                if file_path.extension().map_or(false, |ext| ext == "jsonl") {
                    files.push(file_path);
                }
            }
        }

        files.sort();

        Ok(Self { files })
    }

    /// Read all entries from all files in date order
    pub fn read_all(&self) -> Result<Vec<TransactionEntry>, JournalError> {
        let mut entries = Vec::new();

        for file_path in &self.files {
            let file = File::open(file_path)?;
            let reader = BufReader::new(file);

            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let entry: TransactionEntry = serde_json::from_str(&line)?;
                entries.push(entry);
            }
        }

        Ok(entries)
    }

    /// Count entries across all files
    pub fn count(&self) -> Result<usize, JournalError> {
        let mut count = 0;

        for file_path in &self.files {
            let file = File::open(file_path)?;
            let reader = BufReader::new(file);

            for line in reader.lines() {
                if !line?.trim().is_empty() {
                    count += 1;
                }
            }
        }

        Ok(count)
    }
}
