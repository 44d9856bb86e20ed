use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::record::ScanLogRecord;

/// Append-only JSONL writer. One line per record; the file handle is opened
/// lazily and shared behind a mutex so concurrent appends never interleave.
pub struct ScanLogWriter {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl ScanLogWriter {
    pub fn new(path: PathBuf) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self {
            path,
            file: Mutex::new(None),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &ScanLogRecord) -> io::Result<()> {
        let mut guard = self.file.lock();
        if guard.is_none() {
            *guard = Some(OpenOptions::new().create(true).append(true).open(&self.path)?);
        }

        if let Some(file) = guard.as_mut() {
            let json = serde_json::to_string(record)?;
            writeln!(file, "{}", json)?;
        }
        Ok(())
    }
}
