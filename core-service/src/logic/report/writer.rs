//! Report Writer - JSONL hand-off for audit reports
//!
//! One report per line. A file is closed once the next line would push it
//! past the size limit; a restarted writer resumes the newest file.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::Mutex;
use thiserror::Error;

use super::types::AuditReport;

const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10 MB

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("report serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistence hand-off for assembled reports
pub trait ReportSink: Send + Sync {
    fn submit(&self, report: &AuditReport) -> Result<(), ReportError>;
}

/// Open output file and the bytes already in it
struct ActiveFile {
    file: File,
    len: u64,
}

impl ActiveFile {
    fn open(path: &Path) -> Result<Self, ReportError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let len = file.metadata()?.len();
        Ok(Self { file, len })
    }

    fn fits(&self, extra: u64, limit: u64) -> bool {
        self.len == 0 || self.len + extra <= limit
    }
}

/// Appends one JSON line per report, rotating by size
pub struct JsonlReportWriter {
    active: Mutex<Option<ActiveFile>>,
    base_dir: PathBuf,
    max_file_size: u64,
}

impl JsonlReportWriter {
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, ReportError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;
        Ok(Self {
            active: Mutex::new(None),
            base_dir,
            max_file_size: MAX_FILE_SIZE,
        })
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Append one report. A report larger than the limit still gets a
    /// file of its own.
    pub fn append(&self, report: &AuditReport) -> Result<(), ReportError> {
        let mut line = serde_json::to_vec(report)?;
        line.push(b'\n');
        let extra = line.len() as u64;

        let mut active = self.active.lock();
        let next = match active.take() {
            Some(current) if current.fits(extra, self.max_file_size) => current,
            Some(_) => self.start_file()?,
            None => self.resume_or_start(extra)?,
        };
        let current = active.insert(next);

        current.file.write_all(&line)?;
        current.len += extra;
        Ok(())
    }

/// Report log files, oldest first
    pub fn log_files(&self) -> Result<Vec<PathBuf>, ReportError> {
        let mut entries = fs::read_dir(&self.base_dir)?
            .filter_map(|res| res.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map_or(false, |ext| ext == "jsonl"))
            .collect::<Vec<_>>();
        entries.sort();
        Ok(entries)
    }

    /// Newest existing file if the line fits, otherwise a fresh one
    fn resume_or_start(&self, extra: u64) -> Result<ActiveFile, ReportError> {
        if let Some(latest) = self.log_files()?.pop() {
            let resumed = ActiveFile::open(&latest)?;
            if resumed.fits(extra, self.max_file_size) {
                log::debug!("Resuming report file {}", latest.display());
                return Ok(resumed);
            }
        }
        self.start_file()
    }

    fn start_file(&self) -> Result<ActiveFile, ReportError> {
        // reports-YYYY-MM-DD-HHMMSS.ffffff.jsonl sorts by creation time
        let name = format!("reports-{}.jsonl", Utc::now().format("%Y-%m-%d-%H%M%S%.6f"));
        let path = self.base_dir.join(name);
        log::debug!("Starting report file {}", path.display());
        ActiveFile::open(&path)
    }
}

impl ReportSink for JsonlReportWriter {
    fn submit(&self, report: &AuditReport) -> Result<(), ReportError> {
        self.append(report)
    }
}
