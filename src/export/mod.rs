//! Delivery of exported files
//!
//! The browser version triggers a download; here a sink receives the file
//! name and contents.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::FormResult;

/// Receives exported documents
pub trait ExportSink {
    /// Deliver `contents` under `filename`, returning where it went
    fn deliver(&mut self, filename: &str, contents: &str) -> FormResult<PathBuf>;
}

/// Writes exports into a directory, replacing files of the same name
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for DirectorySink {
    fn deliver(&mut self, filename: &str, contents: &str) -> FormResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        fs::write(&path, contents)?;
        tracing::info!(path = %path.display(), bytes = contents.len(), "delivered export");
        Ok(path)
    }
}

/// One recorded delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub filename: String,
    pub contents: String,
}

/// Keeps deliveries in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    deliveries: Vec<Delivery>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    pub fn last(&self) -> Option<&Delivery> {
        self.deliveries.last()
    }
}

impl ExportSink for MemorySink {
    fn deliver(&mut self, filename: &str, contents: &str) -> FormResult<PathBuf> {
        self.deliveries.push(Delivery {
            filename: filename.to_string(),
            contents: contents.to_string(),
        });
        Ok(PathBuf::from(filename))
    }
}
