use crate::domain::listing::Listing;
use crate::scraper::ScrapeError;
use crate::store::listings::{deduplicate, read_listings, write_listings};
use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;
use thiserror::Error;
use tracing::{info, warn};

const FILE_PREFIX: &str = "foreclosure_listings_";

/// Process-wide; keeps names unique when runs finish within the same second.
static RUN_COUNTER: AtomicU64 = AtomicU64::new(1);

const MAX_NAME_ATTEMPTS: usize = 1000;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No CSV file found. Please run a scrape first.")]
    NoArtifact,

    #[error("Unknown CSV file: {0}")]
    UnknownArtifact(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// The file one completed run produced.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub path: PathBuf,
    pub unique_listings: usize,
}

/// Directory holding run artifacts. Cheap to clone (path only).
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Deduplicate a run's listings and write them to a new artifact. A run
    /// that found nothing still gets a header-only file. A failed write
    /// leaves no file behind.
    pub fn finalize(&self, listings: Vec<Listing>) -> Result<Artifact, ScrapeError> {
        self.finalize_with(listings, BufWriter::new)
    }

    fn finalize_with<W: Write>(
        &self,
        listings: Vec<Listing>,
        wrap: impl FnOnce(File) -> W,
    ) -> Result<Artifact, ScrapeError> {
        let total = listings.len();
        let unique = deduplicate(listings);

        let (path, file) = self
            .create_artifact_file()
            .map_err(|e| self.write_error(&self.dir, e))?;

        let mut writer = wrap(file);
        let written = write_listings(&mut writer, &unique)
            .and_then(|_| writer.flush().map_err(csv::Error::from));
        drop(writer);

        if let Err(e) = written {
            if let Err(rm) = fs::remove_file(&path) {
                warn!("⚠️ Could not remove partial artifact {}: {rm}", path.display());
            }
            return Err(self.write_error(&path, e));
        }

        info!(
            "💾 Saved {} unique listings (from {total} total) to {}",
            unique.len(),
            path.display()
        );

        Ok(Artifact {
            path,
            unique_listings: unique.len(),
        })
    }

    fn write_error(&self, path: &Path, e: impl std::fmt::Display) -> ScrapeError {
        ScrapeError::Write {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
    }

    fn create_artifact_file(&self) -> io::Result<(PathBuf, File)> {
        fs::create_dir_all(&self.dir)?;
        let stamp = Local::now().format("%Y%m%d_%H%M%S");

        for _ in 0..MAX_NAME_ATTEMPTS {
            let n = RUN_COUNTER.fetch_add(1, Ordering::Relaxed);
            let path = self.dir.join(format!("{FILE_PREFIX}{stamp}_{n:04}.csv"));

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }

        Err(io::Error::new(
            ErrorKind::AlreadyExists,
            "could not find a free artifact name",
        ))
    }

    /// Every CSV in the directory. A missing directory is simply empty.
    pub fn list(&self) -> io::Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "csv") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Most recently written artifact, newest modification time first and
    /// file name as the tie breaker.
    pub fn latest(&self) -> io::Result<Option<PathBuf>> {
        let mut newest: Option<(SystemTime, PathBuf)> = None;

        for path in self.list()? {
            let modified = fs::metadata(&path)?.modified()?;
            let is_newer = match &newest {
                Some((t, p)) => (modified, &path) > (*t, p),
                None => true,
            };
            if is_newer {
                newest = Some((modified, path));
            }
        }

        Ok(newest.map(|(_, p)| p))
    }

    /// Resolve a caller-supplied artifact reference. Only the file name is
    /// used, so a reference can never point outside the store.
    pub fn resolve(&self, reference: &str) -> Result<PathBuf, StoreError> {
        let name = Path::new(reference.trim())
            .file_name()
            .ok_or_else(|| StoreError::UnknownArtifact(reference.to_string()))?;

        let path = self.dir.join(name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(StoreError::UnknownArtifact(reference.to_string()))
        }
    }

    /// The referenced artifact, or the latest one when no reference is given.
    pub fn select(&self, reference: Option<&str>) -> Result<PathBuf, StoreError> {
        match reference.map(str::trim).filter(|r| !r.is_empty()) {
            Some(r) => self.resolve(r),
            None => self.latest()?.ok_or(StoreError::NoArtifact),
        }
    }

    pub fn load(&self, path: &Path) -> Result<Vec<Listing>, StoreError> {
        let file = File::open(path)?;
        Ok(read_listings(BufReader::new(file))?)
    }
}
