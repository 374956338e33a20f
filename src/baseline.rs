//! Baseline store
//!
//! Holds the last accepted structural snapshot. The gate reads it before a
//! check and writes it only after the check passes (or was skipped because no
//! baseline existed yet).

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};

use crate::error::{ProtocolError, Result};
use crate::schema::{StructuralSnapshot, SNAPSHOT_FORMAT_VERSION};

/// Read/write access to the accepted baseline
pub trait BaselineStore: Send + Sync {
    /// `Ok(None)` when no baseline has been accepted yet
    fn load(&self) -> Result<Option<StructuralSnapshot>>;

    fn save(&self, snapshot: &StructuralSnapshot) -> Result<()>;

    /// Path of the advisory lock serializing gate runs against this baseline
    fn lock_path(&self) -> Option<PathBuf> {
        None
    }
}

/// Baseline kept as a pretty, key-sorted JSON document on disk
pub struct FileBaselineStore {
    path: PathBuf,
}

impl FileBaselineStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BaselineStore for FileBaselineStore {
    fn load(&self) -> Result<Option<StructuralSnapshot>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no baseline on disk");
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let snapshot = StructuralSnapshot::from_json(&content)?;
        if snapshot.version != SNAPSHOT_FORMAT_VERSION {
            return Err(ProtocolError::InvalidBaseline(format!(
                "{} has format version {}, expected {}",
                self.path.display(),
                snapshot.version,
                SNAPSHOT_FORMAT_VERSION
            )));
        }
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &StructuralSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        // Write beside the target and rename so readers never see a partial file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, snapshot.to_pretty_json()?)?;
        fs::rename(&tmp, &self.path)?;
        info!(path = %self.path.display(), entities = snapshot.entity_count(), "baseline saved");
        Ok(())
    }

    fn lock_path(&self) -> Option<PathBuf> {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        Some(PathBuf::from(name))
    }
}

/// In-process baseline, for tests and embedding
#[derive(Default)]
pub struct MemoryBaselineStore {
    snapshot: Mutex<Option<StructuralSnapshot>>,
}

impl MemoryBaselineStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: StructuralSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
        }
    }

    pub fn current(&self) -> Option<StructuralSnapshot> {
        self.snapshot.lock().ok().and_then(|s| s.clone())
    }
}

impl BaselineStore for MemoryBaselineStore {
    fn load(&self) -> Result<Option<StructuralSnapshot>> {
        let guard = self
            .snapshot
            .lock()
            .map_err(|_| ProtocolError::Store("baseline mutex poisoned".into()))?;
        Ok(guard.clone())
    }

    fn save(&self, snapshot: &StructuralSnapshot) -> Result<()> {
        let mut guard = self
            .snapshot
            .lock()
            .map_err(|_| ProtocolError::Store("baseline mutex poisoned".into()))?;
        *guard = Some(snapshot.clone());
        Ok(())
    }
}

/// Advisory lock file; removed when dropped
#[derive(Debug)]
pub struct BaselineLock {
    path: PathBuf,
}

impl BaselineLock {
    /// Create the lock file, failing if another run holds it
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(ProtocolError::Locked(path));
            }
            Err(e) => return Err(e.into()),
        };
        writeln!(file, "{}", std::process::id())?;
        debug!(path = %path.display(), "baseline lock acquired");
        Ok(Self { path })
    }
}

impl Drop for BaselineLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
