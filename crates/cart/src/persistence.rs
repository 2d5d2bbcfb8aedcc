//! Durable snapshots of the line-item store.
//!
//! The persistence surface is a key-value store holding one serialized line
//! array per cart (the browser-local-storage equivalent). Failures here are
//! non-fatal: a save that cannot complete is logged and the in-memory cart
//! carries on; a load that finds corrupt or absent data yields an empty cart.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use silk_road_core::LineItem;
use thiserror::Error;
use tracing::warn;

/// Errors from writing a snapshot.
///
/// Swallowed (after logging) at the engine boundary; the cart must remain
/// usable when storage is unavailable.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable key-value surface for cart snapshots.
///
/// `load` runs once at engine initialization; `save` runs in the background
/// after every mutating command.
pub trait PersistenceAdapter: Send + Sync + 'static {
    /// Write a snapshot of the lines.
    fn save(&self, lines: &[LineItem]) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Read the last snapshot.
    ///
    /// Absent or unparseable data loads as empty, never as an error.
    fn load(&self) -> impl Future<Output = Vec<LineItem>> + Send;
}

impl<P: PersistenceAdapter> PersistenceAdapter for std::sync::Arc<P> {
    fn save(&self, lines: &[LineItem]) -> impl Future<Output = Result<(), StorageError>> + Send {
        P::save(self, lines)
    }

    fn load(&self) -> impl Future<Output = Vec<LineItem>> + Send {
        P::load(self)
    }
}

/// JSON-file-backed store: one file per cart, written atomically via a
/// temp file and rename.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store snapshots at `path`. Parent directories must already exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PersistenceAdapter for JsonFileStore {
    async fn save(&self, lines: &[LineItem]) -> Result<(), StorageError> {
        static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

        let bytes = serde_json::to_vec_pretty(lines)?;
        // Write-then-rename so a crash mid-write cannot corrupt the
        // previous snapshot. The temp name is unique per write so two
        // stores pointed at the same path cannot clobber each other's
        // in-flight temp file.
        let n = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = self.path.with_extension(format!("tmp.{n}"));
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn load(&self) -> Vec<LineItem> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read cart snapshot, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(lines) => lines,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corrupt cart snapshot, starting empty");
                Vec::new()
            }
        }
    }
}

/// In-process store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    lines: Mutex<Vec<LineItem>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with lines, as if a previous session saved them.
    #[must_use]
    pub fn with_lines(lines: Vec<LineItem>) -> Self {
        Self {
            lines: Mutex::new(lines),
        }
    }

    /// The current persisted snapshot.
    #[must_use]
    pub fn persisted(&self) -> Vec<LineItem> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PersistenceAdapter for MemoryStore {
    async fn save(&self, lines: &[LineItem]) -> Result<(), StorageError> {
        *self.lines.lock().unwrap_or_else(PoisonError::into_inner) = lines.to_vec();
        Ok(())
    }

    async fn load(&self) -> Vec<LineItem> {
        self.persisted()
    }
}
