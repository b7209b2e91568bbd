//! Catalog repository with a single TTL cache
//!
//! The repository owns fetching, retrying and expiring catalog snapshots. The pricing
//! engine never talks to it directly; callers hand the engine the `Arc<Catalog>` it returns.

use super::legacy::LegacyCatalog;
use super::{load_catalog, Catalog, CatalogError};
use chrono::{DateTime, Duration, Utc};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Somewhere a fresh catalog snapshot can be fetched from
pub trait CatalogSource: Send + Sync {
    fn fetch(&self) -> Result<Catalog, CatalogError>;

    /// Human-readable name for logs
    fn describe(&self) -> String {
        "catalog source".to_string()
    }
}

/// Anything that can hand out the current catalog snapshot
pub trait CatalogRepository {
    fn load_catalog(&self) -> Result<Arc<Catalog>, CatalogError>;
}

/// On-disk catalog layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogFormat {
    #[default]
    Canonical,
    /// Korean-keyed export, converted through [`LegacyCatalog`]
    Legacy,
}

/// Reads a catalog JSON file on every fetch
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    path: PathBuf,
    format: CatalogFormat,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>, format: CatalogFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn canonical(path: impl Into<PathBuf>) -> Self {
        Self::new(path, CatalogFormat::Canonical)
    }

    pub fn legacy(path: impl Into<PathBuf>) -> Self {
        Self::new(path, CatalogFormat::Legacy)
    }
}

impl CatalogSource for FileCatalogSource {
    fn fetch(&self) -> Result<Catalog, CatalogError> {
        match self.format {
            CatalogFormat::Canonical => load_catalog(&self.path),
            CatalogFormat::Legacy => LegacyCatalog::from_path(&self.path)?.into_catalog(),
        }
    }

    fn describe(&self) -> String {
        format!("{} ({:?})", self.path.display(), self.format)
    }
}

/// Cache behaviour for [`CachedCatalogRepository`]
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Snapshot lifetime before a refetch
    pub ttl_seconds: i64,

    /// Fetch attempts per refresh before giving up
    pub max_attempts: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 300, // 5 minute cache
            max_attempts: 3,
        }
    }
}

struct CachedSnapshot {
    catalog: Arc<Catalog>,
    fetched_at: DateTime<Utc>,
}

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// TTL cache in front of a [`CatalogSource`]
///
/// Refreshes run without holding the snapshot lock, so `fetched_at` and `invalidate`
/// never wait on a slow or retrying source.
pub struct CachedCatalogRepository<S: CatalogSource> {
    source: S,
    config: CacheConfig,
    clock: Clock,
    slot: Mutex<Option<CachedSnapshot>>,
}

impl<S: CatalogSource> CachedCatalogRepository<S> {
    pub fn new(source: S, config: CacheConfig) -> Self {
        Self {
            source,
            config,
            clock: Box::new(Utc::now),
            slot: Mutex::new(None),
        }
    }

    /// Replace the wall clock, e.g. with a controllable one in tests
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    /// Drop the cached snapshot so the next load refetches
    pub fn invalidate(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }

    /// Time the current snapshot was fetched, if any
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.as_ref().map(|s| s.fetched_at)
    }

    fn is_fresh(&self, snapshot: &CachedSnapshot, now: DateTime<Utc>) -> bool {
        now - snapshot.fetched_at < Duration::seconds(self.config.ttl_seconds)
    }

    fn fetch_with_retry(&self) -> Result<Catalog, CatalogError> {
        let attempts = self.config.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.source.fetch() {
                Ok(catalog) => return Ok(catalog),
                // A snapshot that fails validation won't fix itself on retry
                Err(err @ CatalogError::DataIntegrity(_)) => return Err(err),
                Err(err) => {
                    log::warn!(
                        "Catalog fetch from {} failed (attempt {}/{}): {}",
                        self.source.describe(),
                        attempt,
                        attempts,
                        err
                    );
                    last_error = err.to_string();
                }
            }
        }

        Err(CatalogError::Unavailable {
            attempts,
            last_error,
        })
    }
}

impl<S: CatalogSource> CatalogRepository for CachedCatalogRepository<S> {
    fn load_catalog(&self) -> Result<Arc<Catalog>, CatalogError> {
        let now = (self.clock)();

        {
            let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(snapshot) = slot.as_ref() {
                if self.is_fresh(snapshot, now) {
                    return Ok(Arc::clone(&snapshot.catalog));
                }
                log::info!("Catalog snapshot expired, refreshing from {}", self.source.describe());
            }
        }

        // The slot is unlocked while fetching; the last refresh to finish wins
        let catalog = Arc::new(self.fetch_with_retry()?);
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(CachedSnapshot {
            catalog: Arc::clone(&catalog),
            fetched_at: now,
        });
        Ok(catalog)
    }
}
