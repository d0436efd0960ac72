//! Snapshot ownership and refresh.
//!
//! A [`SnapshotStore`] owns the current record collection. Refreshes replace
//! it wholesale with a new `Arc<Snapshot>`, so readers holding the previous
//! one are never affected by a later refresh.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::models::{Record, Snapshot, Stats};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

pub trait DataSource {
    fn fetch(&self) -> anyhow::Result<Snapshot>;
}

/// Reads rows (JSON or CSV) and optional stats (JSON) from local files.
#[derive(Debug, Clone)]
pub struct FileSource {
    pub rows_path: PathBuf,
    pub stats_path: Option<PathBuf>,
}

impl FileSource {
    pub fn new(rows_path: impl Into<PathBuf>, stats_path: Option<PathBuf>) -> Self {
        Self {
            rows_path: rows_path.into(),
            stats_path,
        }
    }
}

impl DataSource for FileSource {
    fn fetch(&self) -> anyhow::Result<Snapshot> {
        let rows = load_rows(&self.rows_path)?;
        // Stats failures never discard the rows.
        let stats = match &self.stats_path {
            Some(path) => match load_stats(path) {
                Ok(stats) => Some(stats),
                Err(err) => {
                    warn!(error = %format!("{err:#}"), "ignoring unreadable stats");
                    None
                }
            },
            None => None,
        };
        debug!(rows = rows.len(), path = %self.rows_path.display(), "loaded rows");
        Ok(Snapshot::new(rows, stats, Utc::now()))
    }
}

pub fn load_rows(path: &Path) -> anyhow::Result<Vec<Record>> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        read_csv_rows(file).with_context(|| format!("invalid rows in {}", path.display()))
    } else {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        parse_json_rows(&text).with_context(|| format!("invalid rows in {}", path.display()))
    }
}

pub fn load_stats(path: &Path) -> anyhow::Result<Stats> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid stats in {}", path.display()))
}

/// Accepts the data endpoint's `{"rows": [...]}` envelope or a bare array.
pub fn parse_json_rows(text: &str) -> anyhow::Result<Vec<Record>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RowsPayload {
        Bare(Vec<Record>),
        Envelope {
            #[serde(default)]
            rows: Option<Vec<Record>>,
        },
    }

    let payload: RowsPayload = serde_json::from_str(text)?;
    Ok(match payload {
        RowsPayload::Bare(rows) => rows,
        RowsPayload::Envelope { rows: Some(rows) } => rows,
        RowsPayload::Envelope { rows: None } => {
            warn!("rows payload has no `rows` array, treating it as empty");
            Vec::new()
        }
    })
}

/// Reads CSV rows keyed by the header line.
///
/// Ragged rows are accepted: cells past the header are dropped and missing
/// trailing cells become absent fields.
pub fn read_csv_rows<R: std::io::Read>(input: R) -> anyhow::Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();

    for result in reader.records() {
        let row = result?;
        let mut fields = Map::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            fields.insert(header.to_string(), Value::String(cell.to_string()));
        }
        rows.push(Record::from(fields));
    }

    Ok(rows)
}

type Callback = Box<dyn Fn(&Arc<Snapshot>) + Send + Sync>;

struct Subscribers {
    next_id: AtomicU64,
    callbacks: Mutex<Vec<(u64, Callback)>>,
}

impl Subscribers {
    /// A callback that panicked poisons the lock; the list itself is still valid.
    fn lock(&self) -> MutexGuard<'_, Vec<(u64, Callback)>> {
        self.callbacks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, id: u64) {
        self.lock().retain(|(existing, _)| *existing != id);
    }
}

/// Owner of the current snapshot.
pub struct SnapshotStore {
    current: RwLock<Arc<Snapshot>>,
    subscribers: Arc<Subscribers>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(Snapshot::empty())
    }
}

impl SnapshotStore {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
            subscribers: Arc::new(Subscribers {
                next_id: AtomicU64::new(0),
                callbacks: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn current_snapshot(&self) -> Arc<Snapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Swaps in `snapshot` and notifies every subscriber with it.
    pub fn replace(&self, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);
        {
            let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
            *guard = Arc::clone(&snapshot);
        }

        for (_, callback) in self.subscribers.lock().iter() {
            callback(&snapshot);
        }
    }

    /// Fetches a fresh snapshot. On failure the previous snapshot stays current.
    pub fn refresh(&self, source: &dyn DataSource) -> bool {
        match source.fetch() {
            Ok(snapshot) => {
                info!(rows = snapshot.rows.len(), "snapshot refreshed");
                self.replace(snapshot);
                true
            }
            Err(err) => {
                warn!(error = %format!("{err:#}"), "refresh failed, keeping previous snapshot");
                false
            }
        }
    }

    /// Registers `callback` for every future [`replace`](Self::replace).
    ///
    /// Callbacks run under the subscriber lock and must not subscribe or
    /// unsubscribe themselves.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Arc<Snapshot>) + Send + Sync + 'static,
    {
        let id = self.subscribers.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().push((id, Box::new(callback)));
        Subscription {
            id,
            subscribers: Arc::downgrade(&self.subscribers),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

/// Handle returned by [`SnapshotStore::subscribe`]. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    subscribers: Weak<Subscribers>,
}

impl Subscription {
    /// Stops notifications now instead of at end of scope.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            subscribers.remove(self.id);
        }
    }
}

/// Refreshes `store` from `source` every `interval`, starting immediately.
///
/// Runs until `max_refreshes` attempts have been made, or forever when `None`.
pub async fn poll(
    store: &SnapshotStore,
    source: &dyn DataSource,
    interval: Duration,
    max_refreshes: Option<usize>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut attempts = 0usize;

    loop {
        if max_refreshes.is_some_and(|max| attempts >= max) {
            break;
        }
        ticker.tick().await;
        store.refresh(source);
        attempts += 1;
    }

    debug!(attempts, "polling stopped");
}
