//! Persistence seams: object storage for image bytes, record storage for
//! spots.
//!
//! Both are traits so the submission flow can run against a hosted bucket and
//! database, the local filesystem, or in-memory doubles in tests.
//!
//! ## Object layout
//!
//! ```text
//! <root>/
//! └── spots/
//!     ├── 1717000000000-IMG_0042.jpg
//!     └── 1717000000312-____1_.jpg
//! ```
//!
//! Record stores keep a change history alongside the spots: a full snapshot
//! on every insert, update and delete.

use crate::config::UploadConfig;
use crate::naming::{object_key, public_url};
use crate::spot::{Spot, SpotRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("upload rejected: {0}")]
    Rejected(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("spot not found: {0}")]
    NotFound(Uuid),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Stores image bytes and hands back a public URL.
pub trait ObjectStore {
    fn put_object(
        &self,
        bytes: &[u8],
        filename: &str,
        content_type: &str,
    ) -> Result<String, UploadError>;
}

/// Object store on a local directory, published under a base URL.
pub struct FsObjectStore {
    root: PathBuf,
    key_prefix: String,
    public_base_url: String,
    /// Last millisecond stamp handed out; keeps keys unique within a run.
    last_millis: Mutex<i64>,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>, config: &UploadConfig) -> Self {
        Self {
            root: root.into(),
            key_prefix: config.key_prefix.clone(),
            public_base_url: config.public_base_url.clone(),
            last_millis: Mutex::new(0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn next_millis(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut last = match self.last_millis.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *last = now.max(*last + 1);
        *last
    }
}

impl ObjectStore for FsObjectStore {
    fn put_object(
        &self,
        bytes: &[u8],
        filename: &str,
        content_type: &str,
    ) -> Result<String, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::Rejected(format!("{filename} is empty")));
        }
        let key = object_key(&self.key_prefix, self.next_millis(), filename);
        let path = self.root.join(&key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        log::debug!("stored {} ({}, {} bytes)", key, content_type, bytes.len());
        Ok(public_url(&self.public_base_url, &key))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderBy {
    #[default]
    CreatedDesc,
    CreatedAsc,
    RatingDesc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HistoryOperation {
    Insert,
    Update,
    Delete,
}

/// A snapshot of a spot taken when it changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotHistory {
    pub id: Uuid,
    pub spot_id: Uuid,
    pub snapshot: Spot,
    pub operation: HistoryOperation,
    pub created_at: DateTime<Utc>,
}

/// Stores spot records.
pub trait RecordStore {
    fn insert(&mut self, record: SpotRecord) -> Result<Spot, StoreError>;
    fn update(&mut self, id: Uuid, record: SpotRecord) -> Result<Spot, StoreError>;
    fn delete(&mut self, id: Uuid) -> Result<(), StoreError>;
    fn get(&self, id: Uuid) -> Result<Spot, StoreError>;
    fn list(&self, order: OrderBy) -> Result<Vec<Spot>, StoreError>;
    /// Snapshots for one spot, oldest first.
    fn history(&self, spot_id: Uuid) -> Result<Vec<SpotHistory>, StoreError>;
}

/// Everything a record store persists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Tables {
    spots: Vec<Spot>,
    history: Vec<SpotHistory>,
}

impl Tables {
    fn record(&mut self, spot: &Spot, operation: HistoryOperation) {
        self.history.push(SpotHistory {
            id: Uuid::new_v4(),
            spot_id: spot.id,
            snapshot: spot.clone(),
            operation,
            created_at: Utc::now(),
        });
    }

    fn insert(&mut self, record: SpotRecord) -> Spot {
        let now = Utc::now();
        let spot = Spot {
            id: Uuid::new_v4(),
            record,
            created_at: now,
            updated_at: now,
        };
        self.spots.push(spot.clone());
        self.record(&spot, HistoryOperation::Insert);
        spot
    }

    fn update(&mut self, id: Uuid, record: SpotRecord) -> Result<Spot, StoreError> {
        let spot = self
            .spots
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StoreError::NotFound(id))?;
        spot.record = record;
        spot.updated_at = Utc::now();
        let spot = spot.clone();
        self.record(&spot, HistoryOperation::Update);
        Ok(spot)
    }

    fn delete(&mut self, id: Uuid) -> Result<(), StoreError> {
        let pos = self
            .spots
            .iter()
            .position(|s| s.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let spot = self.spots.remove(pos);
        self.record(&spot, HistoryOperation::Delete);
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Spot, StoreError> {
        self.spots
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn list(&self, order: OrderBy) -> Vec<Spot> {
        let mut spots = self.spots.clone();
        match order {
            OrderBy::CreatedDesc => spots.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            OrderBy::CreatedAsc => spots.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            OrderBy::RatingDesc => spots.sort_by(|a, b| {
                b.record
                    .rating
                    .cmp(&a.record.rating)
                    .then(b.created_at.cmp(&a.created_at))
            }),
        }
        spots
    }

    fn history(&self, spot_id: Uuid) -> Vec<SpotHistory> {
        self.history
            .iter()
            .filter(|h| h.spot_id == spot_id)
            .cloned()
            .collect()
    }
}

/// Record store held in memory.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    tables: Tables,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tables.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.spots.is_empty()
    }
}

impl RecordStore for MemoryRecordStore {
    fn insert(&mut self, record: SpotRecord) -> Result<Spot, StoreError> {
        Ok(self.tables.insert(record))
    }

    fn update(&mut self, id: Uuid, record: SpotRecord) -> Result<Spot, StoreError> {
        self.tables.update(id, record)
    }

    fn delete(&mut self, id: Uuid) -> Result<(), StoreError> {
        self.tables.delete(id)
    }

    fn get(&self, id: Uuid) -> Result<Spot, StoreError> {
        self.tables.get(id)
    }

    fn list(&self, order: OrderBy) -> Result<Vec<Spot>, StoreError> {
        Ok(self.tables.list(order))
    }

    fn history(&self, spot_id: Uuid) -> Result<Vec<SpotHistory>, StoreError> {
        Ok(self.tables.history(spot_id))
    }
}

/// Record store persisted as one JSON document, rewritten on every change.
#[derive(Debug)]
pub struct JsonRecordStore {
    path: PathBuf,
    tables: Tables,
}

/// File name used inside a store directory.
pub const RECORDS_FILENAME: &str = "spots.json";

impl JsonRecordStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let tables = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            Tables::default()
        };
        Ok(Self { path, tables })
    }

    /// Open `<dir>/spots.json`.
    pub fn open_in(dir: &Path) -> Result<Self, StoreError> {
        Self::open(dir.join(RECORDS_FILENAME))
    }

    fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&self.tables)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Apply a change, persisting it; on a failed write the change is undone.
    fn commit<T>(
        &mut self,
        change: impl FnOnce(&mut Tables) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let before = self.tables.clone();
        let result = change(&mut self.tables)?;
        if let Err(e) = self.save() {
            self.tables = before;
            return Err(e);
        }
        Ok(result)
    }
}

impl RecordStore for JsonRecordStore {
    fn insert(&mut self, record: SpotRecord) -> Result<Spot, StoreError> {
        self.commit(|t| Ok(t.insert(record)))
    }

    fn update(&mut self, id: Uuid, record: SpotRecord) -> Result<Spot, StoreError> {
        self.commit(|t| t.update(id, record))
    }

    fn delete(&mut self, id: Uuid) -> Result<(), StoreError> {
        self.commit(|t| t.delete(id))
    }

    fn get(&self, id: Uuid) -> Result<Spot, StoreError> {
        self.tables.get(id)
    }

    fn list(&self, order: OrderBy) -> Result<Vec<Spot>, StoreError> {
        Ok(self.tables.list(order))
    }

    fn history(&self, spot_id: Uuid) -> Result<Vec<SpotHistory>, StoreError> {
        Ok(self.tables.history(spot_id))
    }
}
