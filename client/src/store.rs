//! Keyed collection store
//!
//! Emulates an append-only list of records on top of a flat key/value
//! backend. Each collection has one index entry holding the ordered member
//! ids and one entry per member. Appends write the member first and the
//! index second, so an index entry never points at a record that was not
//! written. The index update is a plain read-modify-write: concurrent
//! appenders from different sessions can lose each other's index entry.
//!
//! Corrupt stored data never fails a read. A malformed index reads as an
//! empty collection and a malformed member reads as absent; both are
//! logged.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use mood_museum_core::models::{encode_index, parse_index, Collection, ExhibitRecord, MoodRecord, Record};
use mood_museum_core::CoreError;

use crate::backend::KvBackend;
use crate::error::Result;

/// List-of-records abstraction over a backend
#[async_trait]
pub trait KeyedCollectionStore: Send + Sync {
    /// Ids in the collection's index, in append order
    async fn list_ids(&self, collection: Collection) -> Result<Vec<String>>;

    /// One member record, or `None` if absent or unreadable
    async fn read_record(&self, collection: Collection, id: &str) -> Result<Option<Record>>;

    /// All readable members, newest first
    async fn read_all(&self, collection: Collection) -> Result<Vec<Record>>;

    /// Write a record and add its id to the index
    ///
    /// Mood entries hold only the encoded payload, so a mood's
    /// `created_at` is not stored: reads recover it from the id's
    /// millisecond field, and ids outside the `<kind>-<millis>-<suffix>`
    /// scheme read back with the Unix epoch.
    async fn append_record(&self, collection: Collection, record: &Record) -> Result<()>;

    /// Add ids whose records exist but are missing from the index
    ///
    /// Returns the ids that were added back.
    async fn reconcile_index(&self, collection: Collection, ids: &[String]) -> Result<Vec<String>>;
}

/// Store implementation over any `KvBackend`
pub struct KvCollectionStore<B: ?Sized> {
    backend: Arc<B>,
}

impl<B: KvBackend + ?Sized> KvCollectionStore<B> {
    /// Create a store over `backend`
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// The underlying backend
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    async fn write_index(&self, collection: Collection, ids: &[String]) -> Result<()> {
        self.backend
            .set_data(&collection.index_key(), encode_index(ids)?)
            .await?;
        Ok(())
    }
}

impl<B: ?Sized> Clone for KvCollectionStore<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

/// Sort records newest first, keeping index order among equal times
pub fn sort_newest_first(records: &mut [Record]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// All readable exhibits, newest first
pub async fn read_exhibits<S: KeyedCollectionStore + ?Sized>(store: &S) -> Result<Vec<ExhibitRecord>> {
    Ok(typed(store.read_all(Collection::Exhibit).await?))
}

/// All readable moods, newest first
pub async fn read_moods<S: KeyedCollectionStore + ?Sized>(store: &S) -> Result<Vec<MoodRecord>> {
    Ok(typed(store.read_all(Collection::Mood).await?))
}

fn typed<T>(records: Vec<Record>) -> Vec<T>
where
    T: TryFrom<Record, Error = CoreError>,
{
    records
        .into_iter()
        .filter_map(|record| {
            let id = record.id.clone();
            T::try_from(record)
                .map_err(|e| error!("Dropping unreadable record {}: {}", id, e))
                .ok()
        })
        .collect()
}

#[async_trait]
impl<B: KvBackend + ?Sized> KeyedCollectionStore for KvCollectionStore<B> {
    async fn list_ids(&self, collection: Collection) -> Result<Vec<String>> {
        let bytes = self.backend.get_data(&collection.index_key()).await?;
        if bytes.is_empty() {
            return Ok(Vec::new());
        }

        match parse_index(&bytes) {
            Ok(ids) => Ok(ids),
            Err(e) => {
                error!("Error parsing {} index, treating as empty: {}", collection, e);
                Ok(Vec::new())
            }
        }
    }

    async fn read_record(&self, collection: Collection, id: &str) -> Result<Option<Record>> {
        let bytes = self.backend.get_data(&collection.record_key(id)).await?;
        if bytes.is_empty() {
            debug!("{} {} is indexed but not visible yet", collection, id);
            return Ok(None);
        }

        match Record::from_bytes(collection, id, &bytes) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                error!("Error parsing {} data for {}: {}", collection, id, e);
                Ok(None)
            }
        }
    }

    async fn read_all(&self, collection: Collection) -> Result<Vec<Record>> {
        let ids = self.list_ids(collection).await?;

        let mut records = Vec::with_capacity(ids.len());
        for id in &ids {
            match self.read_record(collection, id).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => error!("Error loading {} {}: {}", collection, id, e),
            }
        }

        sort_newest_first(&mut records);
        debug!("Loaded {} of {} indexed {} records", records.len(), ids.len(), collection);
        Ok(records)
    }

    async fn append_record(&self, collection: Collection, record: &Record) -> Result<()> {
        // Record first: an index entry must never precede its record
        self.backend
            .set_data(&collection.record_key(&record.id), record.to_bytes(collection)?)
            .await?;

        let mut ids = self.list_ids(collection).await.map_err(|e| {
            warn!("{} {} written but index could not be read: {}", collection, record.id, e);
            e
        })?;

        if ids.iter().any(|id| id == &record.id) {
            debug!("{} {} already indexed", collection, record.id);
            return Ok(());
        }

        ids.push(record.id.clone());
        self.write_index(collection, &ids).await.map_err(|e| {
            warn!("{} {} written but not indexed (orphan): {}", collection, record.id, e);
            e
        })?;

        info!("Appended {} {} ({} indexed)", collection, record.id, ids.len());
        Ok(())
    }

    async fn reconcile_index(&self, collection: Collection, ids: &[String]) -> Result<Vec<String>> {
        let mut indexed = self.list_ids(collection).await?;

        let mut added = Vec::new();
        for id in ids {
            if indexed.contains(id) || added.contains(id) {
                continue;
            }
            if self.read_record(collection, id).await?.is_some() {
                added.push(id.clone());
            }
        }

        if !added.is_empty() {
            indexed.extend(added.iter().cloned());
            self.write_index(collection, &indexed).await?;
            info!("Re-indexed {} orphaned {} records", added.len(), collection);
        }

        Ok(added)
    }
}
