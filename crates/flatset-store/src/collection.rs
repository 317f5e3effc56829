//! The [`Collection`]: an in-memory item set mirrored to a JSON file.
//!
//! Mutating and file-touching operations return a [`Pending`] future and are
//! enqueued at call time, so their effects follow call order even when the
//! futures are awaited out of order. Read-only helpers (`get_all_items`,
//! `deep_search`, `search_by_path`) look at memory directly and never fail.

use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use flatset_queue::{OperationQueue, Pending};
use flatset_search::{search, SearchOptions, SearchResult, SearchTerm};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::file::FileStorage;
use crate::id::{IdSource, UuidIdSource};
use crate::set::RecordSet;
use crate::traits::TextStorage;
use crate::validator::Validator;

/// Name of the identifier field filled in for items that lack one.
pub const ID_FIELD: &str = "id";

/// Bounds every stored item type must meet.
pub trait Item: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> Item for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

/// Builder for a [`Collection`] over an arbitrary [`TextStorage`].
pub struct CollectionBuilder<T> {
    storage: Arc<dyn TextStorage>,
    validator: Validator,
    ids: Arc<dyn IdSource>,
    pretty: bool,
    _item: PhantomData<fn() -> T>,
}

impl<T: Item> CollectionBuilder<T> {
    pub fn new(storage: Arc<dyn TextStorage>, validator: Validator) -> Self {
        Self {
            storage,
            validator,
            ids: Arc::new(UuidIdSource),
            pretty: true,
            _item: PhantomData,
        }
    }

    /// Replace the default UUID v7 id source.
    pub fn id_source(mut self, ids: Arc<dyn IdSource>) -> Self {
        self.ids = ids;
        self
    }

    /// Pretty-print (default) or compact JSON on save.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn build(self) -> Collection<T> {
        Collection {
            inner: Arc::new(Inner {
                records: RwLock::new(RecordSet::default()),
                storage: self.storage,
                validator: self.validator,
                ids: self.ids,
                pretty: self.pretty,
                queue: OperationQueue::new(),
            }),
        }
    }
}

/// An insertion-ordered set of validated items backed by one JSON file.
///
/// Cloning yields another handle to the same collection and queue.
pub struct Collection<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    records: RwLock<RecordSet<T>>,
    storage: Arc<dyn TextStorage>,
    validator: Validator,
    ids: Arc<dyn IdSource>,
    pretty: bool,
    queue: OperationQueue,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Item> Collection<T> {
    /// A file-backed collection configured by `config`. Nothing is read
    /// until [`load_batch`](Self::load_batch) is called.
    pub fn open(config: &StoreConfig, validator: Validator) -> Self {
        Self::builder(Arc::new(FileStorage::from_config(config)), validator)
            .pretty(config.pretty)
            .build()
    }

    pub fn builder(storage: Arc<dyn TextStorage>, validator: Validator) -> CollectionBuilder<T> {
        CollectionBuilder::new(storage, validator)
    }

    // ---------------------------------------------------------------
    // Queued operations
    // ---------------------------------------------------------------

    /// Read the backing file and admit every valid element.
    ///
    /// A missing file counts as an empty array. Invalid elements are logged
    /// and skipped; elements already present are not duplicated. Resolves to
    /// the number of items newly added.
    pub fn load_batch(&self) -> Pending<usize, StoreError> {
        let inner = Arc::clone(&self.inner);
        self.inner.queue.enqueue(move || async move { inner.load().await })
    }

    /// Overwrite the backing file with the full in-memory set.
    pub fn save_batch(&self) -> Pending<(), StoreError> {
        let inner = Arc::clone(&self.inner);
        self.inner.queue.enqueue(move || async move { inner.persist().await })
    }

    /// Assign an id if missing, validate, insert and persist.
    ///
    /// Resolves to the item decoded from its stored record, which carries the
    /// id. An invalid item fails with [`StoreError::Validation`] and changes
    /// nothing; a generated id that `T`'s `id` field cannot hold fails with
    /// [`StoreError::IdRejected`]. If the persist fails the item stays in
    /// memory and the error is returned.
    pub fn add_item(&self, item: T) -> Pending<T, StoreError> {
        let inner = Arc::clone(&self.inner);
        self.inner.queue.enqueue(move || async move {
            let (record, stored) = inner
                .prepare(&item)
                .inspect_err(|err| warn!(error = %err, "invalid item"))?;
            inner.insert_all(vec![(record, stored.clone())]);
            inner.persist().await?;
            Ok::<_, StoreError>(stored)
        })
    }

    /// Assign ids, keep the valid subset, insert it and persist once.
    ///
    /// Resolves to the size of the valid subset. Invalid items are logged and
    /// dropped. If no item is valid the call fails with
    /// [`StoreError::EmptyBatch`] without persisting; an empty input is a
    /// no-op resolving to `0`.
    pub fn add_items(&self, items: Vec<T>) -> Pending<usize, StoreError> {
        let inner = Arc::clone(&self.inner);
        self.inner.queue.enqueue(move || async move {
            if items.is_empty() {
                return Ok(0);
            }

            let total = items.len();
            let valid: Vec<(Value, T)> = items
                .iter()
                .filter_map(|item| {
                    match inner.prepare(item) {
                        Ok(record) => Some(record),
                        Err(err) => {
                            warn!(error = %err, "dropping invalid item from batch");
                            None
                        }
                    }
                })
                .collect();

            if valid.is_empty() {
                warn!(total, "no valid items in the batch");
                return Err(StoreError::EmptyBatch { rejected: total });
            }

            let accepted = valid.len();
            inner.insert_all(valid);
            inner.persist().await?;
            debug!(accepted, rejected = total - accepted, "batch added");
            Ok::<_, StoreError>(accepted)
        })
    }

    // ---------------------------------------------------------------
    // Direct reads
    // ---------------------------------------------------------------

    /// Snapshot of every item in insertion order.
    pub fn get_all_items(&self) -> Vec<T> {
        self.inner.read().items().cloned().collect()
    }

    /// Items for which `predicate` holds.
    pub fn deep_search<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        self.inner
            .read()
            .items()
            .filter(|item| predicate(item))
            .cloned()
            .collect()
    }

    /// Items with at least one deep-search match for `term`.
    ///
    /// `stop_on_first_match` applies within each item; every item is still
    /// examined.
    pub fn search_by_path(&self, term: &SearchTerm, options: &SearchOptions) -> Vec<T> {
        self.search_matches(term, options)
            .into_iter()
            .map(|(item, _)| item)
            .collect()
    }

    /// Like [`search_by_path`](Self::search_by_path), paired with the matches
    /// found inside each item.
    pub fn search_matches(
        &self,
        term: &SearchTerm,
        options: &SearchOptions,
    ) -> Vec<(T, Vec<SearchResult>)> {
        self.inner
            .read()
            .iter()
            .filter_map(|record| {
                let results = search(&record.value, term, options);
                (!results.is_empty()).then(|| (record.item.clone(), results))
            })
            .collect()
    }

    /// Number of items held in memory.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns `true` if no items are held in memory.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Where the collection is persisted.
    pub fn location(&self) -> String {
        self.inner.storage.location()
    }
}

impl<T: Item> Inner<T> {
    fn read(&self) -> RwLockReadGuard<'_, RecordSet<T>> {
        self.records.read().expect("collection lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, RecordSet<T>> {
        self.records.write().expect("collection lock poisoned")
    }

    async fn load(&self) -> StoreResult<usize> {
        let location = self.storage.location();
        let Some(text) = self.storage.read_text().await? else {
            info!(location = %location, "no backing file, starting empty");
            return Ok(0);
        };

        let elements: Vec<Value> = serde_json::from_str(&text).map_err(StoreError::Parse)?;
        let total = elements.len();
        let valid: Vec<(Value, T)> = elements
            .into_iter()
            .filter_map(|element| match self.validate(&element) {
                Ok(item) => Some((element, item)),
                Err(err) => {
                    warn!(error = %err, "skipping invalid item on load");
                    None
                }
            })
            .collect();
        let rejected = total - valid.len();

        let added = self.insert_all(valid);
        info!(location = %location, added, rejected, "collection loaded");
        Ok(added)
    }

    async fn persist(&self) -> StoreResult<()> {
        let text = {
            let records = self.read();
            let values: Vec<&Value> = records.values().collect();
            let encoded = if self.pretty {
                serde_json::to_string_pretty(&values)
            } else {
                serde_json::to_string(&values)
            };
            encoded.map_err(|e| StoreError::Serialization(e.to_string()))?
        };
        self.storage.write_text(&text).await?;
        debug!(location = %self.storage.location(), bytes = text.len(), "collection saved");
        Ok(())
    }

    /// JSON record and typed item for a new addition.
    ///
    /// The record is what gets persisted and compared, so a generated id
    /// survives even when `T` has no field for it.
    fn prepare(&self, item: &T) -> StoreResult<(Value, T)> {
        let (record, generated) = self.assign_id(item)?;
        self.check(&record)?;
        let stored = self.decode(&record).map_err(|err| match &generated {
            Some(id) if self.decodes_without_id(&record) => StoreError::IdRejected {
                id: id.to_string(),
                reason: err.to_string(),
            },
            _ => err,
        })?;
        Ok((record, stored))
    }

    /// JSON form of `item`, with a generated id when `id` is absent or null.
    /// Also returns the generated id, if any.
    fn assign_id(&self, item: &T) -> StoreResult<(Value, Option<Value>)> {
        let mut value =
            serde_json::to_value(item).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let mut generated = None;
        if let Value::Object(map) = &mut value {
            if map.get(ID_FIELD).map_or(true, Value::is_null) {
                let id = self.ids.next_value();
                map.insert(ID_FIELD.to_string(), id.clone());
                generated = Some(id);
            }
        }
        Ok((value, generated))
    }

    /// Run the validator, then decode the JSON form as `T`.
    fn validate(&self, candidate: &Value) -> StoreResult<T> {
        self.check(candidate)?;
        self.decode(candidate)
    }

    fn check(&self, candidate: &Value) -> StoreResult<()> {
        if (self.validator)(candidate) {
            Ok(())
        } else {
            Err(StoreError::Validation {
                item: candidate.to_string(),
                reason: "validator refused".to_string(),
            })
        }
    }

    fn decode(&self, candidate: &Value) -> StoreResult<T> {
        T::deserialize(candidate).map_err(|e| StoreError::Validation {
            item: candidate.to_string(),
            reason: e.to_string(),
        })
    }

    fn decodes_without_id(&self, candidate: &Value) -> bool {
        let mut bare = candidate.clone();
        if let Value::Object(map) = &mut bare {
            map.remove(ID_FIELD);
        }
        T::deserialize(&bare).is_ok()
    }

    /// Insert records not already present. Returns how many were new.
    fn insert_all(&self, records: Vec<(Value, T)>) -> usize {
        let mut set = self.write();
        let mut added = 0;
        for (value, item) in records {
            if set.insert(value, item) {
                added += 1;
            }
        }
        added
    }
}

impl<T> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.inner.records.read().map(|set| set.len()).unwrap_or_default();
        f.debug_struct("Collection")
            .field("storage", &self.inner.storage)
            .field("items", &count)
            .field("queue", &self.inner.queue)
            .finish()
    }
}
