//! crates/school_portal_core/src/memory.rs
//!
//! An in-process implementation of `LiveQueryService`. Every write pushes a fresh
//! snapshot to the subscribers whose predicate result changed.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::watch;
use tracing::debug;

use crate::domain::{LiveQuery, Record, Snapshot};
use crate::ports::{LiveQueryService, PortResult};
use crate::subscription::Subscription;

type Collections = HashMap<String, BTreeMap<String, Record>>;

pub struct InMemoryLiveQuery {
    data: watch::Sender<Collections>,
}

impl InMemoryLiveQuery {
    pub fn new() -> Self {
        let (data, _) = watch::channel(Collections::new());
        Self { data }
    }

    /// Inserts or replaces a record.
    pub fn put(&self, collection: &str, record: Record) {
        self.data.send_modify(|c| {
            c.entry(collection.to_string())
                .or_default()
                .insert(record.id.clone(), record);
        });
    }

    /// Deletes a record. Returns whether it existed.
    pub fn remove(&self, collection: &str, id: &str) -> bool {
        let mut removed = false;
        self.data.send_modify(|c| {
            removed = c
                .get_mut(collection)
                .map(|records| records.remove(id).is_some())
                .unwrap_or(false);
        });
        removed
    }

    /// The number of snapshot streams still attached to this store.
    pub fn active_watchers(&self) -> usize {
        self.data.receiver_count()
    }
}

impl Default for InMemoryLiveQuery {
    fn default() -> Self {
        Self::new()
    }
}

fn select(collections: &Collections, query: &LiveQuery) -> Snapshot {
    collections
        .get(&query.collection)
        .map(|records| {
            records
                .values()
                .filter(|r| query.matches(r))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl LiveQueryService for InMemoryLiveQuery {
    async fn watch(&self, query: LiveQuery) -> PortResult<Subscription> {
        debug!(
            "Watching {} where {} == {}",
            query.collection, query.field, query.equals
        );
        let mut rx = self.data.subscribe();
        let snapshots = async_stream::stream! {
            let mut last: Option<Snapshot> = None;
            loop {
                let snapshot = {
                    let collections = rx.borrow_and_update();
                    select(&collections, &query)
                };
                if last.as_ref() != Some(&snapshot) {
                    last = Some(snapshot.clone());
                    yield snapshot;
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
        };
        Ok(Subscription::from_stream(snapshots))
    }
}
