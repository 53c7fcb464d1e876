//! services/api/src/adapters/firestore.rs
//!
//! Live queries over the Firestore REST API. The first snapshot is fetched
//! while subscribing; afterwards the query is re-run on an interval and a new
//! snapshot is pushed only when the result set changed.

use async_trait::async_trait;
use school_portal_core::ports::{LiveQueryService, PortError, PortResult};
use school_portal_core::{LiveQuery, Record, Snapshot, Subscription};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::adapters::firebase::FirebaseClient;

#[derive(Deserialize)]
struct RunQueryItem {
    #[serde(default)]
    document: Option<FirestoreDocument>,
}

#[derive(Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

fn structured_query(query: &LiveQuery) -> Value {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": query.collection }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": query.field },
                    "op": "EQUAL",
                    "value": { "stringValue": query.equals }
                }
            }
        }
    })
}

/// Unwraps a typed Firestore value (`{"stringValue": "x"}`) into plain JSON.
fn decode_value(value: &Value) -> Value {
    let Some(obj) = value.as_object() else {
        return value.clone();
    };
    if let Some(s) = obj.get("stringValue") {
        return s.clone();
    }
    if let Some(b) = obj.get("booleanValue") {
        return b.clone();
    }
    if let Some(i) = obj.get("integerValue") {
        // Integers arrive as strings.
        return i
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Value::from)
            .unwrap_or_else(|| i.clone());
    }
    if let Some(d) = obj.get("doubleValue") {
        return d.clone();
    }
    if obj.contains_key("nullValue") {
        return Value::Null;
    }
    value.clone()
}

fn to_record(document: FirestoreDocument) -> Record {
    let id = document
        .name
        .rsplit('/')
        .next()
        .unwrap_or(&document.name)
        .to_string();
    let fields = document
        .fields
        .iter()
        .map(|(k, v)| (k.clone(), decode_value(v)))
        .collect();
    Record { id, fields }
}

/// Turns a `runQuery` response into a snapshot ordered by document id.
fn parse_run_query(items: Vec<RunQueryItem>) -> Snapshot {
    let mut snapshot: Snapshot = items
        .into_iter()
        .filter_map(|item| item.document)
        .map(to_record)
        .collect();
    snapshot.sort_by(|a, b| a.id.cmp(&b.id));
    snapshot
}

/// An adapter that implements `LiveQueryService` against Firestore.
#[derive(Clone)]
pub struct FirestoreLiveQuery {
    client: FirebaseClient,
    poll_interval: Duration,
}

impl FirestoreLiveQuery {
    /// Creates a new `FirestoreLiveQuery`.
    pub fn new(client: FirebaseClient, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
        }
    }

    async fn run_query(&self, query: &LiveQuery) -> PortResult<Snapshot> {
        let endpoint = self
            .client
            .run_query_endpoint()
            .ok_or_else(|| PortError::Unexpected("no Firestore project configured".to_string()))?;
        let mut request = self.client.http().post(endpoint).json(&structured_query(query));
        if let Some(key) = self.client.api_key() {
            request = request.query(&[("key", key)]);
        }
        let response = request
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        if !response.status().is_success() {
            return Err(PortError::Unexpected(format!(
                "runQuery on {} returned {}",
                query.collection,
                response.status()
            )));
        }
        let items: Vec<RunQueryItem> = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(parse_run_query(items))
    }
}

#[async_trait]
impl LiveQueryService for FirestoreLiveQuery {
    async fn watch(&self, query: LiveQuery) -> PortResult<Subscription> {
        let first = self.run_query(&query).await?;
        debug!(
            "Watching {} where {} == {} ({} initial record(s))",
            query.collection,
            query.field,
            query.equals,
            first.len()
        );

        let this = self.clone();
        let snapshots = async_stream::stream! {
            let mut last = first.clone();
            yield first;
            loop {
                tokio::time::sleep(this.poll_interval).await;
                match this.run_query(&query).await {
                    Ok(snapshot) if snapshot != last => {
                        last = snapshot.clone();
                        yield snapshot;
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Polling {} failed: {}", query.collection, e),
                }
            }
        };
        Ok(Subscription::from_stream(snapshots))
    }
}
