//! Document store adapter: point reads/writes, deletes, and live
//! full-snapshot subscriptions.
//!
//! The store is the single source of truth for all shared state and the
//! sole arbiter of write ordering. Per-document writes are last-write-wins;
//! there is no compare-and-swap. Subscriptions deliver the *entire* current
//! collection or document on every change (at-least-once), so consumers
//! must treat each notification as a full replace of their cached view.
//!
//! All operations may fail with a transient [`StoreError::Unavailable`];
//! no automatic retry is built in — failures surface to the caller.

pub mod memory;

pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};

/// A stored document. The store does not interpret document contents.
pub type Document = serde_json::Value;

/// Full contents of a collection, keyed by document id.
///
/// Backed by `im::HashMap` so snapshots handed to subscribers clone in O(1).
pub type CollectionSnapshot = im::HashMap<String, Document>;

/// Callback invoked with the full collection contents on every change.
pub type CollectionCallback = Box<dyn Fn(&CollectionSnapshot) + Send + Sync>;

/// Callback invoked with the full document (or `None` if absent) on every
/// change.
pub type DocumentCallback = Box<dyn Fn(Option<&Document>) + Send + Sync>;

/// Handle for an active subscription, released via
/// [`DocumentStore::unsubscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Store-assigned timestamp: a monotonic tick, not wall-clock time.
///
/// Used only for display and audit, never for ordering logic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub u64);

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Transient store failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached; the operation had no effect.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Shared document store: key-value/document storage with per-document
/// read/write/delete, collection-wide read, and subscription-based change
/// feeds.
///
/// ## Write Semantics
///
/// `put` with `merge = true` performs a shallow top-level field merge into
/// the existing document (creating it if absent); `merge = false` replaces
/// the document wholesale. Concurrent writers to the same document resolve
/// last-write-wins at the store.
///
/// ## Subscriptions
///
/// Callbacks fire immediately with the current state on registration, and
/// again with the full state after every subsequent change. They must not
/// assume exactly-once delivery.
pub trait DocumentStore: Send + Sync {
    /// Read a single document, `None` if absent.
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Read the full contents of a collection.
    fn get_all(&self, collection: &str) -> Result<CollectionSnapshot, StoreError>;

    /// Write a document, merging or replacing per `merge`.
    fn put(
        &self,
        collection: &str,
        id: &str,
        document: Document,
        merge: bool,
    ) -> Result<(), StoreError>;

    /// Delete a document. Deleting an absent document is a no-op.
    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Subscribe to a collection's change feed.
    fn subscribe_collection(
        &self,
        collection: &str,
        callback: CollectionCallback,
    ) -> SubscriptionId;

    /// Subscribe to a single document's change feed.
    fn subscribe_document(
        &self,
        collection: &str,
        id: &str,
        callback: DocumentCallback,
    ) -> SubscriptionId;

    /// Release a subscription. Unknown ids are ignored.
    fn unsubscribe(&self, subscription: SubscriptionId);

    /// Next store-assigned timestamp, monotonic across calls.
    fn server_timestamp(&self) -> Timestamp;
}
