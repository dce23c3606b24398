use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::notification::{Notification, Notifier};

use super::query_cache::{Collection, QueryCache};

/// What a mutation does to its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    fn verb(&self) -> &'static str {
        match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        }
    }

    fn past_tense(&self) -> &'static str {
        match self {
            MutationKind::Create => "created",
            MutationKind::Update => "updated",
            MutationKind::Delete => "deleted",
        }
    }
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.verb())
    }
}

/// Lifecycle of one mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationStatus {
    Pending,
    Success,
    /// Failed; holds the message shown to the user.
    Error(String),
}

/// Bookkeeping for one mutation, keyed by its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub id: Uuid,
    pub collection: Collection,
    pub kind: MutationKind,
    pub status: MutationStatus,
}

/// Confirmation shown after a successful mutation, e.g. "Trade created successfully".
pub fn success_message(collection: Collection, kind: MutationKind) -> String {
    format!("{} {} successfully", collection.entity_name(), kind.past_tense())
}

/// Message used when a failure carries nothing better, e.g. "Failed to create trade.".
pub fn fallback_message(collection: Collection, kind: MutationKind) -> String {
    format!(
        "Failed to {} {}.",
        kind.verb(),
        collection.entity_name().to_lowercase()
    )
}

/// Runs create/update/delete calls: tracks their status, invalidates the
/// affected collection on success and tells the user how it went.
///
/// Mutations never wait on each other. Two racing mutations on one entity
/// both run; whichever response lands last is what the next read shows.
///
/// Only the most recent finished records are kept; pending ones are never
/// dropped.
pub struct MutationService {
    tracker: Arc<Tracker>,
}

/// Finished records kept for inspection before the oldest are forgotten.
pub const FINISHED_RETAINED: usize = 64;

struct Tracker {
    cache: Arc<QueryCache>,
    notifier: Arc<dyn Notifier>,
    records: Mutex<Records>,
}

#[derive(Default)]
struct Records {
    by_id: HashMap<Uuid, MutationRecord>,
    finished: VecDeque<Uuid>,
}

/// `Send` off the browser; futures there are single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSend: Send {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send> MaybeSend for T {}

#[cfg(target_arch = "wasm32")]
pub trait MaybeSend {}
#[cfg(target_arch = "wasm32")]
impl<T> MaybeSend for T {}

impl std::fmt::Debug for MutationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let records = self.tracker.lock();
        f.debug_struct("MutationService")
            .field("records", &records.by_id.len())
            .finish()
    }
}

impl MutationService {
    pub fn new(cache: Arc<QueryCache>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            tracker: Arc::new(Tracker {
                cache,
                notifier,
                records: Mutex::new(Records::default()),
            }),
        }
    }

    /// Run `operation` as a tracked mutation of `collection`.
    ///
    /// On success every cached read of the collection is invalidated and a
    /// confirmation is emitted; on failure an error notification with the
    /// server's explanation (or the fallback) is emitted. The result is
    /// returned unchanged either way.
    ///
    /// The operation runs as its own task: dropping the returned future
    /// (the user navigated away) does not cancel the request, and its
    /// outcome is still applied and announced. Natively this needs a Tokio
    /// runtime.
    pub async fn execute<T, Fut>(
        &self,
        collection: Collection,
        kind: MutationKind,
        operation: Fut,
    ) -> Result<T, CoreError>
    where
        T: MaybeSend + 'static,
        Fut: Future<Output = Result<T, CoreError>> + MaybeSend + 'static,
    {
        let tracker = self.tracker.clone();
        let id = tracker.begin(collection, kind);
        let task = async move {
            let result = operation.await;
            tracker.complete(id, collection, kind, &result);
            result
        };
        run_detached(id, task).await
    }

    pub fn status(&self, id: Uuid) -> Option<MutationStatus> {
        let records = self.tracker.lock();
        records.by_id.get(&id).map(|r| r.status.clone())
    }

    /// Snapshot of every tracked mutation.
    pub fn records(&self) -> Vec<MutationRecord> {
        let records = self.tracker.lock();
        records.by_id.values().cloned().collect()
    }

    /// True while any mutation of `collection` is awaiting the server.
    pub fn is_pending(&self, collection: Collection) -> bool {
        let records = self.tracker.lock();
        records
            .by_id
            .values()
            .any(|r| r.collection == collection && r.status == MutationStatus::Pending)
    }

    /// Forget every mutation that is no longer pending.
    pub fn prune_finished(&self) {
        let mut records = self.tracker.lock();
        let Records { by_id, finished } = &mut *records;
        for id in finished.drain(..) {
            by_id.remove(&id);
        }
    }
}

impl Tracker {
    fn lock(&self) -> std::sync::MutexGuard<'_, Records> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin(&self, collection: Collection, kind: MutationKind) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().by_id.insert(
            id,
            MutationRecord {
                id,
                collection,
                kind,
                status: MutationStatus::Pending,
            },
        );
        id
    }

    fn complete<T>(&self, id: Uuid, collection: Collection, kind: MutationKind, result: &Result<T, CoreError>) {
        let status = match result {
            Ok(_) => {
                self.cache.invalidate(collection);
                info!(mutation = %id, %collection, %kind, "mutation succeeded");
                self.notifier
                    .notify(Notification::success(success_message(collection, kind)));
                MutationStatus::Success
            }
            Err(e) => {
                let message = e.user_message(&fallback_message(collection, kind));
                warn!(mutation = %id, %collection, %kind, error = %e, "mutation failed");
                self.notifier.notify(Notification::error(message.clone()));
                MutationStatus::Error(message)
            }
        };
        self.finish(id, status);
    }

    fn finish(&self, id: Uuid, status: MutationStatus) {
        let mut records = self.lock();
        let Records { by_id, finished } = &mut *records;
        let Some(record) = by_id.get_mut(&id) else {
            return;
        };
        record.status = status;
        finished.push_back(id);
        while finished.len() > FINISHED_RETAINED {
            if let Some(oldest) = finished.pop_front() {
                by_id.remove(&oldest);
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
async fn run_detached<T, Fut>(id: Uuid, task: Fut) -> Result<T, CoreError>
where
    T: Send + 'static,
    Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
{
    match tokio::spawn(task).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => {
            warn!(mutation = %id, error = %e, "mutation task stopped before completing");
            Err(CoreError::Network(format!("mutation interrupted: {e}")))
        }
    }
}

// TODO: spawn onto the browser event loop once a wasm executor crate is
// part of the stack; until then the mutation lives in the caller's future.
#[cfg(target_arch = "wasm32")]
async fn run_detached<T, Fut>(_id: Uuid, task: Fut) -> Result<T, CoreError>
where
    Fut: Future<Output = Result<T, CoreError>>,
{
    task.await
}
