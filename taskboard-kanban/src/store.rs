//! Live collection store capability.
//!
//! The store is the single source of truth for an owner's Tasks and Tags.
//! Subscriptions deliver the full, ordered result set after every change;
//! only the latest snapshot matters, so they are backed by `watch` channels.

use crate::types::{NewTag, NewTask, Tag, TagId, Task, TaskId, TaskPatch, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Result type for store calls
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failures reported by the store
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Network or backend outage
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("permission denied")]
    PermissionDenied,

    #[error("quota exceeded")]
    QuotaExceeded,

    /// Document does not exist in the owner's collection
    #[error("{collection} document not found: {id}")]
    NotFound {
        collection: &'static str,
        id: String,
    },

    /// The store refused the write for another reason
    #[error("write rejected: {0}")]
    Rejected(String),
}

/// One write inside an atomic batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum BatchOp {
    UpdateTask { id: TaskId, patch: TaskPatch },
    /// Remove one id from a task's tag set, leaving other tags untouched
    RemoveTaskTag { task: TaskId, tag: TagId },
    DeleteTag { id: TagId },
}

/// Writes committed together: either all apply or none do
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_task(mut self, id: TaskId, patch: TaskPatch) -> Self {
        self.ops.push(BatchOp::UpdateTask { id, patch });
        self
    }

    pub fn remove_task_tag(mut self, task: TaskId, tag: TagId) -> Self {
        self.ops.push(BatchOp::RemoveTaskTag { task, tag });
        self
    }

    pub fn delete_tag(mut self, id: TagId) -> Self {
        self.ops.push(BatchOp::DeleteTag { id });
        self
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// A live query handle.
///
/// Holds the receiving side of the store's snapshot channel. Releasing it
/// (explicitly, by cancelling its token, or by dropping it) stops delivery:
/// after release no snapshot is ever observed through this handle.
#[derive(Debug)]
pub struct Subscription<T> {
    rx: watch::Receiver<T>,
    token: CancellationToken,
}

impl<T: Clone> Subscription<T> {
    /// Wrap a receiver. The current value counts as an unseen snapshot.
    pub fn new(mut rx: watch::Receiver<T>, token: CancellationToken) -> Self {
        rx.mark_changed();
        Self { rx, token }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_released(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The latest snapshot if one arrived since the last read
    pub fn take_latest(&mut self) -> Option<T> {
        if self.is_released() {
            return None;
        }
        match self.rx.has_changed() {
            Ok(true) => Some(self.rx.borrow_and_update().clone()),
            _ => None,
        }
    }

    /// Wait for the next snapshot. `None` once released or the store hung up.
    pub async fn changed(&mut self) -> Option<T> {
        if self.is_released() {
            return None;
        }
        tokio::select! {
            _ = self.token.cancelled() => None,
            res = self.rx.changed() => match res {
                Ok(()) => Some(self.rx.borrow_and_update().clone()),
                Err(_) => None,
            },
        }
    }

    /// Stop receiving snapshots
    pub fn release(self) {
        self.token.cancel();
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Per-owner document store with Tasks and Tags collections
#[async_trait]
pub trait LiveCollectionStore: Send + Sync {
    /// Create a task; the store assigns its id and creation time
    async fn add_task(&self, owner: &UserId, fields: NewTask) -> StoreResult<TaskId>;

    async fn update_task(&self, owner: &UserId, id: &TaskId, patch: TaskPatch)
        -> StoreResult<()>;

    async fn delete_task(&self, owner: &UserId, id: &TaskId) -> StoreResult<()>;

    /// Create a tag; the store assigns its id and creation time
    async fn add_tag(&self, owner: &UserId, fields: NewTag) -> StoreResult<TagId>;

    async fn delete_tag(&self, owner: &UserId, id: &TagId) -> StoreResult<()>;

    /// Apply every op of the batch atomically
    async fn commit(&self, owner: &UserId, batch: WriteBatch) -> StoreResult<()>;

    /// Live task list ordered by `order` ascending
    fn subscribe_tasks(&self, owner: &UserId, token: CancellationToken)
        -> Subscription<Vec<Task>>;

    /// Live tag list ordered by `createdAt` ascending
    fn subscribe_tags(&self, owner: &UserId, token: CancellationToken) -> Subscription<Vec<Tag>>;
}
