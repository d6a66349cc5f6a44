//! Command execution against the live collection store.
//!
//! Every store mutation is a small command struct implementing [`Execute`].
//! The board transition function emits [`Command`] values; the session runs
//! them against a [`StoreContext`].

use crate::error::Result;
use crate::store::LiveCollectionStore;
use crate::tag::{AddTag, DeleteTag};
use crate::task::{AddTask, DeleteTask, MoveTask, ReorderColumn, UpdateTask};
use crate::types::UserId;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Context passed to every command - the store and the owner it writes for
#[derive(Clone)]
pub struct StoreContext {
    store: Arc<dyn LiveCollectionStore>,
    owner: UserId,
}

impl StoreContext {
    pub fn new(store: Arc<dyn LiveCollectionStore>, owner: UserId) -> Self {
        Self { store, owner }
    }

    pub fn store(&self) -> &dyn LiveCollectionStore {
        self.store.as_ref()
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }
}

/// A store mutation
#[async_trait]
pub trait Execute: Send + Sync {
    /// Operation verb, e.g. "move"
    fn verb(&self) -> &'static str;

    /// Operation noun, e.g. "task"
    fn noun(&self) -> &'static str;

    /// "verb noun", used in logs
    fn op_string(&self) -> String {
        format!("{} {}", self.verb(), self.noun())
    }

    async fn execute(&self, ctx: &StoreContext) -> Result<Value>;
}

/// Every mutation the board can request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    AddTask(AddTask),
    UpdateTask(UpdateTask),
    MoveTask(MoveTask),
    ReorderColumn(ReorderColumn),
    DeleteTask(DeleteTask),
    AddTag(AddTag),
    DeleteTag(DeleteTag),
}

impl Command {
    fn inner(&self) -> &dyn Execute {
        match self {
            Self::AddTask(c) => c,
            Self::UpdateTask(c) => c,
            Self::MoveTask(c) => c,
            Self::ReorderColumn(c) => c,
            Self::DeleteTask(c) => c,
            Self::AddTag(c) => c,
            Self::DeleteTag(c) => c,
        }
    }
}

#[async_trait]
impl Execute for Command {
    fn verb(&self) -> &'static str {
        self.inner().verb()
    }

    fn noun(&self) -> &'static str {
        self.inner().noun()
    }

    async fn execute(&self, ctx: &StoreContext) -> Result<Value> {
        self.inner().execute(ctx).await
    }
}
