//! ReorderColumn command

use crate::error::Result;
use crate::operation::{Execute, StoreContext};
use crate::store::WriteBatch;
use crate::types::{TaskId, TaskPatch, TaskStatus};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Renumber a whole column in one atomic batch while placing a moved task.
///
/// Issued only when midpoint keys have run out of precision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReorderColumn {
    pub status: TaskStatus,
    /// The task whose drop triggered the renumbering
    pub moving: TaskId,
    /// New keys in final column order
    pub entries: Vec<(TaskId, f64)>,
}

impl ReorderColumn {
    pub fn new(status: TaskStatus, moving: TaskId, entries: Vec<(TaskId, f64)>) -> Self {
        Self {
            status,
            moving,
            entries,
        }
    }

    fn batch(&self) -> WriteBatch {
        self.entries
            .iter()
            .fold(WriteBatch::new(), |batch, (id, order)| {
                let patch = if id == &self.moving {
                    TaskPatch::placement(self.status, *order)
                } else {
                    TaskPatch {
                        order: Some(*order),
                        ..TaskPatch::default()
                    }
                };
                batch.update_task(id.clone(), patch)
            })
    }
}

#[async_trait]
impl Execute for ReorderColumn {
    fn verb(&self) -> &'static str {
        "reorder"
    }

    fn noun(&self) -> &'static str {
        "column"
    }

    async fn execute(&self, ctx: &StoreContext) -> Result<Value> {
        let batch = self.batch();
        let count = batch.len();
        ctx.store().commit(ctx.owner(), batch).await?;
        Ok(serde_json::json!({
            "column": self.status,
            "renumbered": count,
        }))
    }
}
