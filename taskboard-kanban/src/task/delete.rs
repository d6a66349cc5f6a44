//! DeleteTask command

use crate::error::Result;
use crate::operation::{Execute, StoreContext};
use crate::types::TaskId;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Delete a task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteTask {
    pub id: TaskId,
}

impl DeleteTask {
    pub fn new(id: impl Into<TaskId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute for DeleteTask {
    fn verb(&self) -> &'static str {
        "delete"
    }

    fn noun(&self) -> &'static str {
        "task"
    }

    async fn execute(&self, ctx: &StoreContext) -> Result<Value> {
        ctx.store().delete_task(ctx.owner(), &self.id).await?;
        Ok(serde_json::json!({
            "deleted": true,
            "id": self.id,
        }))
    }
}
