//! MoveTask command

use crate::error::{KanbanError, Result};
use crate::operation::{Execute, StoreContext};
use crate::types::{TaskId, TaskPatch, TaskStatus};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Move a task to a column at a new order key.
///
/// Writes only the moved task's `status` and `order`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveTask {
    pub id: TaskId,
    pub status: TaskStatus,
    pub order: f64,
}

impl MoveTask {
    pub fn new(id: impl Into<TaskId>, status: TaskStatus, order: f64) -> Self {
        Self {
            id: id.into(),
            status,
            order,
        }
    }
}

#[async_trait]
impl Execute for MoveTask {
    fn verb(&self) -> &'static str {
        "move"
    }

    fn noun(&self) -> &'static str {
        "task"
    }

    async fn execute(&self, ctx: &StoreContext) -> Result<Value> {
        if !self.order.is_finite() {
            return Err(KanbanError::invalid_value("order", "must be finite"));
        }
        ctx.store()
            .update_task(
                ctx.owner(),
                &self.id,
                TaskPatch::placement(self.status, self.order),
            )
            .await?;
        Ok(serde_json::json!({
            "id": self.id,
            "status": self.status,
            "order": self.order,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::types::{NewTask, UserId};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_move_task_to_column() {
        let store = Arc::new(MemoryStore::new());
        let ctx = StoreContext::new(store.clone(), UserId::from("u1"));
        let id = ctx
            .store()
            .add_task(ctx.owner(), NewTask::new("Task", TaskStatus::Todo, 1000.0))
            .await
            .unwrap();

        let result = MoveTask::new(id, TaskStatus::Completed, 500.0)
            .execute(&ctx)
            .await
            .unwrap();

        assert_eq!(result["status"], "completed");
        let task = &store.tasks(ctx.owner())[0];
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.order, 500.0);
    }

    #[tokio::test]
    async fn test_move_rejects_nan_order() {
        let store = Arc::new(MemoryStore::new());
        let ctx = StoreContext::new(store.clone(), UserId::from("u1"));

        let result = MoveTask::new("t", TaskStatus::Todo, f64::NAN).execute(&ctx).await;
        assert!(matches!(result, Err(KanbanError::InvalidValue { .. })));
        assert_eq!(store.writes(), 0);
    }
}
