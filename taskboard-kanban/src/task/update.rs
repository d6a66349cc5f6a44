//! UpdateTask command

use crate::error::{KanbanError, Result};
use crate::operation::{Execute, StoreContext};
use crate::types::{TaskId, TaskPatch};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Edit fields of an existing task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateTask {
    pub id: TaskId,
    pub patch: TaskPatch,
}

impl UpdateTask {
    pub fn new(id: impl Into<TaskId>, patch: TaskPatch) -> Self {
        Self {
            id: id.into(),
            patch,
        }
    }
}

#[async_trait]
impl Execute for UpdateTask {
    fn verb(&self) -> &'static str {
        "update"
    }

    fn noun(&self) -> &'static str {
        "task"
    }

    async fn execute(&self, ctx: &StoreContext) -> Result<Value> {
        let mut patch = self.patch.clone();
        if let Some(title) = &patch.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(KanbanError::missing_field("title"));
            }
            patch.title = Some(title.to_string());
        }
        if patch.order.is_some_and(|o| !o.is_finite()) {
            return Err(KanbanError::invalid_value("order", "must be finite"));
        }
        if patch.is_empty() {
            return Ok(serde_json::json!({ "id": self.id, "updated": false }));
        }

        ctx.store()
            .update_task(ctx.owner(), &self.id, patch)
            .await?;
        Ok(serde_json::json!({ "id": self.id, "updated": true }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::StoreError;
    use crate::types::{NewTask, TaskStatus, UserId};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_update_title_and_due_date() {
        let store = Arc::new(MemoryStore::new());
        let ctx = StoreContext::new(store.clone(), UserId::from("u1"));
        let id = ctx
            .store()
            .add_task(ctx.owner(), NewTask::new("Old", TaskStatus::Todo, 1000.0))
            .await
            .unwrap();

        let due = chrono::NaiveDate::from_ymd_opt(2025, 6, 10);
        let patch = TaskPatch {
            title: Some(" New ".into()),
            due_date: Some(due),
            ..TaskPatch::default()
        };
        UpdateTask::new(id, patch).execute(&ctx).await.unwrap();

        let task = &store.tasks(ctx.owner())[0];
        assert_eq!(task.title, "New");
        assert_eq!(task.due_date, due);
    }

    #[tokio::test]
    async fn test_empty_patch_skips_store() {
        let store = Arc::new(MemoryStore::new());
        let ctx = StoreContext::new(store.clone(), UserId::from("u1"));

        let result = UpdateTask::new("t1", TaskPatch::default())
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(result["updated"], false);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_missing_task_is_store_error() {
        let store = Arc::new(MemoryStore::new());
        let ctx = StoreContext::new(store, UserId::from("u1"));

        let patch = TaskPatch::placement(TaskStatus::Todo, 1.0);
        let err = UpdateTask::new("ghost", patch).execute(&ctx).await.unwrap_err();
        assert!(matches!(
            err,
            KanbanError::Store(StoreError::NotFound { .. })
        ));
    }
}
