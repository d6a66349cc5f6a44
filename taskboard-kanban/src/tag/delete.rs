//! DeleteTag command

use crate::error::Result;
use crate::operation::{Execute, StoreContext};
use crate::store::WriteBatch;
use crate::types::{TagId, TaskId};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Delete a tag and remove it from every task that carries it.
///
/// The tag removal and the task updates are committed as one batch, so a
/// failure leaves both the tag and every reference in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteTag {
    pub id: TagId,
    /// Tasks currently referencing the tag
    pub tasks: Vec<TaskId>,
}

impl DeleteTag {
    pub fn new(id: impl Into<TagId>, tasks: Vec<TaskId>) -> Self {
        Self {
            id: id.into(),
            tasks,
        }
    }
}

#[async_trait]
impl Execute for DeleteTag {
    fn verb(&self) -> &'static str {
        "delete"
    }

    fn noun(&self) -> &'static str {
        "tag"
    }

    async fn execute(&self, ctx: &StoreContext) -> Result<Value> {
        let batch = self
            .tasks
            .iter()
            .fold(WriteBatch::new(), |batch, task| {
                batch.remove_task_tag(task.clone(), self.id.clone())
            })
            .delete_tag(self.id.clone());

        ctx.store().commit(ctx.owner(), batch).await?;

        Ok(serde_json::json!({
            "deleted": true,
            "id": self.id,
            "untagged": self.tasks.len(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KanbanError;
    use crate::memory::MemoryStore;
    use crate::store::StoreError;
    use crate::types::{NewTag, NewTask, TagColor, TaskStatus, UserId};
    use std::sync::Arc;

    async fn setup() -> (Arc<MemoryStore>, StoreContext, TagId, Vec<TaskId>) {
        let store = Arc::new(MemoryStore::new());
        let ctx = StoreContext::new(store.clone(), UserId::from("u1"));
        let tag = ctx
            .store()
            .add_tag(ctx.owner(), NewTag::new("urgent", TagColor::Red))
            .await
            .unwrap();
        let mut tasks = Vec::new();
        for title in ["t1", "t2"] {
            let fields = NewTask::new(title, TaskStatus::Todo, 1000.0)
                .with_tags([tag.clone(), TagId::from("keep")]);
            tasks.push(ctx.store().add_task(ctx.owner(), fields).await.unwrap());
        }
        (store, ctx, tag, tasks)
    }

    #[tokio::test]
    async fn test_delete_tag_strips_all_references() {
        let (store, ctx, tag, tasks) = setup().await;
        let before = store.writes();

        let result = DeleteTag::new(tag.clone(), tasks)
            .execute(&ctx)
            .await
            .unwrap();

        assert_eq!(result["untagged"], 2);
        assert_eq!(store.writes(), before + 1);
        assert!(store.tags(ctx.owner()).is_empty());
        for task in store.tasks(ctx.owner()) {
            assert!(!task.has_tag(&tag));
            assert!(task.has_tag(&TagId::from("keep")));
        }
    }

    #[tokio::test]
    async fn test_failed_delete_leaves_everything() {
        let (store, ctx, tag, tasks) = setup().await;
        store.fail_next_write(StoreError::Unavailable("offline".into()));

        let result = DeleteTag::new(tag.clone(), tasks).execute(&ctx).await;

        assert!(matches!(result, Err(KanbanError::Store(_))));
        assert_eq!(store.tags(ctx.owner()).len(), 1);
        assert!(store.tasks(ctx.owner()).iter().all(|t| t.has_tag(&tag)));
    }
}
