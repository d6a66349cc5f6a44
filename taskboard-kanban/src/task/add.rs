//! AddTask command

use crate::error::{KanbanError, Result};
use crate::operation::{Execute, StoreContext};
use crate::types::{NewTask, TagId, TaskStatus};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

/// Create a new task in a column at a precomputed order key
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTask {
    /// The task title (required)
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub order: f64,
    pub tags: BTreeSet<TagId>,
    pub due_date: Option<NaiveDate>,
}

impl AddTask {
    pub fn new(title: impl Into<String>, status: TaskStatus, order: f64) -> Self {
        Self {
            title: title.into(),
            description: None,
            status,
            order,
            tags: BTreeSet::new(),
            due_date: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = TagId>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    pub fn with_due_date(mut self, due: Option<NaiveDate>) -> Self {
        self.due_date = due;
        self
    }

    /// Trimmed store fields, or a validation error
    fn fields(&self) -> Result<NewTask> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(KanbanError::missing_field("title"));
        }
        if !self.order.is_finite() {
            return Err(KanbanError::invalid_value("order", "must be finite"));
        }
        Ok(NewTask {
            title: title.to_string(),
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(String::from),
            status: self.status,
            order: self.order,
            tags: self.tags.clone(),
            due_date: self.due_date,
        })
    }
}

#[async_trait]
impl Execute for AddTask {
    fn verb(&self) -> &'static str {
        "add"
    }

    fn noun(&self) -> &'static str {
        "task"
    }

    async fn execute(&self, ctx: &StoreContext) -> Result<Value> {
        let fields = self.fields()?;
        let id = ctx.store().add_task(ctx.owner(), fields).await?;
        Ok(serde_json::json!({
            "id": id,
            "status": self.status,
            "order": self.order,
        }))
    }
}
