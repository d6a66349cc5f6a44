//! AddTag command

use crate::auto_color::auto_color;
use crate::error::{KanbanError, Result};
use crate::operation::{Execute, StoreContext};
use crate::types::{NewTag, TagColor};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Add a new tag to the owner's palette
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddTag {
    /// The tag display name
    pub name: String,
    /// Palette color; derived from the name when absent
    pub color: Option<TagColor>,
}

impl AddTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: None,
        }
    }

    pub fn with_color(mut self, color: TagColor) -> Self {
        self.color = Some(color);
        self
    }
}

#[async_trait]
impl Execute for AddTag {
    fn verb(&self) -> &'static str {
        "add"
    }

    fn noun(&self) -> &'static str {
        "tag"
    }

    async fn execute(&self, ctx: &StoreContext) -> Result<Value> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(KanbanError::missing_field("name"));
        }
        let color = self.color.unwrap_or_else(|| auto_color(name));

        let id = ctx
            .store()
            .add_tag(ctx.owner(), NewTag::new(name, color))
            .await?;
        Ok(serde_json::json!({
            "id": id,
            "name": name,
            "color": color,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::types::UserId;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_add_tag_with_derived_color() {
        let store = Arc::new(MemoryStore::new());
        let ctx = StoreContext::new(store.clone(), UserId::from("u1"));

        let result = AddTag::new("bug").execute(&ctx).await.unwrap();

        assert_eq!(result["color"], auto_color("bug").token());
        assert_eq!(store.tags(ctx.owner())[0].name, "bug");
    }

    #[tokio::test]
    async fn test_add_tag_requires_name() {
        let store = Arc::new(MemoryStore::new());
        let ctx = StoreContext::new(store.clone(), UserId::from("u1"));

        let result = AddTag::new("").with_color(TagColor::Red).execute(&ctx).await;
        assert!(matches!(result, Err(KanbanError::MissingField { .. })));
        assert_eq!(store.writes(), 0);
    }
}
