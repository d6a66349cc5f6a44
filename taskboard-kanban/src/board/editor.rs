//! Form buffers for the task and tag modals.

use crate::operation::Command;
use crate::tag::AddTag;
use crate::task::{AddTask, UpdateTask};
use crate::types::{TagColor, TagId, Task, TaskId, TaskPatch, TaskStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Whether the task modal creates a task or edits one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum EditorMode {
    Create { column: TaskStatus },
    Edit { task: TaskId },
}

/// A single change typed into the task modal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum TaskEdit {
    Title(String),
    Description(String),
    DueDate(Option<NaiveDate>),
    ToggleTag(TagId),
}

/// Task modal buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEditor {
    pub mode: EditorMode,
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub tags: BTreeSet<TagId>,
}

impl TaskEditor {
    pub fn create(column: TaskStatus) -> Self {
        Self {
            mode: EditorMode::Create { column },
            title: String::new(),
            description: String::new(),
            due_date: None,
            tags: BTreeSet::new(),
        }
    }

    pub fn edit(task: &Task) -> Self {
        Self {
            mode: EditorMode::Edit {
                task: task.id.clone(),
            },
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            due_date: task.due_date,
            tags: task.tags.clone(),
        }
    }

    /// Submission is disabled while the title is blank
    pub fn can_submit(&self) -> bool {
        !self.title.trim().is_empty()
    }

    pub fn apply(&mut self, edit: TaskEdit) {
        match edit {
            TaskEdit::Title(title) => self.title = title,
            TaskEdit::Description(description) => self.description = description,
            TaskEdit::DueDate(due) => self.due_date = due,
            TaskEdit::ToggleTag(tag) => {
                if !self.tags.remove(&tag) {
                    self.tags.insert(tag);
                }
            }
        }
    }

    /// Drop selected tags for which `keep` returns false
    pub fn retain_tags(&mut self, keep: impl FnMut(&TagId) -> bool) {
        self.tags.retain(keep);
    }

    fn description(&self) -> Option<String> {
        let trimmed = self.description.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Command creating a task from this buffer at `order`
    pub fn to_add(&self, column: TaskStatus, order: f64) -> Command {
        let mut add = AddTask::new(self.title.trim(), column, order)
            .with_tags(self.tags.iter().cloned())
            .with_due_date(self.due_date);
        if let Some(description) = self.description() {
            add = add.with_description(description);
        }
        Command::AddTask(add)
    }

    /// Command writing only the fields that differ from `task`, if any
    pub fn to_update(&self, task: &Task) -> Option<Command> {
        let title = self.title.trim();
        let description = self.description();
        let patch = TaskPatch {
            title: (title != task.title).then(|| title.to_string()),
            description: (description != task.description).then_some(description),
            due_date: (self.due_date != task.due_date).then_some(self.due_date),
            tags: (self.tags != task.tags).then(|| self.tags.clone()),
            ..TaskPatch::default()
        };
        (!patch.is_empty()).then(|| Command::UpdateTask(UpdateTask::new(task.id.clone(), patch)))
    }
}

/// Tag modal buffer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagEditor {
    pub name: String,
    /// Chosen palette color; derived from the name when left unset
    pub color: Option<TagColor>,
}

impl TagEditor {
    pub fn can_submit(&self) -> bool {
        !self.name.trim().is_empty()
    }

    pub fn to_command(&self) -> Command {
        let mut add = AddTag::new(self.name.trim());
        add.color = self.color;
        Command::AddTag(add)
    }
}
