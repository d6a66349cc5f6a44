//! Serializable render model for the board.

use super::state::BoardState;
use crate::dates::{due_label, DueLabel};
use crate::filter::{FilterCounts, FilterState};
use crate::ordering::DropPosition;
use crate::types::{Tag, TagColor, TagId, Task, TaskId, TaskStatus};
use chrono::NaiveDate;
use serde::Serialize;

/// A tag as shown on a card or in the sidebar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagChip {
    pub id: TagId,
    pub name: String,
    pub color: TagColor,
}

impl From<&Tag> for TagChip {
    fn from(tag: &Tag) -> Self {
        Self {
            id: tag.id.clone(),
            name: tag.name.clone(),
            color: tag.color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCard {
    pub id: TaskId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<TagChip>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<DueLabel>,
    pub completed: bool,
    /// This card is the one being dragged
    pub dragging: bool,
    /// Insertion line drawn above or below this card
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_indicator: Option<DropPosition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnView {
    pub status: TaskStatus,
    pub title: &'static str,
    /// Visible cards, ascending by order
    pub cards: Vec<TaskCard>,
    /// Tasks in the column before filtering
    pub total: usize,
    /// A drag is hovering this column
    pub drag_over: bool,
}

/// Everything needed to draw the board for one day
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub columns: Vec<ColumnView>,
    /// Sidebar tag list, oldest first
    pub tags: Vec<TagChip>,
    pub counts: FilterCounts,
    pub filters: FilterState,
    pub synced: bool,
}

impl BoardView {
    pub fn build(state: &BoardState, today: NaiveDate) -> Self {
        let columns = TaskStatus::ALL
            .into_iter()
            .map(|status| ColumnView {
                status,
                title: status.title(),
                cards: state
                    .filters
                    .visible(status, &state.tasks, today)
                    .into_iter()
                    .map(|task| card(state, task, today))
                    .collect(),
                total: state.tasks.iter().filter(|t| t.status == status).count(),
                drag_over: state.drag.hovered_column == Some(status),
            })
            .collect();

        Self {
            columns,
            tags: state.tags.iter().map(TagChip::from).collect(),
            counts: FilterCounts::build(&state.tasks, &state.tags, today),
            filters: state.filters.clone(),
            synced: state.synced,
        }
    }

    pub fn column(&self, status: TaskStatus) -> Option<&ColumnView> {
        self.columns.iter().find(|c| c.status == status)
    }
}

fn card(state: &BoardState, task: &Task, today: NaiveDate) -> TaskCard {
    // Sidebar order, skipping ids whose tag is already gone
    let tags = state
        .tags
        .iter()
        .filter(|tag| task.has_tag(&tag.id))
        .map(TagChip::from)
        .collect();

    let drop_indicator = state
        .drag
        .drop_target
        .as_ref()
        .filter(|target| target.task_id == task.id)
        .map(|target| target.position);

    TaskCard {
        id: task.id.clone(),
        title: task.title.clone(),
        description: task.description.clone(),
        tags,
        due: task.due_date.map(|due| due_label(due, today)),
        completed: task.is_completed(),
        dragging: state.drag.dragged.as_ref() == Some(&task.id),
        drop_indicator,
    }
}
