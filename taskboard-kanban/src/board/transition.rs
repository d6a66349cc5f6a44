//! The board's pure transition function.
//!
//! `transition` takes the current [`BoardState`] and one [`BoardEvent`] and
//! returns the next state plus the store [`Command`]s to run. It performs no
//! I/O; the session adapter executes the commands and feeds store snapshots
//! back in as events.

use super::drag::DragSession;
use super::editor::{EditorMode, TagEditor, TaskEdit, TaskEditor};
use super::state::BoardState;
use crate::dates::DateBucket;
use crate::operation::Command;
use crate::ordering::{OrderKeys, Placement};
use crate::tag::DeleteTag;
use crate::task::{DeleteTask, MoveTask, ReorderColumn};
use crate::types::{Tag, TagColor, TagId, Task, TaskId, TaskStatus};
use serde::Deserialize;
use tracing::{debug, warn};

/// Input to the board: store deliveries and user gestures
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum BoardEvent {
    TasksSnapshot { tasks: Vec<Task> },
    TagsSnapshot { tags: Vec<Tag> },

    DragStart { task: TaskId },
    DragEnter { column: TaskStatus },
    DragLeave { column: TaskStatus },
    #[serde(rename_all = "camelCase")]
    DragOverTask {
        task: TaskId,
        pointer_y: f64,
        top: f64,
        height: f64,
    },
    Drop { column: TaskStatus },
    /// Gesture ended without a drop, or after one
    DragEnd,

    ToggleTagFilter { tag: TagId },
    ToggleDateFilter { bucket: DateBucket },
    ClearFilters,

    OpenNewTask { column: TaskStatus },
    OpenEditTask { task: TaskId },
    EditTask { edit: TaskEdit },
    SubmitTask,
    CloseTaskEditor,
    ToggleComplete { task: TaskId },
    DeleteTask { task: TaskId },

    OpenTagEditor,
    EditTagName { name: String },
    EditTagColor { color: Option<TagColor> },
    SubmitTag,
    CloseTagEditor,
    DeleteTag { tag: TagId },
}

/// Result of one transition
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: BoardState,
    pub commands: Vec<Command>,
}

/// Apply `event` to `state`
pub fn transition(mut state: BoardState, event: BoardEvent) -> Transition {
    let commands = state.apply(event);
    Transition { state, commands }
}

impl BoardState {
    /// Apply `event` in place, returning the commands it produces
    pub fn apply(&mut self, event: BoardEvent) -> Vec<Command> {
        match event {
            BoardEvent::TasksSnapshot { tasks } => {
                debug!(count = tasks.len(), "task snapshot");
                self.tasks = tasks;
                self.synced = true;
                self.close_stale_editor();
                Vec::new()
            }
            BoardEvent::TagsSnapshot { tags } => {
                debug!(count = tags.len(), "tag snapshot");
                self.tags = tags;
                self.forget_unknown_tags();
                Vec::new()
            }

            BoardEvent::DragStart { task } => {
                self.drag.begin(task);
                Vec::new()
            }
            BoardEvent::DragEnter { column } => {
                self.drag.enter_column(column);
                Vec::new()
            }
            BoardEvent::DragLeave { column } => {
                if self.drag.leave_column(column) {
                    self.forget_target_in(column);
                }
                Vec::new()
            }
            BoardEvent::DragOverTask {
                task,
                pointer_y,
                top,
                height,
            } => {
                self.drag.hover_task(task, pointer_y, top, height);
                Vec::new()
            }
            BoardEvent::Drop { column } => {
                let drag = std::mem::take(&mut self.drag);
                self.drop_on(column, drag)
            }
            BoardEvent::DragEnd => {
                self.drag.clear();
                Vec::new()
            }

            BoardEvent::ToggleTagFilter { tag } => {
                self.filters.toggle_tag(tag);
                Vec::new()
            }
            BoardEvent::ToggleDateFilter { bucket } => {
                self.filters.toggle_date(bucket);
                Vec::new()
            }
            BoardEvent::ClearFilters => {
                self.filters.clear();
                Vec::new()
            }

            BoardEvent::OpenNewTask { column } => {
                self.task_editor = Some(TaskEditor::create(column));
                Vec::new()
            }
            BoardEvent::OpenEditTask { task } => {
                match self.task(&task) {
                    Some(found) => self.task_editor = Some(TaskEditor::edit(found)),
                    None => warn!(task = %task, "cannot edit unknown task"),
                }
                Vec::new()
            }
            BoardEvent::EditTask { edit } => {
                if let Some(editor) = self.task_editor.as_mut() {
                    editor.apply(edit);
                }
                Vec::new()
            }
            BoardEvent::SubmitTask => self.submit_task(),
            BoardEvent::CloseTaskEditor => {
                self.task_editor = None;
                Vec::new()
            }
            BoardEvent::ToggleComplete { task } => self.toggle_complete(&task),
            BoardEvent::DeleteTask { task } => {
                if self.editing(&task) {
                    self.task_editor = None;
                }
                vec![Command::DeleteTask(DeleteTask::new(task))]
            }

            BoardEvent::OpenTagEditor => {
                self.tag_editor = Some(TagEditor::default());
                Vec::new()
            }
            BoardEvent::EditTagName { name } => {
                if let Some(editor) = self.tag_editor.as_mut() {
                    editor.name = name;
                }
                Vec::new()
            }
            BoardEvent::EditTagColor { color } => {
                if let Some(editor) = self.tag_editor.as_mut() {
                    editor.color = color;
                }
                Vec::new()
            }
            BoardEvent::SubmitTag => match self.tag_editor.take() {
                Some(editor) if editor.can_submit() => vec![editor.to_command()],
                Some(editor) => {
                    self.tag_editor = Some(editor);
                    Vec::new()
                }
                None => Vec::new(),
            },
            BoardEvent::CloseTagEditor => {
                self.tag_editor = None;
                Vec::new()
            }
            BoardEvent::DeleteTag { tag } => {
                let tasks = self.tasks_tagged(&tag);
                self.filters.tags.remove(&tag);
                if let Some(editor) = self.task_editor.as_mut() {
                    editor.retain_tags(|id| id != &tag);
                }
                vec![Command::DeleteTag(DeleteTag::new(tag, tasks))]
            }
        }
    }

    /// Resolve a drop. The drag session has already been taken out of state.
    fn drop_on(&self, column: TaskStatus, drag: DragSession) -> Vec<Command> {
        let Some(dragged) = drag.dragged else {
            return Vec::new();
        };
        let Some(task) = self.task(&dragged) else {
            warn!(task = %dragged, "dragged task vanished before drop");
            return Vec::new();
        };
        let target = drag.drop_target;

        if task.status == column {
            if target.is_none() {
                debug!(task = %dragged, "dropped on own column without a target");
                return Vec::new();
            }
            let current = OrderKeys::column(&self.tasks, column, None)
                .iter()
                .position(|t| t.id == dragged);
            let wanted = OrderKeys::index_for(&self.tasks, column, Some(&dragged), target.as_ref());
            if current == Some(wanted) {
                debug!(task = %dragged, "drop keeps current position");
                return Vec::new();
            }
        }

        match self.keys.place(&self.tasks, column, &dragged, target.as_ref()) {
            Placement::Key(order) => vec![Command::MoveTask(MoveTask::new(dragged, column, order))],
            Placement::Rebalance(entries) => vec![Command::ReorderColumn(ReorderColumn::new(
                column, dragged, entries,
            ))],
        }
    }

    fn submit_task(&mut self) -> Vec<Command> {
        let Some(mut editor) = self.task_editor.take() else {
            return Vec::new();
        };
        if !editor.can_submit() {
            self.task_editor = Some(editor);
            return Vec::new();
        }
        let known = &self.tags;
        editor.retain_tags(|id| known.iter().any(|t| &t.id == id));
        match &editor.mode {
            EditorMode::Create { column } => {
                let order = self.keys.append(&self.tasks, *column, None);
                vec![editor.to_add(*column, order)]
            }
            EditorMode::Edit { task } => match self.task(task) {
                Some(current) => editor.to_update(current).into_iter().collect(),
                None => {
                    warn!(task = %task, "edited task no longer exists");
                    Vec::new()
                }
            },
        }
    }

    fn toggle_complete(&self, id: &TaskId) -> Vec<Command> {
        let Some(task) = self.task(id) else {
            warn!(task = %id, "cannot toggle unknown task");
            return Vec::new();
        };
        let column = if task.is_completed() {
            TaskStatus::Todo
        } else {
            TaskStatus::Completed
        };
        let order = self.keys.append(&self.tasks, column, Some(id));
        vec![Command::MoveTask(MoveTask::new(id.clone(), column, order))]
    }

    /// Deselect tags that are no longer in the tag snapshot
    fn forget_unknown_tags(&mut self) {
        let known = &self.tags;
        let is_known = |id: &TagId| known.iter().any(|t| &t.id == id);
        self.filters.tags.retain(is_known);
        if let Some(editor) = self.task_editor.as_mut() {
            editor.retain_tags(is_known);
        }
    }

    fn editing(&self, id: &TaskId) -> bool {
        matches!(
            self.task_editor.as_ref().map(|e| &e.mode),
            Some(EditorMode::Edit { task }) if task == id
        )
    }

    /// Close an edit form whose task disappeared from the snapshot
    fn close_stale_editor(&mut self) {
        if let Some(EditorMode::Edit { task }) = self.task_editor.as_ref().map(|e| &e.mode) {
            if self.task(task).is_none() {
                debug!(task = %task, "closing editor for deleted task");
                self.task_editor = None;
            }
        }
    }

    /// Drop a hovered target that belongs to a column the pointer left
    fn forget_target_in(&mut self, column: TaskStatus) {
        let in_column = self
            .drag
            .drop_target
            .as_ref()
            .and_then(|t| self.tasks.iter().find(|task| task.id == t.task_id))
            .is_some_and(|task| task.status == column);
        if in_column {
            self.drag.drop_target = None;
        }
    }
}
