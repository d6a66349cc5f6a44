//! Drag session bookkeeping.

use crate::ordering::{DropPosition, DropTarget};
use crate::types::{TaskId, TaskStatus};
use serde::Serialize;
use std::collections::BTreeMap;

/// Transient state of an in-progress drag gesture. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DragSession {
    /// Task being dragged
    pub dragged: Option<TaskId>,
    /// Column the pointer is over
    pub hovered_column: Option<TaskStatus>,
    /// Task the pointer is over, and on which half
    pub drop_target: Option<DropTarget>,
    /// Enter minus leave events per column; nested elements fire both
    enter_counts: BTreeMap<TaskStatus, u32>,
}

impl DragSession {
    pub fn is_active(&self) -> bool {
        self.dragged.is_some()
    }

    /// Start dragging `task`, discarding anything left from a previous gesture
    pub fn begin(&mut self, task: TaskId) {
        self.clear();
        self.dragged = Some(task);
    }

    pub fn enter_column(&mut self, column: TaskStatus) {
        if !self.is_active() {
            return;
        }
        *self.enter_counts.entry(column).or_insert(0) += 1;
        self.hovered_column = Some(column);
    }

    /// Returns true when the pointer has fully left the column
    pub fn leave_column(&mut self, column: TaskStatus) -> bool {
        let Some(count) = self.enter_counts.get_mut(&column) else {
            return false;
        };
        *count = count.saturating_sub(1);
        if *count > 0 {
            return false;
        }
        self.enter_counts.remove(&column);
        if self.hovered_column == Some(column) {
            self.hovered_column = None;
        }
        true
    }

    /// Track the hovered task; hovering the dragged task itself is ignored
    pub fn hover_task(&mut self, task: TaskId, pointer_y: f64, top: f64, height: f64) {
        if !self.is_active() || self.dragged.as_ref() == Some(&task) {
            return;
        }
        self.drop_target = Some(DropTarget {
            task_id: task,
            position: drop_position(pointer_y, top, height),
        });
    }

    pub fn enter_count(&self, column: TaskStatus) -> u32 {
        self.enter_counts.get(&column).copied().unwrap_or(0)
    }

    /// Reset every field
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_cleared(&self) -> bool {
        self == &Self::default()
    }
}

/// Upper half of the hovered card drops before it, lower half after
pub fn drop_position(pointer_y: f64, top: f64, height: f64) -> DropPosition {
    if pointer_y < top + height / 2.0 {
        DropPosition::Before
    } else {
        DropPosition::After
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_position_midpoint() {
        assert_eq!(drop_position(10.0, 0.0, 40.0), DropPosition::Before);
        assert_eq!(drop_position(20.0, 0.0, 40.0), DropPosition::After);
        assert_eq!(drop_position(130.0, 100.0, 40.0), DropPosition::After);
    }

    #[test]
    fn test_nested_enter_leave_keeps_hover() {
        let mut drag = DragSession::default();
        drag.begin(TaskId::from("t"));

        drag.enter_column(TaskStatus::Todo);
        drag.enter_column(TaskStatus::Todo); // child element
        assert!(!drag.leave_column(TaskStatus::Todo));
        assert_eq!(drag.hovered_column, Some(TaskStatus::Todo));

        assert!(drag.leave_column(TaskStatus::Todo));
        assert_eq!(drag.hovered_column, None);
        assert_eq!(drag.enter_count(TaskStatus::Todo), 0);
    }

    #[test]
    fn test_ignores_events_without_drag() {
        let mut drag = DragSession::default();
        drag.enter_column(TaskStatus::Todo);
        drag.hover_task(TaskId::from("a"), 0.0, 0.0, 10.0);
        assert!(drag.is_cleared());
        assert!(!drag.leave_column(TaskStatus::Todo));
    }

    #[test]
    fn test_hovering_self_is_ignored() {
        let mut drag = DragSession::default();
        drag.begin(TaskId::from("a"));
        drag.hover_task(TaskId::from("a"), 0.0, 0.0, 10.0);
        assert!(drag.drop_target.is_none());

        drag.hover_task(TaskId::from("b"), 9.0, 0.0, 10.0);
        assert_eq!(drag.drop_target, Some(DropTarget::after("b")));
    }

    #[test]
    fn test_begin_discards_previous_gesture() {
        let mut drag = DragSession::default();
        drag.begin(TaskId::from("a"));
        drag.enter_column(TaskStatus::Completed);
        drag.hover_task(TaskId::from("b"), 0.0, 0.0, 10.0);

        drag.begin(TaskId::from("c"));
        assert_eq!(drag.dragged, Some(TaskId::from("c")));
        assert!(drag.drop_target.is_none());
        assert_eq!(drag.enter_count(TaskStatus::Completed), 0);
    }
}
