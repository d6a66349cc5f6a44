//! Order keys for tasks within a column using gap-based fractional indexing.
//!
//! Keys are `f64` values sorted ascending. Appending leaves a fixed gap after
//! the last task; inserting between two tasks takes the midpoint, so a move
//! writes exactly one document.

use crate::config::OrderingConfig;
use crate::types::{Task, TaskId, TaskStatus};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Which side of the hovered task a dragged task lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Before,
    After,
}

/// A task to drop next to, and on which side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTarget {
    pub task_id: TaskId,
    pub position: DropPosition,
}

impl DropTarget {
    pub fn before(task_id: impl Into<TaskId>) -> Self {
        Self {
            task_id: task_id.into(),
            position: DropPosition::Before,
        }
    }

    pub fn after(task_id: impl Into<TaskId>) -> Self {
        Self {
            task_id: task_id.into(),
            position: DropPosition::After,
        }
    }
}

/// What to write for a placed task
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    /// A single key for the placed task; no sibling changes
    Key(f64),
    /// Every task of the column renumbered, in final column order
    Rebalance(Vec<(TaskId, f64)>),
}

/// Order key generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderKeys {
    step: f64,
    rebalance: bool,
}

impl Default for OrderKeys {
    fn default() -> Self {
        Self::new(&OrderingConfig::default())
    }
}

impl OrderKeys {
    pub fn new(config: &OrderingConfig) -> Self {
        Self {
            step: config.step,
            rebalance: config.rebalance,
        }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Tasks of one column sorted ascending by order, skipping `moving`
    pub fn column<'a>(
        tasks: &'a [Task],
        status: TaskStatus,
        moving: Option<&TaskId>,
    ) -> Vec<&'a Task> {
        let mut column: Vec<&Task> = tasks
            .iter()
            .filter(|t| t.status == status && Some(&t.id) != moving)
            .collect();
        column.sort_by(|a, b| a.order.total_cmp(&b.order));
        column
    }

    /// Key placing a task after everything currently in the column
    pub fn append(&self, tasks: &[Task], status: TaskStatus, moving: Option<&TaskId>) -> f64 {
        let column = Self::column(tasks, status, moving);
        self.key_at(&column, column.len())
    }

    /// Key for a task inserted into `status`, next to `target` when given.
    ///
    /// A target that is not in the column falls back to appending.
    pub fn key_for(
        &self,
        tasks: &[Task],
        status: TaskStatus,
        moving: Option<&TaskId>,
        target: Option<&DropTarget>,
    ) -> f64 {
        let column = Self::column(tasks, status, moving);
        let index = insertion_index(&column, target);
        self.key_at(&column, index)
    }

    /// Position the task would take among its siblings in `status`
    pub fn index_for(
        tasks: &[Task],
        status: TaskStatus,
        moving: Option<&TaskId>,
        target: Option<&DropTarget>,
    ) -> usize {
        let column = Self::column(tasks, status, moving);
        insertion_index(&column, target)
    }

    /// Like [`OrderKeys::key_for`], but renumbers the column when the midpoint
    /// key would not sort strictly between its neighbors and rebalancing is on.
    pub fn place(
        &self,
        tasks: &[Task],
        status: TaskStatus,
        moving: &TaskId,
        target: Option<&DropTarget>,
    ) -> Placement {
        let column = Self::column(tasks, status, Some(moving));
        let index = insertion_index(&column, target);
        let key = self.key_at(&column, index);

        let lower = index.checked_sub(1).map(|i| column[i].order);
        let upper = column.get(index).map(|t| t.order);
        let fits = key.is_finite()
            && lower.map_or(true, |l| key > l)
            && upper.map_or(true, |u| key < u);

        if fits || !self.rebalance {
            return Placement::Key(key);
        }

        debug!(
            column = %status,
            index,
            key,
            "order key collides with a neighbor, renumbering column"
        );
        let mut ids: Vec<TaskId> = column.iter().map(|t| t.id.clone()).collect();
        ids.insert(index, moving.clone());
        Placement::Rebalance(self.renumber(ids))
    }

    /// Evenly spaced keys for the given ids, in order
    pub fn renumber(&self, ids: impl IntoIterator<Item = TaskId>) -> Vec<(TaskId, f64)> {
        ids.into_iter()
            .enumerate()
            .map(|(i, id)| (id, self.step * (i as f64 + 1.0)))
            .collect()
    }

    fn key_at(&self, column: &[&Task], index: usize) -> f64 {
        let lower = index.checked_sub(1).map(|i| column[i].order);
        let upper = column.get(index).map(|t| t.order);
        match (lower, upper) {
            (None, None) => self.step,
            (Some(last), None) => last + self.step,
            (None, Some(first)) => first / 2.0,
            (Some(a), Some(b)) => (a + b) / 2.0,
        }
    }
}

/// Index the new task takes in `column`; stale or absent targets append
fn insertion_index(column: &[&Task], target: Option<&DropTarget>) -> usize {
    let Some(target) = target else {
        return column.len();
    };
    match column.iter().position(|t| t.id == target.task_id) {
        Some(i) => match target.position {
            DropPosition::Before => i,
            DropPosition::After => i + 1,
        },
        None => {
            warn!(task = %target.task_id, "drop target not in column, appending");
            column.len()
        }
    }
}
