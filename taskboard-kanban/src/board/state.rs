//! Local projection of one owner's board.

use super::drag::DragSession;
use super::editor::{TagEditor, TaskEditor};
use crate::filter::FilterState;
use crate::ordering::OrderKeys;
use crate::types::{Tag, TagId, Task, TaskId};

/// Everything the board knows: the latest store snapshots plus local-only
/// drag, filter and editor state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardState {
    /// Latest task snapshot, replaced wholesale on every delivery
    pub tasks: Vec<Task>,
    /// Latest tag snapshot
    pub tags: Vec<Tag>,
    /// Set once the first task snapshot has arrived
    pub synced: bool,
    pub drag: DragSession,
    pub filters: FilterState,
    pub task_editor: Option<TaskEditor>,
    pub tag_editor: Option<TagEditor>,
    pub keys: OrderKeys,
}

impl BoardState {
    pub fn new(keys: OrderKeys) -> Self {
        Self {
            keys,
            ..Self::default()
        }
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn tag(&self, id: &TagId) -> Option<&Tag> {
        self.tags.iter().find(|t| &t.id == id)
    }

    /// Ids of every task carrying `tag`, in snapshot order
    pub fn tasks_tagged(&self, tag: &TagId) -> Vec<TaskId> {
        self.tasks
            .iter()
            .filter(|t| t.has_tag(tag))
            .map(|t| t.id.clone())
            .collect()
    }
}
