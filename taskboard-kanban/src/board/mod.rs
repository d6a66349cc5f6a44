//! Board state reconciler.
//!
//! [`BoardState`] is the local projection of one owner's board. Store
//! snapshots and user gestures arrive as [`BoardEvent`]s; [`transition`]
//! folds each one into the state and yields the store commands to run.
//! [`BoardSession`] wires that function to live subscriptions, and
//! [`BoardView`] turns the state into something to draw.

mod drag;
mod editor;
mod session;
mod state;
mod transition;
mod view;

pub use drag::{drop_position, DragSession};
pub use editor::{EditorMode, TagEditor, TaskEdit, TaskEditor};
pub use session::{BoardSession, DispatchReport};
pub use state::BoardState;
pub use transition::{transition, BoardEvent, Transition};
pub use view::{BoardView, ColumnView, TagChip, TaskCard};
