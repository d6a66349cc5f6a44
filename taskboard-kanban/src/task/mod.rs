//! Task commands

mod add;
mod delete;
mod mv;
mod reorder;
mod update;

pub use add::AddTask;
pub use delete::DeleteTask;
pub use mv::MoveTask;
pub use reorder::ReorderColumn;
pub use update::UpdateTask;
