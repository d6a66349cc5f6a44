//! Tag commands

mod add;
mod delete;

pub use add::AddTag;
pub use delete::DeleteTag;
