//! Core document types

mod ids;
mod tag;
mod task;
mod user;

pub use ids::{TagId, TaskId, UserId};
pub use tag::{NewTag, Tag, TagColor};
pub use task::{NewTask, Task, TaskPatch, TaskStatus};
pub use user::User;
