//! Kanban board core over a managed live-document backend
//!
//! This crate holds the client-side logic of a three-column kanban board
//! (To Do, In Progress, Completed) whose tasks and tags live in a hosted,
//! per-user document store. Storage and authentication are injected as
//! capabilities; everything else is computed locally.
//!
//! ## Overview
//!
//! - **Ordering** - Gap-based `f64` order keys; a move writes one document
//! - **Filtering** - Tag (any-of) and due-date bucket filters, with badge counts
//! - **Dates** - Overdue / Today / Tomorrow / This week / Upcoming / No date
//! - **Reconciliation** - Snapshots and gestures fold through a pure
//!   [`transition`] that emits store [`Command`]s
//! - **Sessions** - [`BoardSession`] owns the live subscriptions for one user
//!   and releases them when the user signs out
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taskboard_kanban::{
//!     App, BoardConfig, BoardEvent, MemoryIdentity, MemoryStore, SystemClock, TaskStatus, User,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut app = App::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(MemoryIdentity::new()),
//!     Arc::new(SystemClock),
//!     BoardConfig::load()?,
//! );
//! app.handle_sign_in(User::new("uid-1").with_email("me@example.com"));
//!
//! if let Some(session) = app.session_mut() {
//!     session.dispatch(BoardEvent::OpenNewTask { column: TaskStatus::Todo }).await?;
//!     println!("{}", serde_json::to_string_pretty(&session.view())?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod auto_color;
pub mod board;
pub mod clock;
pub mod config;
pub mod dates;
mod error;
pub mod filter;
pub mod identity;
pub mod logging;
pub mod memory;
mod operation;
pub mod ordering;
pub mod store;
pub mod types;

// Command modules
pub mod tag;
pub mod task;

pub use async_trait::async_trait;
pub use operation::{Command, Execute, StoreContext};

pub use app::{App, AuthPhase};
pub use board::{
    transition, BoardEvent, BoardSession, BoardState, BoardView, DispatchReport, Transition,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{BoardConfig, ConfigError};
pub use dates::{classify, DateBucket};
pub use error::{KanbanError, Result};
pub use filter::{visible_tasks, FilterCounts, FilterState};
pub use identity::{IdentityError, IdentityProvider, ResetStatus};
pub use memory::{MemoryIdentity, MemoryStore};
pub use ordering::{DropPosition, DropTarget, OrderKeys, Placement};
pub use store::{LiveCollectionStore, StoreError, Subscription, WriteBatch};

// Re-export commonly used types
pub use types::{
    NewTag, NewTask, Tag, TagColor, TagId, Task, TaskId, TaskPatch, TaskStatus, User, UserId,
};
