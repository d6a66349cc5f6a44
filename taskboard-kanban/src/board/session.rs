//! Runtime adapter around the transition function.
//!
//! A [`BoardSession`] belongs to one signed-in owner. It holds both live
//! subscriptions, turns their snapshots into events, runs the commands the
//! transition function emits, and releases everything when it ends.

use super::state::BoardState;
use super::transition::{transition, BoardEvent, Transition};
use super::view::BoardView;
use crate::clock::Clock;
use crate::error::{KanbanError, Result};
use crate::logging::Pretty;
use crate::operation::{Command, Execute, StoreContext};
use crate::ordering::OrderKeys;
use crate::store::{LiveCollectionStore, Subscription};
use crate::types::{Tag, Task, UserId};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// What happened to the commands produced by one event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub issued: usize,
    pub failed: usize,
}

impl DispatchReport {
    pub fn succeeded(&self) -> usize {
        self.issued - self.failed
    }
}

/// Outcome of waiting on one subscription
enum Delivery {
    Tasks(Option<Vec<Task>>),
    Tags(Option<Vec<Tag>>),
}

/// A live board for one owner
pub struct BoardSession {
    ctx: StoreContext,
    clock: Arc<dyn Clock>,
    state: BoardState,
    tasks: Option<Subscription<Vec<Task>>>,
    tags: Option<Subscription<Vec<Tag>>>,
    token: CancellationToken,
    notice: Option<String>,
}

impl BoardSession {
    /// Subscribe to the owner's collections and apply their current snapshots
    pub fn start(
        store: Arc<dyn LiveCollectionStore>,
        owner: UserId,
        clock: Arc<dyn Clock>,
        keys: OrderKeys,
    ) -> Self {
        let token = CancellationToken::new();
        let tasks = store.subscribe_tasks(&owner, token.child_token());
        let tags = store.subscribe_tags(&owner, token.child_token());
        info!(owner = %owner, "board session started");

        let mut session = Self {
            ctx: StoreContext::new(store, owner),
            clock,
            state: BoardState::new(keys),
            tasks: Some(tasks),
            tags: Some(tags),
            token,
            notice: None,
        };
        session.sync();
        session
    }

    pub fn owner(&self) -> &UserId {
        self.ctx.owner()
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Render model for today
    pub fn view(&self) -> BoardView {
        BoardView::build(&self.state, self.clock.today())
    }

    /// Last failure shown to the user, if any
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Apply any snapshots that arrived since the last read, without waiting
    pub fn sync(&mut self) -> bool {
        let tasks = self.tasks.as_mut().and_then(Subscription::take_latest);
        let tags = self.tags.as_mut().and_then(Subscription::take_latest);
        let changed = tasks.is_some() || tags.is_some();
        if let Some(tasks) = tasks {
            self.advance(BoardEvent::TasksSnapshot { tasks });
        }
        if let Some(tags) = tags {
            self.advance(BoardEvent::TagsSnapshot { tags });
        }
        changed
    }

    /// Wait for the next snapshot from either collection and apply it.
    ///
    /// A collection whose store side hangs up is dropped and the wait goes on
    /// with the other one. Returns false once neither can deliver.
    pub async fn next_change(&mut self) -> bool {
        loop {
            let delivery = match (self.tasks.as_mut(), self.tags.as_mut()) {
                (Some(tasks), Some(tags)) => tokio::select! {
                    snapshot = tasks.changed() => Delivery::Tasks(snapshot),
                    snapshot = tags.changed() => Delivery::Tags(snapshot),
                },
                (Some(tasks), None) => Delivery::Tasks(tasks.changed().await),
                (None, Some(tags)) => Delivery::Tags(tags.changed().await),
                (None, None) => return false,
            };

            match delivery {
                Delivery::Tasks(Some(tasks)) => {
                    self.advance(BoardEvent::TasksSnapshot { tasks });
                    return true;
                }
                Delivery::Tags(Some(tags)) => {
                    self.advance(BoardEvent::TagsSnapshot { tags });
                    return true;
                }
                Delivery::Tasks(None) => {
                    debug!(owner = %self.ctx.owner(), "task subscription closed");
                    self.tasks = None;
                }
                Delivery::Tags(None) => {
                    debug!(owner = %self.ctx.owner(), "tag subscription closed");
                    self.tags = None;
                }
            }
        }
    }

    /// Feed a user event through the board and run the resulting commands.
    ///
    /// Store failures are logged and surfaced as the notice; the projection
    /// only changes when the store publishes a new snapshot.
    pub async fn dispatch(&mut self, event: BoardEvent) -> Result<DispatchReport> {
        if !self.is_active() {
            return Err(KanbanError::SessionClosed);
        }
        let commands = self.advance(event);

        let mut report = DispatchReport::default();
        for command in commands {
            report.issued += 1;
            if let Err(error) = self.run(&command).await {
                report.failed += 1;
                self.notice = Some(format!("Could not {}: {}", command.op_string(), error));
            }
        }

        self.sync();
        Ok(report)
    }

    async fn run(&self, command: &Command) -> Result<()> {
        match command.execute(&self.ctx).await {
            Ok(result) => {
                debug!(op = %command.op_string(), %result, "command applied");
                Ok(())
            }
            Err(err) => {
                error!(op = %command.op_string(), error = %err, "command failed");
                Err(err)
            }
        }
    }

    fn advance(&mut self, event: BoardEvent) -> Vec<Command> {
        let Transition { state, commands } = transition(std::mem::take(&mut self.state), event);
        self.state = state;
        if !commands.is_empty() {
            debug!("board commands: {}", Pretty(&commands));
        }
        commands
    }

    /// Release both subscriptions. Further dispatches fail with
    /// [`KanbanError::SessionClosed`].
    pub fn end(&mut self) {
        if !self.is_active() {
            return;
        }
        self.token.cancel();
        if let Some(tasks) = self.tasks.take() {
            tasks.release();
        }
        if let Some(tags) = self.tags.take() {
            tags.release();
        }
        info!(owner = %self.ctx.owner(), "board session ended");
    }
}

impl Drop for BoardSession {
    fn drop(&mut self) {
        self.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::TaskEdit;
    use crate::clock::FixedClock;
    use crate::memory::MemoryStore;
    use crate::store::StoreError;
    use crate::types::{NewTask, TaskStatus};
    use chrono::{NaiveDate, Utc};
    use tokio::sync::watch;

    fn owner() -> UserId {
        UserId::from("u1")
    }

    fn start(store: &Arc<MemoryStore>) -> BoardSession {
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2025, 6, 10).unwrap());
        BoardSession::start(store.clone(), owner(), Arc::new(clock), OrderKeys::default())
    }

    fn seed(store: &MemoryStore, id: &str, status: TaskStatus, order: f64) {
        store.seed_task(
            &owner(),
            Task::from_new(id.into(), NewTask::new(id, status, order), Utc::now()),
        );
    }

    #[tokio::test]
    async fn test_start_applies_current_snapshot() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, "a", TaskStatus::Todo, 1000.0);

        let session = start(&store);
        assert!(session.state().synced);
        assert_eq!(session.state().tasks.len(), 1);
        assert_eq!(store.live_subscriptions(&owner()), 2);
    }

    #[tokio::test]
    async fn test_dispatch_writes_and_resyncs() {
        let store = Arc::new(MemoryStore::new());
        let mut session = start(&store);

        session
            .dispatch(BoardEvent::OpenNewTask {
                column: TaskStatus::Todo,
            })
            .await
            .unwrap();
        session
            .dispatch(BoardEvent::EditTask {
                edit: TaskEdit::Title("First".into()),
            })
            .await
            .unwrap();
        let report = session.dispatch(BoardEvent::SubmitTask).await.unwrap();

        assert_eq!(report, DispatchReport { issued: 1, failed: 0 });
        assert_eq!(session.state().tasks.len(), 1);
        assert_eq!(session.state().tasks[0].order, 1000.0);
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn test_failed_write_sets_notice_and_keeps_projection() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, "a", TaskStatus::Todo, 1000.0);
        let mut session = start(&store);
        let before = session.state().tasks.clone();

        store.fail_next_write(StoreError::PermissionDenied);
        session
            .dispatch(BoardEvent::DragStart { task: "a".into() })
            .await
            .unwrap();
        let report = session
            .dispatch(BoardEvent::Drop {
                column: TaskStatus::Completed,
            })
            .await
            .unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.succeeded(), 0);
        assert_eq!(session.state().tasks, before);
        assert!(session.state().drag.is_cleared());
        assert!(session.notice().unwrap().starts_with("Could not move task"));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_next_change_follows_remote_writes() {
        let store = Arc::new(MemoryStore::new());
        let mut session = start(&store);

        seed(&store, "remote", TaskStatus::InProgress, 1000.0);
        assert!(session.next_change().await);
        session.sync();
        assert_eq!(session.state().tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_next_change_outlives_one_closed_collection() {
        let store = Arc::new(MemoryStore::new());
        let mut session = start(&store);

        let (tasks_tx, tasks_rx) = watch::channel(Vec::new());
        let (tags_tx, tags_rx) = watch::channel(Vec::<Tag>::new());
        session.tasks = Some(Subscription::new(tasks_rx, session.token.child_token()));
        session.tags = Some(Subscription::new(tags_rx, session.token.child_token()));
        session.sync();

        drop(tags_tx);
        tasks_tx.send_replace(vec![Task::from_new(
            "a".into(),
            NewTask::new("a", TaskStatus::Todo, 1000.0),
            Utc::now(),
        )]);
        assert!(session.next_change().await);
        assert_eq!(session.state().tasks.len(), 1);
        assert!(session.is_active());

        drop(tasks_tx);
        assert!(!session.next_change().await);
    }

    #[tokio::test]
    async fn test_end_releases_subscriptions() {
        let store = Arc::new(MemoryStore::new());
        let mut session = start(&store);
        session.end();

        assert!(!session.is_active());
        assert_eq!(store.live_subscriptions(&owner()), 0);
        assert!(!session.next_change().await);
        assert!(matches!(
            session.dispatch(BoardEvent::ClearFilters).await,
            Err(KanbanError::SessionClosed)
        ));
    }

    #[tokio::test]
    async fn test_drop_releases_subscriptions() {
        let store = Arc::new(MemoryStore::new());
        drop(start(&store));
        assert_eq!(store.live_subscriptions(&owner()), 0);
    }
}
