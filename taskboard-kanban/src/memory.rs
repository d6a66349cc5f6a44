//! In-process implementations of the store and identity capabilities.
//!
//! Both keep everything in memory and publish snapshots synchronously after
//! each write, which makes them suitable for tests, demos and previews. They
//! also count writes and accept injected failures so callers can assert on
//! what reached the backend.

use crate::identity::{IdentityError, IdentityProvider};
use crate::store::{BatchOp, LiveCollectionStore, StoreError, StoreResult, Subscription, WriteBatch};
use crate::types::{NewTag, NewTask, Tag, TagId, Task, TaskId, TaskPatch, User, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// One owner's collections and their snapshot channels
struct Collections {
    tasks: Vec<Task>,
    tags: Vec<Tag>,
    tasks_tx: watch::Sender<Vec<Task>>,
    tags_tx: watch::Sender<Vec<Tag>>,
}

impl Collections {
    fn new() -> Self {
        Self {
            tasks: Vec::new(),
            tags: Vec::new(),
            tasks_tx: watch::channel(Vec::new()).0,
            tags_tx: watch::channel(Vec::new()).0,
        }
    }

    fn publish(&mut self) {
        self.tasks.sort_by(|a, b| a.order.total_cmp(&b.order));
        self.tags.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        self.tasks_tx.send_replace(self.tasks.clone());
        self.tags_tx.send_replace(self.tags.clone());
    }
}

fn task_mut<'a>(tasks: &'a mut [Task], id: &TaskId) -> StoreResult<&'a mut Task> {
    tasks
        .iter_mut()
        .find(|t| &t.id == id)
        .ok_or_else(|| StoreError::NotFound {
            collection: "tasks",
            id: id.to_string(),
        })
}

#[derive(Default)]
struct StoreState {
    owners: HashMap<UserId, Collections>,
    pending_failure: Option<StoreError>,
    writes: usize,
    last_created: Option<DateTime<Utc>>,
}

impl StoreState {
    fn owner(&mut self, owner: &UserId) -> &mut Collections {
        self.owners
            .entry(owner.clone())
            .or_insert_with(Collections::new)
    }

    /// Consume an injected failure, if any
    fn check_failure(&mut self) -> StoreResult<()> {
        match self.pending_failure.take() {
            Some(error) => {
                debug!(%error, "failing write on request");
                Err(error)
            }
            None => Ok(()),
        }
    }

    /// Strictly increasing creation timestamps keep creation order stable
    fn next_created_at(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let created = match self.last_created {
            Some(last) if now <= last => last + Duration::milliseconds(1),
            _ => now,
        };
        self.last_created = Some(created);
        created
    }
}

/// In-memory live collection store
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make the next write call fail with `error` without changing anything
    pub fn fail_next_write(&self, error: StoreError) {
        self.lock().pending_failure = Some(error);
    }

    /// Number of successful write calls (a batch counts once)
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    /// Current tasks of an owner, ordered by `order`
    pub fn tasks(&self, owner: &UserId) -> Vec<Task> {
        self.lock().owner(owner).tasks.clone()
    }

    /// Current tags of an owner, ordered by creation
    pub fn tags(&self, owner: &UserId) -> Vec<Tag> {
        self.lock().owner(owner).tags.clone()
    }

    /// Receivers still attached to an owner's collections
    pub fn live_subscriptions(&self, owner: &UserId) -> usize {
        let mut state = self.lock();
        let collections = state.owner(owner);
        collections.tasks_tx.receiver_count() + collections.tags_tx.receiver_count()
    }

    /// Insert a fully formed task document without counting a write
    pub fn seed_task(&self, owner: &UserId, task: Task) {
        let mut state = self.lock();
        let collections = state.owner(owner);
        collections.tasks.retain(|t| t.id != task.id);
        collections.tasks.push(task);
        collections.publish();
    }

    /// Insert a fully formed tag document without counting a write
    pub fn seed_tag(&self, owner: &UserId, tag: Tag) {
        let mut state = self.lock();
        let collections = state.owner(owner);
        collections.tags.retain(|t| t.id != tag.id);
        collections.tags.push(tag);
        collections.publish();
    }
}

fn apply_op(tasks: &mut [Task], tags: &mut Vec<Tag>, op: &BatchOp) -> StoreResult<()> {
    match op {
        BatchOp::UpdateTask { id, patch } => patch.apply(task_mut(tasks, id)?),
        BatchOp::RemoveTaskTag { task, tag } => {
            task_mut(tasks, task)?.tags.remove(tag);
        }
        BatchOp::DeleteTag { id } => tags.retain(|t| &t.id != id),
    }
    Ok(())
}

#[async_trait]
impl LiveCollectionStore for MemoryStore {
    async fn add_task(&self, owner: &UserId, fields: NewTask) -> StoreResult<TaskId> {
        let mut state = self.lock();
        state.check_failure()?;
        let created_at = state.next_created_at();
        let id = TaskId::new();
        let collections = state.owner(owner);
        collections
            .tasks
            .push(Task::from_new(id.clone(), fields, created_at));
        collections.publish();
        state.writes += 1;
        trace!(owner = %owner, task = %id, "task added");
        Ok(id)
    }

    async fn update_task(
        &self,
        owner: &UserId,
        id: &TaskId,
        patch: TaskPatch,
    ) -> StoreResult<()> {
        let mut state = self.lock();
        state.check_failure()?;
        let collections = state.owner(owner);
        patch.apply(task_mut(&mut collections.tasks, id)?);
        collections.publish();
        state.writes += 1;
        Ok(())
    }

    async fn delete_task(&self, owner: &UserId, id: &TaskId) -> StoreResult<()> {
        let mut state = self.lock();
        state.check_failure()?;
        let collections = state.owner(owner);
        collections.tasks.retain(|t| &t.id != id);
        collections.publish();
        state.writes += 1;
        Ok(())
    }

    async fn add_tag(&self, owner: &UserId, fields: NewTag) -> StoreResult<TagId> {
        let mut state = self.lock();
        state.check_failure()?;
        let created_at = state.next_created_at();
        let id = TagId::new();
        let collections = state.owner(owner);
        collections
            .tags
            .push(Tag::from_new(id.clone(), fields, created_at));
        collections.publish();
        state.writes += 1;
        Ok(id)
    }

    async fn delete_tag(&self, owner: &UserId, id: &TagId) -> StoreResult<()> {
        let mut state = self.lock();
        state.check_failure()?;
        let collections = state.owner(owner);
        collections.tags.retain(|t| &t.id != id);
        collections.publish();
        state.writes += 1;
        Ok(())
    }

    async fn commit(&self, owner: &UserId, batch: WriteBatch) -> StoreResult<()> {
        let mut state = self.lock();
        state.check_failure()?;
        let collections = state.owner(owner);

        // Stage on copies so a failing op leaves nothing applied
        let mut tasks = collections.tasks.clone();
        let mut tags = collections.tags.clone();
        for op in batch.ops() {
            apply_op(&mut tasks, &mut tags, op)?;
        }
        collections.tasks = tasks;
        collections.tags = tags;
        collections.publish();
        state.writes += 1;
        debug!(owner = %owner, ops = batch.len(), "batch committed");
        Ok(())
    }

    fn subscribe_tasks(
        &self,
        owner: &UserId,
        token: CancellationToken,
    ) -> Subscription<Vec<Task>> {
        let rx = self.lock().owner(owner).tasks_tx.subscribe();
        Subscription::new(rx, token)
    }

    fn subscribe_tags(&self, owner: &UserId, token: CancellationToken) -> Subscription<Vec<Tag>> {
        let rx = self.lock().owner(owner).tags_tx.subscribe();
        Subscription::new(rx, token)
    }
}

#[derive(Default)]
struct IdentityState {
    registered: HashSet<String>,
    reset_requests: usize,
    reset_limit: Option<usize>,
    sign_out_failure: Option<IdentityError>,
}

/// In-memory identity provider with a scriptable signed-in user
pub struct MemoryIdentity {
    current: watch::Sender<Option<User>>,
    state: Mutex<IdentityState>,
}

impl Default for MemoryIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self {
            current: watch::channel(None).0,
            state: Mutex::new(IdentityState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, IdentityState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Known account for password reset requests
    pub fn register(&self, email: &str) {
        self.lock().registered.insert(email.to_lowercase());
    }

    /// Emit a signed-in user, as the sign-in widget would
    pub fn sign_in(&self, user: User) {
        self.current.send_replace(Some(user));
    }

    pub fn current_user(&self) -> Option<User> {
        self.current.borrow().clone()
    }

    /// Answer reset requests beyond `limit` with too-many-requests
    pub fn limit_resets(&self, limit: usize) {
        self.lock().reset_limit = Some(limit);
    }

    pub fn fail_next_sign_out(&self, error: IdentityError) {
        self.lock().sign_out_failure = Some(error);
    }

    pub fn reset_requests(&self) -> usize {
        self.lock().reset_requests
    }

    /// Auth-state subscriptions still attached
    pub fn listeners(&self) -> usize {
        self.current.receiver_count()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    fn auth_state(&self) -> Subscription<Option<User>> {
        Subscription::new(self.current.subscribe(), CancellationToken::new())
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        if let Some(error) = self.lock().sign_out_failure.take() {
            return Err(error);
        }
        self.current.send_replace(None);
        Ok(())
    }

    async fn send_password_reset_email(&self, email: &str) -> Result<(), IdentityError> {
        let mut state = self.lock();
        state.reset_requests += 1;
        if state
            .reset_limit
            .is_some_and(|limit| state.reset_requests > limit)
        {
            return Err(IdentityError::TooManyRequests);
        }
        let email = email.to_lowercase();
        let valid = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid {
            return Err(IdentityError::InvalidEmail);
        }
        if !state.registered.contains(&email) {
            return Err(IdentityError::UserNotFound);
        }
        Ok(())
    }
}
