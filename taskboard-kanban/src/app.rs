//! Authenticated application shell.
//!
//! [`App`] follows the identity provider's auth state. Signing in opens a
//! [`BoardSession`] for that user; signing out, or a different user signing
//! in, ends it so no snapshot for one account is ever applied to another.

use crate::board::BoardSession;
use crate::clock::Clock;
use crate::config::BoardConfig;
use crate::error::Result;
use crate::identity::{self, IdentityProvider, ResetStatus};
use crate::ordering::OrderKeys;
use crate::store::{LiveCollectionStore, Subscription};
use crate::types::User;
use std::sync::Arc;
use tracing::{error, info};

/// Where the shell is in the sign-in flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPhase {
    /// Waiting for the provider's first auth state
    Loading,
    SignedOut,
    SignedIn(User),
}

pub struct App {
    store: Arc<dyn LiveCollectionStore>,
    identity: Arc<dyn IdentityProvider>,
    clock: Arc<dyn Clock>,
    config: BoardConfig,
    auth: Option<Subscription<Option<User>>>,
    phase: AuthPhase,
    session: Option<BoardSession>,
}

impl App {
    pub fn new(
        store: Arc<dyn LiveCollectionStore>,
        identity: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
        config: BoardConfig,
    ) -> Self {
        let auth = identity.auth_state();
        Self {
            store,
            identity,
            clock,
            config,
            auth: Some(auth),
            phase: AuthPhase::Loading,
            session: None,
        }
    }

    pub fn phase(&self) -> &AuthPhase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == AuthPhase::Loading
    }

    pub fn user(&self) -> Option<&User> {
        match &self.phase {
            AuthPhase::SignedIn(user) => Some(user),
            _ => None,
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&BoardSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut BoardSession> {
        self.session.as_mut()
    }

    /// Apply an auth change that already arrived, without waiting
    pub fn sync_auth(&mut self) -> bool {
        match self.auth.as_mut().and_then(Subscription::take_latest) {
            Some(user) => {
                self.apply_auth(user);
                true
            }
            None => false,
        }
    }

    /// Wait for the next auth change and apply it. False after shutdown.
    pub async fn next_auth_change(&mut self) -> bool {
        let Some(auth) = self.auth.as_mut() else {
            return false;
        };
        match auth.changed().await {
            Some(user) => {
                self.apply_auth(user);
                true
            }
            None => false,
        }
    }

    /// Accept the user handed over by the sign-in widget
    pub fn handle_sign_in(&mut self, user: User) {
        self.apply_auth(Some(user));
    }

    /// Sign out and end the board session. Failures are logged and returned;
    /// the session stays open in that case.
    pub async fn sign_out(&mut self) -> Result<()> {
        if let Err(err) = self.identity.sign_out().await {
            error!(error = %err, "sign out failed");
            return Err(err.into());
        }
        self.apply_auth(None);
        Ok(())
    }

    pub async fn request_password_reset(&self, email: &str) -> ResetStatus {
        identity::request_password_reset(self.identity.as_ref(), email).await
    }

    /// Header greeting: display name, else the email's local part
    pub fn greeting(&self) -> Option<String> {
        self.user()?
            .greeting_name()
            .map(|name| format!("Hello, {name}"))
    }

    /// End the session and stop following auth state
    pub fn shutdown(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.end();
        }
        if let Some(auth) = self.auth.take() {
            auth.release();
        }
    }

    fn apply_auth(&mut self, user: Option<User>) {
        let same_owner = matches!(
            (&user, &self.session),
            (Some(user), Some(session)) if session.owner() == &user.uid
        );

        if !same_owner {
            if let Some(mut session) = self.session.take() {
                session.end();
            }
            if let Some(user) = &user {
                info!(uid = %user.uid, "signed in");
                self.session = Some(BoardSession::start(
                    Arc::clone(&self.store),
                    user.uid.clone(),
                    Arc::clone(&self.clock),
                    OrderKeys::new(&self.config.ordering),
                ));
            }
        }

        self.phase = match user {
            Some(user) => AuthPhase::SignedIn(user),
            None => AuthPhase::SignedOut,
        };
    }
}
