//! Session lifecycle: state record, pure reducer, and the driver that runs
//! the network flows.
//!
//! Every state change goes through [`reduce`], a pure transition function
//! over [`SessionState`]. The [`Session`] driver owns its API client and
//! token store and is passed explicitly wherever it is needed; there is no
//! process-wide singleton.

use crate::api::ApiClient;
use crate::models::{User, UserPatch};
use crate::token::TokenStore;

/// Authentication status, tri-state: `Unknown` at startup until the first
/// restore attempt resolves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthStatus {
    #[default]
    Unknown,
    Authenticated,
    Anonymous,
}

/// The client-side session record.
///
/// Invariant: `auth == Authenticated` implies `user.is_some()`; the reducer
/// only produces `Authenticated` together with a user payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    pub auth: AuthStatus,
    pub loading: bool,
    pub user: Option<User>,
    pub error: Option<String>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.auth == AuthStatus::Authenticated
    }
}

/// State transitions, one per row of the session transition table.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    LoadingStarted,
    UserLoaded(User),
    LoginSucceeded(User),
    /// Any auth failure; `None` keeps the previous error message.
    AuthFailed(Option<String>),
    LoggedOut,
    ErrorsCleared,
    UserMerged(UserPatch),
}

impl SessionAction {
    fn name(&self) -> &'static str {
        match self {
            Self::LoadingStarted => "loading_started",
            Self::UserLoaded(_) => "user_loaded",
            Self::LoginSucceeded(_) => "login_succeeded",
            Self::AuthFailed(_) => "auth_failed",
            Self::LoggedOut => "logged_out",
            Self::ErrorsCleared => "errors_cleared",
            Self::UserMerged(_) => "user_merged",
        }
    }
}

/// Pure transition function: no I/O, no mutation of the input.
pub fn reduce(state: &SessionState, action: &SessionAction) -> SessionState {
    let mut next = state.clone();
    match action {
        SessionAction::LoadingStarted => {
            next.loading = true;
        }
        SessionAction::UserLoaded(user) => {
            next.auth = AuthStatus::Authenticated;
            next.loading = false;
            next.user = Some(user.clone());
        }
        SessionAction::LoginSucceeded(user) => {
            next.auth = AuthStatus::Authenticated;
            next.loading = false;
            next.user = Some(user.clone());
            next.error = None;
        }
        SessionAction::AuthFailed(message) => {
            next.auth = AuthStatus::Anonymous;
            next.loading = false;
            next.user = None;
            if let Some(message) = message {
                next.error = Some(message.clone());
            }
        }
        SessionAction::LoggedOut => {
            next = SessionState {
                auth: AuthStatus::Anonymous,
                loading: false,
                user: None,
                error: None,
            };
        }
        SessionAction::ErrorsCleared => {
            next.error = None;
        }
        SessionAction::UserMerged(patch) => {
            next.loading = false;
            if let Some(user) = next.user.as_mut() {
                user.apply(patch);
            }
        }
    }
    next
}

/// Drives the session flows against the API and token store.
pub struct Session {
    state: SessionState,
    client: ApiClient,
    tokens: TokenStore,
}

impl Session {
    pub fn new(client: ApiClient, tokens: TokenStore) -> Self {
        Self {
            state: SessionState::default(),
            client,
            tokens,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    fn dispatch(&mut self, action: SessionAction) {
        tracing::debug!(action = action.name(), "session transition");
        self.state = reduce(&self.state, &action);
    }

    /// Restore the session from the stored token. With no token present this
    /// resolves to anonymous without issuing any network call.
    pub fn load_user(&mut self) {
        if self.tokens.get().is_none() {
            tracing::debug!("no stored token, session is anonymous");
            self.dispatch(SessionAction::AuthFailed(None));
            return;
        }

        self.dispatch(SessionAction::LoadingStarted);
        match self.client.current_user() {
            Ok(user) => self.dispatch(SessionAction::UserLoaded(user)),
            Err(e) => {
                // All restore failures collapse to anonymous, undifferentiated.
                tracing::debug!(error = %e, "session restore failed");
                self.dispatch(SessionAction::AuthFailed(None));
            }
        }
    }

    /// Exchange credentials and hydrate the profile in one operation.
    ///
    /// On success the token is persisted before the state transitions, then
    /// the full profile is fetched within the same call. A hydration failure
    /// after a successful credential exchange leaves the session
    /// authenticated on the login payload; the profile can be refreshed
    /// later. On credential failure the token store is untouched.
    pub fn authenticate(&mut self, email: &str, password: &str) {
        self.dispatch(SessionAction::LoadingStarted);
        match self.client.login(email, password) {
            Ok(payload) => {
                if let Err(e) = self.tokens.set(&payload.token) {
                    tracing::warn!(error = %e, "failed to persist token");
                }
                self.dispatch(SessionAction::LoginSucceeded(payload.session_user()));

                match self.client.current_user() {
                    Ok(user) => self.dispatch(SessionAction::UserLoaded(user)),
                    Err(e) => {
                        tracing::warn!(error = %e, "profile hydration failed after login");
                    }
                }
            }
            Err(e) => {
                self.dispatch(SessionAction::AuthFailed(Some(e.user_message())));
            }
        }
    }

    /// Clear the stored token and reset the session. The in-memory reset
    /// happens even when the storage clear fails; the error is returned for
    /// reporting. Idempotent.
    pub fn logout(&mut self) -> anyhow::Result<()> {
        let cleared = self.tokens.clear();
        self.dispatch(SessionAction::LoggedOut);
        if let Err(e) = &cleared {
            tracing::warn!(error = %e, "failed to clear stored token");
        }
        cleared
    }

    pub fn clear_errors(&mut self) {
        self.dispatch(SessionAction::ErrorsCleared);
    }

    /// Local optimistic update; no round-trip. Only fields present in the
    /// patch overwrite.
    pub fn merge_user(&mut self, patch: UserPatch) {
        self.dispatch(SessionAction::UserMerged(patch));
    }
}
