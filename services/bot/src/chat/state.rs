//! services/bot/src/chat/state.rs
//!
//! Defines the application's shared state and the per-user chat state.

use crate::config::Config;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use studygate_core::domain::{Category, UserId, Year};
use studygate_core::ports::{ContentStore, PlaylistStore, PortalService, RecordSink, SessionStore};
use tokio::sync::Mutex;

//=========================================================================================
// AppState (Shared Across All Users)
//=========================================================================================

/// The shared application state, created once at startup and passed to all
/// handlers. All collaborators sit behind their ports so tests can inject
/// fakes.
#[derive(Clone)]
pub struct AppState {
    pub portal: Arc<dyn PortalService>,
    pub sessions: Arc<dyn SessionStore>,
    pub content: Arc<dyn ContentStore>,
    pub playlists: Arc<dyn PlaylistStore>,
    pub records: Arc<dyn RecordSink>,
    pub config: Arc<Config>,
    pub chat: Arc<ChatSessions>,
}

//=========================================================================================
// Per-User Chat State
//=========================================================================================

/// Where a user currently is in the menu state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Unauthenticated,
    AwaitingCredentials,
    MainMenu,
    /// Category chosen, year selector on screen.
    SelectingYear(Category),
    /// Inside a year's directory tree; `UserState::nav` is populated.
    Browsing,
}

/// Per-user browsing position inside one category/year tree.
///
/// `dir_stack` runs from the year root to the current directory and is never
/// empty while the mode is `Browsing`. `tokens` is rebuilt on every render
/// and only valid for `generation`; earlier generations are rejected.
#[derive(Debug, Clone)]
pub struct NavigationContext {
    pub category: Category,
    pub year: Year,
    pub dir_stack: Vec<PathBuf>,
    pub tokens: HashMap<String, PathBuf>,
    pub generation: u64,
}

/// The full chat state of one user.
#[derive(Debug, Clone)]
pub struct UserState {
    pub mode: SessionMode,
    pub nav: Option<NavigationContext>,
    /// Monotonic render counter; token generations are drawn from it so a
    /// token can never be valid across two renders.
    pub render_seq: u64,
}

impl Default for UserState {
    fn default() -> Self {
        Self {
            mode: SessionMode::Unauthenticated,
            nav: None,
            render_seq: 0,
        }
    }
}

//=========================================================================================
// ChatSessions (Per-User Checkout Registry)
//=========================================================================================

/// Hands out one `Arc<Mutex<UserState>>` per user. Handlers hold the user's
/// mutex for the whole action, which serializes concurrent actions from the
/// same user while leaving different users fully parallel.
#[derive(Default)]
pub struct ChatSessions {
    inner: Mutex<HashMap<UserId, Arc<Mutex<UserState>>>>,
}

impl ChatSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn checkout(&self, user: UserId) -> Arc<Mutex<UserState>> {
        self.inner
            .lock()
            .await
            .entry(user)
            .or_default()
            .clone()
    }

    /// Drops the user's entire chat state: mode, navigation stack and any
    /// live tokens. Used on logout so nothing stale can resolve afterwards.
    pub async fn reset(&self, user: UserId) {
        self.inner.lock().await.remove(&user);
    }
}
