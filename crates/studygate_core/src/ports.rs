//! crates/studygate_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like the
//! portal's HTTP interface or the on-disk content store.

use crate::domain::{ContentEntry, LoginRecord, PortalCredentials, StudentProfile, UserId, Year};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services
/// (e.g., the portal's HTTP stack, the filesystem).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// Transport failure or unexpected status talking to an external service.
    #[error("Network error: {0}")]
    Network(String),
    /// A page or document did not contain what we needed to extract.
    #[error("Parse error: {0}")]
    Parse(String),
    /// A directory or file is absent at access time.
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The result of one login attempt against the portal.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// The portal accepted the credentials. Carries the raw HTML of the
    /// authenticated student-info page, fetched on the same cookie jar.
    Authenticated { profile_page: String },
    /// HTTP 200 carrying the portal's invalid-credentials marker.
    InvalidCredentials,
}

/// Runs isolated login attempts against the academic portal.
///
/// Implementations must scope cookies to a single call: two concurrent
/// `login` calls must never share an HTTP session.
#[async_trait]
pub trait PortalService: Send + Sync {
    async fn login(&self, credentials: &PortalCredentials) -> PortResult<LoginOutcome>;
}

/// Process-wide mapping from platform user to authenticated profile.
///
/// One profile per user; a new login overwrites. Callers serialize access
/// per user id, so implementations only need coarse interior locking.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put(&self, user: UserId, profile: StudentProfile);
    async fn get(&self, user: UserId) -> Option<StudentProfile>;
    async fn remove(&self, user: UserId);
}

/// Read-only view of the hierarchical study-material store.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Immediate entries of a directory, name-sorted. `NotFound` if the
    /// directory is absent.
    async fn list(&self, path: &Path) -> PortResult<Vec<ContentEntry>>;
    async fn exists(&self, path: &Path) -> bool;
    /// Checks a leaf is still a readable file before delivery and reports
    /// its size in bytes. `NotFound` if it vanished since listing. The
    /// gateway streams the file itself, so no bytes are read here.
    async fn probe(&self, path: &Path) -> PortResult<u64>;
    /// Root directory for a category, before the year subdirectory.
    fn category_root(&self, category: crate::domain::Category) -> Option<PathBuf>;
}

/// Persisted subject -> URL links per year, read-only for the bot.
#[async_trait]
pub trait PlaylistStore: Send + Sync {
    async fn links_for_year(&self, year: Year) -> PortResult<Vec<(String, String)>>;
}

/// Append-only sink recording each successful login.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn append(&self, record: &LoginRecord) -> PortResult<()>;
}
