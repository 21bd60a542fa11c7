//! crates/studygate_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or storage format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A messaging-platform user identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Only used while a login attempt is in flight - contains sensitive data.
#[derive(Debug, Clone)]
pub struct PortalCredentials {
    pub email: String,
    pub password: String,
}

/// A student profile scraped from the portal's student-info page.
///
/// Created once per successful login; a later successful re-login
/// overwrites it wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentProfile {
    pub name: String,
    pub email: String,
    pub study_group: String,
    pub national_id: Option<String>,
    pub mobile: Option<String>,
    pub platform_username: Option<String>,
}

/// Top-level content categories offered by the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Books,
    Summaries,
    Playlists,
}

impl Category {
    pub fn payload(&self) -> &'static str {
        match self {
            Category::Books => "books",
            Category::Summaries => "summaries",
            Category::Playlists => "playlists",
        }
    }

    pub fn from_payload(payload: &str) -> Option<Self> {
        match payload {
            "books" => Some(Category::Books),
            "summaries" => Some(Category::Summaries),
            "playlists" => Some(Category::Playlists),
            _ => None,
        }
    }
}

/// An academic year, 1 through 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Year(u8);

impl Year {
    pub const ALL: [Year; 4] = [Year(1), Year(2), Year(3), Year(4)];

    pub fn new(n: u8) -> Option<Self> {
        (1..=4).contains(&n).then_some(Year(n))
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    /// Directory name under a category root, e.g. `year_3`.
    pub fn dir_name(&self) -> String {
        format!("year_{}", self.0)
    }

    /// Arabic label shown on the year-selector buttons.
    pub fn label(&self) -> &'static str {
        match self.0 {
            1 => "الفرقة الأولى",
            2 => "الفرقة الثانية",
            3 => "الفرقة الثالثة",
            _ => "الفرقة الرابعة",
        }
    }
}

impl std::fmt::Display for Year {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a listed entry is a directory or a downloadable leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// One entry of a directory listing in the content store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// One row appended to the record sink per successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRecord {
    pub username: Option<String>,
    pub name: String,
    pub email: String,
    pub study_group: String,
    pub national_id: Option<String>,
    pub mobile: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl LoginRecord {
    /// Builds the record for a freshly scraped profile, stamped now.
    pub fn for_profile(profile: &StudentProfile) -> Self {
        Self {
            username: profile.platform_username.clone(),
            name: profile.name.clone(),
            email: profile.email.clone(),
            study_group: profile.study_group.clone(),
            national_id: profile.national_id.clone(),
            mobile: profile.mobile.clone(),
            timestamp: Utc::now(),
        }
    }
}
