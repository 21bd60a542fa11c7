//! services/bot/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The
//! `.env` file is used for local development.

use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
///
/// Every variable has a usable default, so the only way to fail is to set
/// one to something unusable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the academic portal, without a trailing slash.
    pub portal_base_url: String,
    pub books_dir: PathBuf,
    pub summaries_dir: PathBuf,
    pub playlists_path: PathBuf,
    pub records_path: PathBuf,
    pub log_level: Level,
    /// Upper bound on buttons rendered for one directory listing.
    pub max_menu_entries: usize,
}

impl Config {
    /// Path of the portal's login form, relative to the base URL.
    pub const LOGIN_PATH: &'static str = "/Account/Login";
    /// Path of the authenticated student-info page.
    pub const STUDENT_INFO_PATH: &'static str = "/Student/Index";

    pub fn login_url(&self) -> String {
        format!("{}{}", self.portal_base_url, Self::LOGIN_PATH)
    }

    pub fn student_info_url(&self) -> String {
        format!("{}{}", self.portal_base_url, Self::STUDENT_INFO_PATH)
    }

    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let portal_base_url = std::env::var("PORTAL_BASE_URL")
            .unwrap_or_else(|_| "https://fcai.deltateach.com".to_string());
        let portal_base_url = portal_base_url.trim_end_matches('/').to_string();
        if !portal_base_url.starts_with("http") {
            return Err(ConfigError::InvalidValue(
                "PORTAL_BASE_URL".to_string(),
                format!("'{}' is not an http(s) URL", portal_base_url),
            ));
        }

        let books_dir = std::env::var("BOOKS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("study_materials"));
        let summaries_dir = std::env::var("SUMMARIES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("study_summaries"));
        let playlists_path = std::env::var("PLAYLISTS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("playlists.json"));
        let records_path = std::env::var("RECORDS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("logins.jsonl"));

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let max_menu_entries = match std::env::var("MAX_MENU_ENTRIES") {
            Ok(raw) => parse_max_entries(&raw)?,
            Err(_) => 30,
        };

        Ok(Self {
            portal_base_url,
            books_dir,
            summaries_dir,
            playlists_path,
            records_path,
            log_level,
            max_menu_entries,
        })
    }
}

/// A listing capped at zero entries would render nothing but the back row,
/// so zero is rejected along with anything non-numeric.
fn parse_max_entries(raw: &str) -> Result<usize, ConfigError> {
    match raw.parse::<usize>() {
        Ok(0) | Err(_) => Err(ConfigError::InvalidValue(
            "MAX_MENU_ENTRIES".to_string(),
            format!("'{}' is not a positive integer", raw),
        )),
        Ok(n) => Ok(n),
    }
}
