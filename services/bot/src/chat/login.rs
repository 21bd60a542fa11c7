//! services/bot/src/chat/login.rs
//!
//! Handles the one free-text message of the login flow: `email:password`.
//! Delegates to the portal port, scrapes the profile out of the returned
//! page, populates the session store and appends a login record.

use crate::adapters::profile;
use crate::chat::messages;
use crate::chat::protocol::Outgoing;
use crate::chat::router::main_menu;
use crate::chat::state::{AppState, SessionMode, UserState};
use studygate_core::domain::{LoginRecord, PortalCredentials, UserId};
use studygate_core::ports::{LoginOutcome, PortError};
use tracing::{error, info, warn};

/// Processes a credentials message. On anything but success the user stays
/// in `AwaitingCredentials` so they can simply try again.
pub async fn handle_credentials(
    app: &AppState,
    user: UserId,
    username: Option<&str>,
    body: &str,
    state: &mut UserState,
) -> Outgoing {
    let Some(credentials) = parse_credentials(body) else {
        warn!("user {} sent a malformed credentials message", user);
        return Outgoing::text(messages::GENERIC_ERROR);
    };

    let outcome = match app.portal.login(&credentials).await {
        Ok(outcome) => outcome,
        Err(PortError::Parse(e)) => {
            // The login page did not carry an anti-forgery token; the POST
            // was never attempted.
            error!("login token unavailable for user {}: {}", user, e);
            return Outgoing::text(messages::LOGIN_INIT_FAILED);
        }
        Err(e) => {
            error!("portal login failed for user {}: {}", user, e);
            return Outgoing::text(messages::GENERIC_ERROR);
        }
    };

    let profile_page = match outcome {
        LoginOutcome::Authenticated { profile_page } => profile_page,
        LoginOutcome::InvalidCredentials => {
            info!("portal rejected credentials for user {}", user);
            return Outgoing::text(messages::INVALID_CREDENTIALS);
        }
    };

    let mut student = profile::extract(&profile_page, &credentials.email);
    student.platform_username = username.map(str::to_string);
    info!(
        "user {} logged in as '{}' ({})",
        user, student.name, student.study_group
    );

    let record = LoginRecord::for_profile(&student);
    if let Err(e) = app.records.append(&record).await {
        // Recording is best-effort; the login itself stands.
        error!("failed to append login record for user {}: {}", user, e);
    }

    let welcome = messages::welcome(&student.name, &student.email, &student.study_group);
    app.sessions.put(user, student).await;
    state.mode = SessionMode::MainMenu;
    state.nav = None;
    Outgoing::menu(welcome, main_menu())
}

/// Splits `email:password` on the first colon. Either side empty, or no
/// colon at all, is malformed input.
fn parse_credentials(body: &str) -> Option<PortalCredentials> {
    let (email, password) = body.trim().split_once(':')?;
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return None;
    }
    Some(PortalCredentials {
        email: email.to_string(),
        password: password.to_string(),
    })
}
