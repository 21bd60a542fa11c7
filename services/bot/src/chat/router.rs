//! services/bot/src/chat/router.rs
//!
//! Pure dispatch: maps the (current session state, incoming action) pair to
//! exactly one handler and renders the resulting view. All business logic
//! lives in the portal/login flow and the navigation engine.

use crate::chat::login;
use crate::chat::messages;
use crate::chat::navigation::{self, back_row, BackOutcome};
use crate::chat::protocol::{Button, Incoming, Outgoing};
use crate::chat::state::{AppState, SessionMode, UserState};
use studygate_core::domain::{Category, UserId, Year};
use tracing::{error, warn};

/// Handles one inbound action for one user and returns the render requests
/// to send back. The user's chat state mutex is held for the whole call, so
/// two actions from the same user can never interleave.
pub async fn handle(
    app: &AppState,
    user: UserId,
    username: Option<&str>,
    action: Incoming,
) -> Vec<Outgoing> {
    let slot = app.chat.checkout(user).await;
    let mut state = slot.lock().await;

    match action {
        Incoming::Command { name } if name == "start" => vec![start(app, user, &mut state).await],
        Incoming::Command { name } => {
            warn!("user {} sent unknown command /{}", user, name);
            vec![Outgoing::text(messages::GENERIC_ERROR)]
        }
        Incoming::Text { body } => match state.mode {
            SessionMode::AwaitingCredentials => {
                vec![login::handle_credentials(app, user, username, &body, &mut state).await]
            }
            SessionMode::Unauthenticated => vec![Outgoing::text(messages::NOT_LOGGED_IN)],
            _ => {
                state.mode = SessionMode::MainMenu;
                state.nav = None;
                vec![Outgoing::menu(messages::MAIN_MENU, main_menu())]
            }
        },
        Incoming::Button { payload } => vec![button(app, user, &payload, &mut state).await],
    }
}

async fn start(app: &AppState, user: UserId, state: &mut UserState) -> Outgoing {
    state.nav = None;
    if let Some(profile) = app.sessions.get(user).await {
        state.mode = SessionMode::MainMenu;
        let text = messages::welcome(&profile.name, &profile.email, &profile.study_group);
        return Outgoing::menu(text, main_menu());
    }
    state.mode = SessionMode::Unauthenticated;
    Outgoing::menu(messages::ROLE_PROMPT, role_menu())
}

async fn button(app: &AppState, user: UserId, payload: &str, state: &mut UserState) -> Outgoing {
    match payload {
        "student" => {
            state.mode = SessionMode::AwaitingCredentials;
            state.nav = None;
            Outgoing::text(messages::CREDENTIALS_PROMPT)
        }
        "logout" => {
            app.sessions.remove(user).await;
            // Cascade: drop navigation stack and any live tokens with the
            // session. The in-place reset covers actions already queued on
            // this user's mutex; the registry entry goes too.
            *state = UserState::default();
            app.chat.reset(user).await;
            Outgoing::menu(messages::LOGGED_OUT, role_menu())
        }
        "back" => back(app, state).await,
        "menu" => {
            if app.sessions.get(user).await.is_none() {
                return Outgoing::text(messages::NOT_LOGGED_IN);
            }
            state.mode = SessionMode::MainMenu;
            state.nav = None;
            Outgoing::menu(messages::MAIN_MENU, main_menu())
        }
        _ => {
            if let Some(category) = Category::from_payload(payload) {
                return select_category(app, user, category, state).await;
            }
            if let Some(year) = payload.strip_prefix("year_") {
                return select_year(app, year, state).await;
            }
            if payload.starts_with('d') || payload.starts_with('f') {
                if state.mode != SessionMode::Browsing {
                    return Outgoing::text(messages::REQUEST_EXPIRED);
                }
                return navigation::select_token(
                    app.content.as_ref(),
                    app.config.max_menu_entries,
                    state,
                    payload,
                )
                .await;
            }
            warn!("user {} pressed unknown payload {:?}", user, payload);
            Outgoing::text(messages::REQUEST_EXPIRED)
        }
    }
}

async fn select_category(
    app: &AppState,
    user: UserId,
    category: Category,
    state: &mut UserState,
) -> Outgoing {
    if app.sessions.get(user).await.is_none() {
        return Outgoing::text(messages::NOT_LOGGED_IN);
    }
    state.mode = SessionMode::SelectingYear(category);
    state.nav = None;
    year_selector(category)
}

async fn select_year(app: &AppState, year: &str, state: &mut UserState) -> Outgoing {
    let SessionMode::SelectingYear(category) = state.mode else {
        // A year button from a listing rendered before logout/menu changes.
        return Outgoing::text(messages::REQUEST_EXPIRED);
    };
    let Some(year) = year.parse::<u8>().ok().and_then(Year::new) else {
        return Outgoing::text(messages::REQUEST_EXPIRED);
    };

    if category == Category::Playlists {
        // Links, not a directory tree; stay on the year selector.
        return playlists_message(app, year).await;
    }
    navigation::enter_year(
        app.content.as_ref(),
        app.config.max_menu_entries,
        state,
        category,
        year,
    )
    .await
}

async fn back(app: &AppState, state: &mut UserState) -> Outgoing {
    match state.mode {
        SessionMode::Browsing => {
            match navigation::back(app.content.as_ref(), app.config.max_menu_entries, state).await
            {
                BackOutcome::Render(out) => out,
                BackOutcome::ExitToYearSelector(category) => {
                    state.mode = SessionMode::SelectingYear(category);
                    year_selector(category)
                }
            }
        }
        SessionMode::SelectingYear(_) => {
            state.mode = SessionMode::MainMenu;
            Outgoing::menu(messages::MAIN_MENU, main_menu())
        }
        // Back at the top is a no-op re-render, never an error.
        SessionMode::MainMenu => Outgoing::menu(messages::MAIN_MENU, main_menu()),
        SessionMode::AwaitingCredentials | SessionMode::Unauthenticated => {
            state.mode = SessionMode::Unauthenticated;
            Outgoing::menu(messages::ROLE_PROMPT, role_menu())
        }
    }
}

async fn playlists_message(app: &AppState, year: Year) -> Outgoing {
    match app.playlists.links_for_year(year).await {
        Ok(links) if links.is_empty() => {
            Outgoing::menu(messages::NO_PLAYLISTS, vec![back_row()])
        }
        Ok(links) => {
            let lines: Vec<String> = links
                .iter()
                .map(|(subject, url)| format!("{subject}:\n{url}"))
                .collect();
            Outgoing::menu(lines.join("\n\n"), vec![back_row()])
        }
        Err(e) => {
            error!("failed to read playlists for year {}: {}", year, e);
            Outgoing::menu(messages::GENERIC_ERROR, vec![back_row()])
        }
    }
}

//=========================================================================================
// View Builders
//=========================================================================================

fn role_menu() -> Vec<Vec<Button>> {
    vec![vec![Button::new(messages::BTN_STUDENT, "student")]]
}

/// The four rows of the main menu.
pub fn main_menu() -> Vec<Vec<Button>> {
    vec![
        vec![Button::new(messages::BTN_BOOKS, Category::Books.payload())],
        vec![Button::new(
            messages::BTN_SUMMARIES,
            Category::Summaries.payload(),
        )],
        vec![Button::new(
            messages::BTN_PLAYLISTS,
            Category::Playlists.payload(),
        )],
        vec![Button::new(messages::BTN_LOGOUT, "logout")],
    ]
}

fn year_selector(category: Category) -> Outgoing {
    let text = match category {
        Category::Books => messages::CHOOSE_YEAR_BOOKS,
        Category::Summaries => messages::CHOOSE_YEAR_SUMMARIES,
        Category::Playlists => messages::CHOOSE_YEAR_PLAYLISTS,
    };
    let mut keyboard: Vec<Vec<Button>> = Year::ALL
        .iter()
        .map(|year| {
            vec![Button::new(
                year.label(),
                format!("year_{}", year.number()),
            )]
        })
        .collect();
    keyboard.push(back_row());
    Outgoing::menu(text, keyboard)
}
