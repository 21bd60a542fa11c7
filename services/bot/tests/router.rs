//! End-to-end tests for the menu/session state machine, driven through the
//! router with fake ports standing in for the portal and the content store.

use async_trait::async_trait;
use bot_lib::adapters::InMemorySessions;
use bot_lib::chat::{self, messages};
use bot_lib::chat::protocol::{Button, Incoming, Outgoing};
use bot_lib::chat::state::{AppState, ChatSessions, SessionMode};
use bot_lib::config::Config;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use studygate_core::domain::{
    Category, ContentEntry, EntryKind, LoginRecord, PortalCredentials, UserId, Year,
};
use studygate_core::ports::{
    ContentStore, LoginOutcome, PlaylistStore, PortError, PortResult, PortalService, RecordSink,
};
use tokio::sync::Mutex;

const USER: UserId = UserId(42);

/// Student-info page the fake portal serves on success.
const PROFILE_HTML: &str = r#"
    <table>
      <tr><td>اسم الطالب</td><td>Ahmed Ali</td></tr>
      <tr><td>الفرقة</td><td>3</td></tr>
    </table>"#;

//=========================================================================================
// Fakes
//=========================================================================================

enum FakeLogin {
    Page(&'static str),
    Invalid,
    Network,
    NoToken,
}

struct FakePortal(FakeLogin);

#[async_trait]
impl PortalService for FakePortal {
    async fn login(&self, _credentials: &PortalCredentials) -> PortResult<LoginOutcome> {
        match &self.0 {
            FakeLogin::Page(html) => Ok(LoginOutcome::Authenticated {
                profile_page: html.to_string(),
            }),
            FakeLogin::Invalid => Ok(LoginOutcome::InvalidCredentials),
            FakeLogin::Network => Err(PortError::Network("portal unreachable".to_string())),
            FakeLogin::NoToken => Err(PortError::Parse("missing token input".to_string())),
        }
    }
}

#[derive(Default)]
struct FakeContent {
    dirs: HashMap<PathBuf, Vec<ContentEntry>>,
    files: HashSet<PathBuf>,
    unreadable: HashSet<PathBuf>,
}

impl FakeContent {
    fn dir(mut self, path: &str, entries: &[(&str, EntryKind)]) -> Self {
        let mut listed: Vec<ContentEntry> = entries
            .iter()
            .map(|(name, kind)| ContentEntry {
                name: name.to_string(),
                kind: *kind,
            })
            .collect();
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        self.dirs.insert(PathBuf::from(path), listed);
        self
    }

    fn file(mut self, path: &str) -> Self {
        self.files.insert(PathBuf::from(path));
        self
    }

    fn unreadable_file(mut self, path: &str) -> Self {
        self.files.insert(PathBuf::from(path));
        self.unreadable.insert(PathBuf::from(path));
        self
    }
}

#[async_trait]
impl ContentStore for FakeContent {
    async fn list(&self, path: &Path) -> PortResult<Vec<ContentEntry>> {
        self.dirs
            .get(path)
            .cloned()
            .ok_or_else(|| PortError::NotFound(path.display().to_string()))
    }

    async fn exists(&self, path: &Path) -> bool {
        self.dirs.contains_key(path) || self.files.contains(path)
    }

    async fn probe(&self, path: &Path) -> PortResult<u64> {
        if self.unreadable.contains(path) {
            Err(PortError::Unexpected("permission denied".to_string()))
        } else if self.files.contains(path) {
            Ok(1024)
        } else {
            Err(PortError::NotFound(path.display().to_string()))
        }
    }

    fn category_root(&self, category: Category) -> Option<PathBuf> {
        match category {
            Category::Books => Some(PathBuf::from("/books")),
            Category::Summaries => Some(PathBuf::from("/sums")),
            Category::Playlists => None,
        }
    }
}

#[derive(Default)]
struct FakePlaylists {
    links: HashMap<u8, Vec<(String, String)>>,
}

#[async_trait]
impl PlaylistStore for FakePlaylists {
    async fn links_for_year(&self, year: Year) -> PortResult<Vec<(String, String)>> {
        Ok(self.links.get(&year.number()).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
struct RecordingSink {
    rows: Mutex<Vec<LoginRecord>>,
}

#[async_trait]
impl RecordSink for RecordingSink {
    async fn append(&self, record: &LoginRecord) -> PortResult<()> {
        self.rows.lock().await.push(record.clone());
        Ok(())
    }
}

//=========================================================================================
// Harness
//=========================================================================================

fn test_config() -> Config {
    Config {
        portal_base_url: "https://portal.test".to_string(),
        books_dir: PathBuf::from("/books"),
        summaries_dir: PathBuf::from("/sums"),
        playlists_path: PathBuf::from("/playlists.json"),
        records_path: PathBuf::from("/logins.jsonl"),
        log_level: tracing::Level::INFO,
        max_menu_entries: 30,
    }
}

fn make_app(
    login: FakeLogin,
    content: FakeContent,
    playlists: FakePlaylists,
) -> (AppState, Arc<RecordingSink>) {
    let records = Arc::new(RecordingSink::default());
    let app = AppState {
        portal: Arc::new(FakePortal(login)),
        sessions: Arc::new(InMemorySessions::new()),
        content: Arc::new(content),
        playlists: Arc::new(playlists),
        records: records.clone(),
        config: Arc::new(test_config()),
        chat: Arc::new(ChatSessions::new()),
    };
    (app, records)
}

fn books_tree() -> FakeContent {
    FakeContent::default()
        .dir("/books/year_1", &[("Math", EntryKind::Directory)])
        .dir("/books/year_1/Math", &[("ch1.pdf", EntryKind::File)])
        .file("/books/year_1/Math/ch1.pdf")
}

async fn command(app: &AppState, name: &str) -> Outgoing {
    one(chat::handle(
        app,
        USER,
        Some("ahmed"),
        Incoming::Command {
            name: name.to_string(),
        },
    )
    .await)
}

async fn press(app: &AppState, payload: &str) -> Outgoing {
    one(chat::handle(
        app,
        USER,
        Some("ahmed"),
        Incoming::Button {
            payload: payload.to_string(),
        },
    )
    .await)
}

async fn send_text(app: &AppState, body: &str) -> Outgoing {
    one(chat::handle(
        app,
        USER,
        Some("ahmed"),
        Incoming::Text {
            body: body.to_string(),
        },
    )
    .await)
}

fn one(mut replies: Vec<Outgoing>) -> Outgoing {
    assert_eq!(replies.len(), 1, "expected exactly one reply");
    replies.pop().unwrap()
}

fn keyboard(out: &Outgoing) -> &Vec<Vec<Button>> {
    match out {
        Outgoing::Menu { keyboard, .. } => keyboard,
        other => panic!("expected a menu, got {other:?}"),
    }
}

fn menu_text(out: &Outgoing) -> &str {
    match out {
        Outgoing::Menu { text, .. } => text,
        Outgoing::Text { text } => text,
        other => panic!("expected text, got {other:?}"),
    }
}

/// Payload of the first button whose label contains `label`.
fn payload_of(out: &Outgoing, label: &str) -> String {
    keyboard(out)
        .iter()
        .flatten()
        .find(|b| b.label.contains(label))
        .unwrap_or_else(|| panic!("no button labelled {label:?} in {out:?}"))
        .payload
        .clone()
}

async fn login(app: &AppState) -> Outgoing {
    command(app, "start").await;
    press(app, "student").await;
    send_text(app, "student:secret123").await
}

async fn mode_of(app: &AppState) -> SessionMode {
    let slot = app.chat.checkout(USER).await;
    let state = slot.lock().await;
    state.mode
}

//=========================================================================================
// Login Flow
//=========================================================================================

#[tokio::test]
async fn full_login_flow_renders_main_menu() {
    let (app, records) = make_app(
        FakeLogin::Page(PROFILE_HTML),
        FakeContent::default(),
        FakePlaylists::default(),
    );

    let role = command(&app, "start").await;
    assert_eq!(menu_text(&role), messages::ROLE_PROMPT);
    assert_eq!(keyboard(&role).len(), 1);

    let prompt = press(&app, "student").await;
    assert_eq!(menu_text(&prompt), messages::CREDENTIALS_PROMPT);
    assert_eq!(mode_of(&app).await, SessionMode::AwaitingCredentials);

    let main = send_text(&app, "student:secret123").await;
    assert!(menu_text(&main).contains("Welcome Ahmed Ali"));
    assert!(menu_text(&main).contains("Study group: 3"));
    assert_eq!(keyboard(&main).len(), 4);

    let profile = app.sessions.get(USER).await.expect("session stored");
    assert_eq!(profile.name, "Ahmed Ali");
    assert_eq!(profile.study_group, "3");
    assert_eq!(profile.email, "student");
    assert_eq!(profile.platform_username.as_deref(), Some("ahmed"));

    let rows = records.rows.lock().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Ahmed Ali");
}

#[tokio::test]
async fn malformed_credentials_keep_awaiting_state() {
    let (app, _) = make_app(
        FakeLogin::Page(PROFILE_HTML),
        FakeContent::default(),
        FakePlaylists::default(),
    );
    command(&app, "start").await;
    press(&app, "student").await;

    let reply = send_text(&app, "no separator here").await;
    assert_eq!(menu_text(&reply), messages::GENERIC_ERROR);
    assert_eq!(mode_of(&app).await, SessionMode::AwaitingCredentials);

    // A correct message afterwards still succeeds.
    let main = send_text(&app, "student:secret123").await;
    assert_eq!(keyboard(&main).len(), 4);
}

#[tokio::test]
async fn invalid_credentials_are_surfaced_verbatim() {
    let (app, records) = make_app(
        FakeLogin::Invalid,
        FakeContent::default(),
        FakePlaylists::default(),
    );
    command(&app, "start").await;
    press(&app, "student").await;

    let reply = send_text(&app, "student:wrong").await;
    assert_eq!(menu_text(&reply), messages::INVALID_CREDENTIALS);
    assert_eq!(mode_of(&app).await, SessionMode::AwaitingCredentials);
    assert!(app.sessions.get(USER).await.is_none());
    assert!(records.rows.lock().await.is_empty());
}

#[tokio::test]
async fn portal_failures_become_retry_prompts() {
    let (app, _) = make_app(
        FakeLogin::Network,
        FakeContent::default(),
        FakePlaylists::default(),
    );
    command(&app, "start").await;
    press(&app, "student").await;
    let reply = send_text(&app, "student:secret123").await;
    assert_eq!(menu_text(&reply), messages::GENERIC_ERROR);

    let (app, _) = make_app(
        FakeLogin::NoToken,
        FakeContent::default(),
        FakePlaylists::default(),
    );
    command(&app, "start").await;
    press(&app, "student").await;
    let reply = send_text(&app, "student:secret123").await;
    assert_eq!(menu_text(&reply), messages::LOGIN_INIT_FAILED);
}

#[tokio::test]
async fn free_text_before_login_is_rejected() {
    let (app, _) = make_app(
        FakeLogin::Invalid,
        FakeContent::default(),
        FakePlaylists::default(),
    );
    let reply = send_text(&app, "hello").await;
    assert_eq!(menu_text(&reply), messages::NOT_LOGGED_IN);
}

#[tokio::test]
async fn start_when_already_logged_in_shows_main_menu() {
    let (app, _) = make_app(
        FakeLogin::Page(PROFILE_HTML),
        FakeContent::default(),
        FakePlaylists::default(),
    );
    login(&app).await;
    let main = command(&app, "start").await;
    assert!(menu_text(&main).contains("Welcome Ahmed Ali"));
    assert_eq!(keyboard(&main).len(), 4);
}

//=========================================================================================
// Browsing
//=========================================================================================

#[tokio::test]
async fn browse_books_year1_and_deliver_file() {
    let (app, _) = make_app(FakeLogin::Page(PROFILE_HTML), books_tree(), FakePlaylists::default());
    login(&app).await;

    let selector = press(&app, "books").await;
    assert_eq!(menu_text(&selector), messages::CHOOSE_YEAR_BOOKS);
    // Four years plus Back.
    assert_eq!(keyboard(&selector).len(), 5);

    let listing = press(&app, "year_1").await;
    assert_eq!(menu_text(&listing), messages::CHOOSE_FILE);
    let math = payload_of(&listing, "Math");
    assert!(math.starts_with('d'));

    let inner = press(&app, &math).await;
    let ch1 = payload_of(&inner, "ch1");
    assert!(ch1.starts_with('f'));

    let delivery = press(&app, &ch1).await;
    match delivery {
        Outgoing::Document { path, filename } => {
            assert_eq!(path, PathBuf::from("/books/year_1/Math/ch1.pdf"));
            assert_eq!(filename, "ch1.pdf");
        }
        other => panic!("expected a document, got {other:?}"),
    }

    // Back returns to the year-1 listing, not the main menu.
    let parent = press(&app, "back").await;
    assert_eq!(menu_text(&parent), messages::CHOOSE_FILE);
    assert!(keyboard(&parent).iter().flatten().any(|b| b.label == "Math"));
}

#[tokio::test]
async fn tokens_resolve_to_the_paths_they_were_rendered_from() {
    let content = FakeContent::default()
        .dir(
            "/books/year_1",
            &[("Algebra", EntryKind::Directory), ("notes.pdf", EntryKind::File)],
        )
        .dir("/books/year_1/Algebra", &[])
        .file("/books/year_1/notes.pdf");
    let (app, _) = make_app(FakeLogin::Page(PROFILE_HTML), content, FakePlaylists::default());
    login(&app).await;
    press(&app, "books").await;
    let listing = press(&app, "year_1").await;

    let dir_token = payload_of(&listing, "Algebra");
    let file_token = payload_of(&listing, "notes");
    assert!(dir_token.starts_with('d'));
    assert!(file_token.starts_with('f'));

    let slot = app.chat.checkout(USER).await;
    let state = slot.lock().await;
    let nav = state.nav.as_ref().expect("browsing context");
    assert_eq!(
        nav.tokens.get(&dir_token),
        Some(&PathBuf::from("/books/year_1/Algebra"))
    );
    assert_eq!(
        nav.tokens.get(&file_token),
        Some(&PathBuf::from("/books/year_1/notes.pdf"))
    );
}

#[tokio::test]
async fn back_unwinds_the_stack_to_main_menu() {
    let content = FakeContent::default()
        .dir("/books/year_2", &[("a", EntryKind::Directory)])
        .dir("/books/year_2/a", &[("b", EntryKind::Directory)])
        .dir("/books/year_2/a/b", &[("deep.pdf", EntryKind::File)])
        .file("/books/year_2/a/b/deep.pdf");
    let (app, _) = make_app(FakeLogin::Page(PROFILE_HTML), content, FakePlaylists::default());
    login(&app).await;
    press(&app, "books").await;

    let root = press(&app, "year_2").await;
    let a = payload_of(&root, "a");
    let inner = press(&app, &a).await;
    let b = payload_of(&inner, "b");
    let leaf_listing = press(&app, &b).await;
    assert!(keyboard(&leaf_listing).iter().flatten().any(|btn| btn.label == "deep"));

    // Two pops land back on the year root.
    press(&app, "back").await;
    let root_again = press(&app, "back").await;
    assert!(keyboard(&root_again).iter().flatten().any(|btn| btn.label == "a"));

    // Third pop leaves the tree for the year selector.
    let selector = press(&app, "back").await;
    assert_eq!(menu_text(&selector), messages::CHOOSE_YEAR_BOOKS);
    assert_eq!(mode_of(&app).await, SessionMode::SelectingYear(Category::Books));

    // Fourth lands on the main menu; further presses are idempotent.
    let main = press(&app, "back").await;
    assert_eq!(menu_text(&main), messages::MAIN_MENU);
    let main_again = press(&app, "back").await;
    assert_eq!(menu_text(&main_again), messages::MAIN_MENU);
    assert_eq!(mode_of(&app).await, SessionMode::MainMenu);
}

#[tokio::test]
async fn missing_year_directory_is_recoverable() {
    let (app, _) = make_app(
        FakeLogin::Page(PROFILE_HTML),
        FakeContent::default(),
        FakePlaylists::default(),
    );
    login(&app).await;
    press(&app, "books").await;
    let reply = press(&app, "year_4").await;
    assert_eq!(menu_text(&reply), messages::YEAR_UNAVAILABLE);
    // Still on the year selector; the user can pick another year.
    assert_eq!(mode_of(&app).await, SessionMode::SelectingYear(Category::Books));
}

#[tokio::test]
async fn missing_file_at_delivery_keeps_navigation_position() {
    // Listed but not openable: vanished between listing and delivery.
    let content = FakeContent::default().dir("/books/year_1", &[("ghost.pdf", EntryKind::File)]);
    let (app, _) = make_app(FakeLogin::Page(PROFILE_HTML), content, FakePlaylists::default());
    login(&app).await;
    press(&app, "books").await;

    let listing = press(&app, "year_1").await;
    let ghost = payload_of(&listing, "ghost");
    let reply = press(&app, &ghost).await;
    assert_eq!(menu_text(&reply), messages::FILE_UNAVAILABLE);
    assert!(keyboard(&reply).iter().flatten().any(|b| b.payload == "back"));

    let slot = app.chat.checkout(USER).await;
    let state = slot.lock().await;
    assert_eq!(state.nav.as_ref().unwrap().dir_stack.len(), 1);
}

#[tokio::test]
async fn unreadable_file_at_delivery_is_reported_without_reading_it() {
    // Present on disk but the pre-delivery check fails, e.g. permissions.
    let content = FakeContent::default()
        .dir("/books/year_1", &[("locked.pdf", EntryKind::File)])
        .unreadable_file("/books/year_1/locked.pdf");
    let (app, _) = make_app(FakeLogin::Page(PROFILE_HTML), content, FakePlaylists::default());
    login(&app).await;
    press(&app, "books").await;

    let listing = press(&app, "year_1").await;
    let locked = payload_of(&listing, "locked");
    let reply = press(&app, &locked).await;
    assert_eq!(menu_text(&reply), messages::DELIVERY_FAILED);
    assert!(keyboard(&reply).iter().flatten().any(|b| b.payload == "back"));
}

#[tokio::test]
async fn tokens_from_a_previous_render_are_rejected() {
    let (app, _) = make_app(FakeLogin::Page(PROFILE_HTML), books_tree(), FakePlaylists::default());
    login(&app).await;
    press(&app, "books").await;

    let listing = press(&app, "year_1").await;
    let old_math = payload_of(&listing, "Math");

    // Leave and re-enter: a fresh render with a fresh generation.
    press(&app, "back").await;
    let listing = press(&app, "year_1").await;
    let new_math = payload_of(&listing, "Math");
    assert_ne!(old_math, new_math);

    let reply = press(&app, &old_math).await;
    assert_eq!(menu_text(&reply), messages::REQUEST_EXPIRED);
    // The fresh token still works.
    let inner = press(&app, &new_math).await;
    assert_eq!(menu_text(&inner), messages::CHOOSE_FILE);
}

//=========================================================================================
// Session Lifecycle & Playlists
//=========================================================================================

#[tokio::test]
async fn logout_cascades_over_navigation_state() {
    let (app, _) = make_app(FakeLogin::Page(PROFILE_HTML), books_tree(), FakePlaylists::default());
    login(&app).await;
    press(&app, "books").await;
    let listing = press(&app, "year_1").await;
    let math = payload_of(&listing, "Math");

    let reply = press(&app, "logout").await;
    assert_eq!(menu_text(&reply), messages::LOGGED_OUT);
    assert!(app.sessions.get(USER).await.is_none());
    assert_eq!(mode_of(&app).await, SessionMode::Unauthenticated);

    // A leftover token from before the logout resolves to nothing.
    let stale = press(&app, &math).await;
    assert_eq!(menu_text(&stale), messages::REQUEST_EXPIRED);
}

#[tokio::test]
async fn categories_require_a_session() {
    let (app, _) = make_app(
        FakeLogin::Invalid,
        FakeContent::default(),
        FakePlaylists::default(),
    );
    let reply = press(&app, "books").await;
    assert_eq!(menu_text(&reply), messages::NOT_LOGGED_IN);
}

#[tokio::test]
async fn playlists_render_links_per_year() {
    let mut playlists = FakePlaylists::default();
    playlists.links.insert(
        2,
        vec![("Math".to_string(), "https://playlists.test/math".to_string())],
    );
    let (app, _) = make_app(FakeLogin::Page(PROFILE_HTML), FakeContent::default(), playlists);
    login(&app).await;

    let selector = press(&app, "playlists").await;
    assert_eq!(menu_text(&selector), messages::CHOOSE_YEAR_PLAYLISTS);

    let links = press(&app, "year_2").await;
    assert!(menu_text(&links).contains("https://playlists.test/math"));

    let empty = press(&app, "year_3").await;
    assert_eq!(menu_text(&empty), messages::NO_PLAYLISTS);

    // Back from the year selector returns to the main menu.
    let main = press(&app, "back").await;
    assert_eq!(menu_text(&main), messages::MAIN_MENU);
}
