//! services/bot/src/chat/navigation.rs
//!
//! The per-user stack machine over the content hierarchy. Each render
//! assigns fresh short tokens to the entries of the current directory;
//! tokens carry a kind prefix (`d` directory, `f` file) and the render
//! generation, so a press on a button from an earlier render is detected
//! and refused instead of resolving to the wrong path.

use crate::chat::messages;
use crate::chat::protocol::{Button, Outgoing};
use crate::chat::state::{NavigationContext, SessionMode, UserState};
use std::collections::HashMap;
use std::path::Path;
use studygate_core::domain::{Category, EntryKind, Year};
use studygate_core::ports::{ContentStore, PortError};
use tracing::{error, warn};

/// What a Back press inside the browsing state resolved to.
pub enum BackOutcome {
    /// Still browsing; carries the re-rendered parent listing.
    Render(Outgoing),
    /// Popped the last directory; the router returns to the year selector.
    ExitToYearSelector(Category),
}

pub fn back_row() -> Vec<Button> {
    vec![Button::new(messages::BTN_BACK, "back")]
}

/// Enters the root listing of one category/year. Replaces any previous
/// navigation context for this user.
pub async fn enter_year(
    content: &dyn ContentStore,
    max_entries: usize,
    state: &mut UserState,
    category: Category,
    year: Year,
) -> Outgoing {
    let Some(root) = content.category_root(category) else {
        // Playlists never reach the stack machine.
        return Outgoing::menu(messages::YEAR_UNAVAILABLE, vec![back_row()]);
    };
    let root = root.join(year.dir_name());
    if !content.exists(&root).await {
        return Outgoing::menu(messages::YEAR_UNAVAILABLE, vec![back_row()]);
    }

    state.nav = Some(NavigationContext {
        category,
        year,
        dir_stack: vec![root],
        tokens: HashMap::new(),
        generation: 0,
    });
    state.mode = SessionMode::Browsing;
    render_listing(content, max_entries, state).await
}

/// Resolves a pressed `d…`/`f…` token: descends into a directory or
/// delivers a file. Missing content is a recoverable apology; the stack is
/// left untouched in every failure case.
pub async fn select_token(
    content: &dyn ContentStore,
    max_entries: usize,
    state: &mut UserState,
    payload: &str,
) -> Outgoing {
    let Some(ctx) = state.nav.as_ref() else {
        return Outgoing::text(messages::REQUEST_EXPIRED);
    };

    let Some((kind, generation)) = parse_token(payload) else {
        return Outgoing::text(messages::REQUEST_EXPIRED);
    };
    if generation != ctx.generation {
        warn!(
            "stale token {} (current generation {})",
            payload, ctx.generation
        );
        return Outgoing::text(messages::REQUEST_EXPIRED);
    }
    let Some(path) = ctx.tokens.get(payload).cloned() else {
        return Outgoing::text(messages::REQUEST_EXPIRED);
    };

    match kind {
        EntryKind::Directory => {
            if !content.exists(&path).await {
                return Outgoing::menu(messages::YEAR_UNAVAILABLE, vec![back_row()]);
            }
            if let Some(ctx) = state.nav.as_mut() {
                ctx.dir_stack.push(path);
            }
            render_listing(content, max_entries, state).await
        }
        EntryKind::File => {
            // Probe before asking the gateway to upload, so storage failures
            // surface here instead of on the transport side. The gateway
            // streams the bytes itself.
            match content.probe(&path).await {
                Ok(_) => {
                    let filename = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "file".to_string());
                    Outgoing::Document { path, filename }
                }
                Err(PortError::NotFound(_)) => {
                    Outgoing::menu(messages::FILE_UNAVAILABLE, vec![back_row()])
                }
                Err(e) => {
                    error!("failed to probe {} for delivery: {}", path.display(), e);
                    Outgoing::menu(messages::DELIVERY_FAILED, vec![back_row()])
                }
            }
        }
    }
}

/// Pops one directory off the stack.
pub async fn back(
    content: &dyn ContentStore,
    max_entries: usize,
    state: &mut UserState,
) -> BackOutcome {
    let Some(ctx) = state.nav.as_mut() else {
        // No context left; treat like leaving the year selector.
        return BackOutcome::ExitToYearSelector(Category::Books);
    };
    let category = ctx.category;
    ctx.dir_stack.pop();
    if ctx.dir_stack.is_empty() {
        state.nav = None;
        return BackOutcome::ExitToYearSelector(category);
    }
    BackOutcome::Render(render_listing(content, max_entries, state).await)
}

/// Renders the current top-of-stack directory with a fresh token table.
pub async fn render_listing(
    content: &dyn ContentStore,
    max_entries: usize,
    state: &mut UserState,
) -> Outgoing {
    state.render_seq += 1;
    let generation = state.render_seq;
    let Some(ctx) = state.nav.as_mut() else {
        return Outgoing::text(messages::REQUEST_EXPIRED);
    };
    ctx.generation = generation;
    ctx.tokens.clear();

    let Some(dir) = ctx.dir_stack.last().cloned() else {
        return Outgoing::text(messages::REQUEST_EXPIRED);
    };

    let entries = match content.list(&dir).await {
        Ok(entries) => entries,
        Err(PortError::NotFound(_)) => {
            return Outgoing::menu(messages::YEAR_UNAVAILABLE, vec![back_row()]);
        }
        Err(e) => {
            error!("failed to list {}: {}", dir.display(), e);
            return Outgoing::menu(messages::YEAR_UNAVAILABLE, vec![back_row()]);
        }
    };
    if entries.is_empty() {
        return Outgoing::menu(messages::NO_FILES, vec![back_row()]);
    }

    let mut keyboard = Vec::new();
    for (index, entry) in entries.iter().take(max_entries).enumerate() {
        let prefix = match entry.kind {
            EntryKind::Directory => 'd',
            EntryKind::File => 'f',
        };
        let token = format!("{}{}-{}", prefix, generation, index + 1);
        ctx.tokens.insert(token.clone(), dir.join(&entry.name));
        keyboard.push(vec![Button::new(display_name(entry.kind, &entry.name), token)]);
    }
    keyboard.push(back_row());
    Outgoing::menu(messages::CHOOSE_FILE, keyboard)
}

/// Splits a token payload into its kind prefix and render generation.
fn parse_token(payload: &str) -> Option<(EntryKind, u64)> {
    let kind = match payload.as_bytes().first()? {
        b'd' => EntryKind::Directory,
        b'f' => EntryKind::File,
        _ => return None,
    };
    let generation = payload[1..].split_once('-')?.0.parse().ok()?;
    Some((kind, generation))
}

/// Leaves directory names as-is; strips the storage extension off leaves.
fn display_name(kind: EntryKind, name: &str) -> String {
    match kind {
        EntryKind::Directory => name.to_string(),
        EntryKind::File => Path::new(name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string()),
    }
}
