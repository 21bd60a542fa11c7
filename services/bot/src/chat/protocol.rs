//! services/bot/src/chat/protocol.rs
//!
//! Defines the message protocol between the generic messaging gateway and
//! the bot core. The gateway owns message delivery, button rendering and
//! file upload; the core only exchanges these structured requests with it.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

//=========================================================================================
// Actions delivered FROM the gateway TO the bot core
//=========================================================================================

/// One inbound user action.
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Incoming {
    /// A slash command, without the leading slash (e.g. `start`).
    Command { name: String },
    /// A button press carrying the opaque payload the button was rendered with.
    Button { payload: String },
    /// A free-text message (only meaningful while awaiting credentials).
    Text { body: String },
}

/// An inbound action together with the platform identity it came from.
#[derive(Deserialize, Debug, Clone)]
pub struct Envelope {
    pub user_id: i64,
    /// Platform username, if the platform exposes one.
    pub username: Option<String>,
    #[serde(flatten)]
    pub action: Incoming,
}

//=========================================================================================
// Render requests sent FROM the bot core TO the gateway
//=========================================================================================

/// One button of a rendered menu: a label and the opaque payload the gateway
/// must echo back when it is pressed.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub payload: String,
}

impl Button {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

/// One outbound render or delivery request.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outgoing {
    /// Plain text message.
    Text { text: String },
    /// Text with an ordered grid of buttons.
    Menu { text: String, keyboard: Vec<Vec<Button>> },
    /// Ask the gateway to upload the file at `path` under `filename`.
    Document { path: PathBuf, filename: String },
}

impl Outgoing {
    pub fn text(text: impl Into<String>) -> Self {
        Outgoing::Text { text: text.into() }
    }

    pub fn menu(text: impl Into<String>, keyboard: Vec<Vec<Button>>) -> Self {
        Outgoing::Menu {
            text: text.into(),
            keyboard,
        }
    }
}

/// An outbound request addressed to a user.
#[derive(Serialize, Debug, Clone)]
pub struct Reply {
    pub user_id: i64,
    #[serde(flatten)]
    pub message: Outgoing,
}
