//! services/bot/src/bin/bot.rs
//!
//! Wires the adapters together and runs the gateway loop. The messaging
//! gateway is a generic collaborator: it feeds one JSON envelope per line on
//! stdin and accepts render/delivery requests as JSON lines on stdout.

use bot_lib::{
    adapters::{
        FsContentStore, InMemorySessions, JsonLinesRecordSink, JsonPlaylistStore, PortalClient,
    },
    chat::{
        self,
        protocol::{Envelope, Reply},
        state::{AppState, ChatSessions},
    },
    config::Config,
    error::BotError,
};
use std::sync::Arc;
use studygate_core::domain::UserId;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), BotError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting bot...");

    // --- 2. Prepare the Content Store ---
    let content = Arc::new(FsContentStore::new(
        config.books_dir.clone(),
        config.summaries_dir.clone(),
    ));
    content.bootstrap().await?;

    // --- 3. Initialize Service Adapters ---
    let portal = Arc::new(PortalClient::new(
        config.portal_base_url.clone(),
        config.login_url(),
        config.student_info_url(),
    ));
    let app = AppState {
        portal,
        sessions: Arc::new(InMemorySessions::new()),
        content,
        playlists: Arc::new(JsonPlaylistStore::new(config.playlists_path.clone())),
        records: Arc::new(JsonLinesRecordSink::new(config.records_path.clone())),
        config: config.clone(),
        chat: Arc::new(ChatSessions::new()),
    };
    info!("Portal endpoint: {}", config.portal_base_url);

    // --- 4. Run the Gateway Loop ---
    // A single writer task owns stdout so replies never interleave.
    let (tx, mut rx) = mpsc::channel::<Reply>(64);
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(reply) = rx.recv().await {
            match serde_json::to_string(&reply) {
                Ok(mut line) => {
                    line.push('\n');
                    if let Err(e) = stdout.write_all(line.as_bytes()).await {
                        error!("failed to write reply: {}", e);
                        break;
                    }
                    let _ = stdout.flush().await;
                }
                Err(e) => error!("failed to serialize reply: {}", e),
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let envelope: Envelope = match serde_json::from_str(&line) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("dropping malformed envelope: {}", e);
                continue;
            }
        };

        // One task per action; the per-user mutex inside `handle` keeps
        // actions from the same user sequential.
        let app = app.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let user = UserId(envelope.user_id);
            let replies =
                chat::handle(&app, user, envelope.username.as_deref(), envelope.action).await;
            for message in replies {
                if tx
                    .send(Reply {
                        user_id: envelope.user_id,
                        message,
                    })
                    .await
                    .is_err()
                {
                    return;
                }
            }
        });
    }

    drop(tx);
    let _ = writer.await;
    info!("Gateway closed. Shutting down.");
    Ok(())
}
