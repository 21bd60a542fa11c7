//! services/bot/src/adapters/playlists.rs
//!
//! JSON-file implementation of the `PlaylistStore` port. The file maps a
//! year number to subject -> URL pairs and is maintained by hand; the bot
//! only reads it. A missing file means no playlists yet, not an error.
//!
//! ```json
//! { "1": { "Math": "https://...", "Programming": "https://..." } }
//! ```

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use studygate_core::domain::Year;
use studygate_core::ports::{PlaylistStore, PortError, PortResult};

pub struct JsonPlaylistStore {
    path: PathBuf,
}

impl JsonPlaylistStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

type PlaylistFile = BTreeMap<String, BTreeMap<String, String>>;

#[async_trait]
impl PlaylistStore for JsonPlaylistStore {
    async fn links_for_year(&self, year: Year) -> PortResult<Vec<(String, String)>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PortError::Unexpected(e.to_string())),
        };
        let file: PlaylistFile =
            serde_json::from_str(&raw).map_err(|e| PortError::Parse(e.to_string()))?;
        Ok(file
            .get(&year.number().to_string())
            .map(|subjects| {
                subjects
                    .iter()
                    .map(|(subject, url)| (subject.clone(), url.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}
