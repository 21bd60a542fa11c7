//! services/bot/src/adapters/content.rs
//!
//! Filesystem implementation of the `ContentStore` port. The hierarchy is
//! maintained externally; the bot only lists directories and reads files.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use studygate_core::domain::{Category, ContentEntry, EntryKind};
use studygate_core::ports::{ContentStore, PortError, PortResult};
use tracing::info;

pub struct FsContentStore {
    books_root: PathBuf,
    summaries_root: PathBuf,
}

impl FsContentStore {
    pub fn new(books_root: PathBuf, summaries_root: PathBuf) -> Self {
        Self {
            books_root,
            summaries_root,
        }
    }

    /// Creates the category roots and their `year_1..4` subdirectories if
    /// they do not exist yet. Runs once at startup.
    pub async fn bootstrap(&self) -> std::io::Result<()> {
        for root in [&self.books_root, &self.summaries_root] {
            for year in 1..=4u8 {
                let dir = root.join(format!("year_{year}"));
                tokio::fs::create_dir_all(&dir).await?;
            }
        }
        info!(
            "content roots ready: {} / {}",
            self.books_root.display(),
            self.summaries_root.display()
        );
        Ok(())
    }
}

#[async_trait]
impl ContentStore for FsContentStore {
    async fn list(&self, path: &Path) -> PortResult<Vec<ContentEntry>> {
        let mut reader = tokio::fs::read_dir(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PortError::NotFound(path.display().to_string())
            } else {
                PortError::Unexpected(e.to_string())
            }
        })?;

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            entries.push(ContentEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }
        // Name-sorted so token indices are stable within one render.
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn probe(&self, path: &Path) -> PortResult<u64> {
        let meta = tokio::fs::metadata(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PortError::NotFound(path.display().to_string())
            } else {
                PortError::Unexpected(e.to_string())
            }
        })?;
        if !meta.is_file() {
            return Err(PortError::NotFound(path.display().to_string()));
        }
        Ok(meta.len())
    }

    fn category_root(&self, category: Category) -> Option<PathBuf> {
        match category {
            Category::Books => Some(self.books_root.clone()),
            Category::Summaries => Some(self.summaries_root.clone()),
            // Playlists are links, not files on disk.
            Category::Playlists => None,
        }
    }
}
