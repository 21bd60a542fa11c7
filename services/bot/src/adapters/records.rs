//! services/bot/src/adapters/records.rs
//!
//! Append-only implementation of the `RecordSink` port: one JSON line per
//! successful login. The file is only ever appended to, so concurrent logins
//! at worst interleave whole lines.

use async_trait::async_trait;
use std::path::PathBuf;
use studygate_core::domain::LoginRecord;
use studygate_core::ports::{PortError, PortResult, RecordSink};
use tokio::io::AsyncWriteExt;

pub struct JsonLinesRecordSink {
    path: PathBuf,
}

impl JsonLinesRecordSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl RecordSink for JsonLinesRecordSink {
    async fn append(&self, record: &LoginRecord) -> PortResult<()> {
        let mut line =
            serde_json::to_string(record).map_err(|e| PortError::Unexpected(e.to_string()))?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}
