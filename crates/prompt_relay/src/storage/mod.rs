use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs::{self as async_fs, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Audit record for one successful generation request. Only content hashes of the
/// generated images are kept, never the images themselves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub prompt: String,
    pub image_hashes: Vec<String>,
    pub model: String,
}

impl LogEntry {
    pub fn new(
        timestamp: DateTime<Utc>,
        prompt: impl Into<String>,
        image_hashes: Vec<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            prompt: prompt.into(),
            image_hashes,
            model: model.into(),
        }
    }
}

/// Append-only log of [`LogEntry`] records kept as newline-delimited JSON.
///
/// Writers are serialized through an async mutex and every entry lands with a single
/// append-mode write, so concurrent requests never drop each other's records.
#[derive(Debug)]
pub struct LogStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, entry: &LogEntry) -> anyhow::Result<()> {
        let mut line = serde_json::to_string(entry).context("serializing log entry")?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            async_fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating log dir {:?}", parent))?;
        }

        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(&self.path)
            .await
            .with_context(|| format!("opening log store {:?}", self.path))?;

        // `mode` only applies on creation; tighten files that already existed.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            async_fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .await
                .with_context(|| format!("restricting log store {:?}", self.path))?;
        }

        file.write_all(line.as_bytes())
            .await
            .with_context(|| format!("writing log store {:?}", self.path))?;
        file.flush().await?;

        Ok(())
    }

    /// Every stored entry in append order. A missing or blank file reads as empty.
    pub async fn read_all(&self) -> anyhow::Result<Vec<LogEntry>> {
        let content = match async_fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err).with_context(|| format!("reading log store {:?}", self.path));
            }
        };

        let trimmed = content.trim_start();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        // Stores written before the line-oriented format start with a single JSON array;
        // entries appended since then follow it as JSON lines.
        let mut entries = Vec::new();
        let mut rest = trimmed;
        if trimmed.starts_with('[') {
            let mut stream =
                serde_json::Deserializer::from_str(trimmed).into_iter::<Vec<LogEntry>>();
            if let Some(legacy) = stream.next() {
                entries = legacy
                    .with_context(|| format!("parsing legacy log array {:?}", self.path))?;
            }
            rest = &trimmed[stream.byte_offset()..];
        }

        for (idx, line) in rest.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str(line)
                .with_context(|| format!("parsing log store {:?} line {}", self.path, idx + 1))?;
            entries.push(entry);
        }

        Ok(entries)
    }
}
