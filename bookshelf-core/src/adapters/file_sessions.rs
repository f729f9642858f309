//! Filesystem-backed session store
//!
//! Each session is one JSON file in the session directory, named after its
//! token. The client only ever holds the token. Sessions older than the
//! store's max age are treated as absent and their files removed.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::result::{Error, Result};

/// Server-side session contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn for_user(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            created_at: Utc::now(),
        }
    }

    fn is_expired(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(max_age) {
            Ok(max_age) => now.signed_duration_since(self.created_at) > max_age,
            Err(_) => false,
        }
    }
}

/// Session store keyed by opaque UUID tokens
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
    max_age: Duration,
}

impl FileSessionStore {
    /// Open the store, creating the directory if needed
    pub fn new(dir: &Path, max_age: Duration) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create session directory: {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            max_age,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Only well-formed tokens map to a path, so a cookie can never point
    /// outside the session directory.
    fn path_for(&self, token: &str) -> Option<PathBuf> {
        let uuid = Uuid::parse_str(token).ok()?;
        Some(self.dir.join(format!("{}.json", uuid.simple())))
    }

    /// Store a new session and return its token
    ///
    /// Expired sessions are swept first.
    pub fn create(&self, data: &SessionData) -> Result<String> {
        if let Err(e) = self.prune_expired() {
            warn!("Failed to prune expired sessions: {}", e);
        }
        let token = Uuid::new_v4().simple().to_string();
        self.save(&token, data)?;
        Ok(token)
    }

    pub fn save(&self, token: &str, data: &SessionData) -> Result<()> {
        let Some(path) = self.path_for(token) else {
            return Err(Error::validation("Malformed session token"));
        };
        let content = serde_json::to_string(data)?;
        // Write then rename so a concurrent sweep never reads a partial file
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, content)
            .with_context(|| format!("Failed to write session file: {}", staging.display()))?;
        fs::rename(&staging, &path)
            .with_context(|| format!("Failed to store session file: {}", path.display()))?;
        Ok(())
    }

    /// Load a session. Unknown, expired or corrupt sessions are `None`.
    pub fn load(&self, token: &str) -> Result<Option<SessionData>> {
        let Some(path) = self.path_for(token) else {
            return Ok(None);
        };
        self.read_live(&path, Utc::now())
    }

    /// Remove every expired or corrupt session file, returning how many went
    pub fn prune_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to list session directory: {}", self.dir.display()))?;

        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if self.read_live(&path, now)?.is_none() && !path.exists() {
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(removed, "Pruned expired sessions");
        }
        Ok(removed)
    }

    fn read_live(&self, path: &Path, now: DateTime<Utc>) -> Result<Option<SessionData>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let data: SessionData = match serde_json::from_str(&content) {
            Ok(data) => data,
            Err(e) => {
                warn!(path = %path.display(), "Discarding corrupt session file: {}", e);
                discard(path);
                return Ok(None);
            }
        };

        if data.is_expired(self.max_age, now) {
            debug!(path = %path.display(), "Discarding expired session");
            discard(path);
            return Ok(None);
        }
        Ok(Some(data))
    }

    /// Remove a session. Unknown tokens are ignored.
    pub fn destroy(&self, token: &str) -> Result<()> {
        let Some(path) = self.path_for(token) else {
            return Ok(());
        };
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != ErrorKind::NotFound {
            debug!(path = %path.display(), "Failed to remove session file: {}", e);
        }
    }
}
