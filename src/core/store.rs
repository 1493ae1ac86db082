//! Stage Record store.
//!
//! One JSON file per session under the state directory. Reads never fail:
//! an absent, unreadable or corrupt file loads as the idle record. Writes go
//! through a temp file in the same directory and an atomic rename, so a
//! concurrent reader sees either the old record or the new one.

use std::fmt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::core::error::GuardError;
use crate::core::schemas;
use crate::core::stage::StageRecord;

const MAX_SESSION_ID_LEN: usize = 128;

/// A session identifier that is safe to use as a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn parse(raw: &str) -> Result<Self, GuardError> {
        validate_session_id(raw)?;
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn validate_session_id(session_id: &str) -> Result<(), GuardError> {
    if session_id.is_empty() {
        return Err(GuardError::Validation(
            "session_id cannot be empty".to_string(),
        ));
    }
    if session_id.len() > MAX_SESSION_ID_LEN {
        return Err(GuardError::Validation(format!(
            "session_id longer than {} characters",
            MAX_SESSION_ID_LEN
        )));
    }
    if session_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        Ok(())
    } else {
        Err(GuardError::Validation(format!(
            "invalid session_id '{}': allowed characters are [A-Za-z0-9_-]",
            session_id
        )))
    }
}

/// Handle on the directory holding every session's Stage Record.
#[derive(Debug, Clone)]
pub struct StageStore {
    pub root: PathBuf,
}

impl StageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at the default state directory under a session cwd.
    pub fn for_cwd(cwd: &Path) -> Self {
        Self::new(cwd.join(schemas::STATE_DIR))
    }

    pub fn record_path(&self, session: &SessionId) -> PathBuf {
        self.root
            .join(format!("{}{}", session.as_str(), schemas::STAGE_FILE_SUFFIX))
    }

    /// Load the session's record, defaulting to idle on any read problem.
    pub fn load(&self, session: &SessionId) -> StageRecord {
        let path = self.record_path(session);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(session = %session, "no stage record, defaulting to idle");
                return StageRecord::idle();
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "unreadable stage record, defaulting to idle");
                return StageRecord::idle();
            }
        };
        match serde_json::from_str::<StageRecord>(&raw) {
            Ok(record) => record,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "corrupt stage record, defaulting to idle");
                StageRecord::idle()
            }
        }
    }

    /// Replace the session's record atomically.
    pub fn save(&self, session: &SessionId, record: &StageRecord) -> Result<PathBuf, GuardError> {
        let path = self.record_path(session);
        let persist_err = |source: std::io::Error| GuardError::Persist {
            path: path.display().to_string(),
            source,
        };

        fs::create_dir_all(&self.root).map_err(persist_err)?;
        let bytes = serde_json::to_vec_pretty(record)?;

        let mut tmp = NamedTempFile::new_in(&self.root).map_err(persist_err)?;
        tmp.write_all(&bytes).map_err(persist_err)?;
        tmp.write_all(b"\n").map_err(persist_err)?;
        tmp.as_file().sync_all().map_err(persist_err)?;
        tmp.persist(&path).map_err(|e| persist_err(e.error))?;

        debug!(session = %session, stage = %record.stage, "stage record saved");
        Ok(path)
    }
}
