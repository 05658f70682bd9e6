//! Session store: binds an opaque session id to exactly one on-disk DOT
//! file for the session's lifetime, and hands out the per-session lock
//! that serializes each read-modify-write cycle.
//!
//! Layout on disk: `<work_dir>/<sessionid>/filelink.dot`, a symlink to
//! the user's file. All reads and writes go through the link, never a
//! copy.

use dashmap::DashMap;
use dotedit_core::error::{EditorError, ErrorCode};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

pub const FILE_LINK_NAME: &str = "filelink.dot";

const SESSION_ID_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown session `{0}`")]
    UnknownSession(String),
    #[error("session `{id}` is already bound to {existing}")]
    AlreadyBound { id: String, existing: PathBuf },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl EditorError for SessionError {
    fn error_code(&self) -> ErrorCode {
        match self {
            SessionError::UnknownSession(_) => ErrorCode::NotFound,
            SessionError::AlreadyBound { .. } => ErrorCode::InvariantViolation,
            SessionError::Io { .. } => ErrorCode::IoFailure,
        }
    }
}

pub struct SessionStore {
    work_dir: PathBuf,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl SessionStore {
    pub fn new(work_dir: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let work_dir = work_dir.into();
        fs::create_dir_all(&work_dir).map_err(|source| SessionError::Io {
            path: work_dir.clone(),
            source,
        })?;
        Ok(Self {
            work_dir,
            locks: DashMap::new(),
        })
    }

    /// Bind a file into a session. Ids derive from the canonical target
    /// path, so launching twice on the same file reuses one session.
    /// A session directory already bound to a different file is refused;
    /// the binding is immutable for the session's lifetime.
    pub fn create(&self, target: &Path) -> Result<String, SessionError> {
        let real = fs::canonicalize(target).map_err(|source| SessionError::Io {
            path: target.to_path_buf(),
            source,
        })?;
        let id = session_id(&real);
        let link = self.work_dir.join(&id).join(FILE_LINK_NAME);

        if fs::symlink_metadata(&link).is_ok() {
            let existing = fs::read_link(&link).map_err(|source| SessionError::Io {
                path: link.clone(),
                source,
            })?;
            if existing != real {
                return Err(SessionError::AlreadyBound { id, existing });
            }
            return Ok(id);
        }

        let dir = self.work_dir.join(&id);
        fs::create_dir_all(&dir).map_err(|source| SessionError::Io {
            path: dir.clone(),
            source,
        })?;
        std::os::unix::fs::symlink(&real, &link).map_err(|source| SessionError::Io {
            path: link.clone(),
            source,
        })?;

        info!(session = %id, file = %real.display(), "session created");
        Ok(id)
    }

    /// Path of the file link for a session; `UnknownSession` if the id is
    /// malformed or no binding exists.
    pub fn resolve(&self, sessionid: &str) -> Result<PathBuf, SessionError> {
        if !is_valid_id(sessionid) {
            return Err(SessionError::UnknownSession(sessionid.to_string()));
        }
        let link = self.work_dir.join(sessionid).join(FILE_LINK_NAME);
        if fs::symlink_metadata(&link).is_err() {
            return Err(SessionError::UnknownSession(sessionid.to_string()));
        }
        Ok(link)
    }

    /// Per-session write lock. Holding it across the whole
    /// read-parse-mutate-serialize cycle prevents lost updates between
    /// concurrent requests on the same file.
    pub fn lock(&self, sessionid: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(sessionid.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

fn session_id(real: &Path) -> String {
    let digest = Sha256::digest(real.to_string_lossy().as_bytes());
    let mut id = format!("{:x}", digest);
    id.truncate(SESSION_ID_LEN);
    id
}

/// Session ids are lowercase hex; anything else (in particular path
/// separators) is rejected before touching the filesystem.
fn is_valid_id(id: &str) -> bool {
    id.len() == SESSION_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_deterministic_hex() {
        let a = session_id(Path::new("/tmp/a.dot"));
        let b = session_id(Path::new("/tmp/a.dot"));
        assert_eq!(a, b);
        assert!(is_valid_id(&a));
        assert_ne!(a, session_id(Path::new("/tmp/b.dot")));
    }

    #[test]
    fn traversal_ids_are_invalid() {
        assert!(!is_valid_id("../../etc/passwd"));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("ABCDEF0123456789"));
    }
}
