//! Durable single-slot storage for the endpoint backend's conversation id.
//!
//! One global slot per profile (not keyed per tab or widget instance), so at
//! most one server-correlated conversation exists at a time.

use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

/// Load/save the server-assigned conversation id.
pub trait CorrelationStore: Send + Sync {
    fn load(&self) -> Option<String>;
    fn save(&self, id: &str) -> io::Result<()>;
}

/// File-backed slot (default `~/.folio/conversation_id`).
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".folio").join("conversation_id"))
            .unwrap_or_else(|| PathBuf::from("conversation_id"))
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

impl CorrelationStore for FileStore {
    fn load(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(s) => {
                let id = s.trim();
                if id.is_empty() {
                    None
                } else {
                    Some(id.to_string())
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                log::debug!("correlation slot read failed ({}): {}", self.path.display(), e);
                None
            }
        }
    }

    fn save(&self, id: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, id)
    }
}

/// In-memory slot for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl CorrelationStore for MemoryStore {
    fn load(&self) -> Option<String> {
        self.slot.lock().expect("slot lock").clone()
    }

    fn save(&self, id: &str) -> io::Result<()> {
        *self.slot.lock().expect("slot lock") = Some(id.to_string());
        Ok(())
    }
}
