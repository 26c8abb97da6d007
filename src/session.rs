//! Ephemeral per-session storage. Results live under fixed keys and are
//! cleared as a unit on restart; nothing else is persisted.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fmt::Debug;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

pub const KEY_EXTRACTED_TEXT: &str = "extracted_text";
pub const KEY_PROFILE: &str = "profile";
pub const KEY_QUESTIONS: &str = "questions";
pub const KEY_RECOMMENDATION: &str = "recommendation";

pub const SESSION_KEYS: [&str; 4] = [
    KEY_EXTRACTED_TEXT,
    KEY_PROFILE,
    KEY_QUESTIONS,
    KEY_RECOMMENDATION,
];

pub trait SessionStore: Send + Sync + Debug {
    fn put(&self, key: &str, value: &str) -> Result<()>;
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn remove(&self, key: &str) -> Result<()>;

    /// Removes every fixed session key.
    fn clear(&self) -> Result<()> {
        for key in SESSION_KEYS {
            self.remove(key)?;
        }
        Ok(())
    }
}

impl<S: SessionStore + ?Sized> SessionStore for std::sync::Arc<S> {
    fn put(&self, key: &str, value: &str) -> Result<()> {
        (**self).put(key, value)
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// One file per key under a session folder.
#[derive(Debug)]
pub struct FileSessionStore {
    root: PathBuf,
}

impl FileSessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create session folder {:?}", root))?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl SessionStore for FileSessionStore {
    fn put(&self, key: &str, value: &str) -> Result<()> {
        fs::write(self.path_for(key), value)
            .with_context(|| format!("Failed to write session key '{}'", key))?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read session key '{}'", key))?;
        Ok(Some(content))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove session key '{}'", key))?;
        }
        Ok(())
    }
}

/// In-memory store, used by tests and embedders that want no filesystem.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}
