//! Config Store (C1): a reloadable handle on the parsed [`Config`] document
//! (§4.1).
//!
//! `load()` reads and parses the document once at startup; `reload()` reads
//! it again and swaps the snapshot only on success. On failure the previous
//! snapshot is retained and the error is surfaced unchanged to the caller —
//! a reload never leaves the store holding a broken or partial config.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;

use super::Config;
use crate::error::CoreError;

/// Env var naming the configuration document path (§6).
pub const CONFIG_PATH_ENV_VAR: &str = "DH_MCP_CONFIG_FILE";

#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    current: RwLock<Arc<Config>>,
}

impl ConfigStore {
    /// Reads `DH_MCP_CONFIG_FILE`, parses the document it points at, and
    /// holds the result. The env var is required: an unset or unreadable
    /// path is `ConfigMissing`, a structurally invalid document is
    /// `ConfigInvalid`.
    pub fn load_from_env() -> Result<Self, CoreError> {
        let path = std::env::var(CONFIG_PATH_ENV_VAR)
            .map_err(|_| CoreError::config_missing(format!("{CONFIG_PATH_ENV_VAR} is not set")))?;
        Self::load(PathBuf::from(path))
    }

    pub fn load(path: PathBuf) -> Result<Self, CoreError> {
        let config = Self::read(&path)?;
        Self::emit_loaded(&config);
        Ok(Self { path, current: RwLock::new(Arc::new(config)) })
    }

    fn emit_loaded(config: &Config) {
        crate::trace::TraceEvent::ConfigLoaded {
            community_sessions: config.community.sessions.len(),
            enterprise_systems: config.enterprise.systems.len(),
            warnings: config.validate().iter().filter(|i| !i.is_error()).count(),
        }
        .emit();
    }

    fn read(path: &PathBuf) -> Result<Config, CoreError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CoreError::config_missing(format!("failed to read {}: {e}", path.display())))?;
        Config::parse(&raw)
    }

    pub fn current(&self) -> Arc<Config> {
        self.current.read().clone()
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Re-reads and re-parses the document at the original path. On success
    /// the new snapshot becomes `current()`; on failure the old snapshot is
    /// left untouched and the error is returned unchanged (§4.1).
    pub fn reload(&self) -> Result<Arc<Config>, CoreError> {
        let config = Self::read(&self.path)?;
        Self::emit_loaded(&config);
        let config = Arc::new(config);
        *self.current.write() = config.clone();
        Ok(config)
    }
}
