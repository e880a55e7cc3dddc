use crate::model::PersistedState;
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::PathBuf;

const APP_DIR: &str = "songdeck";
const STATE_FILE: &str = "state.json";

/// Runtime settings injected at startup by `main`. The admin secret gates
/// catalog-mutating commands in the driver; the core never sees it.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub media_dir: PathBuf,
    pub admin_secret: Option<String>,
}

pub fn config_root() -> Result<PathBuf> {
    if let Ok(override_dir) = env::var("SONGDECK_CONFIG_DIR") {
        return Ok(PathBuf::from(override_dir));
    }

    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .context("neither HOME nor USERPROFILE is set")?;
    Ok(PathBuf::from(home).join(".config").join(APP_DIR))
}

pub fn state_path() -> Result<PathBuf> {
    Ok(config_root()?.join(STATE_FILE))
}

/// Default media directory; audio resource keys resolve under it.
pub fn media_root() -> Result<PathBuf> {
    if let Ok(override_dir) = env::var("SONGDECK_MEDIA_DIR") {
        return Ok(PathBuf::from(override_dir));
    }
    Ok(config_root()?.join("media"))
}

pub fn ensure_config_dir() -> Result<PathBuf> {
    let root = config_root()?;
    fs::create_dir_all(&root).with_context(|| format!("failed to create {}", root.display()))?;
    Ok(root)
}

pub fn load_state() -> Result<PersistedState> {
    let path = state_path()?;
    if !path.exists() {
        return Ok(PersistedState::default());
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read state file {}", path.display()))?;
    let state: PersistedState = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse state file {}", path.display()))?;
    Ok(state)
}

pub fn save_state(state: &PersistedState) -> Result<()> {
    ensure_config_dir()?;
    let path = state_path()?;
    let json = serde_json::to_string_pretty(state)?;
    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
