//! User settings, persisted as JSON in the platform config directory.

use crate::board_file::AssetPolicy;
use crate::constants::{DEFAULT_DECODE_WORKERS, DEFAULT_DROP_CASCADE_OFFSET, DEFAULT_ZOOM_STEP};
use crate::types::SelectionMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const SETTINGS_FILE: &str = "settings.json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSettings {
    pub selection_mode: SelectionMode,
    /// Policy used by plain saves
    pub asset_policy: AssetPolicy,
    pub dedup_assets: bool,
    /// Background decode threads; 0 decodes on the interaction thread
    pub decode_workers: usize,
    pub drop_cascade_offset: f32,
    pub zoom_step: f32,
    pub boards_dir: Option<PathBuf>,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            selection_mode: SelectionMode::Multi,
            asset_policy: AssetPolicy::Embedded,
            dedup_assets: true,
            decode_workers: DEFAULT_DECODE_WORKERS,
            drop_cascade_offset: DEFAULT_DROP_CASCADE_OFFSET,
            zoom_step: DEFAULT_ZOOM_STEP,
            boards_dir: None,
        }
    }
}

/// `<config dir>/refboard`
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(env!("CARGO_PKG_NAME")))
}

pub fn default_settings_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(SETTINGS_FILE))
}

/// `<documents>/refboard`, falling back to the config directory.
pub fn default_boards_dir() -> Option<PathBuf> {
    dirs::document_dir()
        .map(|dir| dir.join(env!("CARGO_PKG_NAME")))
        .or_else(|| config_dir().map(|dir| dir.join("boards")))
}

impl BoardSettings {
    /// Load from the default location. Never fails: problems are logged and
    /// defaults returned.
    pub fn load() -> Self {
        match default_settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        match Self::try_load_from(path) {
            Ok(Some(settings)) => settings.sanitized(),
            Ok(None) => Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %format!("{:#}", e), "Ignoring unreadable settings");
                Self::default()
            }
        }
    }

    fn try_load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let settings = serde_json::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        debug!(path = %path.display(), "Loaded settings");
        Ok(Some(settings))
    }

    /// Replace out-of-range values with defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.zoom_step.is_finite() || self.zoom_step <= 1.0 {
            self.zoom_step = defaults.zoom_step;
        }
        if !self.drop_cascade_offset.is_finite() {
            self.drop_cascade_offset = defaults.drop_cascade_offset;
        }
        self
    }

    pub fn save(&self) -> Result<()> {
        let path = default_settings_path().context("no config directory on this platform")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let dir = path.parent().unwrap_or(Path::new("."));
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        let json = serde_json::to_string_pretty(self)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(path)
            .with_context(|| format!("writing {}", path.display()))?;
        debug!(path = %path.display(), "Saved settings");
        Ok(())
    }

    /// Where new boards go: the configured directory, else the platform default.
    pub fn boards_dir(&self) -> Option<PathBuf> {
        self.boards_dir.clone().or_else(default_boards_dir)
    }
}
