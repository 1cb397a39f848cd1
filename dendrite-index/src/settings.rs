//! Project settings file handling.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use dendrite_core::error::{DendriteError, Result};

/// Current settings format version; older files need migration.
pub const SETTINGS_VERSION: u32 = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct SettingsFile {
    version: u32,
    name: String,
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            name: String::new(),
        }
    }
}

/// Settings of one project, kept together with the raw text snapshot.
///
/// The raw text is what gets compared against the snapshot stored in the
/// persistent storage to detect an outdated index; carriage returns are
/// stripped for the comparison so checkouts with different line endings do not
/// force a reindex.
#[derive(Debug, Clone)]
pub struct ProjectSettings {
    path: PathBuf,
    text: String,
    file: SettingsFile,
}

/// Settings text normalized for snapshot comparison.
pub fn normalize_settings_text(text: &str) -> String {
    text.replace('\r', "")
}

impl ProjectSettings {
    /// Load settings from a TOML file.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut settings = Self {
            path,
            text: String::new(),
            file: SettingsFile::default(),
        };
        settings.reload()?;
        Ok(settings)
    }

    /// Re-read the settings file from disk.
    pub fn reload(&mut self) -> Result<()> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            DendriteError::invalid_input(format!(
                "cannot read project settings {}: {e}",
                self.path.display()
            ))
        })?;
        let file: SettingsFile = toml::from_str(&text)
            .map_err(|e| DendriteError::config(format!("{}: {e}", self.path.display())))?;
        self.text = text;
        self.file = file;
        Ok(())
    }

    pub fn file_path(&self) -> &Path {
        &self.path
    }

    /// Raw settings text as last read from disk.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn project_name(&self) -> &str {
        &self.file.name
    }

    pub fn version(&self) -> u32 {
        self.file.version
    }

    /// Whether the file was written by an older settings format.
    pub fn needs_migration(&self) -> bool {
        self.file.version < SETTINGS_VERSION
    }

    /// Rewrite the settings file in the current format and reload it.
    pub fn migrate(&mut self) -> Result<()> {
        if !self.needs_migration() {
            return Ok(());
        }
        let migrated = SettingsFile {
            version: SETTINGS_VERSION,
            name: self.file.name.clone(),
        };
        let text = toml::to_string(&migrated)
            .map_err(|e| DendriteError::config(format!("cannot serialize settings: {e}")))?;
        std::fs::write(&self.path, text)?;
        self.reload()
    }
}
