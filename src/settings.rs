use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::{FmMode, MaterialKind, DEFAULT_TOTAL_WEIGHT};

/// Environment variable overriding where settings are stored.
pub const SETTINGS_ENV: &str = "GRADATION_SETTINGS";
const SETTINGS_FILE: &str = "gradation_settings.json";

// ---------------------------------------------------------------------------
// Settings – user preferences persisted between sessions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Last file opened or exported, used as the dialog's starting point.
    pub last_file: Option<PathBuf>,
    pub total_weight: f64,
    pub material: MaterialKind,
    pub fm_mode: FmMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            last_file: None,
            total_weight: DEFAULT_TOTAL_WEIGHT,
            material: MaterialKind::Fine,
            fm_mode: FmMode::default(),
        }
    }
}

impl Settings {
    /// Settings file location: `$GRADATION_SETTINGS`, else the working directory.
    pub fn default_path() -> PathBuf {
        std::env::var_os(SETTINGS_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let mut settings: Settings = serde_json::from_str(&text).context("parsing settings")?;
        if !(settings.total_weight.is_finite() && settings.total_weight > 0.0) {
            log::warn!(
                "ignoring stored total weight {}, using {DEFAULT_TOTAL_WEIGHT}",
                settings.total_weight
            );
            settings.total_weight = DEFAULT_TOTAL_WEIGHT;
        }
        Ok(settings)
    }

    /// Load from `path`, falling back to defaults when the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::info!("no settings at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{e:#}; using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).context("serializing settings")?;
        std::fs::write(path, text)
            .with_context(|| format!("writing settings to {}", path.display()))?;
        log::info!("saved settings to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            last_file: Some(PathBuf::from("/data/fine.csv")),
            total_weight: 2000.0,
            material: MaterialKind::SubBase,
            fm_mode: FmMode::RetainedWeights,
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"subbase\""));
        assert!(text.contains("\"retained_weights\""));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_or_default(&dir.path().join("absent.json"));
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.total_weight, 5000.0);
    }

    #[test]
    fn partial_and_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let partial = dir.path().join("partial.json");
        std::fs::write(&partial, r#"{ "material": "crm", "total_weight": -3 }"#).unwrap();
        let s = Settings::load_or_default(&partial);
        assert_eq!(s.material, MaterialKind::Crm);
        assert_eq!(s.total_weight, DEFAULT_TOTAL_WEIGHT);

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(Settings::load(&broken).is_err());
        assert_eq!(Settings::load_or_default(&broken), Settings::default());
    }
}
