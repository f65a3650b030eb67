use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::savegame;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser: BrowserConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

/// How the local view finds savegames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMethod {
    /// Ask the user to pick a single savegame file
    PickFile,
    /// Ask the user to pick a directory, list its children
    PickDirectory,
    /// Run the system `find` utility over the scan root
    ScanFind,
    /// Walk the scan root recursively
    ScanWalk,
}

impl Default for SearchMethod {
    fn default() -> Self {
        Self::PickFile
    }
}

impl SearchMethod {
    pub const ALL: [SearchMethod; 4] = [
        Self::PickFile,
        Self::PickDirectory,
        Self::ScanFind,
        Self::ScanWalk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PickFile => "pick-file",
            Self::PickDirectory => "pick-directory",
            Self::ScanFind => "scan-find",
            Self::ScanWalk => "scan-walk",
        }
    }

    /// True for the strategies that open a picker instead of scanning
    pub fn uses_picker(&self) -> bool {
        matches!(self, Self::PickFile | Self::PickDirectory)
    }
}

impl std::fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pick-file" => Ok(Self::PickFile),
            "pick-directory" => Ok(Self::PickDirectory),
            "scan-find" => Ok(Self::ScanFind),
            "scan-walk" => Ok(Self::ScanWalk),
            other => anyhow::bail!(
                "Unknown search method '{}' (expected one of: pick-file, pick-directory, scan-find, scan-walk)",
                other
            ),
        }
    }
}

/// Savegame browsing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Strategy for finding local savegames
    #[serde(default)]
    pub search_method: SearchMethod,
    /// Directory the scan strategies start from
    #[serde(default)]
    pub scan_root: Option<String>,
    /// Where downloaded savegames are written
    #[serde(default)]
    pub download_dir: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            search_method: SearchMethod::default(),
            scan_root: None,
            download_dir: None,
        }
    }
}

/// Appearance settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Enable dark theme
    #[serde(default = "default_true")]
    pub dark_theme: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { dark_theme: true }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("com", "sasync", "Sasync")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        let config_dir = dirs.config_dir();
        std::fs::create_dir_all(config_dir)?;

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            tracing::info!("Loaded configuration from {:?}", path);
            Ok(config)
        } else {
            tracing::info!("No configuration file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Directory the scan strategies search.
    ///
    /// Falls back to the platform's detected game user-files directory
    /// when nothing is configured.
    pub fn scan_root(&self) -> Option<PathBuf> {
        self.browser
            .scan_root
            .as_ref()
            .map(PathBuf::from)
            .or_else(savegame::default_save_directory)
    }

    /// Directory downloaded savegames are written to.
    ///
    /// Falls back to the scan root, then to a `downloads` directory under
    /// the application data dir.
    pub fn download_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.browser.download_dir {
            return Ok(PathBuf::from(dir));
        }
        if let Some(root) = self.scan_root() {
            return Ok(root);
        }

        let dirs = directories::ProjectDirs::from("com", "sasync", "Sasync")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let download_dir = dirs.data_dir().join("downloads");
        std::fs::create_dir_all(&download_dir)?;

        Ok(download_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();

        assert_eq!(parsed.browser.search_method, SearchMethod::PickFile);
        assert!(parsed.browser.scan_root.is_none());
        assert!(parsed.ui.dark_theme);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let parsed: Config = toml::from_str("[browser]\nsearch_method = \"scan-walk\"\n").unwrap();

        assert_eq!(parsed.browser.search_method, SearchMethod::ScanWalk);
        assert!(parsed.browser.download_dir.is_none());
        assert!(parsed.ui.dark_theme);
    }

    #[test]
    fn test_search_method_parsing() {
        for method in SearchMethod::ALL {
            assert_eq!(method.as_str().parse::<SearchMethod>().unwrap(), method);
        }
        assert!("adb-shell".parse::<SearchMethod>().is_err());
    }

    #[test]
    fn test_picker_methods() {
        assert!(SearchMethod::PickFile.uses_picker());
        assert!(SearchMethod::PickDirectory.uses_picker());
        assert!(!SearchMethod::ScanFind.uses_picker());
        assert!(!SearchMethod::ScanWalk.uses_picker());
    }

    #[test]
    fn test_configured_scan_root_wins() {
        let mut config = Config::default();
        config.browser.scan_root = Some("/tmp/saves".to_string());

        assert_eq!(config.scan_root(), Some(PathBuf::from("/tmp/saves")));
        assert_eq!(config.download_dir().unwrap(), PathBuf::from("/tmp/saves"));
    }

    #[test]
    fn test_configured_download_dir_wins() {
        let mut config = Config::default();
        config.browser.scan_root = Some("/tmp/saves".to_string());
        config.browser.download_dir = Some("/tmp/incoming".to_string());

        assert_eq!(
            config.download_dir().unwrap(),
            PathBuf::from("/tmp/incoming")
        );
    }
}
