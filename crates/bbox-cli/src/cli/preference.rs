use std::fs;
use std::path::{Path, PathBuf};

use bbox_addon_stacks::NetworkPreference;
use bbox_kit::bbox_error;
use bbox_kit::errors::{BboxError, BboxResult, ErrorAttachments};

pub const PREFERENCES_FILE: &str = "preferences.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct StoredPreferences {
    network: Option<String>,
}

/// Network preference persisted as TOML under the bbox data directory.
///
/// An unreadable or unparsable file reads as "no preference", which resolves to testnet.
#[derive(Debug, Clone)]
pub struct FileNetworkPreference {
    path: PathBuf,
}

impl FileNetworkPreference {
    pub fn new(data_dir: Option<PathBuf>) -> BboxResult<Self> {
        let data_dir = data_dir
            .ok_or_else(|| bbox_error!(BboxError::Config, "Failed to get system data directory"))
            .with_documentation("Set BBOX_DATA_DIR to choose where preferences are stored.")?;
        Ok(Self { path: data_dir.join(PREFERENCES_FILE) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> BboxResult<Option<StoredPreferences>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let buf = fs::read_to_string(&self.path).map_err(|e| {
            bbox_error!(BboxError::Config, "Failed to read {}: {}", self.path.display(), e)
        })?;
        let stored = toml::from_str(&buf).map_err(|e| {
            bbox_error!(BboxError::Config, "Failed to parse {}: {}", self.path.display(), e)
        })?;
        Ok(Some(stored))
    }
}

impl NetworkPreference for FileNetworkPreference {
    fn get(&self) -> Option<String> {
        self.read().ok().flatten().and_then(|stored| stored.network)
    }

    fn set(&self, value: &str) -> BboxResult<()> {
        let mut stored = self.read().ok().flatten().unwrap_or_default();
        stored.network = Some(value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                bbox_error!(BboxError::Config, "Failed to create data directory: {}", e)
            })?;
        }
        let toml = toml::to_string(&stored)
            .map_err(|e| bbox_error!(BboxError::Config, "Failed to serialize preferences: {}", e))?;
        fs::write(&self.path, toml).map_err(|e| {
            bbox_error!(BboxError::Config, "Failed to write {}: {}", self.path.display(), e)
        })
    }
}
