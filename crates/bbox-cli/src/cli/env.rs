use std::path::PathBuf;

use dotenvy::dotenv;

pub const BBOX_NETWORK_KEY: &str = "BBOX_NETWORK";
pub const BBOX_DATA_DIR_KEY: &str = "BBOX_DATA_DIR";

pub fn get_env_var(key: &str) -> Option<String> {
    dotenv().ok();
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, Default)]
pub struct BboxEnv {
    /// Overrides the persisted network for this session only
    pub network: Option<String>,
    pub data_dir: Option<PathBuf>,
}

impl BboxEnv {
    pub fn load() -> Self {
        let network = get_env_var(BBOX_NETWORK_KEY);
        let data_dir = get_env_var(BBOX_DATA_DIR_KEY).map(PathBuf::from);
        Self { network, data_dir }
    }

    /// Directory holding `preferences.toml`: `BBOX_DATA_DIR`, else `<system data dir>/bbox`.
    pub fn preference_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone().or_else(|| dirs::data_dir().map(|dir| dir.join("bbox")))
    }
}
