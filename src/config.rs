use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const CONFIG_PATH: &str = "remote_seat.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub session: SessionConfig,
    pub demo: DemoConfig,
}

/// リモートプレイヤー1人分の設定
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// イベントスレッドが ack を待つ上限。None なら無期限に待つ
    pub ack_timeout_ms: Option<u64>,
}

impl SessionConfig {
    pub fn ack_timeout(&self) -> Option<Duration> {
        self.ack_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub game_no: u32,
    pub local_handle: String,
    pub remote_handle: String,
    pub remote_rating: Option<u32>,
    pub minutes: u32,
    pub increment: u32,
    pub max_plies: u32,
    /// 棋譜の保存先。None なら保存しない
    pub record_dir: Option<String>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        DemoConfig {
            game_no: 7,
            local_handle: "LocalPlayer".to_string(),
            remote_handle: "RemoteBot".to_string(),
            remote_rating: Some(1500),
            minutes: 3,
            increment: 2,
            max_plies: 80,
            record_dir: None,
        }
    }
}

impl Config {
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config_str = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(CONFIG_PATH)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|_| Self::default())
    }
}
