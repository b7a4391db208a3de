use serde::Deserialize;

/// Complete prism configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PrismConfig {
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub mirror: MirrorConfig,
}

impl Default for PrismConfig {
    fn default() -> Self {
        Self {
            channel: ChannelConfig::default(),
            mirror: MirrorConfig::default(),
        }
    }
}

impl PrismConfig {
    /// Build from env vars, falling back to defaults.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("PRISM_OBS_URL") {
            cfg.channel.url = v;
        }
        if let Ok(v) = std::env::var("PRISM_REFRESH_INTERVAL_MS") {
            if let Ok(n) = v.parse::<u64>() {
                cfg.mirror.refresh_interval_ms = n;
            }
        }

        cfg
    }
}

/// Control channel configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    /// Websocket address of the remote control endpoint
    #[serde(default = "default_url")]
    pub url: String,
}

fn default_url() -> String {
    "ws://localhost:4444".to_string()
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self { url: default_url() }
    }
}

/// Refresh loop configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MirrorConfig {
    /// Tick period of the refresh loop (milliseconds)
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_ms: u64,
}

fn default_refresh_interval() -> u64 {
    10
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval(),
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<PrismConfig, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let config: PrismConfig = toml::from_str(&contents)?;
    Ok(config)
}
