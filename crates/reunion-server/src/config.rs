use serde::Deserialize;

use reunion_core::geo::{Coordinate, TargetLocation};

/// Top-level server configuration, loaded from `reunion.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub web_root: String,
    pub database: DatabaseConfig,
    pub game: GameConfig,
    pub limits: LimitsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5000".to_string(),
            web_root: "dist/public".to_string(),
            database: DatabaseConfig::default(),
            game: GameConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

/// Relational store settings. Without a `url` the server keeps everything in memory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub target: TargetConfig,
}

/// The location every guess is scored against.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        let target = TargetLocation::default();
        Self {
            name: target.name,
            latitude: target.coordinate.latitude,
            longitude: target.coordinate.longitude,
        }
    }
}

impl TargetConfig {
    pub fn to_target(&self) -> Result<TargetLocation, reunion_core::geo::GeoError> {
        Ok(TargetLocation {
            name: self.name.clone(),
            coordinate: Coordinate::new(self.latitude, self.longitude)?,
        })
    }
}

/// Request limits applied by the HTTP layer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum accepted JSON body size in bytes.
    pub max_body_bytes: usize,
    pub request_timeout_secs: u64,
    /// Cap on posts returned by the board listing (most recent kept).
    pub max_posts_listed: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 64 * 1024,
            request_timeout_secs: 30,
            max_posts_listed: 200,
        }
    }
}

impl ServerConfig {
    /// Validate configuration, logging and exiting on anything unusable.
    pub fn validate(&self) {
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            tracing::error!(
                addr = %self.listen_addr,
                "listen_addr is not a valid socket address"
            );
            std::process::exit(1);
        }

        if let Err(e) = self.game.target.to_target() {
            tracing::error!(error = %e, "game.target is out of range");
            std::process::exit(1);
        }
        if self.game.target.name.trim().is_empty() {
            tracing::warn!("game.target.name is empty");
        }

        if self.database.max_connections == 0 {
            tracing::error!("database.max_connections must be > 0");
            std::process::exit(1);
        }

        if self.limits.max_body_bytes == 0 {
            tracing::error!("limits.max_body_bytes must be > 0");
            std::process::exit(1);
        }
        if self.limits.request_timeout_secs == 0 {
            tracing::error!("limits.request_timeout_secs must be > 0");
            std::process::exit(1);
        }
        if self.limits.max_posts_listed == 0 {
            tracing::error!("limits.max_posts_listed must be > 0");
            std::process::exit(1);
        }
    }

    /// Load config from `reunion.toml` if it exists, then apply env var overrides.
    pub fn load() -> Self {
        let mut config = match std::fs::read_to_string("reunion.toml") {
            Ok(content) => match toml::from_str::<ServerConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from reunion.toml");
                    if cfg.database.url.is_some() {
                        tracing::warn!(
                            "database.url is set in config file; use DATABASE_URL env var in production"
                        );
                    }
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse reunion.toml: {e}, using defaults");
                    ServerConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No reunion.toml found, using defaults");
                ServerConfig::default()
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply environment overrides. `lookup` returns the value of a variable,
    /// if set; empty or unparsable values leave the current setting alone.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(addr) = var("REUNION_LISTEN_ADDR") {
            self.listen_addr = addr;
        } else if let Some(port) = var("PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.listen_addr = format!("0.0.0.0:{port}");
        }
        if let Some(root) = var("REUNION_WEB_ROOT") {
            self.web_root = root;
        }
        if let Some(url) = var("DATABASE_URL") {
            self.database.url = Some(url);
        }

        let target = &mut self.game.target;
        if let Some(name) = var("REUNION_TARGET_NAME") {
            target.name = name;
        }
        if let Some(lat) = var("REUNION_TARGET_LAT").and_then(|v| v.parse().ok()) {
            target.latitude = lat;
        }
        if let Some(lon) = var("REUNION_TARGET_LON").and_then(|v| v.parse().ok()) {
            target.longitude = lon;
        }

        if let Some(secs) = var("REUNION_REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.limits.request_timeout_secs = secs;
        }
    }
}
