//! Application configuration.
//!
//! Values are resolved with priority: config.toml > environment (.env) >
//! defaults.

use serde::Deserialize;
use std::path::PathBuf;

use crate::paths;

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const SERVER_PORT: u16 = 3000;

/// Configuration file read from the working directory
pub const CONFIG_FILE: &str = "config.toml";

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    server: Option<ServerConfig>,
    content: Option<ContentConfig>,
}

#[derive(Debug, Deserialize)]
struct ServerConfig {
    addr: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct ContentConfig {
    lessons_dir: Option<String>,
    static_dir: Option<String>,
}

impl AppConfig {
    /// Read config.toml, if present and valid.
    fn from_file() -> Option<Self> {
        let contents = std::fs::read_to_string(CONFIG_FILE).ok()?;
        match toml::from_str(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("Ignoring invalid {}: {}", CONFIG_FILE, e);
                None
            }
        }
    }
}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub addr: String,
    pub port: u16,
    pub lessons_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl Settings {
    /// Load settings from config.toml, then .env / process environment.
    pub fn load() -> Self {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let file = AppConfig::from_file().unwrap_or_default();
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merge a parsed config file with environment lookups.
    pub fn resolve(file: AppConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let server = file.server.unwrap_or(ServerConfig {
            addr: None,
            port: None,
        });
        let content = file.content.unwrap_or(ContentConfig {
            lessons_dir: None,
            static_dir: None,
        });

        let port = server
            .port
            .or_else(|| env("PORT").and_then(|p| p.parse().ok()))
            .unwrap_or(SERVER_PORT);

        let lessons_dir = match content.lessons_dir {
            Some(dir) => {
                tracing::info!("Using lessons from {}: {}", CONFIG_FILE, dir);
                PathBuf::from(dir)
            }
            None => match env("LESSONS_DIR") {
                Some(dir) => {
                    tracing::info!("Using lessons from LESSONS_DIR env: {}", dir);
                    PathBuf::from(dir)
                }
                None => PathBuf::from(paths::lessons_dir()),
            },
        };

        Self {
            addr: server.addr.unwrap_or_else(|| SERVER_ADDR.to_string()),
            port,
            lessons_dir,
            static_dir: PathBuf::from(content.static_dir.unwrap_or_else(|| paths::STATIC_DIR.to_string())),
        }
    }

    /// Get the full server bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}
