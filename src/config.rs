use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(skip)]
    pub config_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_edit_model")]
    pub edit_model: String,
    #[serde(default = "default_generate_model")]
    pub generate_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_size")]
    pub size: String,
    #[serde(default = "default_quality")]
    pub quality: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: String,
    #[serde(default = "default_true")]
    pub auto_download: bool,
}

// Default value functions
fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_edit_model() -> String {
    "dall-e-2".to_string()
}

fn default_generate_model() -> String {
    "dall-e-3".to_string()
}

fn default_size() -> String {
    "1024x1024".to_string()
}

fn default_quality() -> String {
    "hd".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_output_directory() -> String {
    "./wavelift-output".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: None,
            base_url: default_base_url(),
            edit_model: default_edit_model(),
            generate_model: default_generate_model(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            quality: default_quality(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            auto_download: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            defaults: DefaultsConfig::default(),
            server: ServerConfig::default(),
            output: OutputConfig::default(),
            config_path: PathBuf::new(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "wavelift", "wavelift")
            .context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from file or create default
    pub fn load_or_create() -> Result<Self> {
        let config_path = Self::config_path()?;

        // Environment variable takes precedence over the stored key
        let env_key = std::env::var("OPENAI_API_KEY").ok();

        if config_path.exists() {
            let content =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            let mut config: Config =
                toml::from_str(&content).context("Failed to parse config file")?;
            config.config_path = config_path;

            if let Some(key) = env_key {
                config.api.key = Some(key);
            }

            Ok(config)
        } else {
            let mut config = Config::default();
            config.config_path = config_path;

            if let Some(key) = env_key {
                config.api.key = Some(key);
            }

            // Create config directory and save default config
            config.save()?;
            Ok(config)
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get API key (from config or environment)
    pub fn api_key(&self) -> Option<&str> {
        self.api.key.as_deref()
    }

    /// Set a config value by key path (e.g., "api.key", "server.port")
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api.key" => self.api.key = Some(value.to_string()),
            "api.base_url" => self.api.base_url = value.to_string(),
            "api.edit_model" => self.api.edit_model = value.to_string(),
            "api.generate_model" => self.api.generate_model = value.to_string(),
            "defaults.size" => {
                let valid = ["256x256", "512x512", "1024x1024", "1792x1024", "1024x1792"];
                if valid.contains(&value) {
                    self.defaults.size = value.to_string();
                } else {
                    anyhow::bail!("Invalid size. Valid values: {}", valid.join(", "));
                }
            }
            "defaults.quality" => {
                let valid = ["standard", "hd"];
                if valid.contains(&value) {
                    self.defaults.quality = value.to_string();
                } else {
                    anyhow::bail!("Invalid quality. Valid values: {}", valid.join(", "));
                }
            }
            "server.host" => self.server.host = value.to_string(),
            "server.port" => {
                self.server.port = value.parse().context("Invalid port number")?;
            }
            "server.static_dir" => self.server.static_dir = value.to_string(),
            "output.directory" => self.output.directory = value.to_string(),
            "output.auto_download" => {
                self.output.auto_download = value.parse().context("Invalid boolean value")?;
            }
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        Ok(())
    }

    /// Get a config value by key path
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "api.key" => self.api.key.clone().map(|_| "****".to_string()), // Mask API key
            "api.base_url" => Some(self.api.base_url.clone()),
            "api.edit_model" => Some(self.api.edit_model.clone()),
            "api.generate_model" => Some(self.api.generate_model.clone()),
            "defaults.size" => Some(self.defaults.size.clone()),
            "defaults.quality" => Some(self.defaults.quality.clone()),
            "server.host" => Some(self.server.host.clone()),
            "server.port" => Some(self.server.port.to_string()),
            "server.static_dir" => Some(self.server.static_dir.clone()),
            "output.directory" => Some(self.output.directory.clone()),
            "output.auto_download" => Some(self.output.auto_download.to_string()),
            _ => None,
        }
    }

    /// Get all config keys
    pub fn keys() -> &'static [&'static str] {
        &[
            "api.key",
            "api.base_url",
            "api.edit_model",
            "api.generate_model",
            "defaults.size",
            "defaults.quality",
            "server.host",
            "server.port",
            "server.static_dir",
            "output.directory",
            "output.auto_download",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_service_parameters() {
        let config = Config::default();
        assert_eq!(config.api.edit_model, "dall-e-2");
        assert_eq!(config.api.generate_model, "dall-e-3");
        assert_eq!(config.defaults.size, "1024x1024");
        assert_eq!(config.defaults.quality, "hd");
    }

    #[test]
    fn set_and_get_round_trip() {
        let mut config = Config::default();
        config.set("server.port", "8080").unwrap();
        assert_eq!(config.get("server.port").as_deref(), Some("8080"));

        assert!(config.set("defaults.quality", "ultra").is_err());
        assert!(config.set("no.such.key", "x").is_err());
    }

    #[test]
    fn api_key_is_masked_when_read_back() {
        let mut config = Config::default();
        config.set("api.key", "sk-secret").unwrap();
        assert_eq!(config.get("api.key").as_deref(), Some("****"));
    }
}
