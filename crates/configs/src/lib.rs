use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: None }
    }
}

/// Where the collection files live and which opt-in hardening is enabled.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_products_file")]
    pub products_file: String,
    #[serde(default = "default_orders_file")]
    pub orders_file: String,
    /// Surface corrupt files and update/delete misses as errors.
    #[serde(default)]
    pub strict: bool,
    /// Hold a per-file lock across load-modify-save.
    #[serde(default)]
    pub serialize_writes: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            products_file: default_products_file(),
            orders_file: default_orders_file(),
            strict: false,
            serialize_writes: false,
        }
    }
}

impl StorageConfig {
    pub fn products_path(&self) -> PathBuf {
        self.data_dir.join(&self.products_file)
    }

    pub fn orders_path(&self) -> PathBuf {
        self.data_dir.join(&self.orders_file)
    }
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 3000 }
fn default_data_dir() -> PathBuf { PathBuf::from(".") }
fn default_products_file() -> String { "product.json".into() }
fn default_orders_file() -> String { "order.json".into() }

/// Load `CONFIG_PATH` (default `config.toml`); a missing file yields defaults.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    match std::fs::read_to_string(&path) {
        Ok(content) => parse(&content).with_context(|| format!("invalid config file {path}")),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(anyhow!("cannot read config file {path}: {e}")),
    }
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// File (if any), then environment overrides, then validation.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.apply_env_overrides(|key| std::env::var(key).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Apply overrides from a variable lookup; `std::env::var` in production.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| anyhow!("PORT must be an integer in 1..=65535, got {port:?}"))?;
        }
        if let Some(w) = lookup("TOKIO_WORKER_THREADS") {
            self.server.worker_threads = w.trim().parse().ok();
        }
        if let Some(dir) = lookup("DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(f) = lookup("PRODUCTS_FILE") {
            self.storage.products_file = f;
        }
        if let Some(f) = lookup("ORDERS_FILE") {
            self.storage.orders_file = f;
        }
        if let Some(v) = lookup("STORE_STRICT") {
            self.storage.strict = parse_flag("STORE_STRICT", &v)?;
        }
        if let Some(v) = lookup("STORE_SERIALIZE_WRITES") {
            self.storage.serialize_writes = parse_flag("STORE_SERIALIZE_WRITES", &v)?;
        }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        Ok(())
    }
}

fn parse_flag(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(anyhow!("{name} must be a boolean, got {other:?}")),
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if self.worker_threads == Some(0) {
            self.worker_threads = None;
        }
        Ok(())
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        if self.products_file.trim().is_empty() || self.orders_file.trim().is_empty() {
            return Err(anyhow!("storage file names must not be empty"));
        }
        if self.products_path() == self.orders_path() {
            return Err(anyhow!("products and orders must use different files"));
        }
        Ok(())
    }
}
