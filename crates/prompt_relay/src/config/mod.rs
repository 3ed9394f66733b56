use std::{env, path::PathBuf};

use anyhow::Context;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MODEL: &str = "stabilityai/stable-diffusion-xl-base-1.0";
const DEFAULT_API_BASE: &str = "https://api-inference.huggingface.co";
const DEFAULT_LOG_PATH: &str = "data/logs.jsonl";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub admin_password: Option<String>,
    pub log_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub api_token: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn load() -> anyhow::Result<Self> {
        let config = Self::from_lookup(|key| env::var(key).ok())?;
        config.warn_missing_credentials();
        Ok(config)
    }

    /// Build configuration from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bind_addr = match get("RELAY_BIND") {
            Some(addr) => addr,
            None => {
                let port = match get("PORT") {
                    Some(raw) => raw
                        .trim()
                        .parse::<u16>()
                        .with_context(|| format!("parsing PORT value {raw:?}"))?,
                    None => DEFAULT_PORT,
                };
                format!("0.0.0.0:{port}")
            }
        };

        Ok(Self {
            server: ServerConfig { bind_addr },
            upstream: UpstreamConfig {
                api_token: get("HF_API_TOKEN"),
                model: get("HF_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                base_url: get("HF_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            },
            admin_password: get("ADMIN_PASSWORD"),
            log_path: get("RELAY_LOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_PATH)),
        })
    }

    pub fn warn_missing_credentials(&self) {
        if self.upstream.api_token.is_none() {
            warn!("HF_API_TOKEN is not set; /generate will respond with 500");
        }
        if self.admin_password.is_none() {
            warn!("ADMIN_PASSWORD is not set; /admin/logs will respond with 500");
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> &str {
        &self.bind_addr
    }
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}
