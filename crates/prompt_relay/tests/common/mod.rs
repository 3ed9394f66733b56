use std::{path::Path, time::Duration};

use anyhow::Result;
use prompt_relay::{
    config::{AppConfig, ServerConfig, UpstreamConfig},
    server::{self, ServerState},
    state::AppContext,
};
use reqwest::Client;
use tokio::{net::TcpListener, task::JoinHandle, time::sleep};

pub struct RunningRelay {
    pub base_url: String,
    pub ctx: AppContext,
    pub server: JoinHandle<Result<()>>,
}

pub fn relay_config(log_dir: &Path, upstream_base: &str, admin_password: &str) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            bind_addr: "127.0.0.1:0".to_string(),
        },
        upstream: UpstreamConfig {
            api_token: Some("hf_e2e".to_string()),
            model: "e2e/model".to_string(),
            base_url: upstream_base.to_string(),
        },
        admin_password: Some(admin_password.to_string()),
        log_path: log_dir.join("data/logs.jsonl"),
    }
}

pub async fn start_relay(config: AppConfig) -> Result<RunningRelay> {
    let ctx = AppContext::from_app_config(config)?;
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = tokio::spawn(server::serve_with_listener(
        listener,
        ServerState::new(ctx.clone()),
    ));

    let base_url = format!("http://{}", addr);
    let client = Client::new();
    let mut attempts = 0;
    loop {
        match client.get(format!("{}/health", base_url)).send().await {
            Ok(response) if response.status().is_success() => break,
            _ if attempts > 20 => {
                anyhow::bail!("server did not become ready in time");
            }
            _ => {
                attempts += 1;
                sleep(Duration::from_millis(50)).await;
            }
        }
    }

    Ok(RunningRelay {
        base_url,
        ctx,
        server,
    })
}
