use std::sync::Arc;

use tokio::sync::Notify;

use crate::{
    config::AppConfig,
    storage::LogStore,
    upstream::{HuggingFaceClient, ImageClient},
};

#[derive(Clone)]
pub struct AppContext {
    config: Arc<AppConfig>,
    shutdown: Arc<Notify>,
    logs: Arc<LogStore>,
    images: Option<Arc<dyn ImageClient>>,
}

impl AppContext {
    /// `images` is `None` when no upstream credential is configured.
    pub fn new(config: AppConfig, images: Option<Arc<dyn ImageClient>>) -> Self {
        let logs = Arc::new(LogStore::new(config.log_path.clone()));
        Self {
            config: Arc::new(config),
            shutdown: Arc::new(Notify::new()),
            logs,
            images,
        }
    }

    pub fn from_app_config(config: AppConfig) -> anyhow::Result<Self> {
        let images = HuggingFaceClient::from_config(&config.upstream)?
            .map(|client| Arc::new(client) as Arc<dyn ImageClient>);
        Ok(Self::new(config, images))
    }

    pub fn config(&self) -> Arc<AppConfig> {
        Arc::clone(&self.config)
    }

    pub fn logs(&self) -> Arc<LogStore> {
        Arc::clone(&self.logs)
    }

    pub fn images(&self) -> Option<Arc<dyn ImageClient>> {
        self.images.clone()
    }

    pub fn shutdown_notifier(&self) -> Arc<Notify> {
        Arc::clone(&self.shutdown)
    }

    pub fn request_shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}
