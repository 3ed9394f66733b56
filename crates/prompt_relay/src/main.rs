use prompt_relay::{
    config,
    server::{self, ServerState},
    state::AppContext,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::init_tracing();
    let config = config::AppConfig::load()?;
    info!(
        model = %config.upstream.model,
        log_path = %config.log_path.display(),
        "starting prompt relay"
    );
    let ctx = AppContext::from_app_config(config)?;

    let server_state = ServerState::new(ctx.clone());
    let server_task = tokio::spawn(async move {
        if let Err(err) = server::serve(server_state).await {
            error!(error = ?err, "server error");
        }
    });

    tokio::signal::ctrl_c().await?;
    ctx.request_shutdown();

    let _ = server_task.await;

    Ok(())
}
