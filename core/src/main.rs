/// CareLink headless chat client - main entry point
use carelink_core::{ChatClient, Config, Session};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load();
    let session = Session::from_env()?;

    info!("Starting CareLink chat client");
    info!("   Backend: {}", config.api_base);
    info!("   Signed in as: {} ({})", session.display_name, session.role);

    let client = ChatClient::new(&config, session)?;
    client.load().await;

    let runner = {
        let client = client.clone();
        tokio::spawn(async move { client.run().await })
    };

    wait_for_shutdown().await;
    info!("Shutdown signal received, stopping client...");
    client.shutdown();
    let _ = runner.await;
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn wait_for_shutdown() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Ctrl+C received");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("SIGTERM received");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
