use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use telequeue::api::server::start_server;
use telequeue::config;
use telequeue::db::seed::seed_demo_data;
use telequeue::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} v{}", config::APP_NAME, config::APP_VERSION);

    let db_path = config::default_db_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let state = Arc::new(AppState::new(db_path.clone()));
    state.open_db()?;
    tracing::info!(path = %db_path.display(), "Database ready");

    if std::env::args().any(|arg| arg == "--seed") {
        let conn = state.open_db()?;
        let seeded = seed_demo_data(&conn)?;
        if seeded > 0 {
            tracing::info!("Demo data loaded");
        }
    }

    let mut server = start_server(state, config::bind_addr()).await?;
    tracing::info!(addr = %server.local_addr(), "Listening");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    server.shutdown();

    Ok(())
}
