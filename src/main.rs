use mimalloc::MiMalloc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use community_events::{app, config::Config, listen, AppState};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(environment = %config.app.environment, "Starting Community Events API");

    let listener = listen(&config.app).await?;
    let state = AppState::new(config).await?;

    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app(state).into_make_service()).await?;
    Ok(())
}
