use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use contacts::{AppConfig, AppState, create_router, store};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting contacts service");

    let config = AppConfig::load()?;

    // Open the contact store and check connectivity
    let contact_store = store::connect(&config.database).await?;
    if let Err(e) = contact_store.ping().await {
        anyhow::bail!("Failed to reach contact store: {}", e);
    }
    info!("Contact store connection successful");

    let address = config.app.bind_address();
    let app_state = AppState::new(config, contact_store);

    // Start the web server
    let app = create_router(app_state);

    let listener = TcpListener::bind(&address).await?;
    info!("Contacts service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
