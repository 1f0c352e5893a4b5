/**
 * LesionScan Server Entry Point
 *
 * This is the main entry point for the LesionScan backend server.
 * It loads configuration, initializes tracing and serves the Axum app.
 */

use std::net::SocketAddr;

use lesionscan::backend::server::{config::ServerConfig, create_app};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    // Initialize tracing with INFO level by default
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = ServerConfig::from_env()?;
    tracing::debug!("Loaded configuration: {:?}", config);

    // Create the Axum app
    let app = create_app(&config).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting server on {}", addr);

    // Run the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
