mod config;
mod middleware;
mod routes;
mod state;

use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum ServerError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("server io: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = config::ServerConfig::from_env()?;
    let guard = config.edge_guard()?;
    tracing::info!(
        routes = guard.table().routes().len(),
        reject_expired = guard.options().reject_expired_tokens,
        "edge guard configured"
    );

    let app = routes::app(state::AppState::new(guard));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    tracing::info!(port = config.port, "storefront listening");
    axum::serve(listener, app).await?;
    Ok(())
}
