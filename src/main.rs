mod application;
mod config;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::infrastructure::container::AppContainer;
use crate::presentation::http::server;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let container = match AppContainer::build(config) {
        Ok(container) => Arc::new(container),
        Err(e) => {
            tracing::error!(error = %e, "failed to start");
            std::process::exit(1);
        }
    };

    if let Err(e) = server::run(container).await {
        tracing::error!(error = %e, "server exited");
        std::process::exit(1);
    }
}
