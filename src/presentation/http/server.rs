use std::net::SocketAddr;
use std::sync::Arc;

use axum::serve;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::infrastructure::container::AppContainer;
use crate::presentation::http::routes::api_router;

pub async fn run(container: Arc<AppContainer>) -> Result<(), std::io::Error> {
    let port = container.config.port;
    // Multipart framing adds overhead on top of the file itself.
    let body_limit = container.config.max_upload_bytes + 64 * 1024;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = api_router(container).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(RequestBodyLimitLayer::new(body_limit))
            .layer(cors),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");

    serve(listener, app).await
}
