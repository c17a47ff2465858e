// src/serve.rs

//! Local preview server over the generated output tree.

use std::net::SocketAddr;
use std::path::Path;

use axum::Router;
use tower_http::services::ServeDir;
use tracing::info;

use crate::errors::Result;

/// Serve `output_dir` over HTTP on localhost until the future is dropped.
///
/// Callers are responsible for checking that the output directory exists
/// before starting; serving an absent tree is a configuration error, not
/// something to paper over with 404s.
pub async fn serve(output_dir: &Path, port: u16) -> Result<()> {
    let address = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(address).await?;

    info!(
        url = %format!("http://localhost:{port}/"),
        dir = %output_dir.display(),
        "preview server started"
    );

    let router = Router::new().fallback_service(ServeDir::new(output_dir));

    axum::serve(listener, router).await?;

    Ok(())
}
