//! The hosting shell: a thin axum server around the encoder.
//!
//! One page, one download endpoint, no state. Every request is an
//! independent synchronous encode; concurrent requests share nothing.

pub mod handlers;
pub mod page;
pub mod router;

use anyhow::Result;

/// Start the HTTP server and block until shutdown (ctrl-c).
pub async fn start_server(host: &str, port: u16) -> Result<()> {
    let app = router::create_router();

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("QR page listening on http://{}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
