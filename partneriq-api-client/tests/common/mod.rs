//! Shared helpers for integration tests: a scripted axum server on an
//! ephemeral port, driven by the real client over localhost.

use axum::Router;

/// Bind an ephemeral port, serve the app in the background, and return the
/// base URL to point the client at.
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

/// Install a test subscriber so sink output is visible with `--nocapture`.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
