//! HTTP surface of the dispenser host.
//!
//! | Route                             | Purpose                       |
//! |-----------------------------------|-------------------------------|
//! | `GET  /health`                    | liveness probe                |
//! | `POST /dispense`                  | run one candy handshake       |
//! | `POST /speak`                     | narrate text via TTS program  |
//! | `POST /trigger-fetch-and-prepare` | refresh the question bank     |

pub mod handlers;
pub mod routes;
pub mod types;

use std::net::SocketAddr;

use log::{info, warn};
use tokio::net::TcpListener;

use crate::app::ports::{DelayPort, DispenseTransport};

pub use handlers::HttpState;
pub use routes::create_router;

/// Bind `addr` and serve until Ctrl-C or SIGTERM.
pub async fn serve<T: DispenseTransport, D: DelayPort>(
    addr: SocketAddr,
    state: HttpState<T, D>,
) -> std::io::Result<()> {
    let app = create_router(state);
    let listener = TcpListener::bind(addr).await?;
    info!("Candy dispenser backend running on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Ctrl+C handler unavailable: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received SIGTERM, shutting down");
            }
            Err(e) => {
                warn!("SIGTERM handler unavailable: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
