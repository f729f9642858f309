//! HTTP front end
//!
//! Guest routes (login, register) and member routes (search, book pages, the
//! JSON API) are separate router groups, each wrapped in its own gate.

pub mod error;
pub mod pages;
pub mod routes;
pub mod session;
pub mod state;

use std::net::SocketAddr;

use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::domain::result::Result;
use crate::services::LogEvent;

pub use state::AppState;

/// Build the application router
pub fn router(state: AppState) -> Router {
    let guest = Router::new()
        .route("/", get(routes::login_page).post(routes::login))
        .route("/register", get(routes::register_page).post(routes::register))
        .route_layer(from_fn_with_state(
            state.clone(),
            session::redirect_if_authenticated,
        ));

    let members = Router::new()
        .route("/index", get(routes::index).post(routes::search))
        .route(
            "/books/{id}",
            get(routes::book_detail).post(routes::submit_review),
        )
        .route("/api/{isbn}", get(routes::api_lookup))
        .route_layer(from_fn_with_state(
            state.clone(),
            session::require_authenticated,
        ));

    Router::new()
        .merge(guest)
        .merge(members)
        .route("/logout", get(routes::logout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `address` and serve until ctrl-c or SIGTERM
pub async fn serve(state: AppState, address: SocketAddr) -> Result<()> {
    info!("Binding to {address}");
    let listener = TcpListener::bind(address).await?;
    let local = listener.local_addr()?;
    info!("Server running on http://{local}");

    state.record(LogEvent::new("server_started"));

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
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
