use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use std::sync::Arc;

use crate::{reports, summaries, tags, transactions, users};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

pub fn router(engine: Engine) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
    };

    Router::new()
        .route("/users", post(users::create).get(users::list))
        .route(
            "/users/{line_id}",
            get(users::get)
                .patch(users::update)
                .delete(users::remove),
        )
        .route("/users/{line_id}/sync", post(users::sync))
        .route("/tags", get(tags::search).post(tags::create))
        .route("/transactions", post(transactions::create))
        .route("/transactions/list", post(transactions::list))
        .route(
            "/transactions/{id}",
            axum::routing::patch(transactions::update),
        )
        .route(
            "/transactions/{id}/deactivate",
            post(transactions::deactivate),
        )
        .route("/period-summaries/report", post(summaries::report))
        .route("/reports/tags", post(reports::tags))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
