// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Router construction and the server loop

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::handlers;
use crate::state::AppState;

/// Build the gateway router
pub fn router(state: AppState, enable_cors: bool) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/config", get(handlers::health::config))
        .route("/init", post(handlers::health::init))
        // Sources
        .route(
            "/sources",
            get(handlers::sources::list_sources).post(handlers::sources::search_sources),
        )
        .route("/sources/*id", get(handlers::sources::get_source))
        // Sessions
        .route(
            "/sessions",
            get(handlers::sessions::list_sessions).post(handlers::sessions::create_session),
        )
        .route("/sessions/:id", get(handlers::sessions::get_session))
        .route(
            "/sessions/:id/activities",
            get(handlers::sessions::list_activities),
        )
        .route("/sessions/:id/delete", post(handlers::sessions::delete_session))
        .route("/sessions/:id/message", post(handlers::sessions::send_message))
        .route("/sessions/:id/approve", post(handlers::sessions::approve_plan));

    let app = Router::new()
        .nest("/api", api_routes)
        .fallback(|| async { GatewayError::NotFound })
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        )
    } else {
        app
    }
}

/// The gateway HTTP server
pub struct Server {
    config: GatewayConfig,
    app: Router,
}

impl Server {
    pub fn new(config: GatewayConfig, state: AppState) -> Self {
        let app = router(state, config.enable_cors);
        Self { config, app }
    }

    /// Serve until Ctrl-C
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.config.bind_addr;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Jules gateway running at http://{}", listener.local_addr()?);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("shutting down");
                }
            })
            .await?;
        Ok(())
    }
}
