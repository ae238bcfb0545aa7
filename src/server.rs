//! HTTP server implementation.
//!
//! # Examples
//!
//! Create an item, then read it back.
//!
//! ```no_run
//! # use items_api::feature::item::{item_api::Created, item_repository::Item};
//! # async fn example(url: &str) -> Result<(), reqwest::Error> {
//! let client = reqwest::Client::new();
//! let created: Created = client
//!     .post(format!("{url}/api/create"))
//!     .json(&serde_json::json!({"name": "Widget", "quantity": 5, "description": "x"}))
//!     .send()
//!     .await?
//!     .json()
//!     .await?;
//! let item: Item = client
//!     .post(format!("{url}/api/read/{}", created.id))
//!     .send()
//!     .await?
//!     .json()
//!     .await?;
//! assert_eq!("Widget", item.name);
//! # Ok(())
//! # }
//! ```

use crate::feature::item::item_api;
use crate::infra::{
    database::Database,
    error::PanicHandler,
    middleware::{trace_bodies, MakeRequestIdSpan},
    openapi::ApiDoc,
    state::AppState,
};
use axum::Router;
use http::header::AUTHORIZATION;
use std::iter::once;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    sensitive_headers::SetSensitiveRequestHeadersLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Constructs the full axum application.
pub fn app(state: AppState) -> Router {
    let layers = ServiceBuilder::new()
        .layer(CatchPanicLayer::custom(PanicHandler))
        .layer(SetSensitiveRequestHeadersLayer::new(once(AUTHORIZATION)))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(MakeRequestIdSpan)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                .on_failure(()),
        )
        .layer(axum::middleware::from_fn(trace_bodies));

    Router::new()
        .merge(item_api::routes())
        .with_state(state)
        .merge(SwaggerUi::new("/api/swagger-ui").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(layers)
}

/// Serves the application on `listener` until ctrl-c is pressed.
pub async fn run_app(listener: TcpListener, db: Database) -> std::io::Result<()> {
    let app = app(AppState::new(db)).into_make_service();

    tracing::info!("Server running on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown())
        .await?;
    tracing::info!("Successfully shut down");
    Ok(())
}

/// Completes when ctrl-c is pressed.
pub(crate) async fn shutdown() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to fetch ctrl_c: {}", e);
    }
    tracing::info!("Shutting down");
}

/// Spawn a server on a random port, returning its base url.
pub async fn spawn_app(db: Database) -> std::io::Result<String> {
    let address = "127.0.0.1";
    let listener = TcpListener::bind(format!("{address}:0")).await?;
    let port = listener.local_addr()?.port();
    tokio::spawn(run_app(listener, db));
    Ok(format!("http://{address}:{port}"))
}
