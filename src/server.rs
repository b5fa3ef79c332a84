//! HTTP binding for the SOAP service.
//!
//! The transport is intentionally thin: request bytes go straight to
//! [`service::handle_request`] and whatever comes back is the response body.
//! Status is always 200 with an XML content type; protocol-level failures are
//! expressed inside the envelope, not as HTTP errors.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::registry::Registry;
use crate::service;

/// Service description served verbatim at `/wsdl`. A static asset, not logic.
const WSDL: &str = include_str!("../assets/mahasiswa.wsdl");

const XML_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

pub fn router(registry: Arc<Registry>) -> Router {
    Router::new()
        .route("/mahasiswa", post(soap_endpoint))
        .route("/wsdl", get(wsdl))
        .layer(TraceLayer::new_for_http())
        .with_state(registry)
}

/// Serves requests until `shutdown` resolves.
pub async fn run_until<F>(listener: TcpListener, registry: Arc<Registry>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(registry))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

pub async fn run_until_ctrl_c(listener: TcpListener, registry: Arc<Registry>) -> Result<()> {
    run_until(listener, registry, async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = ?err, "failed to install ctrl-c handler");
        }
    })
    .await
}

async fn soap_endpoint(State(registry): State<Arc<Registry>>, body: Bytes) -> impl IntoResponse {
    let xml = service::handle_request(&registry, &body);
    ([(header::CONTENT_TYPE, XML_CONTENT_TYPE)], xml)
}

async fn wsdl() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, XML_CONTENT_TYPE)], WSDL)
}
