//! HTTP server setup and the proxy handler.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (tracing, request ID, body limit)
//! - Bind server to listener with graceful shutdown
//! - Run the transformation pipeline for every request
//! - Convert every pipeline error into a well-formed response

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, Method, Request},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::Instrument;

use crate::config::{FramingConfig, ProxyConfig};
use crate::error::ProxyError;
use crate::http::request::{request_id, UuidRequestId};
use crate::http::response::assemble;
use crate::lifecycle::shutdown::shutdown_requested;
use crate::observability::metrics;
use crate::rewrite::body::{classify, should_rewrite};
use crate::rewrite::{redirect, BodyTransformer, HtmlRewriter, TransformedBody};
use crate::routing::{MountPrefix, RequestNormalizer, UpstreamOrigin};
use crate::security::headers::sanitize_response_headers;
use crate::security::limits::{body_limit_layer, read_body};
use crate::upstream::UpstreamClient;

/// Everything the pipeline needs, compiled once from configuration.
pub struct ProxyState {
    origin: Arc<UpstreamOrigin>,
    prefix: MountPrefix,
    normalizer: RequestNormalizer,
    client: UpstreamClient,
    transformer: BodyTransformer,
    framing: FramingConfig,
    max_body_size: usize,
}

impl ProxyState {
    pub fn from_config(config: &ProxyConfig) -> Result<Self, ProxyError> {
        let origin = Arc::new(UpstreamOrigin::new(
            &config.upstream.origin,
            &config.upstream.aliases,
        )?);
        let prefix = MountPrefix::new(config.proxy.mount_prefix.as_str());
        let normalizer = RequestNormalizer::new(
            origin.clone(),
            prefix.clone(),
            config.proxy.path_query_param.clone(),
        );
        let client = UpstreamClient::new(config, &origin)?;
        let transformer = BodyTransformer::new(HtmlRewriter::new(
            &origin,
            prefix.clone(),
            config.proxy.inject_interceptor,
        ));

        Ok(Self {
            origin,
            prefix,
            normalizer,
            client,
            transformer,
            framing: config.framing.clone(),
            max_body_size: config.security.max_body_size,
        })
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<ProxyState>,
}

/// How a response body left the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    Redirect,
    Html,
    Passthrough,
}

impl Disposition {
    fn as_str(self) -> &'static str {
        match self {
            Disposition::Redirect => "redirect",
            Disposition::Html => "html",
            Disposition::Passthrough => "passthrough",
        }
    }
}

/// HTTP server for the framing proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ProxyError> {
        let state = AppState {
            proxy: Arc::new(ProxyState::from_config(&config)?),
        };
        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(body_limit_layer(config.security.max_body_size)),
            )
    }

    /// The fully layered router, for serving in-process (tests, embedding).
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server until an OS signal arrives or `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.origin,
            mount_prefix = %self.config.proxy.mount_prefix,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_requested(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler. Never fails: errors become plain-text responses.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().clone();
    let span = tracing::info_span!(
        "proxy",
        request_id = %request_id,
        method = %method,
        path = %request.uri().path()
    );

    async move {
        tracing::debug!("Proxying request");

        let (response, kind) = match forward(&state.proxy, request).await {
            Ok((response, disposition)) => (response, disposition.as_str()),
            Err(e) => {
                match &e {
                    ProxyError::UpstreamUnreachable(_) | ProxyError::UpstreamTimeout(_) => {
                        tracing::error!(error = %e, "Upstream request failed")
                    }
                    _ => tracing::warn!(error = %e, "Request rejected"),
                }
                metrics::record_error(e.reason());
                (e.into_response(), "error")
            }
        };

        tracing::debug!(status = %response.status(), kind, "Request complete");
        metrics::record_request(method.as_str(), response.status().as_u16(), kind, start_time);
        response
    }
    .instrument(span)
    .await
}

/// Run the pipeline: normalize → fetch → (redirect | sanitize → transform) → assemble.
async fn forward(
    proxy: &ProxyState,
    request: Request<Body>,
) -> Result<(Response, Disposition), ProxyError> {
    let (parts, body) = request.into_parts();

    let target = proxy
        .normalizer
        .normalize(parts.uri.path(), parts.uri.query())?;

    let body = if parts.method == Method::GET || parts.method == Method::HEAD {
        None
    } else {
        Some(read_body(body, proxy.max_body_size).await?)
    };

    tracing::debug!(upstream = %target.as_str(), "Forwarding upstream");
    let upstream = proxy
        .client
        .send(parts.method.clone(), &target, &parts.headers, body)
        .await?;
    let status = upstream.status();
    let mut headers = sanitize_response_headers(upstream.headers(), &proxy.framing);

    if redirect::is_redirect(status) && headers.contains_key(header::LOCATION) {
        if redirect::rewrite_location_header(&mut headers, &proxy.origin, &proxy.prefix) {
            tracing::debug!(
                status = %status,
                location = ?headers.get(header::LOCATION),
                "Rewrote redirect location"
            );
        }
        let body = TransformedBody::Streaming(upstream).into_body();
        return Ok((assemble(status, headers, body), Disposition::Redirect));
    }

    if !should_rewrite(classify(upstream.headers()), &parts.method, status) {
        let body = TransformedBody::Streaming(upstream).into_body();
        return Ok((assemble(status, headers, body), Disposition::Passthrough));
    }

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let raw = proxy.client.read_body(upstream).await?;
    let body = proxy.transformer.transform_html(raw, content_type.as_deref());

    Ok((
        assemble(status, headers, TransformedBody::Buffered(body).into_body()),
        Disposition::Html,
    ))
}
