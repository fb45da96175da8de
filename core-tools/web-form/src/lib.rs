//! Web Form Transport
//!
//! Serves the crop advisor as a single HTML form.
//!
//! # Endpoints
//!
//! - GET /  - Render the empty form
//! - POST / - Submit the form (url-encoded) and render the answer
//! - GET /api/status - Get server status
//!
//! The page is always rendered, even on failure. Input errors answer 400,
//! completion service failures 503, anything else 500; the page then shows
//! the error's user hint, never the raw error text.

pub mod page;
pub mod render;

pub use page::{FormInput, PageView};
pub use render::{HtmlEscaper, MarkupRenderer, SafeMarkup};

use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Json, Router,
};
use sdk::{AdvisorError, AdvisorErrorExt, AdvisorHandle, AdvisoryRequest};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// State shared across handlers
#[derive(Clone)]
struct AppState {
    handle: AdvisorHandle,
    renderer: Arc<dyn MarkupRenderer>,
}

/// Build the router with the default HTML escaper
pub fn router(handle: AdvisorHandle) -> Router {
    router_with_renderer(handle, Arc::new(HtmlEscaper))
}

pub fn router_with_renderer(handle: AdvisorHandle, renderer: Arc<dyn MarkupRenderer>) -> Router {
    let state = AppState { handle, renderer };

    Router::new()
        .route("/", get(form_handler).post(submit_handler))
        .route("/api/status", get(status_handler))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// HTTP status for an advisor failure
pub fn status_for(err: &AdvisorError) -> StatusCode {
    if err.is_input_error() {
        StatusCode::BAD_REQUEST
    } else if err.is_remote() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

async fn form_handler() -> Html<String> {
    Html(PageView::blank().render())
}

async fn submit_handler(
    State(state): State<AppState>,
    form: Result<Form<FormInput>, FormRejection>,
) -> Response {
    let renderer = state.renderer.as_ref();

    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            tracing::warn!("Rejected form submission: {}", rejection);
            let page = PageView::blank().error(
                renderer,
                "The form could not be read. Please submit it again",
            );
            return (StatusCode::BAD_REQUEST, Html(page.render())).into_response();
        }
    };

    let view = PageView::with_input(renderer, &form);
    let request = AdvisoryRequest::from(form);

    // Caught here so a bad field never reaches the advisor.
    if let Err(e) = request.validate() {
        tracing::debug!("Invalid form input: {}", e);
        let page = view.error(renderer, e.user_hint());
        return (status_for(&e), Html(page.render())).into_response();
    }

    match state.handle.advise(request).await {
        Ok(advice) => {
            let page = view.answer(renderer, &advice.answer);
            (StatusCode::OK, Html(page.render())).into_response()
        }
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                tracing::error!("Advisor request failed: {}", e);
            } else {
                tracing::debug!("Advisor rejected request: {}", e);
            }
            let page = view.error(renderer, e.user_hint());
            (status, Html(page.render())).into_response()
        }
    }
}

async fn status_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "running",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// A running web form server
pub struct WebFormServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl WebFormServer {
    /// Bind `addr` and start serving in the background.
    ///
    /// Port 0 picks a free port; `local_addr` reports the one bound.
    pub async fn start(addr: SocketAddr, handle: AdvisorHandle) -> Result<Self, AdvisorError> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        let app = router(handle);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            tracing::info!("Web form listening on http://{}", addr);

            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_rx.await.ok();
                    tracing::info!("Web form shutting down gracefully");
                })
                .await
                .unwrap_or_else(|e| {
                    tracing::error!("Web form server error: {}", e);
                });
        });

        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections and wait for in-flight requests
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!("Web form task failed: {}", e);
            }
        }
        tracing::info!("Web form stopped");
    }
}

impl Drop for WebFormServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
