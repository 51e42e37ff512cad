//! Development server.
//!
//! Page paths (`/<page>` and `/<page>.html`) are answered from the page's
//! template; `/` redirects to the default page. Everything else falls
//! through to static files under the project root.

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, Method, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    Router,
};
use multipage_core::{DevRoute, DevRouter};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::dev::DevConfig;
use crate::error::{CliError, Result};

pub struct DevServer {
    config: DevConfig,
    router: Arc<DevRouter>,
}

impl DevServer {
    pub fn new(config: DevConfig, router: DevRouter) -> Self {
        Self {
            config,
            router: Arc::new(router),
        }
    }

    pub fn config(&self) -> &DevConfig {
        &self.config
    }

    /// The axum application.
    pub fn app(&self) -> Router {
        Router::new()
            .fallback_service(ServeDir::new(&self.config.root))
            .layer(middleware::from_fn_with_state(self.router.clone(), route_pages))
    }

    /// Bind the configured address and serve until Ctrl-C.
    pub async fn start(self) -> Result<()> {
        let addr = self.config.addr;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| CliError::Server(format!("Failed to bind to {addr}: {e}")))?;

        crate::ui::success(&format!(
            "Development server running at {}",
            self.config.server_url()
        ));

        self.serve(listener, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.app())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| CliError::Server(format!("Server error: {e}")))
    }
}

async fn route_pages(State(router): State<Arc<DevRouter>>, request: Request, next: Next) -> Response {
    if request.method() != Method::GET && request.method() != Method::HEAD {
        return next.run(request).await;
    }

    match router.route(request.uri().path()) {
        Ok(DevRoute::Redirect(to)) => Redirect::temporary(&to).into_response(),
        Ok(DevRoute::Page(html)) => ([(header::CACHE_CONTROL, "no-cache")], Html(html)).into_response(),
        Ok(DevRoute::Passthrough) => next.run(request).await,
        Err(err) => {
            tracing::error!(path = %request.uri().path(), %err, "failed to render page");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}
