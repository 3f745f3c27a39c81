//! Application wrapper: settings, shorthand route registration, default
//! fallback, and request logging around the [`Router`].

use std::sync::Arc;
use std::time::Instant;

use tracing::{Instrument, info, info_span};

use crate::context::Context;
use crate::error::Error;
use crate::fallback;
use crate::handler::Handler;
use crate::method::Method;
use crate::middleware;
use crate::pattern::IntoPattern;
use crate::router::Router;
use crate::server::Server;
use crate::settings::Settings;

/// A router preloaded with the built-in middleware, plus its settings.
///
/// Every method that registers a route returns `self`, so setup chains:
///
/// ```rust,no_run
/// use wisp::{App, Flow, Handler};
///
/// #[tokio::main]
/// async fn main() -> Result<(), wisp::Error> {
///     App::new()
///         .get("/users/:id", Handler::normal(|cx| Box::pin(async move {
///             let id = cx.param("id").unwrap_or_default().to_owned();
///             cx.response_mut().text(format!("user {id}"));
///             Ok(Flow::Halt)
///         })))?
///         .listen()
///         .await
/// }
/// ```
#[derive(Debug)]
pub struct App {
    router: Router,
    settings: Arc<Settings>,
}

impl Default for App {
    fn default() -> Self { Self::new() }
}

impl App {
    /// An app configured from the environment (see [`Settings::from_env`]).
    pub fn new() -> Self {
        Self::with_settings(Settings::from_env())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let router = Router::new()
            .middleware(middleware::query())
            .middleware(middleware::powered_by());
        Self { router, settings: Arc::new(settings) }
    }

    // ── Settings ──────────────────────────────────────────────────────────

    pub fn settings(&self) -> &Settings { &self.settings }

    /// Mutable settings. Only meaningful during setup; requests already in
    /// flight keep the snapshot they started with.
    pub fn settings_mut(&mut self) -> &mut Settings {
        Arc::make_mut(&mut self.settings)
    }

    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings_mut().set(name, value);
        self
    }

    /// A free-form setting value.
    pub fn setting(&self, name: &str) -> Option<&str> { self.settings.get(name) }

    pub fn enable(mut self, name: impl Into<String>) -> Self {
        self.settings_mut().enable(name);
        self
    }

    pub fn disable(mut self, name: impl Into<String>) -> Self {
        self.settings_mut().disable(name);
        self
    }

    pub fn enabled(&self, name: &str) -> bool { self.settings.enabled(name) }
    pub fn disabled(&self, name: &str) -> bool { self.settings.disabled(name) }

    // ── Registration ──────────────────────────────────────────────────────

    /// Middleware for every path and method.
    pub fn middleware(mut self, handler: Handler) -> Self {
        self.router = self.router.middleware(handler);
        self
    }

    /// Middleware for every method under `pattern`.
    pub fn mount(mut self, pattern: impl IntoPattern, handler: Handler) -> Result<Self, Error> {
        self.router = self.router.mount(pattern, handler)?;
        Ok(self)
    }

    pub fn on(mut self, method: Method, pattern: &str, handler: Handler) -> Result<Self, Error> {
        self.router = self.router.on(method, pattern, handler)?;
        Ok(self)
    }

    pub fn get(self, pattern: &str, handler: Handler) -> Result<Self, Error> {
        self.on(Method::Get, pattern, handler)
    }

    pub fn post(self, pattern: &str, handler: Handler) -> Result<Self, Error> {
        self.on(Method::Post, pattern, handler)
    }

    pub fn put(self, pattern: &str, handler: Handler) -> Result<Self, Error> {
        self.on(Method::Put, pattern, handler)
    }

    pub fn delete(self, pattern: &str, handler: Handler) -> Result<Self, Error> {
        self.on(Method::Delete, pattern, handler)
    }

    pub fn router(&self) -> &Router { &self.router }

    // ── Dispatch ──────────────────────────────────────────────────────────

    /// Runs one request through the chain, finishing with
    /// [`fallback::not_found`].
    pub async fn handle(&self, mut cx: Context) -> Context {
        let started = Instant::now();
        let span = info_span!(
            "request",
            method = cx.request().method(),
            path = cx.request().path()
        );

        cx.extensions_mut().insert(Arc::clone(&self.settings));
        let cx = self.router
            .handle(cx, fallback::not_found)
            .instrument(span.clone())
            .await;

        span.in_scope(|| {
            info!(
                status = cx.response().status_code().as_u16(),
                elapsed = ?started.elapsed(),
                "completed"
            );
        });
        cx
    }

    /// Serves the app on `0.0.0.0:{port}` until SIGTERM / Ctrl-C.
    pub async fn listen(self) -> Result<(), Error> {
        let addr = format!("0.0.0.0:{}", self.settings.port());
        Server::bind(&addr)?.serve(self).await
    }
}
