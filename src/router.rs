//! Ordered middleware chain and its dispatch loop.
//!
//! Routes are tried strictly in registration order. For each request the loop
//! keeps a cursor and at most one pending error:
//!
//! ```text
//!            ┌──────────── route skipped / handler returned Next or Err ─────┐
//!            ▼                                                               │
//!   ┌──── Scanning ── path + method match ──▶ Dispatching ───────────────────┘
//!   │        │                                   │
//!   │  cursor past end                     Flow::Halt, or response
//!   │        ▼                             finalized before the next turn
//!   │    Exhausted ── fallback(err, cx)          ▼
//!   │                                        Terminated
//! ```
//!
//! The fallback runs once per request unless a handler halts the chain.

use tracing::{debug, warn};

use crate::context::Context;
use crate::error::Error;
use crate::handler::Handler;
use crate::method::Method;
use crate::pattern::{IntoPattern, Pattern};
use crate::route::{Route, Step};

/// The application's middleware chain.
///
/// Build it once at startup. [`handle`](Router::handle) only reads it, so one
/// `Router` behind an `Arc` serves any number of concurrent requests.
#[derive(Clone, Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registers method-agnostic middleware that runs for every path.
    pub fn middleware(self, handler: Handler) -> Self {
        self.push(Route::new(Pattern::any(), handler, None))
    }

    /// Registers method-agnostic middleware under `pattern`.
    ///
    /// A literal pattern also covers everything below it, on a segment
    /// boundary: `/api` runs for `/api/users` but not for `/apikey`.
    ///
    /// ```rust
    /// # use wisp::{Flow, Handler, Router};
    /// # fn main() -> Result<(), wisp::Error> {
    /// let router = Router::new()
    ///     .mount("/api", Handler::normal(|cx| Box::pin(async move {
    ///         cx.response_mut().header("cache-control", "no-store");
    ///         Ok(Flow::Next)
    ///     })))?;
    /// # Ok(()) }
    /// ```
    pub fn mount(self, pattern: impl IntoPattern, handler: Handler) -> Result<Self, Error> {
        let route = Route::builder().pattern(pattern).handler(handler).mount().build()?;
        Ok(self.push(route))
    }

    /// Registers a whole-path route. `method: None` accepts any method.
    pub fn create(self, pattern: &str, handler: Handler, method: Option<Method>) -> Result<Self, Error> {
        let route = Route::new(Pattern::parse(pattern)?, handler, method);
        Ok(self.push(route))
    }

    /// Registers a whole-path route for one method.
    ///
    /// Path parameters use `:name` syntax and are read with
    /// [`Context::param`](crate::Context::param).
    pub fn on(self, method: Method, pattern: &str, handler: Handler) -> Result<Self, Error> {
        self.create(pattern, handler, Some(method))
    }

    /// Appends a prebuilt route.
    pub fn route(self, route: Route) -> Self {
        self.push(route)
    }

    fn push(mut self, route: Route) -> Self {
        debug!(route = route.path(), method = ?route.method(), "registered");
        self.routes.push(route);
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Runs `cx` through the chain and returns it once the chain ends.
    ///
    /// `fallback(err, cx)` is called exactly once unless a handler halts the
    /// chain: with the pending error (or `None`) when the routes run out, or
    /// as soon as the response is found finalized between two turns. When
    /// the routes run out the loop first yields to the scheduler, so the
    /// fallback never runs in the same poll that started the dispatch.
    pub async fn handle<F>(&self, mut cx: Context, fallback: F) -> Context
    where
        F: FnOnce(Option<Error>, &mut Context) + Send,
    {
        debug!(method = cx.request().method(), url = ?cx.request().url(), "dispatching");

        cx.params.clear();
        let mut cursor = Cursor::default();

        loop {
            if cx.response().is_sent() {
                debug!(position = cursor.position, "response finalized, stopping");
                fallback(cursor.pending.take(), &mut cx);
                return cx;
            }

            let Some(route) = self.routes.get(cursor.position) else {
                debug!(pending = cursor.pending.is_some(), "chain exhausted");
                tokio::task::yield_now().await;
                fallback(cursor.pending.take(), &mut cx);
                return cx;
            };
            cursor.position += 1;

            let Some(params) = route.matches(cx.request().path()) else {
                debug!(route = route.path(), "path mismatch, skipping");
                continue;
            };
            cx.params = params;

            debug!(route = route.path(), position = cursor.position - 1, "dispatching to route");
            match route.dispatch(cursor.pending.take(), &mut cx).await {
                Step::Advance(err) => cursor.pending = err,
                Step::Halt => {
                    if !cx.response().is_sent() {
                        warn!(route = route.path(), "chain halted with an unsent response");
                    }
                    return cx;
                }
            }
        }
    }
}

/// Per-request position in the chain.
#[derive(Debug, Default)]
struct Cursor {
    position: usize,
    pending: Option<Error>,
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use futures_util::FutureExt;

    use super::*;
    use crate::handler::Flow;
    use crate::request::Request;

    fn noop() -> Handler {
        Handler::normal(|_cx| Box::pin(async { Ok(Flow::Next) }))
    }

    #[test]
    fn registration_preserves_order() {
        let router = Router::new()
            .middleware(noop())
            .mount("/api", noop()).unwrap()
            .on(Method::Get, "/api/users/:id", noop()).unwrap();
        let paths: Vec<_> = router.routes().iter().map(Route::path).collect();
        assert_eq!(paths, ["*", "/api", "/api/users/:id"]);
        assert!(router.routes()[1].is_mount());
        assert_eq!(router.routes()[2].method(), Some(Method::Get));
    }

    #[test]
    fn trailing_slash_registrations_are_equivalent() {
        let router = Router::new()
            .create("/foo/", noop(), None).unwrap()
            .create("/foo", noop(), None).unwrap();
        assert_eq!(router.routes()[0].path(), router.routes()[1].path());
    }

    #[test]
    fn malformed_registrations_fail_fast() {
        assert!(matches!(
            Router::new().create("users", noop(), Some(Method::Get)),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            Router::new().mount("", noop()),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn every_step_is_logged_at_debug() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let router = Router::new()
            .on(Method::Get, "/elsewhere", noop()).unwrap()
            .middleware(Handler::normal(|cx| Box::pin(async move {
                cx.response_mut().text("done");
                Ok(Flow::Next)
            })));

        // Every handler above is ready on first poll, so the chain completes
        // without touching the runtime.
        let cx = tracing::subscriber::with_default(subscriber, || {
            router
                .handle(Context::new(Request::new("GET", "/here")), |_, _| {})
                .now_or_never()
        })
        .unwrap();
        assert!(cx.response().is_sent());

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("path mismatch, skipping"), "{logs}");
        assert!(logs.contains("dispatching to route"), "{logs}");
        assert!(logs.contains("response finalized, stopping"), "{logs}");
    }
}
