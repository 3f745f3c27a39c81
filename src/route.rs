//! A single entry in the router's chain.

use std::panic::{self, AssertUnwindSafe};

use futures_util::FutureExt;
use tracing::{debug, warn};

use crate::context::Context;
use crate::error::Error;
use crate::handler::{BoxFuture, Flow, Handler, Outcome};
use crate::method::Method;
use crate::pattern::{IntoPattern, Params, Pattern};

/// What the dispatch loop does after a route had its turn.
#[derive(Debug)]
pub(crate) enum Step {
    /// Move to the next route, carrying the pending error (if any).
    Advance(Option<Error>),
    /// The handler ended the chain.
    Halt,
}

/// An immutable binding of a pattern and an optional method to a handler.
///
/// Routes registered through [`Router::mount`](crate::Router::mount) also
/// match any path *below* a literal pattern (`/api` covers `/api/users`).
/// Routes registered through [`Router::create`](crate::Router::create) match
/// the whole path only.
#[derive(Clone, Debug)]
pub struct Route {
    pattern: Pattern,
    method: Option<Method>,
    handler: Handler,
    mount: bool,
}

impl Route {
    /// A whole-path route. `method: None` accepts every method.
    pub fn new(pattern: Pattern, handler: Handler, method: Option<Method>) -> Self {
        Self { pattern, method, handler, mount: false }
    }

    pub fn builder() -> RouteBuilder {
        RouteBuilder::default()
    }

    /// The normalized registration string.
    pub fn path(&self) -> &str { self.pattern.as_str() }
    pub fn pattern(&self) -> &Pattern { &self.pattern }
    pub fn method(&self) -> Option<Method> { self.method }
    pub fn handler(&self) -> &Handler { &self.handler }
    pub fn is_mount(&self) -> bool { self.mount }

    /// Whether this route applies to `path`, with the params it captures.
    ///
    /// The compiled pattern is tried first; mount routes then fall back to a
    /// prefix match on a segment boundary.
    pub fn matches(&self, path: &str) -> Option<Params> {
        if let Some(params) = self.pattern.captures(path) {
            return Some(params);
        }
        (self.mount && self.pattern.is_prefix_of(path)).then(Params::new)
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.matches(path).is_some()
    }

    /// True if the route accepts `method` (compared case-insensitively).
    pub fn check_method(&self, method: &str) -> bool {
        self.method.is_none_or(|m| m.matches(method))
    }

    /// Gives this route its turn.
    ///
    /// A route whose method or handler kind does not fit the current state
    /// passes `err` through untouched.
    pub(crate) async fn dispatch(&self, err: Option<Error>, cx: &mut Context) -> Step {
        if !self.check_method(cx.request().method()) {
            debug!(route = %self.pattern, "method mismatch, skipping");
            return Step::Advance(err);
        }

        let outcome = match (&self.handler, err) {
            (Handler::Normal(m), None) => guarded(move || m.call(cx)).await,
            (Handler::ErrorAware(m), Some(e)) => guarded(move || m.call(e, cx)).await,
            (_, err) => return Step::Advance(err),
        };

        match outcome {
            Ok(Flow::Next) => Step::Advance(None),
            Ok(Flow::Halt) => Step::Halt,
            Err(e) => {
                debug!(route = %self.pattern, error = %e, "handler raised an error");
                Step::Advance(Some(e))
            }
        }
    }
}

/// Runs a handler, converting a panic (while building its future or while
/// polling it) into [`Error::HandlerFault`].
async fn guarded<'a, F>(call: F) -> Outcome
where
    F: FnOnce() -> BoxFuture<'a, Outcome>,
{
    let result = match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(fut) => AssertUnwindSafe(fut).catch_unwind().await,
        Err(payload) => Err(payload),
    };
    result.unwrap_or_else(|payload| {
        let err = Error::from_panic(payload);
        warn!(error = %err, "handler panicked");
        Err(err)
    })
}

// ── RouteBuilder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Route`].
///
/// Defaults to the `*` pattern, any method, whole-path matching.
/// [`build`](RouteBuilder::build) fails with [`Error::MissingHandler`] when no
/// handler was given, and with [`Error::InvalidArgument`] for a malformed
/// pattern.
#[derive(Default)]
pub struct RouteBuilder {
    pattern: Option<Result<Pattern, Error>>,
    method: Option<Method>,
    handler: Option<Handler>,
    mount: bool,
}

impl RouteBuilder {
    pub fn pattern(mut self, pattern: impl IntoPattern) -> Self {
        self.pattern = Some(pattern.into_pattern());
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn handler(mut self, handler: Handler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Also match paths below a literal pattern.
    pub fn mount(mut self) -> Self {
        self.mount = true;
        self
    }

    pub fn build(self) -> Result<Route, Error> {
        let pattern = self.pattern.unwrap_or_else(|| Ok(Pattern::any()))?;
        let Some(handler) = self.handler else {
            return Err(Error::MissingHandler { pattern: pattern.as_str().to_owned() });
        };
        Ok(Route { pattern, method: self.method, handler, mount: self.mount })
    }
}
