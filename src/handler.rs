//! Handlers and type erasure.
//!
//! # Two kinds of handler
//!
//! Every route holds a [`Handler`], which is one of two explicit cases:
//!
//! - [`Handler::Normal`] runs while no error is pending.
//! - [`Handler::ErrorAware`] runs only while an error is pending, and receives
//!   that error by value.
//!
//! The kind is chosen at registration (`Handler::normal` vs
//! `Handler::error`). The router never inspects a handler's signature.
//!
//! # Passing control on
//!
//! A handler returns an [`Outcome`]:
//!
//! | Return | Effect |
//! |---|---|
//! | `Ok(Flow::Next)` | continue with the next applicable route (clears a consumed error) |
//! | `Err(e)` | continue with `e` pending: normal handlers are skipped until an error-aware one |
//! | `Ok(Flow::Halt)` | stop; the response is expected to be finalized |
//!
//! A panic inside a handler is caught at the router boundary and treated as
//! `Err(Error::HandlerFault { .. })`.
//!
//! # Storage
//!
//! ```text
//! Handler::normal(|cx| Box::pin(async move { … }))   ← user writes this
//!        ↓
//! Arc::new(closure) as Arc<dyn Middleware>           ← blanket impl
//!        ↓  stored in Route, shared by every request
//! middleware.call(&mut cx)  at request time          ← one vtable dispatch
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::error::Error;

/// A heap-allocated, type-erased future borrowing from `'a`.
///
/// `Pin<Box<…>>` because the runtime polls it in place; `Send` so the
/// request can move between tokio worker threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a handler returns.
pub type Outcome = Result<Flow, Error>;

/// How the dispatch loop proceeds after a handler succeeds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[must_use]
pub enum Flow {
    /// Continue with the next applicable route.
    Next,
    /// Stop the chain. Later routes and the fallback do not run.
    Halt,
}

// ── Traits ────────────────────────────────────────────────────────────────────

/// A handler that runs while no error is pending.
///
/// Implemented for every closure of the shape
/// `for<'a> Fn(&'a mut Context) -> BoxFuture<'a, Outcome>`. Implement it
/// directly for middleware that carries its own state.
pub trait Middleware: Send + Sync + 'static {
    fn call<'a>(&'a self, cx: &'a mut Context) -> BoxFuture<'a, Outcome>;
}

impl<F> Middleware for F
where
    F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, Outcome> + Send + Sync + 'static,
{
    fn call<'a>(&'a self, cx: &'a mut Context) -> BoxFuture<'a, Outcome> {
        self(cx)
    }
}

/// A handler that runs only while an error is pending.
pub trait ErrorMiddleware: Send + Sync + 'static {
    fn call<'a>(&'a self, err: Error, cx: &'a mut Context) -> BoxFuture<'a, Outcome>;
}

impl<F> ErrorMiddleware for F
where
    F: for<'a> Fn(Error, &'a mut Context) -> BoxFuture<'a, Outcome> + Send + Sync + 'static,
{
    fn call<'a>(&'a self, err: Error, cx: &'a mut Context) -> BoxFuture<'a, Outcome> {
        self(err, cx)
    }
}

// ── Handler ───────────────────────────────────────────────────────────────────

/// A route handler, tagged with its kind.
#[derive(Clone)]
pub enum Handler {
    Normal(Arc<dyn Middleware>),
    ErrorAware(Arc<dyn ErrorMiddleware>),
}

impl Handler {
    /// Wraps a normal handler closure.
    ///
    /// ```rust
    /// use wisp::{Flow, Handler};
    ///
    /// let hello = Handler::normal(|cx| Box::pin(async move {
    ///     cx.response_mut().text("hello");
    ///     Ok(Flow::Halt)
    /// }));
    /// ```
    pub fn normal<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, Outcome> + Send + Sync + 'static,
    {
        Self::Normal(Arc::new(f))
    }

    /// Wraps an error-aware handler closure.
    ///
    /// ```rust
    /// use http::StatusCode;
    /// use wisp::{Flow, Handler};
    ///
    /// let report = Handler::error(|err, cx| Box::pin(async move {
    ///     cx.response_mut().status(StatusCode::BAD_GATEWAY).text(err.to_string());
    ///     Ok(Flow::Halt)
    /// }));
    /// ```
    pub fn error<F>(f: F) -> Self
    where
        F: for<'a> Fn(Error, &'a mut Context) -> BoxFuture<'a, Outcome> + Send + Sync + 'static,
    {
        Self::ErrorAware(Arc::new(f))
    }

    /// Wraps a type implementing [`Middleware`].
    pub fn from_middleware(m: impl Middleware) -> Self {
        Self::Normal(Arc::new(m))
    }

    /// Wraps a type implementing [`ErrorMiddleware`].
    pub fn from_error_middleware(m: impl ErrorMiddleware) -> Self {
        Self::ErrorAware(Arc::new(m))
    }

    pub fn is_error_aware(&self) -> bool {
        matches!(self, Self::ErrorAware(_))
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normal(_) => "Handler::Normal",
            Self::ErrorAware(_) => "Handler::ErrorAware",
        })
    }
}
