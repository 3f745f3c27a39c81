//! Per-request state owned by one dispatch loop.

use http::Extensions;

use crate::pattern::Params;
use crate::request::Request;
use crate::response::Response;

/// Everything a handler may read or change for the current request.
///
/// One `Context` exists per request. It is moved into
/// [`Router::handle`](crate::Router::handle), lent to each handler in turn,
/// and handed back when the chain ends. Nothing in it is shared with other
/// requests.
///
/// Typed per-request data (parsed query, settings, application locals) goes
/// in [`extensions`](Context::extensions_mut), keyed by type.
#[derive(Debug, Default)]
pub struct Context {
    request: Request,
    response: Response,
    pub(crate) params: Params,
    extensions: Extensions,
}

impl Context {
    pub fn new(request: Request) -> Self {
        Self { request, ..Self::default() }
    }

    pub fn request(&self) -> &Request { &self.request }
    pub fn request_mut(&mut self) -> &mut Request { &mut self.request }
    pub fn response(&self) -> &Response { &self.response }
    pub fn response_mut(&mut self) -> &mut Response { &mut self.response }

    /// Returns a named path parameter captured by the current route.
    ///
    /// For a route `/users/:id`, `cx.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &Params { &self.params }

    pub fn extensions(&self) -> &Extensions { &self.extensions }
    pub fn extensions_mut(&mut self) -> &mut Extensions { &mut self.extensions }

    pub fn into_response(self) -> Response { self.response }

    pub fn into_parts(self) -> (Request, Response) {
        (self.request, self.response)
    }
}
