//! Incoming HTTP request type.

use bytes::Bytes;
use http_body_util::BodyExt;

use crate::error::Error;

/// An incoming HTTP request.
///
/// The method is kept as the raw wire string: routes compare against it
/// case-insensitively and unknown methods simply match no method-bound route.
#[derive(Debug, Default)]
pub struct Request {
    pub(crate) method: String,
    pub(crate) url: Option<String>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Bytes,
}

impl Request {
    /// Builds a request by hand; handy in tests and for in-process dispatch.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self { method: method.into(), url: Some(url.into()), ..Self::default() }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Collects a hyper request into an owned [`Request`].
    pub(crate) async fn from_http<B>(req: http::Request<B>) -> Result<Self, Error>
    where
        B: hyper::body::Body,
        B::Error: Into<crate::error::BoxError>,
    {
        let (parts, body) = req.into_parts();
        let body = body.collect().await.map_err(|e| Error::other(e))?.to_bytes();
        let headers = parts.headers.iter()
            .filter_map(|(k, v)| Some((k.as_str().to_owned(), v.to_str().ok()?.to_owned())))
            .collect();
        let url = parts.uri.path_and_query().map(|pq| pq.as_str().to_owned());
        Ok(Self { method: parts.method.as_str().to_owned(), url, headers, body })
    }

    pub fn method(&self) -> &str { &self.method }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// The raw request target, query string included.
    pub fn url(&self) -> Option<&str> { self.url.as_deref() }

    /// The path component routes are matched against. Defaults to `/`.
    pub fn path(&self) -> &str {
        match self.url.as_deref() {
            Some(url) => match url.split_once('?') {
                Some(("", _)) => "/",
                Some((path, _)) => path,
                None if url.is_empty() => "/",
                None => url,
            },
            None => "/",
        }
    }

    /// The query string without the leading `?`, if any.
    pub fn query_string(&self) -> Option<&str> {
        self.url.as_deref()?.split_once('?').map(|(_, q)| q)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_defaults_to_root() {
        assert_eq!(Request::default().path(), "/");
        assert_eq!(Request::new("GET", "").path(), "/");
        assert_eq!(Request::new("GET", "?a=1").path(), "/");
    }

    #[test]
    fn path_drops_query() {
        let req = Request::new("GET", "/search?q=rust&page=2");
        assert_eq!(req.path(), "/search");
        assert_eq!(req.query_string(), Some("q=rust&page=2"));
        assert_eq!(req.url(), Some("/search?q=rust&page=2"));
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = Request::new("GET", "/").with_header("Content-Type", "text/plain");
        assert_eq!(req.header("content-type"), Some("text/plain"));
        assert_eq!(req.header("accept"), None);
    }

    #[tokio::test]
    async fn collects_http_request() {
        let req = http::Request::builder()
            .method("POST")
            .uri("/users?debug=1")
            .header("x-id", "7")
            .body(http_body_util::Full::new(Bytes::from_static(b"alice")))
            .unwrap();
        let req = Request::from_http(req).await.unwrap();
        assert_eq!(req.method(), "POST");
        assert_eq!(req.path(), "/users");
        assert_eq!(req.header("X-Id"), Some("7"));
        assert_eq!(req.body(), b"alice");
    }
}
