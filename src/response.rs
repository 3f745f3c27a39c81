//! Outgoing HTTP response.
//!
//! A [`Response`] lives inside the request [`Context`](crate::Context) for the
//! whole trip down the chain. Handlers adjust the status and headers, then
//! finalize it with exactly one terminal write (`send`, `text`, `json`,
//! `json_data`, `json_error`, `html`, `bytes` or `empty`). Once finalized,
//! the router stops advancing and later writes are dropped.

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use serde::Serialize;
use tracing::warn;

use crate::error::Error;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with [`Response::bytes`].
#[derive(Clone, Copy, Debug)]
pub enum ContentType {
    Css,          // text/css
    Csv,          // text/csv
    Gif,          // image/gif
    Html,         // text/html; charset=utf-8
    Javascript,   // text/javascript
    Jpeg,         // image/jpeg
    Json,         // application/json
    OctetStream,  // application/octet-stream
    Pdf,          // application/pdf
    Png,          // image/png
    Svg,          // image/svg+xml
    Text,         // text/plain; charset=utf-8
    Xml,          // application/xml
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Css         => "text/css",
            Self::Csv         => "text/csv",
            Self::Gif         => "image/gif",
            Self::Html        => "text/html; charset=utf-8",
            Self::Javascript  => "text/javascript",
            Self::Jpeg        => "image/jpeg",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Pdf         => "application/pdf",
            Self::Png         => "image/png",
            Self::Svg         => "image/svg+xml",
            Self::Text        => "text/plain; charset=utf-8",
            Self::Xml         => "application/xml",
        }
    }

    /// Looks up a short name or file extension (`"json"`, `".png"`, `"HTML"`).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        Some(match ext.as_str() {
            "css"                => Self::Css,
            "csv"                => Self::Csv,
            "gif"                => Self::Gif,
            "htm" | "html"       => Self::Html,
            "js" | "mjs"         => Self::Javascript,
            "jpg" | "jpeg"       => Self::Jpeg,
            "json"               => Self::Json,
            "bin"                => Self::OctetStream,
            "pdf"                => Self::Pdf,
            "png"                => Self::Png,
            "svg"                => Self::Svg,
            "txt" | "text"       => Self::Text,
            "xml"                => Self::Xml,
            _ => return None,
        })
    }
}

// ── JSON envelope ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Success<'a, T: ?Sized> {
    status: &'static str,
    code: u16,
    data: &'a T,
}

#[derive(Serialize)]
struct Failure<'a> {
    status: &'static str,
    code: u16,
    meta: Meta<'a>,
}

#[derive(Serialize)]
struct Meta<'a> {
    message: &'a str,
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response under construction.
///
/// ```rust
/// use http::StatusCode;
/// use wisp::Response;
///
/// let mut res = Response::new();
/// res.status(StatusCode::CREATED)
///    .header("location", "/users/42")
///    .json(br#"{"id":42}"#.to_vec());
/// assert!(res.is_sent());
/// ```
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Bytes,
    sent: bool,
}

impl Default for Response {
    fn default() -> Self { Self::new() }
}

impl Response {
    /// An unsent `200 OK` with no headers.
    pub fn new() -> Self {
        Self { status: StatusCode::OK, headers: Vec::new(), body: Bytes::new(), sent: false }
    }

    pub fn status(&mut self, code: StatusCode) -> &mut Self {
        if self.guard("status") {
            self.status = code;
        }
        self
    }

    /// Sets a header, replacing any existing value with the same name.
    pub fn header(&mut self, name: &str, value: &str) -> &mut Self {
        if self.guard("header") {
            self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
            self.headers.push((name.to_owned(), value.to_owned()));
        }
        self
    }

    /// Finalizes with `body`, keeping whatever content type was set.
    pub fn send(&mut self, body: impl Into<Bytes>) {
        if self.guard("send") {
            self.body = body.into();
            self.sent = true;
        }
    }

    /// Finalizes with no body (e.g. `204 No Content`, redirects).
    pub fn empty(&mut self) {
        self.send(Bytes::new());
    }

    /// Finalizes with a plain-text body.
    pub fn text(&mut self, body: impl Into<String>) {
        self.bytes(ContentType::Text, body.into());
    }

    /// Finalizes with an HTML body.
    pub fn html(&mut self, body: impl Into<String>) {
        self.bytes(ContentType::Html, body.into());
    }

    /// Finalizes with a JSON body. Pass bytes straight from your serializer.
    pub fn json(&mut self, body: Vec<u8>) {
        self.bytes(ContentType::Json, body);
    }

    /// Finalizes with `data` wrapped in the success envelope:
    /// `{"status":"success","code":200,"data":...}`, where `code` is the
    /// current status.
    ///
    /// A value that fails to serialize is answered with [`json_error`](Response::json_error).
    ///
    /// ```rust
    /// use wisp::Response;
    ///
    /// let mut res = Response::new();
    /// res.json_data(&["a", "b"]);
    /// assert_eq!(res.body(), br#"{"status":"success","code":200,"data":["a","b"]}"#);
    /// ```
    pub fn json_data<T: Serialize + ?Sized>(&mut self, data: &T) {
        let envelope = Success { status: "success", code: self.status.as_u16(), data };
        match serde_json::to_vec(&envelope) {
            Ok(body) => self.json(body),
            Err(e) => {
                warn!(error = %e, "failed to serialize response data");
                self.json_error(&Error::other(e));
            }
        }
    }

    /// Sets the error's status and finalizes with the error envelope:
    /// `{"status":"error","code":404,"meta":{"message":"..."}}`.
    pub fn json_error(&mut self, err: &Error) {
        let message = err.to_string();
        let envelope = Failure {
            status: "error",
            code: err.status().as_u16(),
            meta: Meta { message: &message },
        };
        match serde_json::to_vec(&envelope) {
            Ok(body) => {
                self.status(err.status());
                self.json(body);
            }
            Err(e) => {
                warn!(error = %e, "failed to serialize error envelope");
                self.status(StatusCode::INTERNAL_SERVER_ERROR).text("500 Internal Server Error");
            }
        }
    }

    /// Sets the content type from a full MIME type (anything with a `/`) or a
    /// short name looked up with [`ContentType::from_extension`]. Unknown
    /// names fall back to plain text.
    pub fn content_type(&mut self, kind: &str) -> &mut Self {
        if kind.contains('/') {
            return self.header("content-type", kind);
        }
        let resolved = ContentType::from_extension(kind).unwrap_or(ContentType::Text);
        self.header("content-type", resolved.as_str())
    }

    /// Finalizes with a typed body.
    pub fn bytes(&mut self, content_type: ContentType, body: impl Into<Bytes>) {
        if self.guard("body") {
            self.header("content-type", content_type.as_str());
            self.send(body);
        }
    }

    /// True once a terminal write happened.
    pub fn is_sent(&self) -> bool { self.sent }

    pub fn status_code(&self) -> StatusCode { self.status }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Converts into the hyper representation. Headers that are not valid
    /// HTTP are dropped with a warning.
    pub fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut out = http::Response::new(Full::new(self.body));
        *out.status_mut() = self.status;
        let headers = out.headers_mut();
        for (name, value) in self.headers {
            match (
                http::HeaderName::from_bytes(name.as_bytes()),
                http::HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => warn!(header = %name, "dropping invalid response header"),
            }
        }
        out
    }

    fn guard(&self, op: &'static str) -> bool {
        if self.sent {
            warn!(op, "response already sent; write ignored");
        }
        !self.sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_write_finalizes_once() {
        let mut res = Response::new();
        assert!(!res.is_sent());
        res.status(StatusCode::ACCEPTED).text("first");
        assert!(res.is_sent());

        res.status(StatusCode::IM_A_TEAPOT).text("second");
        assert_eq!(res.status_code(), StatusCode::ACCEPTED);
        assert_eq!(res.body(), b"first");
        assert_eq!(res.get_header("Content-Type"), Some("text/plain; charset=utf-8"));
    }

    #[test]
    fn header_replaces_same_name() {
        let mut res = Response::new();
        res.header("X-Trace", "a").header("x-trace", "b");
        assert_eq!(res.headers().len(), 1);
        assert_eq!(res.get_header("x-trace"), Some("b"));
    }

    #[test]
    fn converts_to_http() {
        let mut res = Response::new();
        res.status(StatusCode::NOT_FOUND).header("bad header", "x").html("<p>gone</p>");
        let http = res.into_http();
        assert_eq!(http.status(), StatusCode::NOT_FOUND);
        assert_eq!(http.headers()["content-type"], "text/html; charset=utf-8");
        assert_eq!(http.headers().len(), 1);
    }

    #[test]
    fn json_data_wraps_in_success_envelope() {
        let mut res = Response::new();
        res.json_data(&serde_json::json!({ "id": 7, "name": "say \"hi\"" }));
        assert_eq!(res.get_header("content-type"), Some("application/json"));

        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["code"], 200);
        assert_eq!(body["data"]["id"], 7);
        assert_eq!(body["data"]["name"], "say \"hi\"");
    }

    #[test]
    fn json_error_sets_status_and_meta() {
        let mut res = Response::new();
        res.json_error(&Error::http(StatusCode::NOT_FOUND, "no \"user\" here"));
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);

        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(body["code"], 404);
        assert_eq!(body["meta"]["message"], "no \"user\" here");
        assert!(body.get("data").is_none());
    }

    #[test]
    fn unserializable_data_becomes_an_error_envelope() {
        use std::collections::HashMap;

        // JSON object keys must be strings.
        let data: HashMap<(u8, u8), u8> = HashMap::from([((1, 2), 3)]);
        let mut res = Response::new();
        res.json_data(&data);
        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["status"], "error");
    }

    #[test]
    fn content_type_accepts_short_names() {
        let mut res = Response::new();
        assert_eq!(res.content_type("png").get_header("content-type"), Some("image/png"));
        assert_eq!(res.content_type(".HTML").get_header("content-type"), Some("text/html; charset=utf-8"));
        assert_eq!(res.content_type("text/event-stream").get_header("content-type"), Some("text/event-stream"));
        assert_eq!(res.content_type("nonsense").get_header("content-type"), Some("text/plain; charset=utf-8"));

        res.send("raw");
        assert_eq!(res.get_header("content-type"), Some("text/plain; charset=utf-8"));
    }
}
