//! Default end-of-chain handler.

use http::StatusCode;
use tracing::warn;

use crate::context::Context;
use crate::error::Error;

/// Renders whatever the chain left unanswered.
///
/// - response already sent → nothing to do
/// - error pending → `error.status()` with `"{code} {message}"`
/// - otherwise → `404` with `"404 Cannot {METHOD} {path}"`
pub fn not_found(err: Option<Error>, cx: &mut Context) {
    if cx.response().is_sent() {
        if let Some(err) = err {
            warn!(error = %err, "error raised after the response was sent");
        }
        return;
    }

    match err {
        Some(err) => {
            let status = err.status();
            warn!(status = status.as_u16(), error = %err, "unhandled error");
            cx.response_mut()
                .status(status)
                .text(format!("{} {err}", status.as_u16()));
        }
        None => {
            let message = format!(
                "404 Cannot {} {}",
                cx.request().method().to_ascii_uppercase(),
                cx.request().path(),
            );
            cx.response_mut().status(StatusCode::NOT_FOUND).text(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;

    #[test]
    fn unmatched_is_404() {
        let mut cx = Context::new(Request::new("get", "/nope?x=1"));
        not_found(None, &mut cx);
        assert_eq!(cx.response().status_code(), StatusCode::NOT_FOUND);
        assert_eq!(cx.response().body(), b"404 Cannot GET /nope");
    }

    #[test]
    fn pending_error_uses_its_status() {
        let mut cx = Context::new(Request::new("GET", "/"));
        not_found(Some(Error::fault("boom")), &mut cx);
        assert_eq!(cx.response().status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(cx.response().body(), b"500 boom");

        let mut cx = Context::new(Request::new("GET", "/"));
        not_found(Some(Error::http(StatusCode::FORBIDDEN, "members only")), &mut cx);
        assert_eq!(cx.response().status_code(), StatusCode::FORBIDDEN);
        assert_eq!(cx.response().body(), b"403 members only");
    }

    #[test]
    fn sent_response_is_left_alone() {
        let mut cx = Context::new(Request::new("GET", "/"));
        cx.response_mut().text("done");
        not_found(Some(Error::fault("late")), &mut cx);
        assert_eq!(cx.response().status_code(), StatusCode::OK);
        assert_eq!(cx.response().body(), b"done");
    }
}
