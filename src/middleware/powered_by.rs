use std::sync::Arc;

use crate::context::Context;
use crate::handler::{BoxFuture, Flow, Handler, Middleware, Outcome};
use crate::settings::{POWERED_BY, Settings};

const PRODUCT: &str = "wisp";

/// Advertises the framework in an `x-powered-by` header.
///
/// Reads the [`Settings`] the app stores in the request extensions; without
/// settings the header is left off.
pub fn powered_by() -> Handler {
    Handler::from_middleware(PoweredBy)
}

struct PoweredBy;

impl Middleware for PoweredBy {
    fn call<'a>(&'a self, cx: &'a mut Context) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            let enabled = cx.extensions()
                .get::<Arc<Settings>>()
                .is_some_and(|s| s.enabled(POWERED_BY));
            if enabled {
                cx.response_mut().header(POWERED_BY, PRODUCT);
            }
            Ok(Flow::Next)
        })
    }
}
