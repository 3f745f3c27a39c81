//! # wisp
//!
//! A minimalist HTTP toolkit built around one idea: an ordered chain of
//! handlers that every request walks from the top.
//!
//! ## The chain
//!
//! - Routes are tried in **registration order**. Each one binds a path
//!   pattern (`*`, `/users`, `/users/:id`, or a precompiled `Regex`) and
//!   optionally a method to a [`Handler`].
//! - A handler either passes control on (`Ok(Flow::Next)`), raises an error
//!   (`Err(e)`, or a panic), or ends the chain (`Ok(Flow::Halt)`).
//! - While an error is pending, normal handlers are skipped and the next
//!   [`Handler::ErrorAware`] route receives it.
//! - When the routes run out, the fallback renders what is left: a `404`,
//!   or the pending error.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::StatusCode;
//! use wisp::{App, Error, Flow, Handler};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     App::new()
//!         .mount("/admin", Handler::normal(|cx| Box::pin(async move {
//!             if cx.request().header("authorization").is_none() {
//!                 return Err(Error::http(StatusCode::UNAUTHORIZED, "login first"));
//!             }
//!             Ok(Flow::Next)
//!         })))?
//!         .get("/users/:id", Handler::normal(|cx| Box::pin(async move {
//!             let id = cx.param("id").unwrap_or_default().to_owned();
//!             cx.response_mut().json_data(&serde_json::json!({ "id": id }));
//!             Ok(Flow::Halt)
//!         })))?
//!         .middleware(Handler::error(|err, cx| Box::pin(async move {
//!             cx.response_mut().json_error(&err);
//!             Ok(Flow::Halt)
//!         })))
//!         .listen()
//!         .await
//! }
//! ```

mod app;
mod context;
mod error;
mod handler;
mod method;
mod pattern;
mod request;
mod response;
mod route;
mod router;
mod server;
mod settings;

pub mod fallback;
pub mod middleware;

pub use app::App;
pub use context::Context;
pub use error::{BoxError, Error};
pub use handler::{BoxFuture, ErrorMiddleware, Flow, Handler, Middleware, Outcome};
pub use method::Method;
pub use pattern::{IntoPattern, Params, Pattern};
pub use request::Request;
pub use response::{ContentType, Response};
pub use route::{Route, RouteBuilder};
pub use router::Router;
pub use server::Server;
pub use settings::Settings;
