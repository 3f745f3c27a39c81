//! Built-in middleware.
//!
//! [`App::new`](crate::App::new) registers both of these ahead of any
//! application route, in this order:
//!
//! | Middleware | Effect |
//! |---|---|
//! | [`query`] | parses the query string into a [`Query`] extension |
//! | [`powered_by`] | sets `x-powered-by` when the setting is enabled |
//!
//! Both always continue the chain.

mod powered_by;
mod query;

pub use powered_by::powered_by;
pub use query::{Query, query};
