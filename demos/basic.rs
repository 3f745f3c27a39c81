//! Minimal wisp example: a middleware chain with an auth gate, CRUD-style
//! routes and an error handler.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:1337/users/42
//!   curl -i -X POST http://localhost:1337/users -d '{"name":"alice"}'
//!   curl -i -X DELETE http://localhost:1337/users/42
//!   curl -i http://localhost:1337/admin/stats
//!   curl -i -H 'authorization: yes' http://localhost:1337/admin/stats
//!   curl -i http://localhost:1337/nowhere

use http::StatusCode;
use serde_json::json;
use wisp::middleware::Query;
use wisp::{App, Error, Flow, Handler};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    App::new()
        .mount("/admin", require_auth())?
        .get("/users/:id", get_user())?
        .post("/users", create_user())?
        .delete("/users/:id", delete_user())?
        .get("/admin/stats", stats())?
        .middleware(report_errors())
        .listen()
        .await
}

// /admin/* → 401 unless an authorization header is present
fn require_auth() -> Handler {
    Handler::normal(|cx| Box::pin(async move {
        if cx.request().header("authorization").is_none() {
            return Err(Error::http(StatusCode::UNAUTHORIZED, "login first"));
        }
        Ok(Flow::Next)
    }))
}

// GET /users/:id?fields=name
fn get_user() -> Handler {
    Handler::normal(|cx| Box::pin(async move {
        let id = cx.param("id").unwrap_or("unknown").to_owned();
        let verbose = cx.extensions().get::<Query>().and_then(|q| q.get("fields")).is_some();
        let body = if verbose {
            json!({ "id": id, "name": "alice" })
        } else {
            json!({ "id": id })
        };
        cx.response_mut().json_data(&body);
        Ok(Flow::Halt)
    }))
}

// POST /users
fn create_user() -> Handler {
    Handler::normal(|cx| Box::pin(async move {
        if cx.request().body().is_empty() {
            return Err(Error::http(StatusCode::BAD_REQUEST, "empty body"));
        }
        cx.response_mut()
            .status(StatusCode::CREATED)
            .header("location", "/users/99")
            .json_data(&json!({ "id": "99" }));
        Ok(Flow::Halt)
    }))
}

// DELETE /users/:id → 204 No Content
fn delete_user() -> Handler {
    Handler::normal(|cx| Box::pin(async move {
        cx.response_mut().status(StatusCode::NO_CONTENT).empty();
        Ok(Flow::Halt)
    }))
}

fn stats() -> Handler {
    Handler::normal(|cx| Box::pin(async move {
        cx.response_mut().text("uptime: forever");
        Ok(Flow::Halt)
    }))
}

// Anything raised above lands here as JSON.
fn report_errors() -> Handler {
    Handler::error(|err, cx| Box::pin(async move {
        cx.response_mut().json_error(&err);
        Ok(Flow::Halt)
    }))
}
