use std::str::FromStr;

use serde::de::DeserializeOwned;
use url::form_urlencoded;

use crate::context::Context;
use crate::handler::{BoxFuture, Flow, Handler, Middleware, Outcome};

/// Decoded query-string pairs, in the order they appeared.
#[derive(Clone, Debug, Default)]
pub struct Query(Vec<(String, String)>);

impl Query {
    pub fn parse(query: &str) -> Self {
        Self(form_urlencoded::parse(query.as_bytes()).into_owned().collect())
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// First value for `key` parsed with [`FromStr`]; `None` when absent or
    /// unparsable.
    ///
    /// ```rust
    /// use wisp::middleware::Query;
    ///
    /// let q = Query::parse("page=3&debug=true&name=x");
    /// assert_eq!(q.get_as::<u32>("page"), Some(3));
    /// assert_eq!(q.get_as::<bool>("debug"), Some(true));
    /// assert_eq!(q.get_as::<u32>("name"), None);
    /// ```
    pub fn get_as<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get(key)?.parse().ok()
    }

    /// First value for `key` decoded as JSON, so `?ids=[1,2]` or
    /// `?filter={"a":1}` come back structured.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        serde_json::from_str(self.get(key)?).ok()
    }

    /// Every value for `key`, e.g. `?tag=a&tag=b`.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0.iter().filter(move |(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn len(&self) -> usize { self.0.len() }
}

/// Parses the request's query string into a [`Query`] extension.
///
/// Requests without a query string get an empty `Query`, so handlers can
/// always look it up.
pub fn query() -> Handler {
    Handler::from_middleware(ParseQuery)
}

struct ParseQuery;

impl Middleware for ParseQuery {
    fn call<'a>(&'a self, cx: &'a mut Context) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            let query = cx.request().query_string().map(Query::parse).unwrap_or_default();
            cx.extensions_mut().insert(query);
            Ok(Flow::Next)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;
    use crate::router::Router;

    #[test]
    fn decodes_pairs() {
        let q = Query::parse("name=J%C3%BCrgen&tag=a&tag=b&empty=&plus=a+b");
        assert_eq!(q.get("name"), Some("Jürgen"));
        assert_eq!(q.get("tag"), Some("a"));
        assert_eq!(q.get_all("tag").collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(q.get("empty"), Some(""));
        assert_eq!(q.get("plus"), Some("a b"));
        assert_eq!(q.get("missing"), None);
    }

    #[test]
    fn typed_values() {
        let q = Query::parse("n=5&ratio=0.5&ids=%5B1%2C2%5D&flag=yes");
        assert_eq!(q.get_as::<i64>("n"), Some(5));
        assert_eq!(q.get_as::<f64>("ratio"), Some(0.5));
        assert_eq!(q.get_as::<bool>("flag"), None);
        assert_eq!(q.get_json::<Vec<u32>>("ids"), Some(vec![1, 2]));
        assert_eq!(q.get_json::<Vec<u32>>("flag"), None);
        assert_eq!(q.get_as::<i64>("missing"), None);
    }

    #[tokio::test]
    async fn inserts_extension() {
        let router = Router::new().middleware(query());
        let cx = Context::new(Request::new("GET", "/search?q=rust"));
        let cx = router.handle(cx, |_, _| {}).await;
        let q = cx.extensions().get::<Query>().unwrap();
        assert_eq!(q.get("q"), Some("rust"));

        let cx = router.handle(Context::new(Request::new("GET", "/plain")), |_, _| {}).await;
        assert!(cx.extensions().get::<Query>().unwrap().is_empty());
    }
}
