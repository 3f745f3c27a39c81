//! Path patterns and their compiled matchers.
//!
//! | Registration | Matches |
//! |---|---|
//! | `*` | every path |
//! | `/users` | `/users` and `/users/` |
//! | `/users/:id` | `/users/42` and `/users/42/`, capturing `id = "42"`; not `/users` or `/users/42/x` |
//! | `Regex` | whatever the regex matches; named groups become params |
//!
//! String patterns are compiled once, at registration, into an anchored
//! regex. Literal text is escaped, so `.` or `+` in a path mean themselves.
//! A `:name` token captures one non-empty run of characters other than `/`.

use std::collections::HashMap;
use std::fmt;

use regex::Regex;

use crate::error::Error;

/// Named path parameters captured by a match, e.g. `id → "42"`.
pub type Params = HashMap<String, String>;

const WILDCARD: &str = "*";

/// A compiled route pattern.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    kind: Kind,
}

#[derive(Clone)]
enum Kind {
    Any,
    /// Compiled from a string. `literal` is true when the string had no tokens.
    Path { regex: Regex, literal: bool },
    /// Supplied precompiled by the caller; used as-is, unanchored.
    Regex(Regex),
}

impl Pattern {
    /// The match-everything pattern, `*`.
    pub fn any() -> Self {
        Self { source: WILDCARD.to_owned(), kind: Kind::Any }
    }

    /// Normalizes and compiles a string pattern.
    ///
    /// Trailing slashes are stripped (except on the root), so `/foo/` and
    /// `/foo` compile to the same pattern.
    pub fn parse(pattern: &str) -> Result<Self, Error> {
        if pattern == WILDCARD {
            return Ok(Self::any());
        }
        if pattern.is_empty() {
            return Err(Error::invalid(pattern, "pattern is empty"));
        }
        if !pattern.starts_with('/') {
            return Err(Error::invalid(pattern, "pattern must be `*` or start with `/`"));
        }

        let source = strip_trailing_slash(pattern);
        let (regex, literal) = compile(source)?;
        Ok(Self { source: source.to_owned(), kind: Kind::Path { regex, literal } })
    }

    /// The normalized registration string (or the regex source).
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_any(&self) -> bool {
        matches!(self.kind, Kind::Any)
    }

    /// True for string patterns without `:name` tokens.
    pub fn is_literal(&self) -> bool {
        matches!(self.kind, Kind::Path { literal: true, .. })
    }

    /// Full match of `path`, returning the captured params.
    pub fn captures(&self, path: &str) -> Option<Params> {
        let regex = match &self.kind {
            Kind::Any => return Some(Params::new()),
            Kind::Path { regex, .. } | Kind::Regex(regex) => regex,
        };
        let caps = regex.captures(path)?;
        Some(
            regex
                .capture_names()
                .flatten()
                .filter_map(|name| caps.name(name).map(|m| (name.to_owned(), m.as_str().to_owned())))
                .collect(),
        )
    }

    /// Mount-style prefix match on a segment boundary: `/api` covers `/api`
    /// and `/api/users` but not `/apikey`. Only literal patterns qualify.
    pub fn is_prefix_of(&self, path: &str) -> bool {
        if !self.is_literal() {
            return false;
        }
        let base = self.source.as_str();
        base == "/"
            || path
                .strip_prefix(base)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Self { source: regex.as_str().to_owned(), kind: Kind::Regex(regex) }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// ── IntoPattern ───────────────────────────────────────────────────────────────

/// Anything a route can be registered against: a string, a [`Regex`], or an
/// already built [`Pattern`].
pub trait IntoPattern {
    fn into_pattern(self) -> Result<Pattern, Error>;
}

impl IntoPattern for Pattern {
    fn into_pattern(self) -> Result<Pattern, Error> { Ok(self) }
}

impl IntoPattern for Regex {
    fn into_pattern(self) -> Result<Pattern, Error> { Ok(self.into()) }
}

impl IntoPattern for &str {
    fn into_pattern(self) -> Result<Pattern, Error> { Pattern::parse(self) }
}

impl IntoPattern for String {
    fn into_pattern(self) -> Result<Pattern, Error> { Pattern::parse(&self) }
}

impl IntoPattern for &String {
    fn into_pattern(self) -> Result<Pattern, Error> { Pattern::parse(self) }
}

// ── Compilation ───────────────────────────────────────────────────────────────

fn strip_trailing_slash(pattern: &str) -> &str {
    match pattern.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

fn compile(source: &str) -> Result<(Regex, bool), Error> {
    let mut expr = String::with_capacity(source.len() * 2 + 2);
    let mut literal = true;
    let mut rest = source;

    expr.push('^');
    while let Some(at) = rest.find(':') {
        expr.push_str(&regex::escape(&rest[..at]));

        let after = &rest[at + 1..];
        let len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        let name = &after[..len];
        if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(Error::invalid(source, format!("bad parameter name after `:` at byte {at}")));
        }

        expr.push_str("(?P<");
        expr.push_str(name);
        expr.push_str(">[^/]+)");
        literal = false;
        rest = &after[len..];
    }
    expr.push_str(&regex::escape(rest));
    // Requests may carry the trailing slash the registration dropped.
    if source != "/" {
        expr.push_str("/?");
    }
    expr.push('$');

    let regex = Regex::new(&expr).map_err(|e| Error::invalid(source, e.to_string()))?;
    Ok((regex, literal))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(s: &str) -> Pattern {
        Pattern::parse(s).unwrap()
    }

    #[test]
    fn trailing_slash_is_normalized() {
        assert_eq!(pattern("/foo/").as_str(), pattern("/foo").as_str());
        assert_eq!(pattern("/").as_str(), "/");
        assert_eq!(pattern("//").as_str(), "/");
    }

    #[test]
    fn one_trailing_slash_on_the_request_is_accepted() {
        let p = pattern("/foo/");
        assert!(p.captures("/foo").is_some());
        assert!(p.captures("/foo/").is_some());
        assert!(p.captures("/foo//").is_none());

        let params = pattern("/users/:id/").captures("/users/7/").unwrap();
        assert_eq!(params["id"], "7");

        let root = pattern("/");
        assert!(root.captures("/").is_some());
        assert!(root.captures("//").is_none());
    }

    #[test]
    fn tokens_capture_one_segment() {
        let p = pattern("/users/:id");
        let params = p.captures("/users/42").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("42"));
        assert!(p.captures("/users").is_none());
        assert!(p.captures("/users/42/extra").is_none());
        assert!(!p.is_literal());
    }

    #[test]
    fn several_tokens() {
        let p = pattern("/orgs/:org/repos/:repo_name");
        let params = p.captures("/orgs/rust/repos/regex").unwrap();
        assert_eq!(params["org"], "rust");
        assert_eq!(params["repo_name"], "regex");
    }

    #[test]
    fn literals_are_escaped() {
        let p = pattern("/files/a.txt");
        assert!(p.captures("/files/a.txt").is_some());
        assert!(p.captures("/files/abtxt").is_none());
        assert!(p.is_literal());
    }

    #[test]
    fn wildcard_matches_everything() {
        let p = pattern("*");
        assert!(p.is_any());
        assert!(p.captures("/").is_some());
        assert!(p.captures("/anything/at/all").is_some());
    }

    #[test]
    fn prefix_respects_segment_boundary() {
        let p = pattern("/api");
        assert!(p.is_prefix_of("/api"));
        assert!(p.is_prefix_of("/api/users"));
        assert!(!p.is_prefix_of("/apikey"));
        assert!(pattern("/").is_prefix_of("/anything"));
        assert!(!pattern("/api/:v").is_prefix_of("/api/1/users"));
    }

    #[test]
    fn precompiled_regex_keeps_named_groups() {
        let p = Pattern::from(Regex::new(r"^/v(?P<version>\d+)/").unwrap());
        let params = p.captures("/v2/items").unwrap();
        assert_eq!(params["version"], "2");
        assert!(p.captures("/items").is_none());
        assert!(!p.is_prefix_of("/v2/items"));
    }

    #[test]
    fn rejects_malformed_patterns() {
        for bad in ["", "users", "/users/:", "/users/:1st", "/a/:id/b/:id"] {
            assert!(
                matches!(Pattern::parse(bad), Err(Error::InvalidArgument { .. })),
                "`{bad}` should be rejected",
            );
        }
    }
}
