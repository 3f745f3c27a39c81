//! HTTP method as a typed enum.
//!
//! Routes bind to one [`Method`] or to any method. Incoming method strings are
//! compared case-insensitively, so a route bound to `Method::Get` accepts
//! `GET`, `get` and `Get` alike.

use std::fmt;
use std::str::FromStr;

/// An RFC 9110 request method.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    Connect,
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
    Trace,
}

impl Method {
    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Delete  => "DELETE",
            Self::Get     => "GET",
            Self::Head    => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch   => "PATCH",
            Self::Post    => "POST",
            Self::Put     => "PUT",
            Self::Trace   => "TRACE",
        }
    }

    /// Case-insensitive comparison against a raw request method.
    pub fn matches(self, method: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(method)
    }
}

/// Parses a method name in any letter case.
impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::Connect,
            Self::Delete,
            Self::Get,
            Self::Head,
            Self::Options,
            Self::Patch,
            Self::Post,
            Self::Put,
            Self::Trace,
        ]
        .into_iter()
        .find(|m| m.matches(s))
        .ok_or(())
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_ignores_case() {
        assert!(Method::Get.matches("GET"));
        assert!(Method::Get.matches("get"));
        assert!(!Method::Get.matches("POST"));
    }

    #[test]
    fn parses_any_case() {
        assert_eq!("delete".parse::<Method>(), Ok(Method::Delete));
        assert_eq!("PUT".parse::<Method>(), Ok(Method::Put));
        assert!("BREW".parse::<Method>().is_err());
    }
}
