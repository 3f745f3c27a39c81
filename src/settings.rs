//! Application settings.
//!
//! A small typed core (`env`, `port`) plus two open tables: boolean flags
//! (`enable` / `disable`) and free-form string values (`set` / `get`).
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `WISP_ENV` | `development` | deployment environment name |
//! | `WISP_PORT` | `1337` | port [`App::listen`](crate::App::listen) binds |
//!
//! The `x-powered-by` flag starts enabled.

use std::collections::HashMap;

use tracing::warn;

pub const DEFAULT_PORT: u16 = 1337;
pub const POWERED_BY: &str = "x-powered-by";

#[derive(Clone, Debug)]
pub struct Settings {
    env: String,
    port: u16,
    flags: HashMap<String, bool>,
    values: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            env: "development".to_owned(),
            port: DEFAULT_PORT,
            flags: HashMap::from([(POWERED_BY.to_owned(), true)]),
            values: HashMap::new(),
        }
    }
}

impl Settings {
    /// Defaults overridden by `WISP_ENV` / `WISP_PORT`. An unparsable port is
    /// ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        if let Some(env) = var("WISP_ENV") {
            settings.env = env;
        }
        if let Some(port) = var("WISP_PORT") {
            match port.parse() {
                Ok(port) => settings.port = port,
                Err(e) => warn!(value = %port, "ignoring WISP_PORT: {e}"),
            }
        }
        settings
    }

    pub fn env(&self) -> &str { &self.env }
    pub fn port(&self) -> u16 { self.port }

    pub fn is_production(&self) -> bool {
        self.env == "production"
    }

    pub fn set_env(&mut self, env: impl Into<String>) -> &mut Self {
        self.env = env.into();
        self
    }

    pub fn set_port(&mut self, port: u16) -> &mut Self {
        self.port = port;
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn enable(&mut self, name: impl Into<String>) -> &mut Self {
        self.flags.insert(name.into(), true);
        self
    }

    pub fn disable(&mut self, name: impl Into<String>) -> &mut Self {
        self.flags.insert(name.into(), false);
        self
    }

    /// Unknown flags are disabled.
    pub fn enabled(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn disabled(&self, name: &str) -> bool {
        !self.enabled(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.env(), "development");
        assert_eq!(s.port(), DEFAULT_PORT);
        assert!(s.enabled(POWERED_BY));
        assert!(s.disabled("view cache"));
    }

    #[test]
    fn flags_and_values() {
        let mut s = Settings::default();
        s.disable(POWERED_BY).enable("trust proxy").set("title", "wisp");
        assert!(s.disabled(POWERED_BY));
        assert!(s.enabled("trust proxy"));
        assert_eq!(s.get("title"), Some("wisp"));
        assert_eq!(s.get("missing"), None);
    }

    #[test]
    fn reads_environment_variables() {
        let s = Settings::from_vars(|key| match key {
            "WISP_ENV" => Some("production".to_owned()),
            "WISP_PORT" => Some("8080".to_owned()),
            _ => None,
        });
        assert!(s.is_production());
        assert_eq!(s.port(), 8080);

        let s = Settings::from_vars(|key| (key == "WISP_PORT").then(|| "http".to_owned()));
        assert_eq!(s.port(), DEFAULT_PORT);
    }
}
