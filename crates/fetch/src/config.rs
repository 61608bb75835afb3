//! Request defaults and where they come from.
//!
//! [`Request::init`](crate::Request::init) starts from the process-wide
//! template returned by [`Config::global`]. The template is replaced with
//! [`Request::ini`](crate::Request::ini) and restored with
//! [`Request::reset_ini`](crate::Request::reset_ini).
//!
//! The only default read from the environment is the proxy: `http_proxy`, then
//! `HTTP_PROXY`. An empty variable counts as unset.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use http::Method;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::request::SerializePolicy;

/// Environment variables consulted for a default proxy, in order.
pub const PROXY_VARS: [&str; 2] = ["http_proxy", "HTTP_PROXY"];

/// Reads default configuration values by name.
pub trait ConfigSource {
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl<S: std::hash::BuildHasher> ConfigSource for HashMap<String, String, S> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// The proxy configured in `source`, if any.
pub fn env_proxy<C: ConfigSource + ?Sized>(source: &C) -> Option<String> {
    PROXY_VARS.iter().find_map(|name| source.var(name).filter(|value| !value.is_empty()))
}

/// Defaults copied into every new request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub method: Method,
    pub strict_tls: bool,
    /// Canonical send type.
    pub send_type: Option<String>,
    /// Canonical expect type.
    pub expect_type: Option<String>,
    pub auto_parse: bool,
    pub serialize_policy: SerializePolicy,
    pub user_agent: Option<String>,
    pub timeout: Option<Duration>,
    pub proxy: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            method: Method::GET,
            strict_tls: false,
            send_type: None,
            expect_type: None,
            auto_parse: true,
            serialize_policy: SerializePolicy::Smart,
            user_agent: None,
            timeout: None,
            proxy: None,
        }
    }
}

static TEMPLATE: Lazy<ArcSwap<Config>> = Lazy::new(|| ArcSwap::from_pointee(Config::default()));

impl Config {
    /// Built-in defaults plus the environment proxy.
    pub fn from_env() -> Self {
        Self::from_source(&EnvSource)
    }

    pub fn from_source<C: ConfigSource + ?Sized>(source: &C) -> Self {
        Self { proxy: env_proxy(source), ..Self::default() }
    }

    /// The current process-wide template.
    pub fn global() -> Arc<Config> {
        TEMPLATE.load_full()
    }

    pub(crate) fn set_global(config: Config) {
        debug!(method = %config.method, strict_tls = config.strict_tls, "replacing request template");
        TEMPLATE.store(Arc::new(config));
    }

    pub(crate) fn reset_global() {
        Self::set_global(Config::default());
    }
}
