// Client configuration.
// Endpoint bases, user agent, and credential precedence (per-call > per-wrapper > process default).

use std::env;

const DEFAULT_API_BASE: &str = "https://api.github.com";
const DEFAULT_WEB_BASE: &str = "https://gist.github.com";
const DEFAULT_USER_AGENT: &str = "gistkit";

/// Username/token pair passed through to the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: Option<String>,
    pub token: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            token: Some(token.into()),
        }
    }

    /// Credentials carrying only a token (bearer auth).
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            username: None,
            token: Some(token.into()),
        }
    }

    /// A request is authenticated only when a token is set.
    pub fn is_present(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Pick the first present layer in precedence order.
    pub fn resolve(
        per_call: Option<&Credentials>,
        per_wrapper: Option<&Credentials>,
        process_default: &Credentials,
    ) -> Option<Credentials> {
        [per_call, per_wrapper, Some(process_default)]
            .into_iter()
            .flatten()
            .find(|c| c.is_present())
            .cloned()
    }
}

/// Endpoint and credential configuration shared by every client handle.
#[derive(Debug, Clone)]
pub struct GistConfig {
    /// REST API base, e.g. `https://api.github.com`.
    pub api_base: String,
    /// Web base used for derived html/embed/raw URLs.
    pub web_base: String,
    pub user_agent: String,
    /// Process-wide fallback credentials.
    pub default_credentials: Credentials,
}

impl Default for GistConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            web_base: DEFAULT_WEB_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_credentials: Credentials::default(),
        }
    }
}

impl GistConfig {
    /// Build a configuration from `GIST_*` environment variables.
    ///
    /// `GIST_TOKEN` falls back to `GITHUB_TOKEN`. Unset variables keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let token = env_var("GIST_TOKEN").or_else(|| env_var("GITHUB_TOKEN"));

        Self {
            api_base: env_var("GIST_API_BASE")
                .map(trim_base)
                .unwrap_or(defaults.api_base),
            web_base: env_var("GIST_WEB_BASE")
                .map(trim_base)
                .unwrap_or(defaults.web_base),
            user_agent: defaults.user_agent,
            default_credentials: Credentials {
                username: env_var("GIST_USERNAME"),
                token,
            },
        }
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = trim_base(base.into());
        self
    }

    pub fn with_web_base(mut self, base: impl Into<String>) -> Self {
        self.web_base = trim_base(base.into());
        self
    }

    pub fn with_default_credentials(mut self, credentials: Credentials) -> Self {
        self.default_credentials = credentials;
        self
    }
}

fn env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn trim_base(value: String) -> String {
    value.trim_end_matches('/').to_string()
}
