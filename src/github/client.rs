// Gist API HTTP client.
// Wraps a transport with endpoint resolution, credential resolution, and status checking.

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;

use crate::config::{Credentials, GistConfig};
use crate::error::{GistError, Result};

use super::transport::{ApiRequest, ApiResponse, HttpTransport, Transport};

/// Cheaply cloneable handle shared by every gist and collection wrapper.
#[derive(Clone)]
pub struct GistClient {
    transport: Arc<dyn Transport>,
    config: Arc<GistConfig>,
}

impl std::fmt::Debug for GistClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GistClient")
            .field("api_base", &self.config.api_base)
            .field("web_base", &self.config.web_base)
            .finish_non_exhaustive()
    }
}

impl GistClient {
    /// Create a client over the reqwest transport.
    pub fn new(config: GistConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    /// Create a client from `GIST_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(GistConfig::from_env())
    }

    /// Create a client over any transport.
    pub fn with_transport(transport: Arc<dyn Transport>, config: GistConfig) -> Self {
        Self {
            transport,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &GistConfig {
        &self.config
    }

    /// Absolute URL for an API path such as `/gists/abc`.
    pub fn api_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.api_base, endpoint)
    }

    /// Resolve credentials against the process default.
    pub fn resolve_credentials(
        &self,
        per_call: Option<&Credentials>,
        per_wrapper: Option<&Credentials>,
    ) -> Option<Credentials> {
        Credentials::resolve(per_call, per_wrapper, &self.config.default_credentials)
    }

    /// Send a request without interpreting the status.
    pub async fn send(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
        credentials: Option<Credentials>,
    ) -> Result<ApiResponse> {
        let mut request = ApiRequest::new(method, self.api_url(endpoint)).credentials(credentials);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.transport.send(request).await
    }

    /// Make a GET request to an API path, failing on non-2xx.
    pub async fn get(&self, endpoint: &str, credentials: Option<Credentials>) -> Result<ApiResponse> {
        self.get_url(&self.api_url(endpoint), credentials).await
    }

    /// Make a GET request to an absolute URL, failing on non-2xx.
    pub async fn get_url(&self, url: &str, credentials: Option<Credentials>) -> Result<ApiResponse> {
        let request = ApiRequest::new(Method::GET, url).credentials(credentials);
        let response = self.transport.send(request).await?;
        check_response(url, response)
    }
}

/// Check response status and convert errors.
fn check_response(url: &str, response: ApiResponse) -> Result<ApiResponse> {
    if response.is_success() {
        return Ok(response);
    }
    match response.status {
        401 => Err(GistError::Unauthorized),
        404 => Err(GistError::NotFound(url.to_string())),
        status => Err(GistError::Http {
            status,
            message: response.body,
        }),
    }
}
