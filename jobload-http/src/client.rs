//! HTTP client implementation

use crate::config::HttpConfig;
use crate::errors::HttpError;
use crate::types::{HttpRequest, HttpResponse};
use reqwest::{header::CONTENT_TYPE, Client};
use std::time::Instant;
use tracing::{debug, trace};

/// HTTP client trait the engine issues every target request through
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// `reqwest`-backed client bound to one target base URL
#[derive(Debug, Clone)]
pub struct HttpManager {
    client: Client,
    base_url: String,
    config: HttpConfig,
}

impl HttpManager {
    /// Build a client with the given configuration
    pub fn with_config(config: HttpConfig) -> Result<Self, HttpError> {
        debug!(
            "Creating HttpManager for {} with timeout: {:?}",
            config.base_url, config.timeout
        );
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()?;

        let parsed =
            reqwest::Url::parse(&config.base_url).map_err(|e| HttpError::InvalidUrl(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(HttpError::InvalidUrl(config.base_url.clone()));
        }

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            config,
        })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Join a request path onto the base URL
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait::async_trait]
impl HttpClient for HttpManager {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let url = self.url_for(&request.path);
        let started = Instant::now();
        trace!("{} {}", request.method, url);

        let mut builder = self.client.request(request.method.into(), &url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout(self.config.timeout)
            } else {
                HttpError::NetworkError(e)
            }
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        debug!(
            "{} {} -> {} in {}ms",
            request.method,
            request.path,
            status,
            started.elapsed().as_millis()
        );

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}
