use opsdesk_domain::{BackendConfig, OpsDeskError};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::InfraError;

const USER_AGENT: &str = concat!("opsdesk/", env!("CARGO_PKG_VERSION"));

/// Gateway client for the hosted backend.
///
/// Every request carries the `apikey` and bearer headers and is sent once.
/// Ledger calls are never retried; a failed call surfaces to the caller.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    pub fn for_backend(config: &BackendConfig) -> Result<Self, OpsDeskError> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", secret_header(&config.api_key, "api key")?);
        headers.insert(
            AUTHORIZATION,
            secret_header(&format!("Bearer {}", config.bearer_token()), "bearer token")?,
        );

        let client = ReqwestClient::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .no_proxy()
            .build()
            .map_err(|err| OpsDeskError::from(InfraError::from(err)))?;

        Ok(Self { client })
    }

    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Send one request. Any HTTP status comes back as a response; only
    /// transport failures and malformed requests become errors.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, OpsDeskError> {
        let request = builder.build().map_err(|err| OpsDeskError::from(InfraError::from(err)))?;
        let method = request.method().clone();
        let url = request.url().clone();

        match self.client.execute(request).await {
            Ok(response) => {
                debug!(%method, %url, status = %response.status(), "backend responded");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, %url, error = %err, "backend request failed");
                Err(InfraError::from(err).into())
            }
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient").finish_non_exhaustive()
    }
}

/// Header value for a credential, hidden from `Debug` output.
fn secret_header(value: &str, what: &str) -> Result<HeaderValue, OpsDeskError> {
    let mut header = HeaderValue::from_str(value)
        .map_err(|_| OpsDeskError::Config(format!("backend {what} is not a valid header value")))?;
    header.set_sensitive(true);
    Ok(header)
}
