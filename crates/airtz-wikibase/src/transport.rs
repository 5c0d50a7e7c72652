//! Write-API transport.
//!
//! The writer talks to the API through [`ApiTransport`] so the token/claim
//! protocol can be exercised without a network. [`HttpTransport`] is the
//! reqwest implementation used by the binary.

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;

use crate::WikibaseError;

/// Form/query parameters of one API call, in send order.
pub type ApiParams = Vec<(&'static str, String)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait ApiTransport {
    /// Authenticated GET with `params` in the query string.
    fn get(&self, params: &ApiParams, bearer: &str) -> Result<ApiResponse, WikibaseError>;

    /// Authenticated POST with `params` form-encoded in the body.
    fn post_form(&self, params: &ApiParams, bearer: &str) -> Result<ApiResponse, WikibaseError>;
}

impl<T: ApiTransport + ?Sized> ApiTransport for &T {
    fn get(&self, params: &ApiParams, bearer: &str) -> Result<ApiResponse, WikibaseError> {
        (**self).get(params, bearer)
    }

    fn post_form(&self, params: &ApiParams, bearer: &str) -> Result<ApiResponse, WikibaseError> {
        (**self).post_form(params, bearer)
    }
}

pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: &str, user_agent: &str, timeout: Duration) -> Result<Self, WikibaseError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|source| WikibaseError::Transport {
                context: "failed to build http client".to_string(),
                source,
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    fn finish(&self, resp: reqwest::blocking::Response) -> Result<ApiResponse, WikibaseError> {
        let status = resp.status().as_u16();
        let body = resp.text().map_err(|source| WikibaseError::Transport {
            context: format!("failed to read response from {}", self.endpoint),
            source,
        })?;
        Ok(ApiResponse { status, body })
    }

    fn unreachable(&self, source: reqwest::Error) -> WikibaseError {
        WikibaseError::Transport {
            context: format!("failed to reach {}", self.endpoint),
            source,
        }
    }
}

impl ApiTransport for HttpTransport {
    fn get(&self, params: &ApiParams, bearer: &str) -> Result<ApiResponse, WikibaseError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(params)
            .bearer_auth(bearer)
            .send()
            .map_err(|source| self.unreachable(source))?;
        self.finish(resp)
    }

    fn post_form(&self, params: &ApiParams, bearer: &str) -> Result<ApiResponse, WikibaseError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .form(params)
            .bearer_auth(bearer)
            .send()
            .map_err(|source| self.unreachable(source))?;
        self.finish(resp)
    }
}
