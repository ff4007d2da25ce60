//! HTTP client implementation.

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, trace};

use wms_core::error::{ApiError, Error, FieldViolation, TransportError, ValidationError};
use wms_core::types::ApiUrl;

use super::endpoints::{ApiErrorBody, ErrorDetail};

/// Header carrying the tenant selector (`X-Tenant-ID` on the wire).
pub const TENANT_HEADER: HeaderName = HeaderName::from_static("x-tenant-id");

/// HTTP client for backend API requests.
///
/// This is the transport layer only: it attaches whatever headers it is
/// handed and classifies error responses. Credential selection and 401
/// recovery live in the request pipeline.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base: ApiUrl,
}

impl HttpClient {
    /// Create a new HTTP client for the given API base URL.
    pub fn new(base: ApiUrl) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("wms/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client");

        Self { client, base }
    }

    /// Returns the API base URL this client is configured for.
    pub fn base(&self) -> &ApiUrl {
        &self.base
    }

    /// Make a bare POST request (no credentials attached).
    ///
    /// Used for login, refresh, and registration. The refresh call in
    /// particular must stay on this path so that a 401 from it is a plain
    /// error rather than a trigger for further refresh attempts.
    #[instrument(skip(self, body), fields(base = %self.base))]
    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize + std::fmt::Debug,
        R: DeserializeOwned,
    {
        let url = self.base.endpoint(path);
        debug!(path, "API procedure");

        let response = self
            .client
            .post(&url)
            .json(body)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .send()
            .await
            .map_err(transport_error)?;

        let value = self.handle_response(response).await?;
        decode(value)
    }

    /// Send a request with explicit credential and tenant headers, returning
    /// the raw JSON body.
    ///
    /// The pipeline uses this form so it can re-issue the same request after
    /// a token rotation.
    #[instrument(skip(self, body, token), fields(base = %self.base))]
    pub(crate) async fn send_value(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        token: Option<&str>,
        tenant: Option<&str>,
    ) -> Result<serde_json::Value, Error> {
        let url = self.base.endpoint(path);
        debug!(%method, path, "API request");
        trace!(authed = token.is_some(), tenant, "request context");

        let mut request = self
            .client
            .request(method, &url)
            .headers(self.auth_headers(token, tenant));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(transport_error)?;
        self.handle_response(response).await
    }

    /// Create headers for credentialed requests.
    fn auth_headers(&self, token: Option<&str>, tenant: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let auth_value = format!("Bearer {}", token);
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth_value).expect("invalid token characters"),
            );
        }
        if let Some(tenant) = tenant {
            headers.insert(
                TENANT_HEADER,
                HeaderValue::from_str(tenant).expect("invalid tenant characters"),
            );
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    /// Handle a response, reading the body or classifying the error.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<serde_json::Value, Error> {
        let status = response.status();
        trace!(status = %status, "API response");

        if !status.is_success() {
            return Err(self.parse_error_response(response).await);
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        if bytes.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| {
            TransportError::Http {
                message: format!("invalid JSON response: {}", e),
            }
            .into()
        })
    }

    /// Parse an error response body.
    ///
    /// A `detail` list is a field-level validation failure; a `detail`
    /// string (or anything unparseable) is a plain API error.
    async fn parse_error_response(&self, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();

        match response.json::<ApiErrorBody>().await {
            Ok(body) => match body.detail {
                Some(ErrorDetail::Fields(fields)) => Error::Validation(ValidationError {
                    violations: fields
                        .into_iter()
                        .map(|f| FieldViolation {
                            field: f.field_name(),
                            message: f.msg,
                        })
                        .collect(),
                }),
                Some(ErrorDetail::Text(message)) => {
                    Error::Api(ApiError::new(status, None, Some(message)))
                }
                None => Error::Api(ApiError::new(status, None, None)),
            },
            Err(_) => Error::Api(ApiError::new(status, None, None)),
        }
    }
}

/// Decode a JSON value into a typed response.
pub(crate) fn decode<R: DeserializeOwned>(value: serde_json::Value) -> Result<R, Error> {
    serde_json::from_value(value).map_err(|e| {
        TransportError::Http {
            message: format!("invalid response body: {}", e),
        }
        .into()
    })
}

/// Map a reqwest failure onto the transport error taxonomy.
pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        TransportError::Timeout.into()
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
        .into()
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let base = ApiUrl::new("https://wms.acme.example").unwrap();
        let client = HttpClient::new(base.clone());
        assert_eq!(client.base().as_str(), base.as_str());
    }
}
