//! Client layer: orchestrates transport calls and maps transport ↔ domain.

mod collection;
mod credentials;
#[cfg(test)]
pub(crate) mod fake;

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::domain::{
    ApiToken, DeleteDomainResponse, Domain, DomainName, OtpId, OtpResendResponse,
    OtpSendResponse, OtpVerifyResponse, PartialDomain, RegisterDomain, SendOtp, SendText,
    TextResponse, ValidationError, encode_path_segment,
};
use crate::transport::{DecodeError, EncodeError};

pub use collection::{
    Collection, CollectionBuilder, DEFAULT_API_VERSION, DEFAULT_BASE_HOST, DEFAULT_STORE_TIMEOUT,
    DEPRECATION_TARGET,
};
pub use credentials::{
    BASE_HOST_VAR, CredentialSource, DATA_KEY_VAR, Environment, PROJECT_ID_VAR, TOKEN_VAR,
};

const DEFAULT_BASE_URL: &str = "https://api.contiguity.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const SEND_TEXT_PATH: &str = "/send/text";
const OTP_NEW_PATH: &str = "/otp/new";
const OTP_RESEND_PATH: &str = "/otp/resend";
const OTP_VERIFY_PATH: &str = "/otp/verify";
const DOMAINS_PATH: &str = "/domains";

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result of a single transport round trip.
pub type TransportResult = Result<HttpResponse, Box<dyn StdError + Send + Sync>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(value: Method) -> Self {
        match value {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Raw HTTP response: status code and body bytes.
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// HTTP seam used by every client in this crate.
///
/// `path` is relative to the base URL the transport was built for. Implementations
/// perform exactly one request per call and never retry on their own account.
pub trait HttpTransport: Send + Sync {
    fn send<'a>(
        &'a self,
        method: Method,
        path: &'a str,
        body: Option<Value>,
    ) -> BoxFuture<'a, TransportResult>;

    fn get<'a>(&'a self, path: &'a str) -> BoxFuture<'a, TransportResult> {
        self.send(Method::Get, path, None)
    }

    fn post<'a>(&'a self, path: &'a str, body: Value) -> BoxFuture<'a, TransportResult> {
        self.send(Method::Post, path, Some(body))
    }

    fn put<'a>(&'a self, path: &'a str, body: Value) -> BoxFuture<'a, TransportResult> {
        self.send(Method::Put, path, Some(body))
    }

    fn patch<'a>(&'a self, path: &'a str, body: Value) -> BoxFuture<'a, TransportResult> {
        self.send(Method::Patch, path, Some(body))
    }

    fn delete<'a>(&'a self, path: &'a str) -> BoxFuture<'a, TransportResult> {
        self.send(Method::Delete, path, None)
    }
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl ReqwestTransport {
    fn new(
        base_url: String,
        token: String,
        timeout: Option<Duration>,
        user_agent: Option<String>,
    ) -> Result<Self, ContiguityError> {
        url::Url::parse(&base_url).map_err(|err| ContiguityError::InvalidConfiguration {
            message: format!("invalid base URL '{base_url}': {err}"),
        })?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = user_agent {
            builder = builder.user_agent(user_agent);
        }
        let client = builder
            .build()
            .map_err(|err| ContiguityError::Transport(Box::new(err)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token,
        })
    }
}

impl HttpTransport for ReqwestTransport {
    fn send<'a>(
        &'a self,
        method: Method,
        path: &'a str,
        body: Option<Value>,
    ) -> BoxFuture<'a, TransportResult> {
        Box::pin(async move {
            let url = format!("{}{}", self.base_url, path);
            let mut request = self
                .client
                .request(method.into(), url)
                .header(reqwest::header::AUTHORIZATION, format!("Token {}", self.token));
            if let Some(body) = body.as_ref() {
                request = request.json(body);
            }

            let response = request.send().await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?;
            Ok(HttpResponse {
                status,
                body: body.to_vec(),
            })
        })
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`Contiguity`] and [`Collection`].
///
/// Local failures (`InvalidConfiguration`, `InvalidKey`, `Validation`) are detected
/// before any request is sent.
pub enum ContiguityError {
    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Non-successful response not covered by a more specific variant.
    #[error("API error (HTTP {status}): {}", message.as_deref().unwrap_or("no message"))]
    Api {
        status: u16,
        message: Option<String>,
    },

    /// Response body could not be decoded into the expected shape.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Request value could not be serialized.
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),

    /// A builder argument or credential is missing or invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// An empty or dot-segment key was passed to a key-bearing operation.
    #[error("invalid key '{key}'")]
    InvalidKey { key: String },

    /// `insert` hit an existing key.
    #[error("item with key '{key}' already exists")]
    ItemConflict { key: String },

    /// `update` targeted a key that does not exist.
    #[error("key '{key}' not found")]
    ItemNotFound { key: String },

    /// One of the domain constructors or local checks rejected a value.
    #[error("validation error: {0}")]
    Validation(#[source] ValidationError),
}

impl From<ValidationError> for ContiguityError {
    fn from(value: ValidationError) -> Self {
        match value {
            ValidationError::InvalidKey { key } => Self::InvalidKey { key },
            other => Self::Validation(other),
        }
    }
}

impl From<EncodeError> for ContiguityError {
    fn from(value: EncodeError) -> Self {
        match value {
            EncodeError::Json(err) => Self::Encode(err),
            EncodeError::Validation(err) => err.into(),
        }
    }
}

async fn send_request(
    http: &dyn HttpTransport,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> Result<HttpResponse, ContiguityError> {
    tracing::debug!(?method, path, "sending request");
    let response = http
        .send(method, path, body)
        .await
        .map_err(ContiguityError::Transport)?;
    tracing::debug!(?method, path, status = response.status, "received response");
    Ok(response)
}

fn ensure_success(response: HttpResponse) -> Result<HttpResponse, ContiguityError> {
    if response.is_success() {
        return Ok(response);
    }
    Err(ContiguityError::Api {
        status: response.status,
        message: crate::transport::decode_api_error(&response.body),
    })
}

#[derive(Debug, Clone)]
/// Builder for [`Contiguity`].
///
/// Use this when you need to customize the base URL, timeout, or user-agent.
pub struct ContiguityBuilder {
    token: Option<String>,
    base_url: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl ContiguityBuilder {
    /// Create a builder with the default base URL and a 5 second timeout.
    pub fn new() -> Self {
        Self {
            token: None,
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Some(DEFAULT_TIMEOUT),
            user_agent: None,
        }
    }

    /// Set the API token. Without it, `CONTIGUITY_TOKEN` is read at build time.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`Contiguity`] client, reading missing credentials from the environment.
    pub fn build(self) -> Result<Contiguity, ContiguityError> {
        self.build_with(&Environment)
    }

    /// Build a [`Contiguity`] client, reading missing credentials from `source`.
    pub fn build_with(self, source: &dyn CredentialSource) -> Result<Contiguity, ContiguityError> {
        let token = credentials::resolve(
            self.token.as_deref(),
            source,
            TOKEN_VAR,
            ApiToken::FIELD,
        )?;
        let token = ApiToken::new(token)?;
        let http = ReqwestTransport::new(
            self.base_url,
            token.as_str().to_owned(),
            self.timeout,
            self.user_agent,
        )?;
        Ok(Contiguity {
            http: Arc::new(http),
        })
    }
}

impl Default for ContiguityBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
/// Client for the messaging endpoints (text, OTP, domains).
///
/// Every method issues one request and decodes one enveloped response. Non-2xx
/// responses become [`ContiguityError::Api`].
pub struct Contiguity {
    http: Arc<dyn HttpTransport>,
}

impl Contiguity {
    /// Create a client with an explicit token and default settings.
    pub fn new(token: impl Into<String>) -> Result<Self, ContiguityError> {
        Self::builder().token(token).build()
    }

    /// Create a client from `CONTIGUITY_TOKEN`.
    pub fn from_env() -> Result<Self, ContiguityError> {
        Self::builder().build()
    }

    pub fn builder() -> ContiguityBuilder {
        ContiguityBuilder::new()
    }

    /// Use a caller-provided transport, e.g. one with custom middleware.
    pub fn with_transport(http: Arc<dyn HttpTransport>) -> Self {
        Self { http }
    }

    /// Send a text message to an E.164 number.
    pub async fn send_text(&self, request: SendText) -> Result<TextResponse, ContiguityError> {
        let body = crate::transport::encode_send_text_body(&request);
        let response = self.execute(Method::Post, SEND_TEXT_PATH, Some(body)).await?;
        let parsed: TextResponse = crate::transport::decode_response(&response.body)?;
        tracing::debug!(message_id = %parsed.message_id, "text message accepted");
        Ok(parsed)
    }

    /// Send a one-time passcode.
    pub async fn send_otp(&self, request: SendOtp) -> Result<OtpSendResponse, ContiguityError> {
        let body = crate::transport::encode_send_otp_body(&request);
        let response = self.execute(Method::Post, OTP_NEW_PATH, Some(body)).await?;
        let parsed: OtpSendResponse = crate::transport::decode_response(&response.body)?;
        tracing::debug!(otp_id = %parsed.otp_id, "passcode sent");
        Ok(parsed)
    }

    pub async fn resend_otp(&self, otp_id: &OtpId) -> Result<OtpResendResponse, ContiguityError> {
        let body = crate::transport::encode_resend_otp_body(otp_id);
        let response = self.execute(Method::Post, OTP_RESEND_PATH, Some(body)).await?;
        Ok(crate::transport::decode_response(&response.body)?)
    }

    /// Check a passcode entered by the user. `verified` is `false` for a wrong code.
    pub async fn verify_otp(
        &self,
        otp: &str,
        otp_id: &OtpId,
    ) -> Result<OtpVerifyResponse, ContiguityError> {
        let body = crate::transport::encode_verify_otp_body(otp, otp_id);
        let response = self.execute(Method::Post, OTP_VERIFY_PATH, Some(body)).await?;
        Ok(crate::transport::decode_response(&response.body)?)
    }

    pub async fn register_domain(
        &self,
        request: RegisterDomain,
    ) -> Result<PartialDomain, ContiguityError> {
        let path = domain_path(request.domain());
        let body = crate::transport::encode_register_domain_body(&request);
        let response = self.execute(Method::Post, &path, Some(body)).await?;
        let parsed: PartialDomain = crate::transport::decode_response(&response.body)?;
        tracing::debug!(domain = %parsed.domain, "domain registered");
        Ok(parsed)
    }

    pub async fn list_domains(&self) -> Result<Vec<PartialDomain>, ContiguityError> {
        let response = self.execute(Method::Get, DOMAINS_PATH, None).await?;
        Ok(crate::transport::decode_response_list(&response.body)?)
    }

    pub async fn get_domain(&self, domain: &DomainName) -> Result<Domain, ContiguityError> {
        let response = self.execute(Method::Get, &domain_path(domain), None).await?;
        Ok(crate::transport::decode_response(&response.body)?)
    }

    pub async fn delete_domain(
        &self,
        domain: &DomainName,
    ) -> Result<DeleteDomainResponse, ContiguityError> {
        let response = self
            .execute(Method::Delete, &domain_path(domain), None)
            .await?;
        let parsed: DeleteDomainResponse = crate::transport::decode_response(&response.body)?;
        tracing::debug!(domain = domain.as_str(), "domain deleted");
        Ok(parsed)
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<HttpResponse, ContiguityError> {
        let response = send_request(self.http.as_ref(), method, path, body).await?;
        ensure_success(response)
    }
}

fn domain_path(domain: &DomainName) -> String {
    format!("{DOMAINS_PATH}/{}", encode_path_segment(domain.as_str()))
}
