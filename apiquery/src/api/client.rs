//! Authenticated request pipeline
//!
//! Every verb goes through the same steps: normalize the sub-path, attach the
//! bearer credential, merge the caller's overrides, dispatch. A 401 runs the
//! refresh protocol and replays the request once; everything else is
//! classified and normalized into [`ApiResult`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use log::{debug, error, warn};
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::auth::{RefreshCoordinator, RefreshError, RefreshMode, SessionContext};
use super::config::RequestConfig;
use super::constants::{
    ALERT_TITLE, DEFAULT_API_PREFIX, DEFAULT_REFRESH_PATH, NOT_AUTHORIZED_MESSAGE,
    SESSION_EXPIRED_MESSAGE, TOKEN_TYPE,
};
use super::query::{FilterNode, OrderKey, QueryEnvelope};
use super::result::{ApiError, ApiErrorKind, ApiResult, classify, normalize};
use super::transport::{HttpTransport, Transport, TransportError, TransportRequest, TransportResponse};
use crate::config::ClientConfig;

/// Prepend `/` to a non-empty sub-path that lacks one.
pub fn normalize_sub_path(sub_path: &str) -> String {
    if sub_path.is_empty() || sub_path.starts_with('/') {
        sub_path.to_string()
    } else {
        format!("/{sub_path}")
    }
}

/// Base configuration: the bearer header when a credential is present.
fn base_config(credential: Option<&str>) -> RequestConfig {
    let Some(token) = credential else {
        return RequestConfig::default();
    };

    match HeaderValue::from_str(&format!("{TOKEN_TYPE}{token}")) {
        Ok(mut value) => {
            value.set_sensitive(true);
            RequestConfig::default().header(AUTHORIZATION, value)
        }
        Err(_) => {
            warn!("Stored access credential is not a valid header value; sending without it");
            RequestConfig::default()
        }
    }
}

/// A failed dispatch and the credential it carried.
struct Failure {
    error: TransportError,
    credential: Option<String>,
}

struct ClientInner {
    base_path: String,
    transport: Arc<dyn Transport>,
    session: SessionContext,
    refresh: RefreshCoordinator,
}

/// Cheap-to-clone handle on the pipeline.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_path", &self.inner.base_path)
            .field("refresh", &self.inner.refresh)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Client over `reqwest` with the default refresh settings.
    pub fn new(base_path: impl Into<String>, session: SessionContext) -> Self {
        Self::builder(base_path, session).build()
    }

    pub fn builder(base_path: impl Into<String>, session: SessionContext) -> ApiClientBuilder {
        ApiClientBuilder::new(base_path, session)
    }

    /// Client described by a loaded [`ClientConfig`].
    pub fn from_config(config: &ClientConfig, session: SessionContext) -> anyhow::Result<Self> {
        let transport = match config.timeout_secs {
            Some(secs) => HttpTransport::with_timeout(Duration::from_secs(secs))
                .context("Failed to build HTTP client")?,
            None => HttpTransport::new(),
        };

        Ok(Self::builder(config.base_path(), session)
            .transport(transport)
            .refresh_path(config.refresh_path.clone())
            .refresh_mode(config.refresh_mode)
            .build())
    }

    pub fn base_path(&self) -> &str {
        &self.inner.base_path
    }

    pub fn session(&self) -> &SessionContext {
        &self.inner.session
    }

    pub async fn get<R: DeserializeOwned>(
        &self,
        sub_path: &str,
        overrides: Option<RequestConfig>,
    ) -> ApiResult<Option<R>> {
        self.request(Method::GET, sub_path, None, overrides).await
    }

    pub async fn post<R, B>(
        &self,
        sub_path: &str,
        body: &B,
        overrides: Option<RequestConfig>,
    ) -> ApiResult<Option<R>>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = encode_body(body)?;
        self.request(Method::POST, sub_path, Some(body), overrides).await
    }

    pub async fn put<R, B>(
        &self,
        sub_path: &str,
        body: &B,
        overrides: Option<RequestConfig>,
    ) -> ApiResult<Option<R>>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = encode_body(body)?;
        self.request(Method::PUT, sub_path, Some(body), overrides).await
    }

    pub async fn patch<R, B>(
        &self,
        sub_path: &str,
        body: &B,
        overrides: Option<RequestConfig>,
    ) -> ApiResult<Option<R>>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = encode_body(body)?;
        self.request(Method::PATCH, sub_path, Some(body), overrides).await
    }

    pub async fn delete<R: DeserializeOwned>(
        &self,
        sub_path: &str,
        overrides: Option<RequestConfig>,
    ) -> ApiResult<Option<R>> {
        self.request(Method::DELETE, sub_path, None, overrides).await
    }

    /// GET a listing with `envelope` attached as `pagination`/`order`/`where`
    /// query parameters. The filter is validated first; an invalid one is
    /// never sent.
    pub async fn list<R, W, K, P>(
        &self,
        sub_path: &str,
        envelope: &QueryEnvelope<W, K, P>,
        overrides: Option<RequestConfig>,
    ) -> ApiResult<Option<R>>
    where
        R: DeserializeOwned,
        W: FilterNode,
        K: OrderKey,
        P: Serialize,
    {
        if let Err(e) = envelope.validate() {
            warn!("Rejected listing query for {}: {}", sub_path, e);
            return Err(ApiError::invalid_request(e.to_string()));
        }

        let pairs = envelope.to_query_pairs().map_err(|e| {
            error!("Failed to encode listing query: {}", e);
            ApiError::unknown()
        })?;
        let query = pairs
            .into_iter()
            .fold(RequestConfig::default(), |config, (key, value)| config.query_param(key, value));

        self.request(Method::GET, sub_path, None, Some(query.merge(overrides.unwrap_or_default())))
            .await
    }

    /// Shared entry point of every verb.
    pub async fn request<R: DeserializeOwned>(
        &self,
        method: Method,
        sub_path: &str,
        body: Option<Value>,
        overrides: Option<RequestConfig>,
    ) -> ApiResult<Option<R>> {
        let url = format!("{}{}", self.inner.base_path, normalize_sub_path(sub_path));
        let overrides = overrides.unwrap_or_default();

        let outcome = match self.dispatch(&method, &url, body.clone(), &overrides).await {
            Ok(response) => Ok(response),
            Err(failure) => self.recover(&method, &url, body, &overrides, failure).await,
        };
        normalize(outcome)
    }

    async fn dispatch(
        &self,
        method: &Method,
        url: &str,
        body: Option<Value>,
        overrides: &RequestConfig,
    ) -> Result<TransportResponse, Failure> {
        let credential = self.inner.session.credentials.access_credential();
        let config = base_config(credential.as_deref()).merge(overrides.clone());

        debug!("{} {}", method, url);
        let request = TransportRequest {
            method: method.clone(),
            url: url.to_string(),
            config,
            body,
        };

        self.inner
            .transport
            .send(request)
            .await
            .map_err(|error| Failure { error, credential })
    }

    async fn recover(
        &self,
        method: &Method,
        url: &str,
        body: Option<Value>,
        overrides: &RequestConfig,
        failure: Failure,
    ) -> Result<TransportResponse, ApiError> {
        let Failure { error, credential } = failure;

        match classify(&error) {
            ApiErrorKind::AuthExpired => {
                warn!("{} {} was rejected as unauthorized; refreshing credential", method, url);
                let refreshed = self
                    .inner
                    .refresh
                    .refresh(
                        self.inner.transport.as_ref(),
                        self.inner.session.credentials.as_ref(),
                        credential.as_deref(),
                    )
                    .await;

                match refreshed {
                    Ok(_) => self.replay(method, url, body, overrides).await,
                    // The call that failed the refresh already ended the session.
                    Err(RefreshError::SignedOut) => {
                        Err(ApiError::from_transport(ApiErrorKind::AuthExpired, &error))
                    }
                    Err(_) => {
                        self.end_session();
                        Err(ApiError::from_transport(ApiErrorKind::AuthExpired, &error))
                    }
                }
            }
            ApiErrorKind::Forbidden => {
                warn!("{} {} was rejected as forbidden", method, url);
                self.alert(NOT_AUTHORIZED_MESSAGE);
                Err(ApiError::from_transport(ApiErrorKind::Forbidden, &error))
            }
            kind => {
                warn!("{} {} failed ({:?}): {}", method, url, kind, error);
                Err(ApiError::from_transport(kind, &error))
            }
        }
    }

    /// Second and last attempt after a refresh. Its failure is final.
    async fn replay(
        &self,
        method: &Method,
        url: &str,
        body: Option<Value>,
        overrides: &RequestConfig,
    ) -> Result<TransportResponse, ApiError> {
        debug!("Replaying {} {} with the refreshed credential", method, url);

        match self.dispatch(method, url, body, overrides).await {
            Ok(response) => Ok(response),
            Err(Failure { error, .. }) => {
                let kind = classify(&error);
                if kind == ApiErrorKind::Forbidden {
                    self.alert(NOT_AUTHORIZED_MESSAGE);
                }
                warn!("Replayed {} {} failed ({:?}): {}", method, url, kind, error);
                Err(ApiError::from_transport(kind, &error))
            }
        }
    }

    fn end_session(&self) {
        self.alert(SESSION_EXPIRED_MESSAGE);
        self.inner.session.session.force_sign_out();
    }

    fn alert(&self, message: &str) {
        self.inner.session.alerts.notify(ALERT_TITLE, message);
    }
}

fn encode_body<B: Serialize + ?Sized>(body: &B) -> ApiResult<Value> {
    serde_json::to_value(body).map_err(|e| {
        error!("Failed to serialize request body: {}", e);
        ApiError::unknown()
    })
}

/// Assembles an [`ApiClient`].
pub struct ApiClientBuilder {
    base_path: String,
    session: SessionContext,
    transport: Option<Arc<dyn Transport>>,
    refresh_path: String,
    refresh_mode: RefreshMode,
}

impl ApiClientBuilder {
    pub fn new(base_path: impl Into<String>, session: SessionContext) -> Self {
        Self {
            base_path: base_path.into(),
            session,
            transport: None,
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            refresh_mode: RefreshMode::default(),
        }
    }

    pub fn transport(self, transport: impl Transport + 'static) -> Self {
        self.shared_transport(Arc::new(transport))
    }

    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn refresh_path(mut self, refresh_path: impl Into<String>) -> Self {
        self.refresh_path = refresh_path.into();
        self
    }

    pub fn refresh_mode(mut self, mode: RefreshMode) -> Self {
        self.refresh_mode = mode;
        self
    }

    pub fn build(self) -> ApiClient {
        let base_path = if self.base_path.is_empty() {
            DEFAULT_API_PREFIX.to_string()
        } else {
            self.base_path.trim_end_matches('/').to_string()
        };
        let refresh_url = format!("{}{}", base_path, normalize_sub_path(&self.refresh_path));
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(HttpTransport::new()));

        ApiClient {
            inner: Arc::new(ClientInner {
                refresh: RefreshCoordinator::new(refresh_url, self.refresh_mode),
                base_path,
                transport,
                session: self.session,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_sub_path() {
        assert_eq!(normalize_sub_path(""), "");
        assert_eq!(normalize_sub_path("users"), "/users");
        assert_eq!(normalize_sub_path("/users"), "/users");
    }

    #[test]
    fn test_base_config_with_and_without_credential() {
        let config = base_config(Some("t1"));
        assert_eq!(config.headers[AUTHORIZATION], "Bearer t1");
        assert!(config.headers[AUTHORIZATION].is_sensitive());

        assert!(base_config(None).headers.is_empty());
        assert!(base_config(Some("bad\ntoken")).headers.is_empty());
    }
}
