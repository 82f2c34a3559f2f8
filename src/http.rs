//! HTTP client implementation for the Lumino SDK
//!
//! This module owns the HTTP session used to talk to the Lumino API. The
//! session wraps a pooled `reqwest::Client` that carries the bearer
//! credential as a default header. It is opened lazily on the first request
//! (or explicitly via [`HttpClient::open`]) and released by
//! [`HttpClient::close`].

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, instrument};
use url::Url;

/// HTTP client for making requests to the Lumino API
///
/// Cloning is cheap and clones share one session, so closing any clone
/// closes it for all of them.
#[derive(Clone)]
pub struct HttpClient {
    /// Client configuration
    config: Arc<ClientConfig>,

    /// Parsed base URL
    base_url: Url,

    /// The pooled connection session; `None` while closed
    session: Arc<Mutex<Option<ReqwestClient>>>,
}

impl HttpClient {
    /// Create a new HTTP client. No connection resources are acquired yet.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::Config(format!("Invalid base URL: {}", e)))?;

        Ok(Self {
            config: Arc::new(config),
            base_url,
            session: Arc::new(Mutex::new(None)),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Acquire the session if it is not already open
    pub fn open(&self) -> Result<()> {
        self.session().map(|_| ())
    }

    /// Release the session.
    ///
    /// Returns `true` if an open session was released and `false` if the
    /// client was already closed. Requests in flight keep their own handle
    /// to the pool and complete normally.
    pub fn close(&self) -> bool {
        let released = self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match released {
            Some(_) => {
                debug!("Closed HTTP session for {}", self.base_url);
                true
            }
            None => false,
        }
    }

    /// Whether a session is currently open
    pub fn is_open(&self) -> bool {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Get the open session, opening one if needed
    fn session(&self) -> Result<ReqwestClient> {
        let mut slot = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        let client = self.build_session()?;
        debug!("Opened HTTP session for {}", self.base_url);
        *slot = Some(client.clone());
        Ok(client)
    }

    fn build_session(&self) -> Result<ReqwestClient> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", self.config.api_key))
            .map_err(|e| Error::Config(format!("Invalid API key header value: {}", e)))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let mut builder = ReqwestClient::builder()
            .default_headers(headers)
            .user_agent(self.config.user_agent.clone());
        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }

        builder.build().map_err(Error::Transport)
    }

    /// Build a URL from path segments, percent-encoding each segment
    pub(crate) fn build_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Base URL '{}' cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a GET request
    #[instrument(skip(self), level = "debug")]
    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let response = self.send(Method::GET, segments, |r| r).await?;
        Self::parse_json(response).await
    }

    /// Send a GET request with query parameters
    #[instrument(skip(self, query), level = "debug")]
    pub async fn get_with_query<T, Q>(&self, segments: &[&str], query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self.send(Method::GET, segments, |r| r.query(query)).await?;
        Self::parse_json(response).await
    }

    /// Send a GET request and hand back the raw response for streaming
    #[instrument(skip(self), level = "debug")]
    pub async fn get_stream(&self, segments: &[&str]) -> Result<Response> {
        self.send(Method::GET, segments, |r| r).await
    }

    /// Send a POST request with a JSON body
    #[instrument(skip(self, body), level = "debug")]
    pub async fn post<T, B>(&self, segments: &[&str], body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.send(Method::POST, segments, |r| r.json(body)).await?;
        Self::parse_json(response).await
    }

    /// Send a POST request without a body
    #[instrument(skip(self), level = "debug")]
    pub async fn post_empty<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let response = self.send(Method::POST, segments, |r| r).await?;
        Self::parse_json(response).await
    }

    /// Send a POST request with a multipart form body
    #[instrument(skip(self, form), level = "debug")]
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        form: reqwest::multipart::Form,
    ) -> Result<T> {
        let response = self
            .send(Method::POST, segments, |r| r.multipart(form))
            .await?;
        Self::parse_json(response).await
    }

    /// Send a PATCH request with a JSON body
    #[instrument(skip(self, body), level = "debug")]
    pub async fn patch<T, B>(&self, segments: &[&str], body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.send(Method::PATCH, segments, |r| r.json(body)).await?;
        Self::parse_json(response).await
    }

    /// Send a DELETE request and parse the response body
    #[instrument(skip(self), level = "debug")]
    pub async fn delete<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let response = self.send(Method::DELETE, segments, |r| r).await?;
        Self::parse_json(response).await
    }

    /// Send a DELETE request, discarding any response body
    #[instrument(skip(self), level = "debug")]
    pub async fn delete_no_content(&self, segments: &[&str]) -> Result<()> {
        self.send(Method::DELETE, segments, |r| r).await?;
        Ok(())
    }

    /// Issue exactly one request and map a non-success status to an error
    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<Response> {
        let url = self.build_url(segments)?;
        let session = self.session()?;

        debug!("Sending {} request to {}", method, url);
        let response = build(session.request(method.clone(), url.clone()))
            .send()
            .await
            .map_err(|e| {
                error!("{} {} failed: {}", method, url, e);
                Error::Transport(e)
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!("Failed to read error body of {} {}: {}", method, url, e);
                String::new()
            }
        };
        error!("API error: {} {} -> {} - {}", method, url, status, body);
        Err(Error::from_response(status, &body))
    }

    /// Parse a success body into the expected type
    async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let text = response.text().await.map_err(Error::Transport)?;
        serde_json::from_str(&text).map_err(|e| {
            error!("Failed to parse response: {}", e);
            Error::UnknownResponse(format!("Failed to parse response: {}", e))
        })
    }
}
