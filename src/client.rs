//! Client implementation for the Lumino SDK
//!
//! This module provides the main client interface for interacting with the Lumino API.

use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::HttpClient;
use crate::services::{
    ApiKeysService, BillingService, DatasetsService, FineTuningService, ModelsService,
    UsageService, UserService,
};
use std::future::Future;
use std::ops::Deref;
use std::sync::{Arc, Mutex, PoisonError};

/// Client for the Lumino API
///
/// This is the main entry point for interacting with the Lumino API.
/// It provides access to the services for users, API keys, datasets,
/// fine-tuning jobs, models, usage and billing.
///
/// The underlying HTTP session opens on the first request. Use
/// [`Client::with_session`] or [`Client::session`] to bound its lifetime to
/// a scope, or call [`Client::close`] directly. Clones share the session.
#[derive(Clone)]
pub struct Client {
    http_client: HttpClient,

    /// Number of live `SessionGuard`s across all clones
    active_guards: Arc<Mutex<usize>>,
}

impl Client {
    /// Create a client for the default endpoint with an API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(api_key))
    }

    /// Create a client with an API key and a base URL override
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        Self::with_config(
            ClientConfig::builder()
                .api_key(api_key)
                .base_url(base_url)
                .build()?,
        )
    }

    /// Create a client from a full configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            http_client: HttpClient::new(config)?,
            active_guards: Arc::new(Mutex::new(0)),
        })
    }

    /// Create a client from `LUMINO_API_KEY` and, if set, `LUMINO_BASE_URL`
    pub fn from_env() -> Result<Self> {
        Self::with_config(ClientConfig::from_env()?)
    }

    /// Access the user service
    pub fn user(&self) -> UserService {
        UserService::new(self.http_client.clone())
    }

    /// Access the API keys service
    pub fn api_keys(&self) -> ApiKeysService {
        ApiKeysService::new(self.http_client.clone())
    }

    /// Access the datasets service
    pub fn datasets(&self) -> DatasetsService {
        DatasetsService::new(self.http_client.clone())
    }

    /// Access the fine-tuning service
    pub fn fine_tuning(&self) -> FineTuningService {
        FineTuningService::new(self.http_client.clone())
    }

    /// Access the models service
    pub fn models(&self) -> ModelsService {
        ModelsService::new(self.http_client.clone())
    }

    /// Access the usage service
    pub fn usage(&self) -> UsageService {
        UsageService::new(self.http_client.clone())
    }

    /// Access the billing service
    pub fn billing(&self) -> BillingService {
        BillingService::new(self.http_client.clone())
    }

    /// Open the HTTP session ahead of the first request
    pub fn open(&self) -> Result<()> {
        self.http_client.open()
    }

    /// Release the HTTP session. Returns `false` if it was already closed.
    pub fn close(&self) -> bool {
        self.http_client.close()
    }

    /// Check if the HTTP session is open
    pub fn is_open(&self) -> bool {
        self.http_client.is_open()
    }

    /// Open the session and return a guard that closes it when dropped
    ///
    /// Guards nest: while several guards from this client or its clones are
    /// alive, only the last one dropped closes the session. An explicit
    /// [`Client::close`] still closes it immediately.
    pub fn session(&self) -> Result<SessionGuard> {
        let mut active = self
            .active_guards
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.open()?;
        *active += 1;
        Ok(SessionGuard {
            client: self.clone(),
        })
    }

    /// Run `f` inside a session scope
    ///
    /// The session is released when `f` finishes, whether it succeeded or
    /// failed, and also if the returned future is dropped before completing.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use lumino::Client;
    ///
    /// # async fn run() -> lumino::Result<()> {
    /// let client = Client::from_env()?;
    /// let user = client
    ///     .with_session(|client| async move { client.user().get_current_user().await })
    ///     .await?;
    /// println!("{}", user.email);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn with_session<F, Fut, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(Client) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let guard = self.session()?;
        f(guard.client.clone()).await
    }
}

/// Scope guard returned by [`Client::session`]
///
/// Dereferences to the client. Dropping the last live guard closes the
/// session.
pub struct SessionGuard {
    client: Client,
}

impl Deref for SessionGuard {
    type Target = Client;

    fn deref(&self) -> &Client {
        &self.client
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let mut active = self
            .client
            .active_guards
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *active = active.saturating_sub(1);
        if *active == 0 {
            self.client.close();
        }
    }
}
