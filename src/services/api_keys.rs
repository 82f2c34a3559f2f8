//! API key service for the Lumino SDK
//!
//! API keys can be created, listed, renamed, extended and revoked. The
//! secret of a key is only returned by [`ApiKeysService::create`].

use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::types::{ApiKey, ApiKeyCreate, ApiKeyUpdate, ApiKeyWithSecret, ListOptions, ListResponse};
use chrono::{DateTime, Utc};
use tracing::{info, instrument};

/// Service for managing API keys
#[derive(Clone)]
pub struct ApiKeysService {
    http_client: HttpClient,
}

impl ApiKeysService {
    /// Create a new API keys service
    pub(crate) fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }

    /// Create a new API key
    ///
    /// Fails with a validation error, without contacting the server, when
    /// `expires_at` is not in the future.
    #[instrument(skip(self, request), fields(name = %request.name), level = "debug")]
    pub async fn create(&self, request: &ApiKeyCreate) -> Result<ApiKeyWithSecret> {
        check_expiration(&request.expires_at)?;
        info!("Creating new API key: {}", request.name);
        self.http_client.post(&["api-keys"], request).await
    }

    /// List API keys
    #[instrument(skip(self), level = "debug")]
    pub async fn list(&self, options: ListOptions) -> Result<ListResponse<ApiKey>> {
        info!("Listing API keys (page {})", options.page);
        self.http_client
            .get_with_query(&["api-keys"], &options)
            .await
    }

    /// Get an API key by name
    #[instrument(skip(self), level = "debug")]
    pub async fn get(&self, name: &str) -> Result<ApiKey> {
        info!("Getting API key: {}", name);
        self.http_client.get(&["api-keys", name]).await
    }

    /// Update an API key's name or expiration
    #[instrument(skip(self), level = "debug")]
    pub async fn update(&self, name: &str, update: &ApiKeyUpdate) -> Result<ApiKey> {
        if let Some(expires_at) = &update.expires_at {
            check_expiration(expires_at)?;
        }
        info!("Updating API key: {}", name);
        self.http_client.patch(&["api-keys", name], update).await
    }

    /// Revoke an API key; the revoked key is returned
    #[instrument(skip(self), level = "debug")]
    pub async fn revoke(&self, name: &str) -> Result<ApiKey> {
        info!("Revoking API key: {}", name);
        self.http_client.delete(&["api-keys", name]).await
    }
}

fn check_expiration(expires_at: &DateTime<Utc>) -> Result<()> {
    if *expires_at <= Utc::now() {
        return Err(Error::invalid_field(
            "expires_at",
            "Expiration date must be in the future",
        ));
    }
    Ok(())
}
