//! User service for the Lumino SDK
//!
//! This module provides access to the authenticated user's account.

use crate::error::Result;
use crate::http::HttpClient;
use crate::types::{JsonObject, User, UserUpdate};
use tracing::{info, instrument, warn};

/// Service for the current user's account
#[derive(Clone)]
pub struct UserService {
    http_client: HttpClient,
}

impl UserService {
    /// Create a new user service
    pub(crate) fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }

    /// Get the user the API key belongs to
    #[instrument(skip(self), level = "debug")]
    pub async fn get_current_user(&self) -> Result<User> {
        info!("Getting current user information");
        self.http_client.get(&["users", "me"]).await
    }

    /// Update the current user; unset fields are left unchanged
    #[instrument(skip(self), level = "debug")]
    pub async fn update_current_user(&self, update: &UserUpdate) -> Result<User> {
        info!("Updating current user information");
        self.http_client.patch(&["users", "me"], update).await
    }

    /// Delete the current user's account, returning the server's confirmation
    #[instrument(skip(self), level = "debug")]
    pub async fn delete_account(&self) -> Result<JsonObject> {
        warn!("Deleting user account");
        self.http_client.delete(&["users", "me"]).await
    }

    /// Get the current user's account settings
    #[instrument(skip(self), level = "debug")]
    pub async fn get_account_settings(&self) -> Result<JsonObject> {
        info!("Getting user account settings");
        self.http_client.get(&["users", "me", "settings"]).await
    }

    /// Update account settings; only the keys present in `settings` are sent
    #[instrument(skip(self, settings), level = "debug")]
    pub async fn update_account_settings(&self, settings: &JsonObject) -> Result<JsonObject> {
        info!("Updating user account settings");
        self.http_client
            .patch(&["users", "me", "settings"], settings)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::services::test_http_client;
    use crate::types::UserStatus;
    use mockito::{Matcher, Server};

    const USER_BODY: &str = r#"{
        "id": "123e4567-e89b-12d3-a456-426614174000",
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z",
        "status": "ACTIVE",
        "name": "Test User",
        "email": "test@example.com",
        "credits_balance": 100.0
    }"#;

    #[tokio::test]
    async fn test_get_current_user_is_stable() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/users/me")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(USER_BODY)
            .expect(2)
            .create_async()
            .await;

        let service = UserService::new(test_http_client(server.url()));
        let first = service.get_current_user().await.unwrap();
        let second = service.get_current_user().await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.email, "test@example.com");
        assert_eq!(first.status, UserStatus::Active);
        assert_eq!(first.credits_balance, 100.0);

        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_current_user_sends_only_set_fields() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("PATCH", "/users/me")
            .match_body(Matcher::Json(serde_json::json!({"name": "Test User"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(USER_BODY)
            .expect(1)
            .create_async()
            .await;

        let service = UserService::new(test_http_client(server.url()));
        let update = UserUpdate {
            name: Some("Test User".to_string()),
        };
        let user = service.update_current_user(&update).await.unwrap();
        assert_eq!(user.name, "Test User");

        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalid_key_is_authentication_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/users/me")
            .with_status(401)
            .with_body(r#"{"message": "Invalid API key"}"#)
            .create_async()
            .await;

        let service = UserService::new(test_http_client(server.url()));
        let result = service.get_current_user().await;
        assert!(matches!(
            result,
            Err(Error::Authentication { status_code: 401, ref message }) if message == "Invalid API key"
        ));
    }

    #[tokio::test]
    async fn test_account_settings_round_trip() {
        let mut server = Server::new_async().await;
        let get = server
            .mock("GET", "/users/me/settings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"notifications": true, "theme": "dark"}"#)
            .expect(1)
            .create_async()
            .await;
        let update = server
            .mock("PATCH", "/users/me/settings")
            .match_body(Matcher::Json(serde_json::json!({"theme": "light"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"notifications": true, "theme": "light"}"#)
            .expect(1)
            .create_async()
            .await;

        let service = UserService::new(test_http_client(server.url()));
        let settings = service.get_account_settings().await.unwrap();
        assert_eq!(settings["theme"], "dark");

        let mut changes = JsonObject::new();
        changes.insert("theme".to_string(), serde_json::json!("light"));
        let updated = service.update_account_settings(&changes).await.unwrap();
        assert_eq!(updated["theme"], "light");
        assert_eq!(updated["notifications"], true);

        get.assert_async().await;
        update.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_account() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("DELETE", "/users/me")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "Account deleted"}"#)
            .expect(1)
            .create_async()
            .await;

        let service = UserService::new(test_http_client(server.url()));
        let response = service.delete_account().await.unwrap();
        assert_eq!(response["message"], "Account deleted");

        m.assert_async().await;
    }
}
