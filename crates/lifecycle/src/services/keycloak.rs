//! Keycloak-backed identity resolver.
//!
//! A service token is obtained with the resource-owner password grant and
//! kept in a [`TokenCache`] for a fixed time. The token is then used as a
//! bearer credential against the user-detail service, which returns the
//! client's record (including `email`) as JSON.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::ClientId;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::error::IdentityError;
use crate::services::identity::IdentityResolver;
use crate::services::token_cache::{InMemoryTokenCache, TokenCache};

/// Cache key of the service token.
pub const TOKEN_CACHE_KEY: &str = "keycloak_admin_token";

/// Connection settings for the identity provider and user-detail service.
#[derive(Clone)]
pub struct KeycloakConfig {
    pub base_url: String,
    pub realm: String,
    pub client_id: String,
    pub client_secret: String,
    pub admin_username: String,
    pub admin_password: String,
    pub user_details_url: String,
    /// How long a fetched service token is reused.
    pub token_ttl: Duration,
    pub token_timeout: Duration,
    pub lookup_timeout: Duration,
}

impl Default for KeycloakConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            realm: "my-realm".to_string(),
            client_id: "kong".to_string(),
            client_secret: String::new(),
            admin_username: String::new(),
            admin_password: String::new(),
            user_details_url: "http://localhost:8000/user/user-details".to_string(),
            token_ttl: Duration::from_secs(300),
            token_timeout: Duration::from_secs(10),
            lookup_timeout: Duration::from_secs(5),
        }
    }
}

impl std::fmt::Debug for KeycloakConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeycloakConfig")
            .field("base_url", &self.base_url)
            .field("realm", &self.realm)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("admin_username", &self.admin_username)
            .field("admin_password", &"<redacted>")
            .field("user_details_url", &self.user_details_url)
            .field("token_ttl", &self.token_ttl)
            .finish_non_exhaustive()
    }
}

impl KeycloakConfig {
    /// Token endpoint of the configured realm.
    pub fn token_url(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.base_url.trim_end_matches('/'),
            self.realm
        )
    }

    /// User-detail endpoint of one client, with a trailing slash.
    pub fn user_details_url_for(&self, client: &ClientId) -> Result<Url, IdentityError> {
        let mut url = Url::parse(&self.user_details_url)
            .map_err(|e| IdentityError::InvalidUrl(format!("{}: {e}", self.user_details_url)))?;

        url.path_segments_mut()
            .map_err(|_| IdentityError::InvalidUrl(self.user_details_url.clone()))?
            .pop_if_empty()
            .push(client.as_str())
            .push("");

        Ok(url)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserDetails {
    email: Option<String>,
}

/// Identity resolver talking to Keycloak and the user-detail service.
#[derive(Clone)]
pub struct KeycloakIdentityResolver {
    client: Client,
    config: KeycloakConfig,
    cache: Arc<dyn TokenCache>,
}

impl std::fmt::Debug for KeycloakIdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeycloakIdentityResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl KeycloakIdentityResolver {
    /// Creates a resolver with a process-local token cache.
    pub fn new(config: KeycloakConfig) -> Self {
        Self::with_cache(config, Arc::new(InMemoryTokenCache::new()))
    }

    /// Creates a resolver that shares `cache` for service tokens.
    pub fn with_cache(config: KeycloakConfig, cache: Arc<dyn TokenCache>) -> Self {
        Self {
            client: Client::new(),
            config,
            cache,
        }
    }

    /// Returns a service token, exchanging credentials only on a cache miss.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::AuthProvider` when the provider answers with a
    /// non-success status, carrying that status and the response body.
    pub async fn get_service_token(&self) -> Result<String, IdentityError> {
        if let Some(token) = self.cache.get(TOKEN_CACHE_KEY) {
            return Ok(token);
        }

        metrics::counter!("identity_token_exchanges_total").increment(1);

        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("username", self.config.admin_username.as_str()),
            ("password", self.config.admin_password.as_str()),
            ("grant_type", "password"),
        ];

        let response = self
            .client
            .post(self.config.token_url())
            .form(&params)
            .timeout(self.config.token_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::AuthProvider {
                status: status.as_u16(),
                body,
            });
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| IdentityError::MalformedResponse(e.to_string()))?
            .access_token
            .ok_or_else(|| IdentityError::MalformedResponse("missing access_token".to_string()))?;

        self.cache
            .set(TOKEN_CACHE_KEY, token.clone(), self.config.token_ttl);
        tracing::debug!("obtained service token");

        Ok(token)
    }

    /// Returns the email of `client`, or `None` on any failure.
    pub async fn get_user_contact(&self, client: &ClientId) -> Option<String> {
        match self.fetch_email(client).await {
            Ok(email) => Some(email),
            Err(e) => {
                tracing::warn!(client = %client, error = %e, "could not resolve client email");
                None
            }
        }
    }

    async fn fetch_email(&self, client: &ClientId) -> Result<String, IdentityError> {
        let url = self.config.user_details_url_for(client)?;
        let token = self.get_service_token().await?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .timeout(self.config.lookup_timeout)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => response
                .json::<UserDetails>()
                .await
                .map_err(|e| IdentityError::MalformedResponse(e.to_string()))?
                .email
                .ok_or(IdentityError::MissingEmail),
            status => {
                // Drop a revoked token so the next lookup exchanges again
                if status == StatusCode::UNAUTHORIZED {
                    self.cache.invalidate(TOKEN_CACHE_KEY);
                }
                let body = response.text().await.unwrap_or_default();
                Err(IdentityError::UserLookup {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

#[async_trait]
impl IdentityResolver for KeycloakIdentityResolver {
    async fn resolve_email(&self, client: &ClientId) -> Option<String> {
        self.get_user_contact(client).await
    }
}
