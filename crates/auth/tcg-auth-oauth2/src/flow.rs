//! The authorization-code + PKCE login flow.

use crate::config::FlowConfig;
use crate::error::{FlowError, FlowResult};
use crate::pkce::{self, PkceChallenge};
use crate::types::{CallbackParams, CompletedLogin, LoginRedirect, TokenEndpointResponse};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tcg_auth_core::{AccessToken, LoginAttempt, RefreshToken, SessionStore, TokenPair};
use tracing::{debug, error, info};
use url::Url;

/// Authorization-code + PKCE client for the storefront's identity provider.
///
/// One instance per flow configuration. The session store is injected, so
/// tests and alternate frontends supply their own persistence instead of the
/// flow reaching for a global.
#[derive(Clone)]
pub struct AuthFlow {
    config: FlowConfig,
    http_client: Client,
    store: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for AuthFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthFlow")
            .field("config", &self.config)
            .field("http_client", &self.http_client)
            .finish_non_exhaustive()
    }
}

impl AuthFlow {
    pub fn new(config: FlowConfig, store: Arc<dyn SessionStore>) -> FlowResult<Self> {
        config.validate()?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
            store,
        })
    }

    /// Start a login attempt: generate fresh state and PKCE material, persist
    /// the attempt, and return the authorize URL to navigate the member to.
    ///
    /// `original_uri` is carried through the flow so the post-login redirect
    /// returns the member to where they started. No network call is made.
    pub async fn begin_login(&self, original_uri: &str) -> FlowResult<LoginRedirect> {
        let state = pkce::new_state();
        let challenge = PkceChallenge::new();

        let attempt = LoginAttempt::new(
            state.clone(),
            challenge.code_verifier.clone(),
            original_uri.to_string(),
            self.config.attempt_ttl_seconds,
        );
        self.store.save_attempt(&attempt).await?;

        let mut url = Url::parse(&self.config.authorize_endpoint)?;
        {
            let mut params = url.query_pairs_mut();
            params.append_pair("client_id", &self.config.client_id);
            params.append_pair("response_type", "code");
            params.append_pair("redirect_uri", &self.config.redirect_uri);
            params.append_pair("scope", &self.config.scopes.join(" "));
            params.append_pair("state", &state);
            params.append_pair("code_challenge", &challenge.code_challenge);
            params.append_pair("code_challenge_method", &challenge.code_challenge_method);
        }

        debug!(state = %state, "built authorize redirect");

        Ok(LoginRedirect {
            url: url.to_string(),
            state,
        })
    }

    /// Complete a login from the callback query, exchanging the code for a
    /// token pair.
    ///
    /// The stored attempt is consumed before the exchange, so success,
    /// failure, and a replayed callback all leave it invalidated. The token
    /// endpoint is never contacted unless the state matches a pending
    /// attempt.
    pub async fn complete_login(&self, params: CallbackParams) -> FlowResult<CompletedLogin> {
        if let Some(provider_error) = params.error {
            // Invalidate the attempt if the provider echoed our state back.
            if let Some(state) = params.state.as_deref() {
                self.store.take_attempt(state).await?;
            }
            let description = params
                .error_description
                .unwrap_or_else(|| "no description".to_string());
            return Err(FlowError::ProviderError(format!(
                "{provider_error}: {description}"
            )));
        }

        let code = params.code.ok_or(FlowError::MissingCode)?;
        let state = params.state.ok_or(FlowError::MissingState)?;

        let attempt = self
            .store
            .take_attempt(&state)
            .await?
            .ok_or(FlowError::StateMismatch)?;

        if attempt.is_expired() {
            return Err(FlowError::AttemptExpired);
        }

        let tokens = self.exchange_code(&code, &attempt.code_verifier).await?;
        self.store.save_tokens(&tokens).await?;

        info!("completed member login");

        Ok(CompletedLogin {
            tokens,
            return_to: attempt.original_uri,
        })
    }

    /// Refresh the pair if its access token has expired.
    ///
    /// The unexpired case returns the pair untouched with zero network
    /// traffic; callers may invoke this before every authenticated request.
    pub async fn refresh_if_expired(&self, pair: TokenPair) -> FlowResult<TokenPair> {
        if !pair.access_token.is_expired() {
            return Ok(pair);
        }

        let refresh_token = pair
            .refresh_token
            .as_ref()
            .ok_or(FlowError::NoRefreshToken)?;

        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", self.config.client_id.as_str()),
            ("refresh_token", refresh_token.value.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.config.token_endpoint)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), "token refresh failed");
            return Err(FlowError::RefreshFailed(status.as_u16()));
        }

        let token_response: TokenEndpointResponse = response
            .json()
            .await
            .map_err(|e| FlowError::InvalidTokenResponse(e.to_string()))?;

        // Providers that rotate refresh tokens send a replacement; those that
        // don't expect the client to keep using the old one.
        let refreshed = TokenPair {
            access_token: AccessToken::new(token_response.access_token, token_response.expires_in),
            refresh_token: token_response
                .refresh_token
                .map(|value| RefreshToken { value })
                .or(pair.refresh_token),
        };

        self.store.save_tokens(&refreshed).await?;
        info!("refreshed member access token");

        Ok(refreshed)
    }

    /// A valid access token for authenticated storefront calls, refreshing
    /// the stored pair first when it has expired.
    pub async fn access_token(&self) -> FlowResult<AccessToken> {
        let pair = self
            .store
            .load_tokens()
            .await?
            .ok_or(FlowError::NotLoggedIn)?;

        let pair = self.refresh_if_expired(pair).await?;
        Ok(pair.access_token)
    }

    /// End the session, removing the token pair and any pending attempts.
    pub async fn logout(&self) -> FlowResult<()> {
        self.store.clear().await?;
        info!("member logged out");
        Ok(())
    }

    async fn exchange_code(&self, code: &str, code_verifier: &str) -> FlowResult<TokenPair> {
        let form = [
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("code", code),
            // Must match the authorize-time URI exactly.
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code_verifier", code_verifier),
        ];

        let response = self
            .http_client
            .post(&self.config.token_endpoint)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "token exchange failed: {}", body);
            return Err(FlowError::ExchangeFailed {
                status: status.as_u16(),
                body,
            });
        }

        let token_response: TokenEndpointResponse = response
            .json()
            .await
            .map_err(|e| FlowError::InvalidTokenResponse(e.to_string()))?;

        Ok(TokenPair {
            access_token: AccessToken::new(token_response.access_token, token_response.expires_in),
            refresh_token: token_response
                .refresh_token
                .map(|value| RefreshToken { value }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tcg_auth_session::InMemorySessionStore;

    fn test_config() -> FlowConfig {
        FlowConfig::new(
            "storefront-web",
            "https://id.example.com/authorize",
            "https://id.example.com/token",
            "https://shop.example.com/members/callback",
        )
    }

    #[tokio::test]
    async fn begin_login_builds_authorize_url_and_stores_attempt() {
        let store = Arc::new(InMemorySessionStore::new());
        let flow = AuthFlow::new(test_config(), store.clone()).unwrap();

        let redirect = flow.begin_login("/cart").await.unwrap();

        let url = Url::parse(&redirect.url).unwrap();
        assert_eq!(url.host_str(), Some("id.example.com"));
        assert_eq!(url.path(), "/authorize");

        let params: HashMap<_, _> = url.query_pairs().collect();
        assert_eq!(params.get("client_id"), Some(&"storefront-web".into()));
        assert_eq!(params.get("response_type"), Some(&"code".into()));
        assert_eq!(
            params.get("redirect_uri"),
            Some(&"https://shop.example.com/members/callback".into())
        );
        assert_eq!(params.get("scope"), Some(&"offline_access".into()));
        assert_eq!(params.get("state"), Some(&redirect.state.clone().into()));
        assert!(params.contains_key("code_challenge"));
        assert_eq!(params.get("code_challenge_method"), Some(&"S256".into()));

        let attempt = store.take_attempt(&redirect.state).await.unwrap().unwrap();
        assert_eq!(attempt.original_uri, "/cart");
        assert_eq!(attempt.state, redirect.state);
    }

    #[tokio::test]
    async fn two_logins_never_share_state_or_verifier() {
        let store = Arc::new(InMemorySessionStore::new());
        let flow = AuthFlow::new(test_config(), store.clone()).unwrap();

        let first = flow.begin_login("/").await.unwrap();
        let second = flow.begin_login("/").await.unwrap();
        assert_ne!(first.state, second.state);

        let a = store.take_attempt(&first.state).await.unwrap().unwrap();
        let b = store.take_attempt(&second.state).await.unwrap().unwrap();
        assert_ne!(a.code_verifier, b.code_verifier);
    }

    #[tokio::test]
    async fn construction_rejects_invalid_config() {
        let store = Arc::new(InMemorySessionStore::new());
        let config = FlowConfig::new(
            "",
            "https://id.example.com/authorize",
            "https://id.example.com/token",
            "https://shop.example.com/members/callback",
        );

        let err = AuthFlow::new(config, store).unwrap_err();
        assert!(matches!(err, FlowError::ConfigError(_)));
    }
}
