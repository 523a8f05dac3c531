//! Flow configuration.

use crate::error::{FlowError, FlowResult};
use serde::Deserialize;

/// Configuration for one login flow against the identity provider.
///
/// Validation happens at [`AuthFlow`](crate::AuthFlow) construction; missing
/// values are a hard error, never silently replaced with demo credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct FlowConfig {
    pub client_id: String,
    pub authorize_endpoint: String,
    pub token_endpoint: String,
    /// Must match the authorize-time URI exactly at token exchange,
    /// scheme/host/path included.
    pub redirect_uri: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    /// How long a pending login attempt stays valid.
    #[serde(default = "default_attempt_ttl")]
    pub attempt_ttl_seconds: u64,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
}

fn default_scopes() -> Vec<String> {
    vec!["offline_access".to_string()]
}

fn default_attempt_ttl() -> u64 {
    600 // 10 minutes
}

fn default_http_timeout() -> u64 {
    30
}

impl FlowConfig {
    pub fn new(
        client_id: impl Into<String>,
        authorize_endpoint: impl Into<String>,
        token_endpoint: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            authorize_endpoint: authorize_endpoint.into(),
            token_endpoint: token_endpoint.into(),
            redirect_uri: redirect_uri.into(),
            scopes: default_scopes(),
            attempt_ttl_seconds: default_attempt_ttl(),
            http_timeout_seconds: default_http_timeout(),
        }
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn with_attempt_ttl(mut self, seconds: u64) -> Self {
        self.attempt_ttl_seconds = seconds;
        self
    }

    pub fn with_http_timeout(mut self, seconds: u64) -> Self {
        self.http_timeout_seconds = seconds;
        self
    }

    pub(crate) fn validate(&self) -> FlowResult<()> {
        if self.client_id.trim().is_empty() {
            return Err(FlowError::ConfigError("client_id is required".to_string()));
        }
        if self.authorize_endpoint.trim().is_empty() {
            return Err(FlowError::ConfigError(
                "authorize_endpoint is required".to_string(),
            ));
        }
        if self.token_endpoint.trim().is_empty() {
            return Err(FlowError::ConfigError(
                "token_endpoint is required".to_string(),
            ));
        }
        if self.redirect_uri.trim().is_empty() {
            return Err(FlowError::ConfigError(
                "redirect_uri is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_request_offline_access() {
        let json = serde_json::json!({
            "client_id": "storefront-web",
            "authorize_endpoint": "https://id.example.com/authorize",
            "token_endpoint": "https://id.example.com/token",
            "redirect_uri": "https://shop.example.com/members/callback",
        });

        let config: FlowConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.scopes, vec!["offline_access".to_string()]);
        assert_eq!(config.attempt_ttl_seconds, 600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_client_id_is_rejected() {
        let config = FlowConfig::new(
            "",
            "https://id.example.com/authorize",
            "https://id.example.com/token",
            "https://shop.example.com/members/callback",
        );

        let err = config.validate().unwrap_err();
        assert!(matches!(err, FlowError::ConfigError(_)));
    }
}
