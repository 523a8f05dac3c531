//! Flow error types.

use tcg_auth_core::StoreError;
use thiserror::Error;

pub type FlowResult<T> = Result<T, FlowError>;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Identity provider returned an error: {0}")]
    ProviderError(String),

    #[error("Callback is missing the authorization code")]
    MissingCode,

    #[error("Callback is missing the state parameter")]
    MissingState,

    #[error("Callback state does not match any pending login attempt")]
    StateMismatch,

    #[error("Login attempt expired before the callback arrived")]
    AttemptExpired,

    #[error("Token exchange failed with status {status}: {body}")]
    ExchangeFailed { status: u16, body: String },

    #[error("Stored token pair has no refresh token")]
    NoRefreshToken,

    #[error("Token refresh failed with status {0}")]
    RefreshFailed(u16),

    #[error("No member is logged in")]
    NotLoggedIn,

    #[error("Invalid token response: {0}")]
    InvalidTokenResponse(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Session storage error: {0}")]
    StorageError(#[from] StoreError),
}

/// Broad failure classes, used by the UI layer to pick a message without
/// matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Protocol,
    Network,
    Storage,
}

impl FlowError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError(_) | Self::UrlError(_) => ErrorCategory::Configuration,
            Self::ProviderError(_)
            | Self::MissingCode
            | Self::MissingState
            | Self::StateMismatch
            | Self::AttemptExpired
            | Self::NoRefreshToken
            | Self::InvalidTokenResponse(_) => ErrorCategory::Protocol,
            Self::ExchangeFailed { .. } | Self::RefreshFailed(_) | Self::HttpError(_) => {
                ErrorCategory::Network
            }
            Self::NotLoggedIn | Self::StorageError(_) => ErrorCategory::Storage,
        }
    }
}
