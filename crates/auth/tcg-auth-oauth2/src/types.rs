//! Wire types for the authorize callback and token endpoint.

use serde::{Deserialize, Serialize};
use tcg_auth_core::TokenPair;

/// Query parameters the identity provider appends to the callback redirect.
///
/// All fields are optional on the wire; `complete_login` decides which
/// absences are fatal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Where to send the member to authenticate.
#[derive(Debug, Clone)]
pub struct LoginRedirect {
    pub url: String,
    pub state: String,
}

/// Result of a successful callback exchange.
#[derive(Debug, Clone)]
pub struct CompletedLogin {
    pub tokens: TokenPair,
    /// The URI the member was on when login began.
    pub return_to: String,
}

/// Successful token-endpoint response body.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenEndpointResponse {
    pub access_token: String,
    /// Lifetime in seconds, converted to an absolute expiry on receipt.
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}
