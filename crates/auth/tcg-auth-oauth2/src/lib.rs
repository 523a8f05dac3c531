//! Authorization-code + PKCE login flow for the storefront's hosted
//! identity provider.
//!
//! One parameterized flow replaces the per-page variants of the original
//! storefront: construct a [`FlowConfig`], inject a session store, and drive
//! login with [`AuthFlow::begin_login`] / [`AuthFlow::complete_login`].

mod config;
mod error;
mod flow;
mod pkce;
mod types;

pub use config::FlowConfig;
pub use error::{ErrorCategory, FlowError, FlowResult};
pub use flow::AuthFlow;
pub use pkce::{PkceChallenge, code_challenge_s256};
pub use types::{CallbackParams, CompletedLogin, LoginRedirect};
