//! Example wiring for the storefront member login flow.
//!
//! This example demonstrates:
//! 1. Building a FlowConfig (env vars override the placeholders)
//! 2. Injecting a session store
//! 3. Producing the authorize redirect
//! 4. Completing the callback and refreshing tokens

use std::sync::Arc;
use tcg_auth_oauth2::{AuthFlow, CallbackParams, FlowConfig};
use tcg_auth_session::InMemorySessionStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = FlowConfig::new(
        std::env::var("STOREFRONT_CLIENT_ID").unwrap_or_else(|_| "storefront-web".to_string()),
        std::env::var("IDP_AUTHORIZE_ENDPOINT")
            .unwrap_or_else(|_| "https://id.example.com/authorize".to_string()),
        std::env::var("IDP_TOKEN_ENDPOINT")
            .unwrap_or_else(|_| "https://id.example.com/token".to_string()),
        std::env::var("STOREFRONT_REDIRECT_URI")
            .unwrap_or_else(|_| "https://shop.example.com/members/callback".to_string()),
    );

    let store = Arc::new(InMemorySessionStore::new());
    let flow = AuthFlow::new(config, store.clone())?;

    println!("Storefront Member Login Example");
    println!("===============================");

    // Step 1: begin the login attempt
    println!("\n1. Beginning login from /cart ...");
    let redirect = flow.begin_login("/cart").await?;
    println!("Authorize URL: {}", redirect.url);
    println!("State: {}", redirect.state);

    println!("\nIn the real storefront, the browser would:");
    println!("1. Navigate to the authorize URL");
    println!("2. Return to the callback URI with ?code=...&state=...");
    println!("3. Exchange the code and route the member back to /cart");

    // Step 2: simulate the callback (fails here since no real provider is up)
    println!("\n2. Simulating the provider callback...");
    let result = flow
        .complete_login(CallbackParams {
            code: Some("simulated_authorization_code".to_string()),
            state: Some(redirect.state),
            error: None,
            error_description: None,
        })
        .await;

    match result {
        Ok(completed) => {
            println!("✅ Login complete, returning member to {}", completed.return_to);
            println!(
                "Access token expires at {}",
                completed.tokens.access_token.expires_at
            );
        }
        Err(e) => {
            println!("❌ Callback failed: {} (category {:?})", e, e.category());
            println!("Note: expected in this simulation, no real token endpoint is running");
        }
    }

    Ok(())
}
