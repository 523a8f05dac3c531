//! Session store implementations for member authentication.
//!
//! Two [`SessionStore`](tcg_auth_core::SessionStore) backends: an in-memory
//! store for tests and short-lived processes, and a file-backed store that
//! survives restarts, the desktop analog of the storefront's browser-side
//! session storage.

mod file;
mod memory;

pub use file::FileSessionStore;
pub use memory::InMemorySessionStore;
