//! Authentication module
//!
//! Personio issues short-lived tokens in exchange for client credentials.
//! The `TokenAuthenticator` performs that exchange on every request and
//! never caches the resulting token.

mod authenticator;
mod types;

pub use authenticator::{extract_path, TokenAuthenticator, DEFAULT_SCHEME, TOKEN_PATH};
pub use types::Credentials;
