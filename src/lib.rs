#![doc = include_str!("../README.md")]

pub mod error;
pub mod middleware;
pub mod oauth;
pub mod retry;
pub mod token;
pub mod types;

// Re-exports for convenient access
pub use error::ExchangeError;
pub use oauth::{AuthClient, OAuthConfig, TokenResponse};
pub use retry::RetryPolicy;
pub use token::TokenRecord;
pub use types::SessionId;
