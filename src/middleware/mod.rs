//! Axum login gate: landing endpoint, code callback and route guard.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use authcode_gate::middleware::{Gate, GateConfig, MemorySessionStore};
//!
//! let config = GateConfig::from_env()?;
//! let store = Arc::new(MemorySessionStore::new(config.session_ttl()));
//! let gate = Gate::new(config, store);
//!
//! let app = gate.router().merge(gate.protect(my_private_routes));
//! ```

mod config;
mod cookies;
mod error;
mod gate;
mod guard;
mod memory;
mod pages;
mod routes;
mod state;
mod traits;

pub use config::GateConfig;
pub use error::AuthError;
pub use gate::AuthPhase;
pub use memory::MemorySessionStore;
pub use routes::{Gate, gate_routes};
pub use traits::{SessionStore, StoreError};

/// Re-export cookie key type for builder API.
pub use axum_extra::extract::cookie::Key as CookieKey;
