//! Authentication state.
//!
//! # Data Flow
//! ```text
//! login / register ──▶ credential.rs (set, persist) ──▶ CredentialEvent::Set
//! every dispatch   ──▶ credential.rs (lock-free read for Authorization)
//! logout / HTTP 401 ─▶ credential.rs (clear) ──▶ CredentialEvent::Cleared
//!                  └─▶ navigator.rs (send the user to the login route)
//! ```
//!
//! # Design Decisions
//! - The credential store is an owned object handed to the transport, never a global
//! - Subscribers observe changes through a broadcast channel
//! - A clear issued by one request's 401 handling may race another request's read

pub mod credential;
pub mod navigator;
pub mod session;

pub use credential::{ClearReason, CredentialEvent, CredentialStore, TOKEN_KEY};
pub use navigator::{LoggingNavigator, Navigator};
pub use session::{login, logout, register, LoginResponse};
