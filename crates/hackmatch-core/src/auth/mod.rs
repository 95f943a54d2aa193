//! Session handling for the client.
//!
//! - `TokenStore`: the only path to persisted access/refresh tokens
//! - `jwt`: local decoding of the access token expiry
//! - `SessionGuard`: per-navigation authorization decision
//! - `LandingRouter`: picks the first screen after authentication

pub mod guard;
pub mod jwt;
pub mod landing;
pub mod tokens;

pub use guard::{
    evaluate, AuthDecision, DenyReason, GuardConfig, GuardPass, GuardState, RevalidationHandle,
    SessionGuard, SyncOutcome, TokenRefresher,
};
pub use jwt::{AccessClaims, TokenError};
pub use landing::{Landing, LandingRouter, ProfileSource};
pub use tokens::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenPair, TokenStore};
