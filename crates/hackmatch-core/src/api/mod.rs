//! REST client for the hackathon backend.
//!
//! Resource calls carry the stored access token as a bearer header. The
//! token endpoints (`/api/token/`, `/api/token/refresh/`,
//! `/api/login_with_code/`) are called without one.

pub mod client;
pub mod error;

pub use client::{persist_tokens, ApiClient, TokenResponse};
pub use error::ApiError;
