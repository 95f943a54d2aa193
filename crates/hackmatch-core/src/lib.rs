//! Core library for hackmatch.
//!
//! Shared by the terminal client and the headless commands:
//! - `api`: backend client and error type
//! - `auth`: token store, session guard and landing router
//! - `models`: backend resource types
//! - `route`: navigation targets
//! - `config`: user configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod route;

pub use api::{ApiClient, ApiError};
pub use auth::{
    AuthDecision, GuardConfig, Landing, LandingRouter, SessionGuard, TokenPair, TokenStore,
};
pub use config::{Config, TokenStorage};
pub use route::Route;
