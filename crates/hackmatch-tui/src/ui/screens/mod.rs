//! Per-route content rendering.

pub mod hackathon;
pub mod home;
pub mod login;
pub mod messages;
pub mod my_teams;
pub mod profile;
