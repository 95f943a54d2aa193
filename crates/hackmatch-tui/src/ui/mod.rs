//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, navigation bar and overlays
//! - `input`: keyboard event handling per route
//! - `styles`: color palette and text styling
//! - `screens`: per-route content rendering

pub mod input;
pub mod render;
pub mod screens;
pub mod styles;
