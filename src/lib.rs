//! NutriLens — meal-photo nutrition readings and daily goal tracking.

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod session;
pub mod store;
pub mod tui;
pub mod upload;
