//! Arena Dash Library
//!
//! Terminal dashboard for the AI Trading Robots Arena backend

pub mod api;
pub mod config;
pub mod dashboard;
pub mod types;
pub mod ui;
