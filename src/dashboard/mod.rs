//! Operator control page served at `/`.
//!
//! Shows the current health state and instance metadata, with buttons for
//! the control endpoints. The page is an askama template
//! (`templates/index.html`); CSS and JS are embedded from `dashboard/`.

pub mod handler;

pub use handler::{assets_handler, dashboard_handler};
