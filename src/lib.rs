//! Headless admin-dashboard order card.
//!
//! Shows one customer order, lets an operator toggle per-item completion
//! through a confirmation step, applies the change optimistically and
//! persists it through the order service, rolling back on failure.

pub mod actors;
pub mod config;
pub mod domain;
pub mod messaging;
pub mod metrics;
pub mod utils;
pub mod view;
pub mod workflow;
