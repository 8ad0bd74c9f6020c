//! healthsim - Readiness probe simulator
//!
//! An HTTP service whose readiness probe can be switched off or made to fail
//! a configurable share of the time, for exercising load balancer and
//! orchestrator failover.

pub mod api;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod health;
pub mod logging;
pub mod metadata;
pub mod metrics;
