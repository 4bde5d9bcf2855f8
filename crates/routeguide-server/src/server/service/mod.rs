//! gRPC service implementation and call lifecycle.
//!
//! ## Structure
//!
//! - [`handler`] - gRPC service entry point (`RouteGuideService`).
//! - [`tracker`] - in-flight call accounting and graceful shutdown.

pub mod handler;
pub mod tracker;
