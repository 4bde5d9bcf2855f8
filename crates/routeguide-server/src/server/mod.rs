//! Server side of the RouteGuide service.
//!
//! - [`config`] - CLI/environment configuration.
//! - [`catalog`] - read-only feature catalog and exact-point index.
//! - [`notes`] - sharded note table backing `RouteChat`.
//! - [`streaming`] - per-call procedures for the streaming RPCs.
//! - [`service`] - the tonic service and call lifecycle.
//! - [`telemetry`] - logging, tracing and metrics setup.

pub mod catalog;
pub mod config;
pub mod notes;
pub mod service;
pub mod streaming;
pub mod telemetry;
