//! Types shared by the RouteGuide server and its clients.
//!
//! - [`types`] - location model and conversions from the wire messages.
//! - [`error`] - the service error and its mapping onto `tonic::Status`.

pub mod error;
pub mod types;

pub use error::{Error, Result};
