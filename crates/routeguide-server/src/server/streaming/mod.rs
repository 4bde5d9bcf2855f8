//! Per-call streaming procedures.
//!
//! Each function drives one call to completion against a transport-neutral
//! surface: inbound messages arrive as a `Stream` of `Result<T, Status>` that
//! ends when the client half-closes, and outbound messages go through a
//! bounded `mpsc::Sender` whose receiver backs the gRPC response stream.
//!
//! - [`features`] - `ListFeatures` range scan.
//! - [`route`] - `RecordRoute` accumulation.
//! - [`chat`] - `RouteChat` note exchange.

pub mod chat;
pub mod features;
pub mod route;
