//! Error types for the RouteGuide service.
//!
//! None of the four calls has a domain failure: unknown points, empty
//! rectangles and empty routes all have well-defined answers. What remains is
//! the peer going away mid-call, the service shutting down, and a bad feature
//! catalog at startup. `From<Error>` for `tonic::Status` maps each case onto
//! a gRPC status code.
//!
//! ## Error Cases
//! - `Transport`: receiving the next message from the client failed.
//! - `ChannelError`: an outgoing message could not be handed to the response
//!   stream, usually because the client disconnected.
//! - `ServiceShutdown`: a call arrived, or was still running, while the
//!   service was shutting down.
//! - `Catalog`: the feature catalog could not be loaded.

use tonic::Status;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the RouteGuide service.
#[derive(Clone, thiserror::Error, Debug)]
pub enum Error {
    /// The inbound half of the call failed.
    #[error("Transport error: {0}")]
    Transport(#[from] Status),

    /// Response channel closed while forwarding a message.
    #[error("Channel error: {context}")]
    ChannelError { context: String },

    /// The service is in the process of shutting down.
    #[error("Service is shutting down")]
    ServiceShutdown,

    /// The feature catalog is unreadable or malformed.
    #[error("Catalog error: {reason}")]
    Catalog { reason: String },
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::Transport(status) => status,
            Error::ChannelError { context } => {
                Status::internal(format!("Channel error: {}", context))
            }
            Error::ServiceShutdown => Status::unavailable("Service is shutting down"),
            Error::Catalog { reason } => Status::internal(format!("Catalog error: {}", reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn transport_status_passes_through_unchanged() {
        let status: Status = Error::from(Status::cancelled("peer went away")).into();
        assert_eq!(status.code(), Code::Cancelled);
        assert_eq!(status.message(), "peer went away");
    }

    #[test]
    fn shutdown_maps_to_unavailable() {
        let status: Status = Error::ServiceShutdown.into();
        assert_eq!(status.code(), Code::Unavailable);
    }

    #[test]
    fn channel_error_maps_to_internal() {
        let status: Status = Error::ChannelError {
            context: "closed".into(),
        }
        .into();
        assert_eq!(status.code(), Code::Internal);
        assert!(status.message().contains("closed"));
    }
}
