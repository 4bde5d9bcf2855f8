#![doc = include_str!("../README.md")]

mod common;
pub use common::*;

/// gRPC service and message definitions generated from
/// `proto/routeguide.proto`.
///
/// ## Service
///
/// - `GetFeature` - unary lookup of the feature at a point.
/// - `ListFeatures` - server stream of the features inside a rectangle.
/// - `RecordRoute` - client stream of points answered by one summary.
/// - `RouteChat` - bidirectional stream of location-tagged notes.
///
/// Coordinates on the wire are `int32` degrees scaled by 10^7; see
/// [`GeoPoint`](crate::types::GeoPoint) for the in-process form.
pub mod proto {
    tonic::include_proto!("routeguide");

    /// Encoded file descriptor set for the reflection service.
    pub const FILE_DESCRIPTOR_SET: &[u8] =
        tonic::include_file_descriptor_set!("routeguide_descriptor");
}
