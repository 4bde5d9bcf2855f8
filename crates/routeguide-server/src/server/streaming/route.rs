use crate::server::catalog::FeatureCatalog;
use routeguide_core::{
    proto::{Point, RouteSummary},
    types::GeoPoint,
};
use tokio_stream::{Stream, StreamExt};
use tonic::Status;

/// Running totals for one `RecordRoute` call.
pub struct RouteAccumulator<'a> {
    catalog: &'a FeatureCatalog,
    point_count: i32,
    feature_count: i32,
}

impl<'a> RouteAccumulator<'a> {
    pub const fn new(catalog: &'a FeatureCatalog) -> Self {
        Self {
            catalog,
            point_count: 0,
            feature_count: 0,
        }
    }

    /// Counts `point`, and counts it again as a feature hit when it lands
    /// exactly on a catalog feature. Repeated points are counted every time.
    pub fn push(&mut self, point: GeoPoint) {
        self.point_count = self.point_count.saturating_add(1);
        if self.catalog.find(point).is_some() {
            self.feature_count = self.feature_count.saturating_add(1);
        }
    }

    pub const fn summary(&self) -> RouteSummary {
        RouteSummary {
            point_count: self.point_count,
            feature_count: self.feature_count,
        }
    }
}

/// Consumes `points` until the client half-closes and returns the summary.
///
/// # Errors
///
/// Returns [`Error::Transport`](routeguide_core::Error::Transport) if
/// receiving fails; no summary is produced in that case.
pub async fn record_route<S>(
    catalog: &FeatureCatalog,
    points: S,
) -> routeguide_core::Result<RouteSummary>
where
    S: Stream<Item = Result<Point, Status>>,
{
    futures::pin_mut!(points);
    let mut acc = RouteAccumulator::new(catalog);

    while let Some(point) = points.next().await {
        acc.push(GeoPoint::from(point?));
    }

    Ok(acc.summary())
}

#[cfg(test)]
mod tests {
    use super::*;
    use routeguide_core::Error;

    fn point(lat: i32, lon: i32) -> Result<Point, Status> {
        Ok(GeoPoint::new(lat, lon).into())
    }

    #[tokio::test]
    async fn empty_route_yields_zero_summary() {
        let catalog = FeatureCatalog::builtin();
        let summary = record_route(&catalog, tokio_stream::empty()).await.unwrap();
        assert_eq!(
            summary,
            RouteSummary {
                point_count: 0,
                feature_count: 0
            }
        );
    }

    #[tokio::test]
    async fn counts_points_and_feature_hits() {
        let catalog = FeatureCatalog::builtin();
        let points = tokio_stream::iter(vec![
            point(395_906_000, -753_506_000),
            point(405_847_500, -741_301_800),
            point(407_486_500, -739_885_900),
            point(407_486_500, -3),
        ]);
        let summary = record_route(&catalog, points).await.unwrap();
        assert_eq!(summary.point_count, 4);
        assert_eq!(summary.feature_count, 3);
    }

    #[tokio::test]
    async fn repeated_landmark_counts_each_time() {
        let catalog = FeatureCatalog::builtin();
        let points = tokio_stream::iter(vec![
            point(395_906_000, -753_506_000),
            point(395_906_000, -753_506_000),
            point(0, 0),
        ]);
        let summary = record_route(&catalog, points).await.unwrap();
        assert_eq!(summary.point_count, 3);
        assert_eq!(summary.feature_count, 2);
    }

    #[tokio::test]
    async fn receive_failure_produces_no_summary() {
        let catalog = FeatureCatalog::builtin();
        let points = tokio_stream::iter(vec![
            point(395_906_000, -753_506_000),
            Err(Status::cancelled("client gone")),
            point(1, 1),
        ]);
        let err = record_route(&catalog, points).await.unwrap_err();
        assert!(matches!(err, Error::Transport(ref status) if status.code() == tonic::Code::Cancelled));
    }
}
