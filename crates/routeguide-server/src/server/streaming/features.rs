use crate::server::catalog::FeatureCatalog;
use routeguide_core::{Error, proto::Feature, types::BoundingBox};
use tokio::sync::mpsc;
use tonic::Status;

/// Streams every catalog feature strictly inside `bbox` to `resp_tx`.
///
/// Matches are forwarded one at a time in catalog order, so the client starts
/// receiving before the scan finishes and a slow client holds the scan back
/// through the bounded channel. Returns the number of features sent.
///
/// # Errors
///
/// Returns [`Error::ChannelError`] as soon as a send fails (the client went
/// away); the scan does not continue past that point.
pub async fn feed_features(
    catalog: &FeatureCatalog,
    bbox: BoundingBox,
    resp_tx: &mpsc::Sender<Result<Feature, Status>>,
) -> routeguide_core::Result<usize> {
    let mut sent = 0;

    for feature in catalog.within(bbox) {
        if let Err(e) = resp_tx.send(Ok(feature.clone())).await {
            return Err(Error::ChannelError {
                context: format!("Failed to forward feature: {e}"),
            });
        }
        sent += 1;
    }

    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use routeguide_core::types::GeoPoint;

    fn grid() -> FeatureCatalog {
        FeatureCatalog::new(
            (0..5)
                .map(|i| Feature::named(format!("f{i}"), GeoPoint::new(i * 10, i * 10)))
                .collect(),
        )
    }

    #[tokio::test]
    async fn sends_matches_in_catalog_order() {
        let catalog = grid();
        let (tx, mut rx) = mpsc::channel(8);
        let bbox = BoundingBox::new(GeoPoint::new(5, 5), GeoPoint::new(45, 45));

        let sent = feed_features(&catalog, bbox, &tx).await.unwrap();
        drop(tx);

        let mut names = Vec::new();
        while let Some(feature) = rx.recv().await {
            names.push(feature.unwrap().name);
        }
        assert_eq!(sent, 4);
        assert_eq!(names, ["f1", "f2", "f3", "f4"]);
    }

    #[tokio::test]
    async fn feature_on_low_edge_is_excluded() {
        let catalog = grid();
        let (tx, mut rx) = mpsc::channel(8);
        let bbox = BoundingBox::new(GeoPoint::new(10, 5), GeoPoint::new(25, 25));

        feed_features(&catalog, bbox, &tx).await.unwrap();
        drop(tx);

        let first = rx.recv().await.unwrap().unwrap();
        assert_eq!(first.name, "f2");
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn empty_box_sends_nothing() {
        let catalog = grid();
        let (tx, mut rx) = mpsc::channel(1);
        let bbox = BoundingBox::new(GeoPoint::new(1, 1), GeoPoint::new(2, 2));

        assert_eq!(feed_features(&catalog, bbox, &tx).await.unwrap(), 0);
        drop(tx);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn stops_when_client_disconnects() {
        let catalog = grid();
        let (tx, rx) = mpsc::channel(8);
        drop(rx);
        let bbox = BoundingBox::new(GeoPoint::new(-1, -1), GeoPoint::new(100, 100));

        let err = feed_features(&catalog, bbox, &tx).await.unwrap_err();
        assert!(matches!(err, Error::ChannelError { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stops_mid_scan_when_client_disconnects() {
        let catalog = grid();
        let (tx, mut rx) = mpsc::channel(1);
        let bbox = BoundingBox::new(GeoPoint::new(-1, -1), GeoPoint::new(100, 100));

        let scan = tokio::spawn(async move { feed_features(&catalog, bbox, &tx).await });

        let first = rx.recv().await.unwrap().unwrap();
        assert_eq!(first.name, "f0");
        drop(rx);

        let err = scan.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::ChannelError { .. }));
    }
}
