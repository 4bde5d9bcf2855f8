//! Demo client exercising each RouteGuide call once.

use clap::Parser;
use routeguide_core::{
    proto::{Point, Rectangle, RouteNote, route_guide_client::RouteGuideClient},
    types::{BoundingBox, GeoPoint},
};
use tokio_stream::StreamExt;
use tonic::{Request, transport::Channel};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "routeguide-client", version, about = "Calls every RouteGuide RPC once")]
struct ClientArgs {
    /// Server address, either `host:port` or a full `http(s)://` URI.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("127.0.0.1:50051"))]
    server_addr: String,
}

/// Turns a bare `host:port` into an `http://` endpoint URI.
fn endpoint_uri(addr: &str) -> String {
    if addr.contains("://") {
        addr.to_owned()
    } else {
        format!("http://{addr}")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = ClientArgs::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    let mut client = RouteGuideClient::connect(endpoint_uri(&args.server_addr)).await?;

    get_feature(&mut client).await?;
    list_features(&mut client).await?;
    record_route(&mut client).await?;
    route_chat(&mut client).await?;

    Ok(())
}

fn describe(point: Option<&Point>) -> String {
    let (lat, lon) = GeoPoint::from(point).to_degrees();
    format!("({lat:.7}, {lon:.7})")
}

async fn get_feature(client: &mut RouteGuideClient<Channel>) -> anyhow::Result<()> {
    tracing::info!("=== GetFeature ===");
    let point: Point = GeoPoint::from_degrees(39.5906, -75.3506).into();

    let feature = client.get_feature(Request::new(point)).await?.into_inner();
    tracing::info!(
        "Feature name: {:?} at {}",
        feature.name,
        describe(feature.location.as_ref())
    );
    Ok(())
}

async fn list_features(client: &mut RouteGuideClient<Channel>) -> anyhow::Result<()> {
    tracing::info!("=== ListFeatures ===");
    let rect: Rectangle = BoundingBox::new(
        GeoPoint::new(385_000_000, -780_000_000),
        GeoPoint::new(410_000_000, -735_000_000),
    )
    .into();

    let mut stream = client.list_features(Request::new(rect)).await?.into_inner();
    while let Some(feature) = stream.next().await {
        let feature = feature?;
        tracing::info!("- {} at {}", feature.name, describe(feature.location.as_ref()));
    }
    Ok(())
}

async fn record_route(client: &mut RouteGuideClient<Channel>) -> anyhow::Result<()> {
    tracing::info!("=== RecordRoute ===");
    let points: Vec<Point> = [
        GeoPoint::from_degrees(39.5906, -75.3506),
        GeoPoint::from_degrees(40.584_75, -74.130_18),
        GeoPoint::from_degrees(40.748_65, -73.988_59),
        GeoPoint::new(407_486_500, -3),
    ]
    .into_iter()
    .map(Point::from)
    .collect();

    let summary = client
        .record_route(Request::new(tokio_stream::iter(points)))
        .await?
        .into_inner();
    tracing::info!(
        "Route summary: {} points, {} features",
        summary.point_count,
        summary.feature_count
    );
    Ok(())
}

async fn route_chat(client: &mut RouteGuideClient<Channel>) -> anyhow::Result<()> {
    tracing::info!("=== RouteChat ===");
    let notes = vec![
        RouteNote::new(GeoPoint::new(0, 1), "First message"),
        RouteNote::new(GeoPoint::new(0, 2), "Second message"),
        RouteNote::new(GeoPoint::new(0, 3), "Third message"),
        RouteNote::new(GeoPoint::new(0, 1), "Fourth message"),
        RouteNote::new(GeoPoint::new(0, 2), "Fifth message"),
        RouteNote::new(GeoPoint::new(0, 3), "Sixth message"),
    ];
    for note in &notes {
        tracing::info!(
            "Sending message: {} at {}",
            note.message,
            describe(note.location.as_ref())
        );
    }

    let mut inbound = client
        .route_chat(Request::new(tokio_stream::iter(notes)))
        .await?
        .into_inner();
    while let Some(note) = inbound.next().await {
        let note = note?;
        tracing::info!(
            "Received message: {} at {}",
            note.message,
            describe(note.location.as_ref())
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_address_gets_http_scheme() {
        assert_eq!(endpoint_uri("127.0.0.1:50051"), "http://127.0.0.1:50051");
        assert_eq!(endpoint_uri("https://guide.local:443"), "https://guide.local:443");
    }

    #[test]
    fn describes_points_in_degrees() {
        let point = Point::from(GeoPoint::new(407_486_500, -739_885_900));
        assert_eq!(describe(Some(&point)), "(40.7486500, -73.9885900)");
        assert_eq!(describe(None), "(0.0000000, 0.0000000)");
    }
}
