//! gRPC service implementation for RouteGuide.
//!
//! [`RouteGuideService`] implements the generated [`RouteGuide`] trait on top
//! of the shared, read-only [`FeatureCatalog`] and the shared [`NoteHub`].
//! Streaming responses are produced by a spawned task writing into a bounded
//! channel whose receiver is handed to tonic as the response stream.
//!
//! ## Responsibilities
//!
//! - Translate wire messages into [`GeoPoint`]/[`BoundingBox`].
//! - Run the per-call procedures from [`crate::server::streaming`].
//! - Surface failures to the client as a terminal status where possible.
//! - Refuse calls during shutdown and stop running ones when cancelled.

use crate::server::{
    catalog::FeatureCatalog,
    config::ServerConfig,
    notes::NoteHub,
    service::tracker::{CallGuard, CallTracker},
    streaming::{chat::route_chat, features::feed_features, route::record_route},
    telemetry::{
        increment_features_streamed, increment_requests, increment_stream_errors,
        record_stream_duration,
    },
};
use core::{future::Future, pin::Pin};
use futures::TryStreamExt;
use routeguide_core::{
    Error,
    proto::{Feature, Point, Rectangle, RouteNote, RouteSummary, route_guide_server::RouteGuide},
    types::{BoundingBox, GeoPoint},
};
use std::{sync::Arc, time::Instant};
use tokio::sync::mpsc;
use tokio_stream::{Stream, wrappers::ReceiverStream};
use tonic::{Request, Response, Status, Streaming};

type ResponseStream<T> = Pin<Box<dyn Stream<Item = Result<T, Status>> + Send>>;

/// gRPC service answering feature lookups, range queries, route summaries and
/// location chat.
///
/// Cloning is cheap: the catalog, note table and call tracker are shared.
#[derive(Clone)]
pub struct RouteGuideService {
    config: ServerConfig,
    catalog: Arc<FeatureCatalog>,
    notes: Arc<NoteHub>,
    tracker: Arc<CallTracker>,
}

impl RouteGuideService {
    pub fn new(config: ServerConfig, catalog: FeatureCatalog) -> Self {
        let notes = NoteHub::new(config.note_shards);
        let tracker = CallTracker::new(config.shutdown_timeout);

        Self {
            config,
            catalog: Arc::new(catalog),
            notes: Arc::new(notes),
            tracker: Arc::new(tracker),
        }
    }

    pub fn notes(&self) -> &NoteHub {
        &self.notes
    }

    pub fn inflight(&self) -> usize {
        self.tracker.inflight()
    }

    /// Initiates a graceful shutdown.
    ///
    /// New calls are refused immediately; running calls get the configured
    /// timeout to finish before they are cancelled.
    pub async fn shutdown(&self) {
        self.tracker.shutdown().await;
    }

    /// Spawns `produce` as the feeder of a server-streaming response.
    ///
    /// The task races `produce` against shutdown cancellation. On failure it
    /// makes a best effort to send the error as the stream's final item; if
    /// the client is already gone, the error is only logged.
    fn spawn_stream<T, F, Fut>(
        &self,
        rpc: &'static str,
        guard: CallGuard,
        produce: F,
    ) -> ReceiverStream<Result<T, Status>>
    where
        T: Send + 'static,
        F: FnOnce(mpsc::Sender<Result<T, Status>>) -> Fut,
        Fut: Future<Output = routeguide_core::Result<()>> + Send + 'static,
    {
        let (resp_tx, resp_rx) = mpsc::channel(self.config.stream_buffer_size);
        let producer = produce(resp_tx.clone());

        let fut = async move {
            let start = Instant::now();
            let outcome = tokio::select! {
                res = producer => res,
                () = guard.cancelled() => Err(Error::ServiceShutdown),
            };

            match outcome {
                Ok(()) => {
                    record_stream_duration(rpc, start.elapsed().as_millis() as f64);
                }
                Err(e) => {
                    increment_stream_errors(rpc);
                    tracing::warn!("{rpc} failed: {e}");
                    if !matches!(e, Error::ChannelError { .. }) {
                        if let Err(e) = resp_tx.send(Err(e.into())).await {
                            tracing::debug!("Failed to forward {rpc} error: {e}");
                        }
                    }
                }
            }
            drop(guard);
        };

        let span = tracing::info_span!("stream", rpc);
        tokio::spawn(tracing::Instrument::instrument(fut, span));

        ReceiverStream::new(resp_rx)
    }
}

#[tonic::async_trait]
impl RouteGuide for RouteGuideService {
    type ListFeaturesStream = ResponseStream<Feature>;
    type RouteChatStream = ResponseStream<RouteNote>;

    /// Returns the catalog feature at the point, or an unnamed feature at the
    /// same point.
    #[tracing::instrument(skip_all, fields(lat = tracing::field::Empty, lon = tracing::field::Empty))]
    async fn get_feature(&self, req: Request<Point>) -> Result<Response<Feature>, Status> {
        let _guard = self.tracker.begin()?;
        increment_requests("GetFeature");

        let point = GeoPoint::from(req.get_ref());
        tracing::Span::current()
            .record("lat", point.lat)
            .record("lon", point.lon);

        Ok(Response::new(self.catalog.lookup(point)))
    }

    /// Streams the catalog features strictly inside the rectangle.
    #[tracing::instrument(skip_all)]
    async fn list_features(
        &self,
        req: Request<Rectangle>,
    ) -> Result<Response<Self::ListFeaturesStream>, Status> {
        let guard = self.tracker.begin()?;
        increment_requests("ListFeatures");

        let bbox = BoundingBox::from(req.get_ref());
        tracing::debug!(?bbox, "listing features");

        let catalog = Arc::clone(&self.catalog);
        let stream = self.spawn_stream("ListFeatures", guard, move |resp_tx| async move {
            let sent = feed_features(&catalog, bbox, &resp_tx).await?;
            tracing::debug!("Streamed {sent} features");
            Ok::<_, Error>(())
        });

        let stream = stream.inspect_ok(|_| increment_features_streamed(1));
        Ok(Response::new(Box::pin(stream)))
    }

    /// Consumes the client's points and answers with a single summary once
    /// the client half-closes.
    #[tracing::instrument(skip_all)]
    async fn record_route(
        &self,
        req: Request<Streaming<Point>>,
    ) -> Result<Response<RouteSummary>, Status> {
        let guard = self.tracker.begin()?;
        increment_requests("RecordRoute");

        let start = Instant::now();
        let points = req.into_inner();
        let outcome = tokio::select! {
            res = record_route(&self.catalog, points) => res,
            () = guard.cancelled() => Err(Error::ServiceShutdown),
        };

        match outcome {
            Ok(summary) => {
                record_stream_duration("RecordRoute", start.elapsed().as_millis() as f64);
                tracing::debug!(
                    "Route summary: {} points, {} features",
                    summary.point_count,
                    summary.feature_count
                );
                Ok(Response::new(summary))
            }
            Err(e) => {
                increment_stream_errors("RecordRoute");
                tracing::warn!("RecordRoute failed: {e}");
                Err(e.into())
            }
        }
    }

    /// For every received note, echoes the full mailbox at that note's
    /// location.
    #[tracing::instrument(skip_all)]
    async fn route_chat(
        &self,
        req: Request<Streaming<RouteNote>>,
    ) -> Result<Response<Self::RouteChatStream>, Status> {
        let guard = self.tracker.begin()?;
        increment_requests("RouteChat");

        let notes_in = req.into_inner();
        let notes = Arc::clone(&self.notes);
        let stream = self.spawn_stream("RouteChat", guard, move |resp_tx| async move {
            route_chat(&notes, notes_in, &resp_tx).await
        });

        Ok(Response::new(Box::pin(stream)))
    }
}
