use clap::Parser;
use futures::Stream;
use routeguide_core::proto::{FILE_DESCRIPTOR_SET, route_guide_server::RouteGuideServer};
use routeguide_server::server::{
    catalog::FeatureCatalog,
    config::{CliArgs, ServerConfig},
    service::handler::RouteGuideService,
    telemetry::{TelemetryProviders, init_telemetry},
};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::server::Connected;
use tonic::{codec::CompressionEncoding, transport::Server};
use tonic_health::server::HealthReporter;
use tonic_reflection::server::Builder;
use tonic_web::GrpcWebLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

// mimalloc holds up better than the system allocator under many concurrent
// streams, especially on musl.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    let providers = init_telemetry()?;

    let catalog = match &config.features_path {
        Some(path) => FeatureCatalog::load(path)?,
        None => FeatureCatalog::builtin(),
    };

    if config.uds {
        #[cfg(unix)]
        {
            use tokio::net::UnixListener;
            use tokio_stream::wrappers::UnixListenerStream;
            let uds_path = config.server_addr.clone();
            let uds = UnixListener::bind(&uds_path)?;
            let incoming = UnixListenerStream::new(uds);
            log_startup_info(&uds_path, &config, &catalog);
            let res = run_server_with_incoming(providers, incoming, config, catalog).await;
            // A panic can still leave the socket file behind.
            let _ = std::fs::remove_file(&uds_path);
            res
        }
        #[cfg(not(unix))]
        {
            anyhow::bail!("Unix domain sockets are not supported on this platform");
        }
    } else {
        let tcp_path = config.server_addr.clone();
        let tcp = TcpListener::bind(&tcp_path).await?;
        let incoming = TcpListenerStream::new(tcp);
        log_startup_info(&tcp_path, &config, &catalog);
        run_server_with_incoming(providers, incoming, config, catalog).await
    }
}

async fn run_server_with_incoming<I, IO, IE>(
    providers: TelemetryProviders,
    incoming: I,
    config: ServerConfig,
    catalog: FeatureCatalog,
) -> anyhow::Result<()>
where
    I: Stream<Item = Result<IO, IE>>,
    IO: AsyncRead + AsyncWrite + Connected + Unpin + Send + 'static,
    IE: Into<tower::BoxError>,
{
    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<RouteGuideServer<RouteGuideService>>()
        .await;

    let service = RouteGuideService::new(config, catalog);

    let reflection = Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    Server::builder()
        .accept_http1(true)
        .http2_adaptive_window(Some(true))
        .layer(
            ServiceBuilder::new()
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(GrpcWebLayer::new()),
        )
        .add_service(health_service)
        .add_service(reflection)
        .add_service(build_route_guide(service.clone()))
        .serve_with_incoming_shutdown(incoming, shutdown_signal(service, health_reporter))
        .await?;

    providers.shutdown();
    tracing::info!("Service shut down successfully");
    Ok(())
}

fn log_startup_info(addr: &str, config: &ServerConfig, catalog: &FeatureCatalog) {
    if cfg!(debug_assertions) {
        tracing::info!(
            "Starting RouteGuide on {} with {} features and full config: {:#?}",
            addr,
            catalog.len(),
            config
        );
    } else {
        tracing::info!(
            "Starting RouteGuide on {} with {} features and {} note shards",
            addr,
            catalog.len(),
            config.note_shards
        );
    }
}

fn build_route_guide(service: RouteGuideService) -> RouteGuideServer<RouteGuideService> {
    RouteGuideServer::new(service)
        .send_compressed(CompressionEncoding::Zstd)
        .send_compressed(CompressionEncoding::Gzip)
        .send_compressed(CompressionEncoding::Deflate)
        .accept_compressed(CompressionEncoding::Zstd)
        .accept_compressed(CompressionEncoding::Gzip)
        .accept_compressed(CompressionEncoding::Deflate)
}

async fn shutdown_signal(service: RouteGuideService, health_reporter: HealthReporter) {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
    }

    tracing::info!(
        "Shutdown signal received, terminating gracefully ({} calls in flight)...",
        service.inflight()
    );

    // 1. Publish the status
    health_reporter
        .set_not_serving::<RouteGuideServer<RouteGuideService>>()
        .await;

    // 2. Drain, then cancel whatever is left
    service.shutdown().await;
}
