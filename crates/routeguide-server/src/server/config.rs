use anyhow::bail;
use clap::Parser;
use core::time::Duration;
use std::path::PathBuf;

/// Runtime configuration for the `routeguide-server` binary.
///
/// Every flag can also be supplied through the environment (a `.env` file in
/// the working directory is loaded first). Defaults are suitable for local
/// runs and small deployments.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "routeguide-server",
    version,
    about = "A gRPC service for feature lookup, route summaries and location notes"
)]
pub struct CliArgs {
    /// Address to listen on (TCP or Unix socket path; use --uds for Unix
    /// socket).
    ///
    /// Example: "0.0.0.0:50051" or "/tmp/routeguide.sock"
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:50051"))]
    pub server_addr: String,

    /// Listen on a Unix socket instead of TCP. If set, `SERVER_ADDR` must be a
    /// file path.
    #[arg(short, long, default_value_t = false)]
    pub uds: bool,

    /// JSON file holding the feature catalog.
    ///
    /// The file is an array of `{"name": .., "location": {"latitude": ..,
    /// "longitude": ..}}` objects. When omitted, a small built-in set of
    /// landmarks is served.
    ///
    /// Environment variable: `FEATURES_PATH`
    #[arg(long, env = "FEATURES_PATH")]
    pub features_path: Option<PathBuf>,

    /// Number of independently locked shards in the note table.
    ///
    /// Notes at different locations only contend when their locations hash to
    /// the same shard.
    ///
    /// Environment variable: `NOTE_SHARDS`
    #[arg(long, env = "NOTE_SHARDS", default_value_t = 16)]
    pub note_shards: usize,

    /// Capacity of the outgoing buffer between a streaming call and the
    /// transport.
    ///
    /// Lower values apply backpressure sooner; higher values let the service
    /// run further ahead of a slow client.
    ///
    /// Environment variable: `STREAM_BUFFER_SIZE`
    #[arg(long, env = "STREAM_BUFFER_SIZE", default_value_t = 8)]
    pub stream_buffer_size: usize,

    /// Seconds to wait for in-flight calls to finish during shutdown before
    /// cancelling them.
    ///
    /// Environment variable: `SHUTDOWN_TIMEOUT`
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 3)]
    pub shutdown_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub uds: bool,
    pub features_path: Option<PathBuf>,
    pub note_shards: usize,
    pub stream_buffer_size: usize,
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_addr: String::from("0.0.0.0:50051"),
            uds: false,
            features_path: None,
            note_shards: 16,
            stream_buffer_size: 8,
            shutdown_timeout: Duration::from_secs(3),
        }
    }
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.note_shards == 0 {
            bail!("NOTE_SHARDS must be greater than 0");
        }

        if args.stream_buffer_size == 0 {
            bail!("STREAM_BUFFER_SIZE must be greater than 0");
        }

        Ok(Self {
            server_addr: args.server_addr,
            uds: args.uds,
            features_path: args.features_path,
            note_shards: args.note_shards,
            stream_buffer_size: args.stream_buffer_size,
            shutdown_timeout: Duration::from_secs(args.shutdown_timeout),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<ServerConfig> {
        let mut argv = vec!["routeguide-server"];
        argv.extend_from_slice(args);
        ServerConfig::try_from(CliArgs::try_parse_from(argv)?)
    }

    #[test]
    fn explicit_flags_override_defaults() {
        let config = parse(&[
            "--server-addr",
            "127.0.0.1:6000",
            "--note-shards",
            "4",
            "--stream-buffer-size",
            "32",
            "--shutdown-timeout",
            "10",
            "--features-path",
            "/tmp/features.json",
        ])
        .unwrap();

        assert_eq!(config.server_addr, "127.0.0.1:6000");
        assert_eq!(config.note_shards, 4);
        assert_eq!(config.stream_buffer_size, 32);
        assert_eq!(config.shutdown_timeout, Duration::from_secs(10));
        assert_eq!(
            config.features_path.as_deref(),
            Some(std::path::Path::new("/tmp/features.json"))
        );
        assert!(!config.uds);
    }

    #[test]
    fn rejects_zero_shards() {
        let err = parse(&["--note-shards", "0"]).unwrap_err();
        assert!(err.to_string().contains("NOTE_SHARDS"));
    }

    #[test]
    fn rejects_zero_stream_buffer() {
        let err = parse(&["--stream-buffer-size", "0"]).unwrap_err();
        assert!(err.to_string().contains("STREAM_BUFFER_SIZE"));
    }
}
