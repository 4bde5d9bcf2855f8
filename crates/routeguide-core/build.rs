/// Generates the gRPC client and server bindings for `proto/routeguide.proto`.
///
/// Alongside the bindings the build writes `routeguide_descriptor.bin` into
/// `OUT_DIR`; the server registers it with the reflection service so tools
/// such as `grpcurl` can discover the API without a local copy of the proto.
///
/// Generated code is exposed as:
///
/// ```rust,ignore
/// pub mod proto {
///     tonic::include_proto!("routeguide");
/// }
/// ```
///
/// # Panics
///
/// Panics if `OUT_DIR` is missing or if `protoc` fails to compile the schema.
use std::env;
use std::path::PathBuf;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let descriptor_path = out_dir.join("routeguide_descriptor.bin");

    let mut config = tonic_prost_build::Config::new();
    config.file_descriptor_set_path(&descriptor_path);

    tonic_prost_build::configure()
        .compile_with_config(config, &["proto/routeguide.proto"], &["proto"])
        .unwrap();

    println!("cargo:rerun-if-changed=proto/routeguide.proto");
}
