/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */
use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;

use aws_sdk_s3::error::DisplayErrorContext;
use clap::Parser;
use s3_file_gateway::config::{ConfigLoader, DEFAULT_DOWNLOAD_DIR, DEFAULT_UPLOAD_BUCKET};
use s3_file_gateway::server::{GatewayServer, DEFAULT_LISTEN_ADDR};
use s3_file_gateway::storage::{
    DEFAULT_ACCESS_KEY, DEFAULT_ENDPOINT, DEFAULT_REGION, DEFAULT_SECRET_KEY,
};
use s3_file_gateway::Client;
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Debug, Clone, clap::Parser)]
#[command(name = "s3-file-gateway")]
#[command(about = "Moves files between the local filesystem and an S3-compatible object store over HTTP.")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "GATEWAY_LISTEN", default_value = DEFAULT_LISTEN_ADDR)]
    listen: SocketAddr,

    /// Object store endpoint, `host:port` or a full URL
    #[arg(long, env = "GATEWAY_S3_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Object store access key
    #[arg(long, env = "GATEWAY_S3_ACCESS_KEY", default_value = DEFAULT_ACCESS_KEY)]
    access_key: String,

    /// Object store secret key
    #[arg(
        long,
        env = "GATEWAY_S3_SECRET_KEY",
        default_value = DEFAULT_SECRET_KEY,
        hide_env_values = true
    )]
    secret_key: String,

    /// Connect to the object store over TLS
    #[arg(long, env = "GATEWAY_S3_USE_SSL", default_value_t = false, action = clap::ArgAction::SetTrue)]
    use_ssl: bool,

    /// Region of the object store
    #[arg(long, env = "GATEWAY_S3_REGION", default_value = DEFAULT_REGION)]
    region: String,

    /// Bucket uploads are written into, created on first use
    #[arg(long, env = "GATEWAY_UPLOAD_BUCKET", default_value = DEFAULT_UPLOAD_BUCKET)]
    upload_bucket: String,

    /// Directory downloaded objects are written into
    #[arg(long, env = "GATEWAY_DOWNLOAD_DIR", default_value = DEFAULT_DOWNLOAD_DIR)]
    download_dir: PathBuf,

    /// Resolve upload paths relative to this directory instead of the filesystem root
    #[arg(long, env = "GATEWAY_UPLOAD_ROOT")]
    upload_root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_thread_ids(true)
        .init();

    let mut loader = ConfigLoader::default()
        .endpoint(args.endpoint)
        .access_key_id(args.access_key)
        .secret_access_key(args.secret_key)
        .use_ssl(args.use_ssl)
        .region(args.region)
        .upload_bucket(args.upload_bucket)
        .download_dir(args.download_dir);
    if let Some(root) = args.upload_root {
        loader = loader.upload_root(root);
    }

    let config = match loader.load().await {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("failed to load configuration: {}", DisplayErrorContext(&err));
            return Err(err.into());
        }
    };

    let server = GatewayServer::builder()
        .listen(args.listen)
        .client(Client::new(config))
        .build()?;
    let handle = server.start().await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("received shutdown signal");
    handle.shutdown().await?;

    Ok(())
}
