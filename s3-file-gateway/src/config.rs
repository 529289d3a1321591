/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::storage::DEFAULT_REGION;
use crate::types::BucketName;

pub mod loader;

pub use loader::ConfigLoader;

/// Bucket that receives every upload unless configured otherwise
pub const DEFAULT_UPLOAD_BUCKET: &str = "mymusic";

/// Directory downloads are written into unless configured otherwise
pub const DEFAULT_DOWNLOAD_DIR: &str = "temp/download/";

/// Configuration for a [`Client`](crate::client::Client)
///
/// Loaded once at startup and read-only thereafter.
#[derive(Debug, Clone)]
pub struct Config {
    upload_bucket: BucketName,
    region: String,
    download_dir: PathBuf,
    upload_root: Option<PathBuf>,
    client: aws_sdk_s3::Client,
}

impl Config {
    /// Create a new `Config` builder
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// The bucket uploads are written into
    pub fn upload_bucket(&self) -> &BucketName {
        &self.upload_bucket
    }

    /// The region used when the upload bucket has to be created
    pub fn region(&self) -> &str {
        &self.region
    }

    /// The local directory downloaded objects are written into
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// The directory upload paths are resolved against, if any.
    ///
    /// When `None` the request path is used as an absolute local path.
    pub fn upload_root(&self) -> Option<&Path> {
        self.upload_root.as_deref()
    }

    /// The S3 client instance that will be used to send requests to the object store.
    pub fn client(&self) -> &aws_sdk_s3::Client {
        &self.client
    }
}

/// Fluent style builder for [Config]
#[derive(Debug, Clone, Default)]
pub struct Builder {
    upload_bucket: Option<String>,
    region: Option<String>,
    download_dir: Option<PathBuf>,
    upload_root: Option<PathBuf>,
    client: Option<aws_sdk_s3::Client>,
}

impl Builder {
    /// Bucket every upload is written into.
    ///
    /// Default is `mymusic`.
    pub fn upload_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.upload_bucket = Some(bucket.into());
        self
    }

    /// Region used as the location constraint when creating the upload bucket.
    ///
    /// Default is `us-east-1`.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Directory downloaded objects are written into. Missing parents are created on demand.
    ///
    /// Default is `temp/download/`.
    pub fn download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = Some(dir.into());
        self
    }

    /// Resolve upload request paths relative to `root` and reject paths that escape it.
    pub fn upload_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.upload_root = Some(root.into());
        self
    }

    /// Set an explicit S3 client to use.
    pub fn client(mut self, client: aws_sdk_s3::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Consumes the builder and constructs a [`Config`](crate::config::Config)
    pub fn build(self) -> Result<Config, Error> {
        let client = self.client.ok_or_else(|| {
            aws_smithy_types::error::operation::BuildError::missing_field(
                "client",
                "an S3 client is required",
            )
        })?;

        let upload_bucket = BucketName::new(
            self.upload_bucket
                .unwrap_or_else(|| DEFAULT_UPLOAD_BUCKET.to_owned()),
        )?;

        Ok(Config {
            upload_bucket,
            region: self.region.unwrap_or_else(|| DEFAULT_REGION.to_owned()),
            download_dir: self
                .download_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DOWNLOAD_DIR)),
            upload_root: self.upload_root,
            client,
        })
    }
}
