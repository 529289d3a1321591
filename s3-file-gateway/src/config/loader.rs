/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::path::PathBuf;

use crate::config::Builder;
use crate::error::Error;
use crate::storage::{self, StorageEndpoint};
use crate::Config;

/// Load gateway [`Config`] and connect to the object store.
///
/// Every setting defaults to the local MinIO development setup: endpoint `127.0.0.1:9000`,
/// credentials `minioadmin`/`minioadmin`, no TLS, region `us-east-1`, upload bucket `mymusic`
/// and download directory `temp/download/`.
#[derive(Default, Debug)]
pub struct ConfigLoader {
    storage: StorageEndpoint,
    builder: Builder,
}

impl ConfigLoader {
    /// Object store endpoint, either `host:port` or a full `http(s)://` URL
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.storage = self.storage.endpoint(endpoint);
        self
    }

    /// Static access key id
    pub fn access_key_id(mut self, access_key_id: impl Into<String>) -> Self {
        self.storage = self.storage.access_key_id(access_key_id);
        self
    }

    /// Static secret access key
    pub fn secret_access_key(mut self, secret_access_key: impl Into<String>) -> Self {
        self.storage = self.storage.secret_access_key(secret_access_key);
        self
    }

    /// Use TLS when the endpoint has no explicit scheme
    pub fn use_ssl(mut self, use_ssl: bool) -> Self {
        self.storage = self.storage.use_ssl(use_ssl);
        self
    }

    /// Region used both for request signing and as the upload bucket's location
    pub fn region(mut self, region: impl Into<String>) -> Self {
        let region = region.into();
        self.storage = self.storage.region(region.clone());
        self.builder = self.builder.region(region);
        self
    }

    /// Bucket every upload is written into
    pub fn upload_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.builder = self.builder.upload_bucket(bucket);
        self
    }

    /// Directory downloaded objects are written into
    pub fn download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.builder = self.builder.download_dir(dir);
        self
    }

    /// Resolve upload paths relative to `root` instead of as absolute paths
    pub fn upload_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.builder = self.builder.upload_root(root);
        self
    }

    /// Load the configuration
    ///
    /// If fields have been overridden during builder construction, the override values will be
    /// used. Otherwise, the default values for each field will be provided.
    pub async fn load(self) -> Result<Config, Error> {
        let client = storage::connect(&self.storage).await?;
        self.builder.client(client).build()
    }
}
