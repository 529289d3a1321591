/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_sdk_s3::config::{Credentials, Region};

use crate::error::{self, Error};

/// Name reported by the static credentials provider
const CREDENTIALS_PROVIDER_NAME: &str = "s3-file-gateway";

/// Default MinIO endpoint
pub const DEFAULT_ENDPOINT: &str = "127.0.0.1:9000";

/// Default MinIO access key
pub const DEFAULT_ACCESS_KEY: &str = "minioadmin";

/// Default MinIO secret key
pub const DEFAULT_SECRET_KEY: &str = "minioadmin";

/// Default region used for signing and bucket creation
pub const DEFAULT_REGION: &str = "us-east-1";

/// Coordinates and static credentials of the object store.
#[derive(Clone)]
pub struct StorageEndpoint {
    endpoint: String,
    access_key_id: String,
    secret_access_key: String,
    use_ssl: bool,
    region: String,
}

impl std::fmt::Debug for StorageEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEndpoint")
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("use_ssl", &self.use_ssl)
            .field("region", &self.region)
            .finish()
    }
}

impl Default for StorageEndpoint {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            access_key_id: DEFAULT_ACCESS_KEY.to_owned(),
            secret_access_key: DEFAULT_SECRET_KEY.to_owned(),
            use_ssl: false,
            region: DEFAULT_REGION.to_owned(),
        }
    }
}

impl StorageEndpoint {
    /// Set the endpoint, either `host:port` or a full `http(s)://` URL
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the static access key id
    pub fn access_key_id(mut self, access_key_id: impl Into<String>) -> Self {
        self.access_key_id = access_key_id.into();
        self
    }

    /// Set the static secret access key
    pub fn secret_access_key(mut self, secret_access_key: impl Into<String>) -> Self {
        self.secret_access_key = secret_access_key.into();
        self
    }

    /// Use `https` when the endpoint is given without a scheme
    pub fn use_ssl(mut self, use_ssl: bool) -> Self {
        self.use_ssl = use_ssl;
        self
    }

    /// Set the signing region
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Returns the signing region
    pub fn region_name(&self) -> &str {
        &self.region
    }

    /// Resolve the endpoint to a URL the S3 client can use.
    pub fn endpoint_url(&self) -> Result<String, Error> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(error::storage_unavailable("storage endpoint is empty"));
        }

        let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_owned()
        } else {
            let scheme = if self.use_ssl { "https" } else { "http" };
            format!("{scheme}://{endpoint}")
        };

        let uri: hyper::Uri = url.parse().map_err(|err| {
            error::storage_unavailable(format!("malformed storage endpoint '{endpoint}': {err}"))
        })?;

        match uri.authority() {
            Some(authority) if !authority.host().is_empty() => {}
            _ => {
                return Err(error::storage_unavailable(format!(
                    "storage endpoint '{endpoint}' has no host"
                )))
            }
        }

        if uri.path() != "/" && !uri.path().is_empty() {
            return Err(error::storage_unavailable(format!(
                "storage endpoint '{endpoint}' must not contain a path"
            )));
        }

        Ok(url.trim_end_matches('/').to_owned())
    }
}

/// Build a reusable S3 client for the given endpoint.
///
/// The client uses path style addressing and static credentials. No request is sent, so an
/// unreachable store is only detected by the first operation.
pub async fn connect(endpoint: &StorageEndpoint) -> Result<aws_sdk_s3::Client, Error> {
    let endpoint_url = endpoint.endpoint_url()?;
    if endpoint.access_key_id.is_empty() || endpoint.secret_access_key.is_empty() {
        return Err(error::storage_unavailable(
            "storage credentials must not be empty",
        ));
    }

    let shared_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .credentials_provider(Credentials::new(
            endpoint.access_key_id.clone(),
            endpoint.secret_access_key.clone(),
            None,
            None,
            CREDENTIALS_PROVIDER_NAME,
        ))
        .region(Region::new(endpoint.region.clone()))
        .endpoint_url(&endpoint_url)
        .load()
        .await;

    let config = aws_sdk_s3::config::Builder::from(&shared_config)
        .force_path_style(true)
        .build();

    tracing::debug!("storage client configured for {endpoint_url}");
    Ok(aws_sdk_s3::Client::from_conf(config))
}
