/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_smithy_types::error::operation::BuildError;

/// Request type for downloading a single object
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadInput {
    /// <p>The bucket name containing the object.</p>
    pub bucket: String,

    /// <p>Key of the object to get. The key is also the name of the local file written.</p>
    pub key: String,
}

impl DownloadInput {
    /// Creates a new builder-style object to manufacture [`DownloadInput`](crate::operation::download::DownloadInput).
    pub fn builder() -> DownloadInputBuilder {
        DownloadInputBuilder::default()
    }

    /// The bucket name containing the object.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Key of the object to get.
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// A builder for [`DownloadInput`](crate::operation::download::DownloadInput).
#[non_exhaustive]
#[derive(Clone, Default, Debug, PartialEq)]
pub struct DownloadInputBuilder {
    pub(crate) bucket: Option<String>,
    pub(crate) key: Option<String>,
}

impl DownloadInputBuilder {
    /// The bucket name containing the object.
    ///
    /// This field is required.
    pub fn bucket(mut self, input: impl Into<String>) -> Self {
        self.bucket = Some(input.into());
        self
    }

    /// The bucket name containing the object.
    pub fn set_bucket(mut self, input: Option<String>) -> Self {
        self.bucket = input;
        self
    }

    /// The bucket name containing the object.
    pub fn get_bucket(&self) -> &Option<String> {
        &self.bucket
    }

    /// Key of the object to get.
    ///
    /// This field is required.
    pub fn key(mut self, input: impl Into<String>) -> Self {
        self.key = Some(input.into());
        self
    }

    /// Key of the object to get.
    pub fn set_key(mut self, input: Option<String>) -> Self {
        self.key = input;
        self
    }

    /// Key of the object to get.
    pub fn get_key(&self) -> &Option<String> {
        &self.key
    }

    /// Consumes the builder and constructs a [`DownloadInput`](crate::operation::download::DownloadInput).
    pub fn build(self) -> Result<DownloadInput, BuildError> {
        let bucket = self
            .bucket
            .ok_or_else(|| BuildError::missing_field("bucket", "a bucket name is required"))?;
        let key = self
            .key
            .ok_or_else(|| BuildError::missing_field("key", "an object key is required"))?;
        Ok(DownloadInput { bucket, key })
    }
}
