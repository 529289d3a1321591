/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::path::{Path, PathBuf};

use aws_smithy_types::error::operation::BuildError;

/// Request type for uploading a local file
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct UploadInput {
    /// <p>Local path of the file to upload.</p>
    /// <p>Without an upload root this is an absolute path, otherwise it is resolved relative to
    /// the root. The file's base name becomes the object key.</p>
    pub path: PathBuf,
}

impl UploadInput {
    /// Creates a new builder-style object to manufacture [`UploadInput`](crate::operation::upload::UploadInput).
    pub fn builder() -> UploadInputBuilder {
        UploadInputBuilder::default()
    }

    /// Local path of the file to upload
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A builder for [`UploadInput`](crate::operation::upload::UploadInput).
#[non_exhaustive]
#[derive(Clone, Default, Debug, PartialEq)]
pub struct UploadInputBuilder {
    pub(crate) path: Option<PathBuf>,
}

impl UploadInputBuilder {
    /// Local path of the file to upload
    ///
    /// This field is required.
    pub fn path(mut self, input: impl Into<PathBuf>) -> Self {
        self.path = Some(input.into());
        self
    }

    /// Local path of the file to upload
    pub fn set_path(mut self, input: Option<PathBuf>) -> Self {
        self.path = input;
        self
    }

    /// Local path of the file to upload
    pub fn get_path(&self) -> &Option<PathBuf> {
        &self.path
    }

    /// Consumes the builder and constructs a [`UploadInput`](crate::operation::upload::UploadInput).
    pub fn build(self) -> Result<UploadInput, BuildError> {
        let path = self
            .path
            .ok_or_else(|| BuildError::missing_field("path", "a local file path is required"))?;

        if path.as_os_str().is_empty() {
            return Err(BuildError::invalid_field("path", "path must not be empty"));
        }

        Ok(UploadInput { path })
    }
}
