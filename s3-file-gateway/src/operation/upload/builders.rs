/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Error;

use super::{UploadInputBuilder, UploadOutput};

/// Fluent builder for constructing a local file upload
#[derive(Debug)]
pub struct UploadFluentBuilder {
    handle: Arc<crate::client::Handle>,
    inner: UploadInputBuilder,
}

impl UploadFluentBuilder {
    pub(crate) fn new(handle: Arc<crate::client::Handle>) -> Self {
        Self {
            handle,
            inner: ::std::default::Default::default(),
        }
    }

    /// Upload the file and wait for the object store to acknowledge it
    pub async fn send(self) -> Result<UploadOutput, Error> {
        let input = self.inner.build()?;
        crate::operation::upload::Upload::orchestrate(self.handle, input).await
    }

    /// Local path of the file to upload
    ///
    /// This field is required.
    pub fn path(mut self, input: impl Into<PathBuf>) -> Self {
        self.inner = self.inner.path(input);
        self
    }

    /// Local path of the file to upload
    pub fn set_path(mut self, input: Option<PathBuf>) -> Self {
        self.inner = self.inner.set_path(input);
        self
    }

    /// Local path of the file to upload
    pub fn get_path(&self) -> &Option<PathBuf> {
        self.inner.get_path()
    }
}

impl crate::operation::upload::input::UploadInputBuilder {
    /// Upload the file with this input using the given client.
    pub async fn send_with(self, client: &crate::Client) -> Result<UploadOutput, Error> {
        let mut fluent_builder = client.upload();
        fluent_builder.inner = self;
        fluent_builder.send().await
    }
}
