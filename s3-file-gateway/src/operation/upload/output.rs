/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/// Response type for a local file upload
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutput {
    /// Bucket the object was written to
    pub bucket: String,

    /// Key of the uploaded object (the local file's base name)
    pub key: String,

    /// Content type the object was stored with
    pub content_type: String,

    /// Number of bytes uploaded
    pub size: u64,

    /// Entity tag for the uploaded object
    pub e_tag: Option<String>,
}

impl UploadOutput {
    /// Bucket the object was written to
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Key of the uploaded object
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Content type the object was stored with
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Number of bytes uploaded
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Entity tag for the uploaded object
    pub fn e_tag(&self) -> Option<&str> {
        self.e_tag.as_deref()
    }

    /// Human readable status returned to HTTP callers
    pub fn message(&self) -> String {
        format!("Successfully uploaded {} of size {}\n", self.key, self.size)
    }
}
