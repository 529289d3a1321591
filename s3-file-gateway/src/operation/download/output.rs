/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::path::{Path, PathBuf};

/// Status message returned to HTTP callers for a completed download
pub const DOWNLOAD_COMPLETE_MESSAGE: &str = "File Downloaded Successfully";

/// Response type for a single object download
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadOutput {
    /// Bucket the object was read from
    pub bucket: String,

    /// Key of the downloaded object
    pub key: String,

    /// Local file the object was written to
    pub path: PathBuf,

    /// Number of bytes written
    pub size: u64,
}

impl DownloadOutput {
    /// Bucket the object was read from
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Key of the downloaded object
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Local file the object was written to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of bytes written
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Human readable status returned to HTTP callers
    pub fn message(&self) -> &'static str {
        DOWNLOAD_COMPLETE_MESSAGE
    }
}
