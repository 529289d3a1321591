/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;

use crate::error::{self, Error};

const MIN_BUCKET_NAME_LEN: usize = 3;
const MAX_BUCKET_NAME_LEN: usize = 63;
/// Keys become local file names, so they are held to the common file name limit
const MAX_OBJECT_KEY_LEN: usize = 255;

/// A validated bucket name.
///
/// Bucket names are taken from untrusted request paths so they are restricted to the S3 naming
/// rules: 3 to 63 characters of lowercase letters, digits, `.` and `-`, beginning and ending
/// with a letter or digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketName(String);

impl BucketName {
    /// Validate `name` and wrap it
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        if name.len() < MIN_BUCKET_NAME_LEN || name.len() > MAX_BUCKET_NAME_LEN {
            return Err(error::invalid_input(format!(
                "bucket name '{name}' must be between {MIN_BUCKET_NAME_LEN} and {MAX_BUCKET_NAME_LEN} characters"
            )));
        }

        let valid_char = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-';
        let valid_edge = |c: Option<char>| c.is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());

        if !name.chars().all(valid_char)
            || !valid_edge(name.chars().next())
            || !valid_edge(name.chars().last())
            || name.contains("..")
        {
            return Err(error::invalid_input(format!(
                "bucket name '{name}' contains invalid characters"
            )));
        }

        Ok(Self(name))
    }

    /// Returns the bucket name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BucketName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated object key.
///
/// Keys map one-to-one onto local file names, so a key is a single path segment of at most 255
/// bytes made of ASCII letters, digits, `.`, `_` and `-`. The special names `.` and `..` are
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Validate `key` and wrap it
    pub fn new(key: impl Into<String>) -> Result<Self, Error> {
        let key = key.into();
        if key.is_empty() || key.len() > MAX_OBJECT_KEY_LEN {
            return Err(error::invalid_input(format!(
                "object key must be between 1 and {MAX_OBJECT_KEY_LEN} bytes"
            )));
        }

        if key == "." || key == ".." {
            return Err(error::invalid_input(format!("object key '{key}' is reserved")));
        }

        let valid_char = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-');
        if !key.chars().all(valid_char) {
            return Err(error::invalid_input(format!(
                "object key '{key}' contains invalid characters"
            )));
        }

        Ok(Self(key))
    }

    /// Returns the object key
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Content type derived from the key's extension.
    ///
    /// This is `application/` followed by everything after the last `.`; a key without any
    /// `.` uses the whole key as the extension. It is not a MIME lookup.
    pub fn content_type(&self) -> String {
        let extension = self.0.rsplit('.').next().unwrap_or_default();
        format!("application/{extension}")
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
