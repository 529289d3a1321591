/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! S3 File Gateway
//!
//! A small HTTP service that moves files between the local filesystem and an
//! S3-compatible object store (MinIO by default).
//!
//! * `POST /<path/to/local/file>` uploads a server-local file into the configured
//!   upload bucket, keyed by the file's base name.
//! * `GET /download-file/<bucket>/<key>` fetches an object and writes it into the
//!   configured download directory.

#![warn(
    missing_debug_implementations,
    missing_docs,
    rustdoc::missing_crate_level_docs,
    unreachable_pub,
    rust_2018_idioms
)]

/// Error types emitted by `s3-file-gateway`
pub mod error;

/// Common types used by `s3-file-gateway`
pub mod types;

/// Gateway configuration
pub mod config;

/// Connection to the object store
pub mod storage;

/// Gateway client
pub mod client;

/// Gateway operations
pub mod operation;

/// HTTP response helpers
pub mod http;

/// HTTP server
pub mod server;

pub use self::client::Client;
pub use self::config::Config;
