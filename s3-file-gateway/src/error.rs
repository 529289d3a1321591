/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;

use aws_sdk_s3::error::SdkError;

/// A boxed error that is `Send` and `Sync`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by this library
///
/// The `Display` implementation only describes the [`ErrorKind`] so that it can be returned to
/// HTTP callers without leaking storage details. Use
/// [`aws_sdk_s3::error::DisplayErrorContext`] or similar to display the entire error
/// cause/source chain.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: BoxError,
}

/// General categories of gateway errors.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Request path, bucket name or object key failed validation
    InputInvalid,

    /// The object store could not be reached or the client could not be constructed
    StorageUnavailable,

    /// The upload bucket did not exist and could not be created
    BucketProvisionFailed,

    /// The requested bucket does not exist
    BucketNotFound,

    /// Checking whether a bucket exists failed
    BucketCheckFailed,

    /// The requested object does not exist
    ObjectNotFound,

    /// Sending or receiving object data failed
    TransferFailed,

    /// Local filesystem errors
    IOError,
}

impl Error {
    /// Creates a new gateway [`Error`] from a known kind of error as well as an arbitrary error
    /// source.
    pub fn new<E>(kind: ErrorKind, err: E) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            kind,
            source: err.into(),
        }
    }

    /// Returns the corresponding [`ErrorKind`] for this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::InputInvalid => write!(f, "invalid input"),
            ErrorKind::StorageUnavailable => write!(f, "storage unavailable"),
            ErrorKind::BucketProvisionFailed => write!(f, "failed to provision bucket"),
            ErrorKind::BucketNotFound => write!(f, "bucket does not exist"),
            ErrorKind::BucketCheckFailed => write!(f, "failed to check bucket existence"),
            ErrorKind::ObjectNotFound => write!(f, "object not found"),
            ErrorKind::TransferFailed => write!(f, "object transfer failed"),
            ErrorKind::IOError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::new(ErrorKind::IOError, value)
    }
}

impl From<aws_smithy_types::error::operation::BuildError> for Error {
    fn from(value: aws_smithy_types::error::operation::BuildError) -> Self {
        Self::new(ErrorKind::InputInvalid, value)
    }
}

pub(crate) fn invalid_input<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::InputInvalid, err)
}

pub(crate) fn storage_unavailable<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::StorageUnavailable, err)
}

/// Classify an SDK error that carries no operation specific meaning.
///
/// Requests that never produced a response (connector failures, timeouts) mean the store is
/// unreachable; everything else is reported as `kind`.
pub(crate) fn from_sdk_error<E, R>(kind: ErrorKind, err: SdkError<E, R>) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
    R: fmt::Debug + Send + Sync + 'static,
{
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => storage_unavailable(err),
        err => Error::new(kind, err),
    }
}
