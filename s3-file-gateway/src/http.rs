/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::error::Error as _;

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use hyper::{Method, Response, StatusCode};
use serde_json::{json, Value};

use crate::error::{Error, ErrorKind};

/// Body type of every response produced by the gateway
pub type Body = Full<Bytes>;

/// Status used for requests made with the wrong method.
///
/// Existing clients expect `400` rather than `405`.
pub const METHOD_ERROR_STATUS: StatusCode = StatusCode::BAD_REQUEST;

/// Plain text body of a method error
pub const METHOD_NOT_ALLOWED: &str = "METHOD_NOT_ALLOWED";

/// Serialize `payload` as the JSON body of a response with `status`
pub fn respond_with_json(status: StatusCode, payload: &Value) -> Response<Body> {
    let body = match serde_json::to_vec(payload) {
        Ok(body) => body,
        Err(err) => {
            tracing::error!("failed to serialize response: {err}");
            return internal_error();
        }
    };

    let mut resp = Response::new(Full::new(Bytes::from(body)));
    *resp.status_mut() = status;
    resp.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    resp
}

/// JSON error response of the form `{"error": message}`
pub fn respond_with_error(status: StatusCode, message: &str) -> Response<Body> {
    respond_with_json(status, &json!({ "error": message }))
}

/// Plain text method error naming the method the route accepts
pub fn render_error(allow: Method) -> Response<Body> {
    let mut resp = Response::new(Full::new(Bytes::from_static(METHOD_NOT_ALLOWED.as_bytes())));
    *resp.status_mut() = METHOD_ERROR_STATUS;
    resp.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    if let Ok(allow) = HeaderValue::from_str(allow.as_str()) {
        resp.headers_mut().insert(ALLOW, allow);
    }
    resp
}

/// HTTP status reported for a failed operation
pub fn status_for(kind: &ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::BucketProvisionFailed => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

/// Message reported to the caller for a failed operation.
///
/// Only input errors carry their detail; anything from the object store is reduced to the
/// error kind.
pub fn client_message(err: &Error) -> String {
    match (err.kind(), err.source()) {
        (ErrorKind::InputInvalid, Some(source)) => format!("{err}: {source}"),
        _ => err.to_string(),
    }
}

/// Log `err` with its full source chain and convert it into a JSON error response
pub fn error_response(err: &Error) -> Response<Body> {
    let status = status_for(err.kind());
    if status.is_server_error() {
        tracing::error!("request failed: {}", aws_sdk_s3::error::DisplayErrorContext(err));
    } else {
        tracing::warn!("request failed: {}", aws_sdk_s3::error::DisplayErrorContext(err));
    }
    respond_with_error(status, &client_message(err))
}

fn internal_error() -> Response<Body> {
    let mut resp = Response::new(Full::new(Bytes::new()));
    *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    resp
}
