/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::path::PathBuf;

use hyper::{Method, Request, Response, StatusCode};
use percent_encoding::percent_decode_str;
use serde_json::Value;

use crate::error::{self, Error};
use crate::http::{error_response, render_error, respond_with_json, Body};
use crate::Client;

/// Requests under this prefix are downloads, everything else is an upload
pub const DOWNLOAD_PREFIX: &str = "/download-file/";

/// Dispatch a request to the upload or download operation and render its outcome.
///
/// The request body is never read; uploads name a file already present on the server.
pub async fn route<B>(client: &Client, req: Request<B>) -> Response<Body> {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    tracing::debug!("{method} {path}");

    let result = match path.strip_prefix(DOWNLOAD_PREFIX) {
        Some(rest) => {
            if method != Method::GET {
                return render_error(Method::GET);
            }
            download(client, rest).await
        }
        None => {
            if method != Method::POST {
                return render_error(Method::POST);
            }
            upload(client, &path).await
        }
    };

    match result {
        Ok(message) => respond_with_json(StatusCode::OK, &Value::String(message)),
        Err(err) => error_response(&err),
    }
}

async fn upload(client: &Client, path: &str) -> Result<String, Error> {
    let local_path = PathBuf::from(decode(path)?);
    let output = client.upload().path(local_path).send().await?;
    Ok(output.message())
}

async fn download(client: &Client, rest: &str) -> Result<String, Error> {
    let (bucket, key) = parse_download_path(rest)?;
    let output = client.download().bucket(bucket).key(key).send().await?;
    Ok(output.message().to_owned())
}

/// Split the path after the download prefix into `(bucket, key)` using its last two segments
fn parse_download_path(rest: &str) -> Result<(String, String), Error> {
    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [.., bucket, key] => Ok((decode(bucket)?, decode(key)?)),
        _ => Err(error::invalid_input(format!(
            "expected {DOWNLOAD_PREFIX}<bucket>/<key>"
        ))),
    }
}

fn decode(segment: &str) -> Result<String, Error> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|err| error::invalid_input(format!("path is not valid UTF-8: {err}")))
}
