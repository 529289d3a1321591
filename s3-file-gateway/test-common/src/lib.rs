/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_sdk_s3::operation::create_bucket::CreateBucketOutput;
use aws_sdk_s3::operation::get_object::GetObjectOutput;
use aws_sdk_s3::operation::head_bucket::HeadBucketOutput;
use aws_sdk_s3::primitives::ByteStream;
use aws_smithy_mocks_experimental::{mock, mock_client, Rule, RuleMode};
use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
use aws_smithy_runtime_api::http::StatusCode;
use bytes::Bytes;

/// Create a temporary directory containing files with the sizes specified in `files`.
///
/// File paths are relative to the returned directory and missing parent directories are
/// created. Each file is filled with `b'x'`.
pub fn create_test_dir(files: Vec<(&str, usize)>) -> tempfile::TempDir {
    let temp_dir = tempfile::tempdir().unwrap();

    for (path, size) in files {
        let full_path = temp_dir.path().join(path);
        let parent = full_path.parent().unwrap();

        // Create the parent directories if they don't exist
        std::fs::create_dir_all(parent).unwrap();

        std::fs::write(&full_path, vec![b'x'; size]).unwrap();
    }

    temp_dir
}

/// A client whose rules are never expected to be hit.
///
/// Useful wherever a gateway config needs a client but the test never reaches the object store.
pub fn idle_client() -> aws_sdk_s3::Client {
    let head_bucket =
        mock!(aws_sdk_s3::Client::head_bucket).then_output(|| HeadBucketOutput::builder().build());
    mock_client!(aws_sdk_s3, RuleMode::MatchAny, &[&head_bucket])
}

/// Rule answering `CreateBucket` for `bucket` with success
pub fn create_bucket_rule(bucket: &'static str) -> Rule {
    mock!(aws_sdk_s3::Client::create_bucket)
        .match_requests(move |r| r.bucket() == Some(bucket))
        .then_output(|| CreateBucketOutput::builder().build())
}

/// Rule answering `HeadBucket` for `bucket` with success
pub fn head_bucket_rule(bucket: &'static str) -> Rule {
    mock!(aws_sdk_s3::Client::head_bucket)
        .match_requests(move |r| r.bucket() == Some(bucket))
        .then_output(|| HeadBucketOutput::builder().build())
}

/// Rule answering `GetObject` for `key` with `contents`
pub fn get_object_rule(key: &'static str, contents: impl Into<Bytes>) -> Rule {
    let contents: Bytes = contents.into();
    mock!(aws_sdk_s3::Client::get_object)
        .match_requests(move |r| r.key() == Some(key))
        .then_output(move || {
            GetObjectOutput::builder()
                .content_length(contents.len() as i64)
                .body(ByteStream::from(contents.clone()))
                .build()
        })
}

/// An S3 error response with the given HTTP status and error code.
///
/// The SDK parses this exactly like a response from a real service, so operations surface the
/// matching modeled error (e.g. `NoSuchKey`, `NotFound`) or a generic one for unmodeled codes.
pub fn s3_error_response(status: u16, code: &str) -> HttpResponse {
    let body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <Error><Code>{code}</Code><Message>{code}</Message><RequestId>test-request</RequestId></Error>"
    );
    HttpResponse::new(
        StatusCode::try_from(status).unwrap(),
        Bytes::from(body).into(),
    )
}
