/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/// Operation builders
pub mod builders;
mod input;
mod output;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use path_clean::PathClean;

use crate::error::{self, Error, ErrorKind};
use crate::storage::DEFAULT_REGION;
use crate::types::{BucketName, ObjectKey};

/// Request type for local file uploads
pub use input::{UploadInput, UploadInputBuilder};
/// Response type for local file uploads
pub use output::UploadOutput;

/// Operation struct for a local file upload
#[derive(Clone, Default, Debug)]
pub(crate) struct Upload;

impl Upload {
    /// Execute a single `Upload` operation
    pub(crate) async fn orchestrate(
        handle: Arc<crate::client::Handle>,
        input: UploadInput,
    ) -> Result<UploadOutput, Error> {
        let config = &handle.config;
        let path = resolve_local_path(config.upload_root(), input.path())?;
        let key = object_key_for(&path)?;
        let size = local_file_size(&path).await?;

        let bucket = config.upload_bucket();
        ensure_bucket(handle.client(), bucket, config.region()).await?;

        let content_type = key.content_type();
        tracing::debug!(
            "uploading {} to {bucket}/{key} ({size} bytes, {content_type})",
            path.display()
        );

        let body = ByteStream::from_path(&path)
            .await
            .map_err(|err| Error::new(ErrorKind::IOError, err))?;
        let content_length: i64 = size
            .try_into()
            .map_err(|_| error::invalid_input(format!("file size {size} is too large")))?;

        let resp = handle
            .client()
            .put_object()
            .bucket(bucket.as_str())
            .key(key.as_str())
            .content_type(&content_type)
            .content_length(content_length)
            .body(body)
            .send()
            .await
            .map_err(|err| error::from_sdk_error(ErrorKind::TransferFailed, err))?;

        tracing::info!("successfully uploaded {key} of size {size}");

        Ok(UploadOutput {
            bucket: bucket.to_string(),
            key: key.to_string(),
            content_type,
            size,
            e_tag: resp.e_tag,
        })
    }
}

/// Resolve the requested path to the local file to upload.
///
/// Without a root the request path must be absolute. With a root it is joined onto the root
/// and must not resolve outside of it. Both forms are lexically cleaned.
fn resolve_local_path(root: Option<&Path>, requested: &Path) -> Result<PathBuf, Error> {
    let Some(root) = root else {
        if !requested.is_absolute() {
            return Err(error::invalid_input(format!(
                "upload path '{}' must be absolute",
                requested.display()
            )));
        }
        return Ok(requested.clean());
    };

    let root = root.clean();
    let relative = requested.strip_prefix("/").unwrap_or(requested);
    let local_path = root.join(relative).clean();

    // validate the resolved path doesn't resolve outside the upload root
    if !local_path.starts_with(&root) || local_path == root {
        return Err(error::invalid_input(format!(
            "upload path '{}' resolves outside the upload root",
            requested.display()
        )));
    }

    Ok(local_path)
}

/// The object key for a local file is its base name
fn object_key_for(path: &Path) -> Result<ObjectKey, Error> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            error::invalid_input(format!("'{}' does not name a file", path.display()))
        })?;
    ObjectKey::new(file_name)
}

async fn local_file_size(path: &Path) -> Result<u64, Error> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(error::invalid_input(format!(
                "local file '{}' does not exist",
                path.display()
            )))
        }
        Err(err) => return Err(err.into()),
    };

    if !metadata.is_file() {
        return Err(error::invalid_input(format!(
            "'{}' is not a regular file",
            path.display()
        )));
    }

    Ok(metadata.len())
}

/// Create `bucket` unless it already exists and is ours.
async fn ensure_bucket(
    client: &aws_sdk_s3::Client,
    bucket: &BucketName,
    region: &str,
) -> Result<(), Error> {
    // us-east-1 is the implied location, S3 rejects it as an explicit constraint
    let configuration = (region != DEFAULT_REGION).then(|| {
        CreateBucketConfiguration::builder()
            .location_constraint(BucketLocationConstraint::from(region))
            .build()
    });

    let create_err = match client
        .create_bucket()
        .bucket(bucket.as_str())
        .set_create_bucket_configuration(configuration)
        .send()
        .await
    {
        Ok(_) => {
            tracing::info!("successfully created {bucket}");
            return Ok(());
        }
        Err(err) => err,
    };

    if create_err
        .as_service_error()
        .is_some_and(|err| err.is_bucket_already_owned_by_you())
    {
        tracing::info!("we already own {bucket}");
        return Ok(());
    }

    // creation can fail for reasons that still leave us with a usable bucket
    match client.head_bucket().bucket(bucket.as_str()).send().await {
        Ok(_) => {
            tracing::info!("we already own {bucket}");
            Ok(())
        }
        Err(head_err) => {
            tracing::debug!(
                "bucket {bucket} is not accessible after failed create: {}",
                DisplayErrorContext(&head_err)
            );
            Err(error::from_sdk_error(
                ErrorKind::BucketProvisionFailed,
                create_err,
            ))
        }
    }
}

#[cfg(test)]
mod test {
    use super::{object_key_for, resolve_local_path};
    use crate::error::ErrorKind;
    use crate::operation::upload::UploadInput;
    use aws_sdk_s3::operation::put_object::PutObjectOutput;
    use aws_smithy_mocks_experimental::{mock, mock_client, RuleMode};
    use std::path::{Path, PathBuf};
    use test_common::{create_bucket_rule, create_test_dir, head_bucket_rule, s3_error_response};

    fn test_client(s3: aws_sdk_s3::Client) -> crate::Client {
        let config = crate::Config::builder().client(s3).build().unwrap();
        crate::Client::new(config)
    }

    #[test]
    fn test_resolve_without_root() {
        assert_eq!(
            PathBuf::from("/srv/media/song.mp3"),
            resolve_local_path(None, Path::new("/srv/media/./extra/../song.mp3")).unwrap()
        );

        let err = resolve_local_path(None, Path::new("relative/song.mp3")).unwrap_err();
        assert_eq!(&ErrorKind::InputInvalid, err.kind());
    }

    #[test]
    fn test_resolve_with_root() {
        let root = Some(Path::new("/srv/media"));
        assert_eq!(
            PathBuf::from("/srv/media/albums/song.mp3"),
            resolve_local_path(root, Path::new("/albums/song.mp3")).unwrap()
        );

        for escape in ["/../etc/passwd", "/albums/../../etc/passwd", "/"] {
            let err = resolve_local_path(root, Path::new(escape)).unwrap_err();
            assert_eq!(&ErrorKind::InputInvalid, err.kind(), "{escape}");
        }
    }

    #[test]
    fn test_object_key_is_base_name() {
        let key = object_key_for(Path::new("/srv/media/albums/song.mp3")).unwrap();
        assert_eq!("song.mp3", key.as_str());
        assert_eq!("application/mp3", key.content_type());

        let err = object_key_for(Path::new("/srv/media/bad name.mp3")).unwrap_err();
        assert_eq!(&ErrorKind::InputInvalid, err.kind());
    }

    #[tokio::test]
    async fn test_basic_upload() {
        let dir = create_test_dir(vec![("song.mp3", 42)]);
        let path = dir.path().join("song.mp3");

        let create_bucket = create_bucket_rule("mymusic");
        let put_object = mock!(aws_sdk_s3::Client::put_object)
            .match_requests(|r| {
                r.bucket() == Some("mymusic")
                    && r.key() == Some("song.mp3")
                    && r.content_type() == Some("application/mp3")
                    && r.content_length() == Some(42)
            })
            .then_output(|| PutObjectOutput::builder().e_tag("test-etag").build());

        let client = mock_client!(
            aws_sdk_s3,
            RuleMode::MatchAny,
            &[&create_bucket, &put_object]
        );
        let tm = test_client(client);

        let resp = UploadInput::builder()
            .path(&path)
            .send_with(&tm)
            .await
            .unwrap();

        assert_eq!("mymusic", resp.bucket());
        assert_eq!("song.mp3", resp.key());
        assert_eq!(42, resp.size());
        assert_eq!(Some("test-etag"), resp.e_tag());
        assert_eq!("Successfully uploaded song.mp3 of size 42\n", resp.message());
        assert_eq!(1, put_object.num_calls());
    }

    #[tokio::test]
    async fn test_upload_with_bucket_already_owned() {
        let dir = create_test_dir(vec![("notes.txt", 7)]);
        let path = dir.path().join("notes.txt");

        let create_bucket = mock!(aws_sdk_s3::Client::create_bucket)
            .then_http_response(|| s3_error_response(409, "BucketAlreadyOwnedByYou"));
        let put_object = mock!(aws_sdk_s3::Client::put_object)
            .then_output(|| PutObjectOutput::builder().build());

        let client = mock_client!(
            aws_sdk_s3,
            RuleMode::MatchAny,
            &[&create_bucket, &put_object]
        );
        let tm = test_client(client);

        let resp = tm.upload().path(&path).send().await.unwrap();
        assert_eq!("application/txt", resp.content_type());
        assert_eq!(1, put_object.num_calls());
    }

    #[tokio::test]
    async fn test_upload_with_failed_create_but_existing_bucket() {
        let dir = create_test_dir(vec![("notes.txt", 7)]);
        let path = dir.path().join("notes.txt");

        let create_bucket = mock!(aws_sdk_s3::Client::create_bucket)
            .then_http_response(|| s3_error_response(409, "BucketAlreadyExists"));
        let head_bucket = head_bucket_rule("mymusic");
        let put_object = mock!(aws_sdk_s3::Client::put_object)
            .then_output(|| PutObjectOutput::builder().build());

        let client = mock_client!(
            aws_sdk_s3,
            RuleMode::MatchAny,
            &[&create_bucket, &head_bucket, &put_object]
        );
        let tm = test_client(client);

        tm.upload().path(&path).send().await.unwrap();
        assert_eq!(1, head_bucket.num_calls());
        assert_eq!(1, put_object.num_calls());
    }

    #[tokio::test]
    async fn test_upload_bucket_provision_failure() {
        let dir = create_test_dir(vec![("notes.txt", 7)]);
        let path = dir.path().join("notes.txt");

        let create_bucket = mock!(aws_sdk_s3::Client::create_bucket)
            .then_http_response(|| s3_error_response(403, "AccessDenied"));
        let head_bucket = mock!(aws_sdk_s3::Client::head_bucket)
            .then_http_response(|| s3_error_response(404, "NotFound"));
        let put_object = mock!(aws_sdk_s3::Client::put_object)
            .then_output(|| PutObjectOutput::builder().build());

        let client = mock_client!(
            aws_sdk_s3,
            RuleMode::MatchAny,
            &[&create_bucket, &head_bucket, &put_object]
        );
        let tm = test_client(client);

        let err = tm.upload().path(&path).send().await.unwrap_err();
        assert_eq!(&ErrorKind::BucketProvisionFailed, err.kind());
        assert_eq!(0, put_object.num_calls());
    }

    #[tokio::test]
    async fn test_upload_missing_local_file_does_not_touch_storage() {
        let dir = create_test_dir(vec![]);
        let path = dir.path().join("missing.mp3");

        let create_bucket = create_bucket_rule("mymusic");
        let client = mock_client!(aws_sdk_s3, RuleMode::MatchAny, &[&create_bucket]);
        let tm = test_client(client);

        let err = tm.upload().path(&path).send().await.unwrap_err();
        assert_eq!(&ErrorKind::InputInvalid, err.kind());
        assert_eq!(0, create_bucket.num_calls());
    }

    #[tokio::test]
    async fn test_upload_uses_region_constraint() {
        let dir = create_test_dir(vec![("clip.mp4", 3)]);
        let path = dir.path().join("clip.mp4");

        let create_bucket = mock!(aws_sdk_s3::Client::create_bucket)
            .match_requests(|r| {
                r.create_bucket_configuration()
                    .and_then(|c| c.location_constraint())
                    .map(|c| c.as_str())
                    == Some("eu-west-1")
            })
            .then_output(|| {
                aws_sdk_s3::operation::create_bucket::CreateBucketOutput::builder().build()
            });
        let put_object = mock!(aws_sdk_s3::Client::put_object)
            .then_output(|| PutObjectOutput::builder().build());

        let client = mock_client!(
            aws_sdk_s3,
            RuleMode::MatchAny,
            &[&create_bucket, &put_object]
        );
        let config = crate::Config::builder()
            .client(client)
            .region("eu-west-1")
            .build()
            .unwrap();
        let tm = crate::Client::new(config);

        tm.upload().path(&path).send().await.unwrap();
        assert_eq!(1, create_bucket.num_calls());
    }
}
