/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/// Operation builders
pub mod builders;
mod input;
mod output;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use tokio::io::AsyncWriteExt;

use crate::error::{self, Error, ErrorKind};
use crate::types::{BucketName, ObjectKey};

/// Request type for downloading a single object
pub use input::{DownloadInput, DownloadInputBuilder};
/// Response type for downloading a single object
pub use output::{DownloadOutput, DOWNLOAD_COMPLETE_MESSAGE};

/// Operation struct for single object download
#[derive(Clone, Default, Debug)]
pub(crate) struct Download;

impl Download {
    /// Execute a single `Download` operation
    ///
    /// The object is streamed into a hidden part file next to its destination and renamed into
    /// place once every byte has been written, so a failed transfer never leaves a truncated
    /// file under the object's name.
    pub(crate) async fn orchestrate(
        handle: Arc<crate::client::Handle>,
        input: DownloadInput,
    ) -> Result<DownloadOutput, Error> {
        let bucket = BucketName::new(input.bucket)?;
        let key = ObjectKey::new(input.key)?;

        check_bucket_exists(handle.client(), &bucket).await?;

        let resp = handle
            .client()
            .get_object()
            .bucket(bucket.as_str())
            .key(key.as_str())
            .send()
            .await
            .map_err(|err| match err.as_service_error() {
                Some(service_err) if service_err.is_no_such_key() => {
                    Error::new(ErrorKind::ObjectNotFound, err)
                }
                _ => error::from_sdk_error(ErrorKind::TransferFailed, err),
            })?;

        let expected_len = match resp.content_length {
            Some(len) => Some(len),
            None => object_size(handle.client(), &bucket, &key).await?,
        };

        let download_dir = handle.config.download_dir();
        tokio::fs::create_dir_all(download_dir).await?;

        let dest = download_dir.join(key.as_str());
        let part = part_path(download_dir);
        tracing::debug!("downloading {bucket}/{key} to {}", part.display());

        let size = match write_part(&part, resp.body, expected_len).await {
            Ok(size) => size,
            Err(err) => {
                discard_part(&part).await;
                return Err(err);
            }
        };

        if let Err(err) = tokio::fs::rename(&part, &dest).await {
            discard_part(&part).await;
            return Err(err.into());
        }

        tracing::info!("downloaded {bucket}/{key} ({size} bytes) to {}", dest.display());

        Ok(DownloadOutput {
            bucket: bucket.to_string(),
            key: key.to_string(),
            path: dest,
            size,
        })
    }
}

async fn check_bucket_exists(
    client: &aws_sdk_s3::Client,
    bucket: &BucketName,
) -> Result<(), Error> {
    match client.head_bucket().bucket(bucket.as_str()).send().await {
        Ok(_) => Ok(()),
        Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => {
            Err(Error::new(ErrorKind::BucketNotFound, err))
        }
        Err(err) => {
            tracing::debug!(
                "failed to check bucket {bucket}: {}",
                DisplayErrorContext(&err)
            );
            Err(error::from_sdk_error(ErrorKind::BucketCheckFailed, err))
        }
    }
}

/// Size of the object according to `HeadObject`, used when `GetObject` omits its length
async fn object_size(
    client: &aws_sdk_s3::Client,
    bucket: &BucketName,
    key: &ObjectKey,
) -> Result<Option<i64>, Error> {
    let resp = client
        .head_object()
        .bucket(bucket.as_str())
        .key(key.as_str())
        .send()
        .await
        .map_err(|err| error::from_sdk_error(ErrorKind::TransferFailed, err))?;
    Ok(resp.content_length)
}

/// Part files are named after the request alone so that any key that is a valid file name
/// also fits as a part file name.
fn part_path(dir: &Path) -> PathBuf {
    dir.join(format!(".{}.part", uuid::Uuid::new_v4()))
}

/// Stream `body` into a new file at `path`, returning the number of bytes written.
///
/// When the expected length is known exactly that many bytes are written; anything the stream
/// sends beyond it is dropped and a stream that ends early is an error.
async fn write_part(
    path: &Path,
    mut body: ByteStream,
    expected_len: Option<i64>,
) -> Result<u64, Error> {
    let limit = expected_len
        .map(|len| {
            u64::try_from(len).map_err(|_| {
                Error::new(
                    ErrorKind::TransferFailed,
                    format!("invalid object length {len}"),
                )
            })
        })
        .transpose()?;

    let mut file = tokio::fs::File::create(path).await?;
    let mut written: u64 = 0;

    while let Some(mut chunk) = body
        .try_next()
        .await
        .map_err(|err| Error::new(ErrorKind::TransferFailed, err))?
    {
        if let Some(limit) = limit {
            let remaining = limit - written;
            if remaining == 0 {
                break;
            }
            if (chunk.len() as u64) > remaining {
                chunk.truncate(remaining as usize);
            }
        }
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    file.sync_all().await?;

    if let Some(limit) = limit {
        if written < limit {
            return Err(Error::new(
                ErrorKind::TransferFailed,
                format!("received {written} bytes, expected {limit}"),
            ));
        }
    }

    Ok(written)
}

async fn discard_part(path: &Path) {
    if let Err(err) = tokio::fs::remove_file(path).await {
        if err.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("failed to remove part file {}: {err}", path.display());
        }
    }
}

#[cfg(test)]
mod test {
    use crate::error::ErrorKind;
    use crate::operation::download::DownloadInput;
    use aws_sdk_s3::operation::get_object::GetObjectOutput;
    use aws_sdk_s3::operation::head_object::HeadObjectOutput;
    use aws_sdk_s3::primitives::ByteStream;
    use aws_smithy_mocks_experimental::{mock, mock_client, RuleMode};
    use bytes::Bytes;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use test_common::{get_object_rule, head_bucket_rule, s3_error_response};

    fn test_client(s3: aws_sdk_s3::Client, download_dir: &Path) -> crate::Client {
        let config = crate::Config::builder()
            .client(s3)
            .download_dir(download_dir)
            .build()
            .unwrap();
        crate::Client::new(config)
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_basic_download() {
        let tmp = tempfile::tempdir().unwrap();
        let download_dir = tmp.path().join("temp").join("download");

        let head_bucket = head_bucket_rule("mymusic");
        let get_object = get_object_rule("song.mp3", Bytes::from_static(b"0123456789"));
        let client = mock_client!(
            aws_sdk_s3,
            RuleMode::MatchAny,
            &[&head_bucket, &get_object]
        );
        let tm = test_client(client, &download_dir);

        let resp = tm
            .download()
            .bucket("mymusic")
            .key("song.mp3")
            .send()
            .await
            .unwrap();

        assert_eq!(10, resp.size());
        assert_eq!(download_dir.join("song.mp3"), resp.path());
        assert_eq!("File Downloaded Successfully", resp.message());
        assert_eq!(b"0123456789".to_vec(), std::fs::read(resp.path()).unwrap());
        assert_eq!(vec!["song.mp3".to_owned()], dir_entries(&download_dir));
    }

    #[tokio::test]
    async fn test_download_overwrites_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("notes.txt"), b"stale contents that are longer").unwrap();

        let head_bucket = head_bucket_rule("docs");
        let get_object = get_object_rule("notes.txt", Bytes::from_static(b"fresh"));
        let client = mock_client!(
            aws_sdk_s3,
            RuleMode::MatchAny,
            &[&head_bucket, &get_object]
        );
        let tm = test_client(client, tmp.path());

        DownloadInput::builder()
            .bucket("docs")
            .key("notes.txt")
            .send_with(&tm)
            .await
            .unwrap();

        assert_eq!(
            b"fresh".to_vec(),
            std::fs::read(tmp.path().join("notes.txt")).unwrap()
        );
    }

    #[tokio::test]
    async fn test_download_missing_bucket() {
        let tmp = tempfile::tempdir().unwrap();

        let head_bucket = mock!(aws_sdk_s3::Client::head_bucket)
            .then_http_response(|| s3_error_response(404, "NotFound"));
        let get_object = get_object_rule("song.mp3", Bytes::from_static(b"data"));
        let client = mock_client!(
            aws_sdk_s3,
            RuleMode::MatchAny,
            &[&head_bucket, &get_object]
        );
        let tm = test_client(client, tmp.path());

        let err = tm
            .download()
            .bucket("nosuchbucket")
            .key("song.mp3")
            .send()
            .await
            .unwrap_err();

        assert_eq!(&ErrorKind::BucketNotFound, err.kind());
        assert_eq!(0, get_object.num_calls());
        assert!(dir_entries(tmp.path()).is_empty());
    }

    #[tokio::test]
    async fn test_download_bucket_check_failure() {
        let tmp = tempfile::tempdir().unwrap();

        let head_bucket = mock!(aws_sdk_s3::Client::head_bucket)
            .then_http_response(|| s3_error_response(403, "AccessDenied"));
        let client = mock_client!(aws_sdk_s3, RuleMode::MatchAny, &[&head_bucket]);
        let tm = test_client(client, tmp.path());

        let err = tm
            .download()
            .bucket("mymusic")
            .key("song.mp3")
            .send()
            .await
            .unwrap_err();

        assert_eq!(&ErrorKind::BucketCheckFailed, err.kind());
    }

    #[tokio::test]
    async fn test_download_missing_object() {
        let tmp = tempfile::tempdir().unwrap();

        let head_bucket = head_bucket_rule("mymusic");
        let get_object = mock!(aws_sdk_s3::Client::get_object)
            .then_http_response(|| s3_error_response(404, "NoSuchKey"));
        let client = mock_client!(
            aws_sdk_s3,
            RuleMode::MatchAny,
            &[&head_bucket, &get_object]
        );
        let tm = test_client(client, tmp.path());

        let err = tm
            .download()
            .bucket("mymusic")
            .key("missing.mp3")
            .send()
            .await
            .unwrap_err();

        assert_eq!(&ErrorKind::ObjectNotFound, err.kind());
        assert!(dir_entries(tmp.path()).is_empty());
    }

    #[tokio::test]
    async fn test_download_rejects_invalid_names() {
        let tmp = tempfile::tempdir().unwrap();

        let head_bucket = head_bucket_rule("mymusic");
        let client = mock_client!(aws_sdk_s3, RuleMode::MatchAny, &[&head_bucket]);
        let tm = test_client(client, tmp.path());

        for (bucket, key) in [("mymusic", ".."), ("../etc", "passwd"), ("mymusic", "a\\b")] {
            let err = tm
                .download()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .unwrap_err();
            assert_eq!(&ErrorKind::InputInvalid, err.kind(), "{bucket}/{key}");
        }
        assert_eq!(0, head_bucket.num_calls());
    }

    #[tokio::test]
    async fn test_short_body_leaves_no_file() {
        let tmp = tempfile::tempdir().unwrap();

        let head_bucket = head_bucket_rule("mymusic");
        let get_object = mock!(aws_sdk_s3::Client::get_object).then_output(|| {
            GetObjectOutput::builder()
                .content_length(10)
                .body(ByteStream::from_static(b"0123"))
                .build()
        });
        let client = mock_client!(
            aws_sdk_s3,
            RuleMode::MatchAny,
            &[&head_bucket, &get_object]
        );
        let tm = test_client(client, tmp.path());

        let err = tm
            .download()
            .bucket("mymusic")
            .key("song.mp3")
            .send()
            .await
            .unwrap_err();

        assert_eq!(&ErrorKind::TransferFailed, err.kind());
        assert!(dir_entries(tmp.path()).is_empty());
    }

    #[tokio::test]
    async fn test_missing_content_length_uses_head_object() {
        let tmp = tempfile::tempdir().unwrap();

        let head_bucket = head_bucket_rule("mymusic");
        let get_object = mock!(aws_sdk_s3::Client::get_object).then_output(|| {
            GetObjectOutput::builder()
                .body(ByteStream::from_static(b"abc"))
                .build()
        });
        let head_object = mock!(aws_sdk_s3::Client::head_object)
            .then_output(|| HeadObjectOutput::builder().content_length(3).build());
        let client = mock_client!(
            aws_sdk_s3,
            RuleMode::MatchAny,
            &[&head_bucket, &get_object, &head_object]
        );
        let tm = test_client(client, tmp.path());

        let resp = tm
            .download()
            .bucket("mymusic")
            .key("clip.txt")
            .send()
            .await
            .unwrap();

        assert_eq!(3, resp.size());
        assert_eq!(1, head_object.num_calls());
    }

    #[tokio::test]
    async fn test_download_dir_creation_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let head_bucket = head_bucket_rule("mymusic");
        let get_object = get_object_rule("song.mp3", Bytes::from_static(b"data"));
        let client = mock_client!(
            aws_sdk_s3,
            RuleMode::MatchAny,
            &[&head_bucket, &get_object]
        );
        let tm = test_client(client, &blocker.join("download"));

        let err = tm
            .download()
            .bucket("mymusic")
            .key("song.mp3")
            .send()
            .await
            .unwrap_err();

        assert_eq!(&ErrorKind::IOError, err.kind());
    }

    #[tokio::test]
    async fn test_long_body_is_truncated_to_content_length() {
        let tmp = tempfile::tempdir().unwrap();

        let head_bucket = head_bucket_rule("mymusic");
        let get_object = mock!(aws_sdk_s3::Client::get_object).then_output(|| {
            GetObjectOutput::builder()
                .content_length(3)
                .body(ByteStream::from_static(b"abcdef"))
                .build()
        });
        let client = mock_client!(
            aws_sdk_s3,
            RuleMode::MatchAny,
            &[&head_bucket, &get_object]
        );
        let tm = test_client(client, tmp.path());

        let resp = tm
            .download()
            .bucket("mymusic")
            .key("clip.txt")
            .send()
            .await
            .unwrap();

        assert_eq!(3, resp.size());
        assert_eq!(b"abc".to_vec(), std::fs::read(resp.path()).unwrap());
        assert_eq!(vec!["clip.txt".to_owned()], dir_entries(tmp.path()));
    }

    #[tokio::test]
    async fn test_download_key_near_file_name_limit() {
        let tmp = tempfile::tempdir().unwrap();
        let key = format!("{}.mp3", "k".repeat(226));
        assert_eq!(230, key.len());

        let head_bucket = head_bucket_rule("mymusic");
        let get_object = mock!(aws_sdk_s3::Client::get_object).then_output(|| {
            GetObjectOutput::builder()
                .content_length(4)
                .body(ByteStream::from_static(b"data"))
                .build()
        });
        let client = mock_client!(
            aws_sdk_s3,
            RuleMode::MatchAny,
            &[&head_bucket, &get_object]
        );
        let tm = test_client(client, tmp.path());

        let resp = tm
            .download()
            .bucket("mymusic")
            .key(key.clone())
            .send()
            .await
            .unwrap();

        assert_eq!(tmp.path().join(&key), resp.path());
        assert_eq!(b"data".to_vec(), std::fs::read(resp.path()).unwrap());
        assert_eq!(vec![key], dir_entries(tmp.path()));
    }

    #[tokio::test]
    async fn test_concurrent_downloads_of_same_key() {
        let tmp = tempfile::tempdir().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let head_bucket = head_bucket_rule("mymusic");
        let get_object = mock!(aws_sdk_s3::Client::get_object).then_output({
            let calls = calls.clone();
            move || {
                let fill = if calls.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                    b'a'
                } else {
                    b'b'
                };
                GetObjectOutput::builder()
                    .content_length(4096)
                    .body(ByteStream::from(vec![fill; 4096]))
                    .build()
            }
        });
        let client = mock_client!(
            aws_sdk_s3,
            RuleMode::MatchAny,
            &[&head_bucket, &get_object]
        );
        let tm = test_client(client, tmp.path());

        let (first, second) = tokio::join!(
            tm.download().bucket("mymusic").key("song.mp3").send(),
            tm.download().bucket("mymusic").key("song.mp3").send()
        );
        first.unwrap();
        second.unwrap();
        assert_eq!(2, get_object.num_calls());

        let written = std::fs::read(tmp.path().join("song.mp3")).unwrap();
        assert_eq!(4096, written.len());
        assert!(
            written.iter().all(|b| *b == b'a') || written.iter().all(|b| *b == b'b'),
            "final file mixes both bodies"
        );
        assert_eq!(vec!["song.mp3".to_owned()], dir_entries(tmp.path()));
    }

    #[tokio::test]
    async fn test_head_object_failure_without_content_length() {
        let tmp = tempfile::tempdir().unwrap();

        let head_bucket = head_bucket_rule("mymusic");
        let get_object = mock!(aws_sdk_s3::Client::get_object).then_output(|| {
            GetObjectOutput::builder()
                .body(ByteStream::from_static(b"abc"))
                .build()
        });
        let head_object = mock!(aws_sdk_s3::Client::head_object)
            .then_http_response(|| s3_error_response(403, "AccessDenied"));
        let client = mock_client!(
            aws_sdk_s3,
            RuleMode::MatchAny,
            &[&head_bucket, &get_object, &head_object]
        );
        let tm = test_client(client, tmp.path());

        let err = tm
            .download()
            .bucket("mymusic")
            .key("clip.txt")
            .send()
            .await
            .unwrap_err();

        assert_eq!(&ErrorKind::TransferFailed, err.kind());
        assert_eq!(1, head_object.num_calls());
        assert!(dir_entries(tmp.path()).is_empty());
    }
}
