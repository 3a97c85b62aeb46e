use crate::config::{DEFAULT_MULTIPART_THRESHOLD, DEFAULT_PART_SIZE};
use crate::error::StageError;
use crate::models::ObjectLocation;
use crate::utils::validation::Expiration;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, error, info, warn};

/// S3 refuses multipart uploads with more parts than this.
const MAX_PARTS: u64 = 10_000;

/// The two storage capabilities the pipeline needs: put a local file into a
/// bucket, and sign a time-limited GET for it.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload_file(&self, location: &ObjectLocation, path: &Path) -> Result<(), StageError>;

    /// Does not check that the object exists.
    async fn presign_get(
        &self,
        location: &ObjectLocation,
        expiration: Expiration,
    ) -> Result<String, StageError>;
}

pub struct S3ObjectStore {
    client: Client,
    multipart_threshold: u64,
    part_size: usize,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            multipart_threshold: DEFAULT_MULTIPART_THRESHOLD,
            part_size: DEFAULT_PART_SIZE,
        }
    }

    /// Files larger than `threshold` bytes are sent as a multipart upload in
    /// parts of `part_size` bytes.
    pub fn with_multipart(mut self, threshold: u64, part_size: usize) -> Self {
        self.multipart_threshold = threshold;
        self.part_size = part_size.max(1);
        self
    }

    async fn put_single(&self, location: &ObjectLocation, path: &Path) -> Result<(), StageError> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| upload_error(location, format!("cannot read {}: {}", path.display(), e)))?;

        let output = self
            .client
            .put_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .body(body)
            .send()
            .await
            .map_err(|e| sdk_upload_error(location, "put_object", &e))?;

        debug!("S3 put_object ok: {} etag={:?}", location, output.e_tag());
        Ok(())
    }

    async fn put_multipart(
        &self,
        location: &ObjectLocation,
        path: &Path,
        size: u64,
    ) -> Result<(), StageError> {
        let created = self
            .client
            .create_multipart_upload()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
            .map_err(|e| sdk_upload_error(location, "create_multipart_upload", &e))?;

        let upload_id = created
            .upload_id()
            .ok_or_else(|| upload_error(location, "No upload ID".to_string()))?
            .to_string();

        let res = self.send_parts(location, path, size, &upload_id).await;
        if res.is_err() {
            self.abort_multipart(location, &upload_id).await;
        }
        res
    }

    async fn send_parts(
        &self,
        location: &ObjectLocation,
        path: &Path,
        size: u64,
        upload_id: &str,
    ) -> Result<(), StageError> {
        let mut file = File::open(path)
            .await
            .map_err(|e| upload_error(location, format!("cannot read {}: {}", path.display(), e)))?;

        let part_size = part_size_for(size, self.part_size);
        let mut buffer = vec![0u8; part_size];
        let mut part_number = 1;
        let mut completed_parts = Vec::new();

        loop {
            let n = read_part(&mut file, &mut buffer)
                .await
                .map_err(|e| upload_error(location, format!("cannot read {}: {}", path.display(), e)))?;
            if n == 0 {
                break;
            }

            let upload_part_res = self
                .client
                .upload_part()
                .bucket(&location.bucket)
                .key(&location.key)
                .upload_id(upload_id)
                .part_number(part_number)
                .body(ByteStream::from(buffer[..n].to_vec()))
                .send()
                .await
                .map_err(|e| sdk_upload_error(location, "upload_part", &e))?;

            completed_parts.push(
                CompletedPart::builder()
                    .e_tag(upload_part_res.e_tag().unwrap_or_default())
                    .part_number(part_number)
                    .build(),
            );

            part_number += 1;
        }

        let completed_multipart_upload = CompletedMultipartUpload::builder()
            .set_parts(Some(completed_parts))
            .build();

        self.client
            .complete_multipart_upload()
            .bucket(&location.bucket)
            .key(&location.key)
            .upload_id(upload_id)
            .multipart_upload(completed_multipart_upload)
            .send()
            .await
            .map_err(|e| sdk_upload_error(location, "complete_multipart_upload", &e))?;

        info!(
            "☁️  Multipart upload of {} finished in {} parts",
            location,
            part_number - 1
        );
        Ok(())
    }

    async fn abort_multipart(&self, location: &ObjectLocation, upload_id: &str) {
        if let Err(e) = self
            .client
            .abort_multipart_upload()
            .bucket(&location.bucket)
            .key(&location.key)
            .upload_id(upload_id)
            .send()
            .await
        {
            warn!(
                "S3 abort_multipart_upload failed: {}, upload_id={}, error={}",
                location,
                upload_id,
                DisplayErrorContext(&e)
            );
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload_file(&self, location: &ObjectLocation, path: &Path) -> Result<(), StageError> {
        let size = tokio::fs::metadata(path)
            .await
            .map_err(|e| upload_error(location, format!("cannot read {}: {}", path.display(), e)))?
            .len();

        if size > self.multipart_threshold {
            self.put_multipart(location, path, size).await
        } else {
            self.put_single(location, path).await
        }
    }

    async fn presign_get(
        &self,
        location: &ObjectLocation,
        expiration: Expiration,
    ) -> Result<String, StageError> {
        let sign_error = |message: String| StageError::Sign {
            location: location.clone(),
            message,
        };

        let presigning_config = PresigningConfig::expires_in(expiration.as_duration())
            .map_err(|e| sign_error(DisplayErrorContext(&e).to_string()))?;

        let presigned_request = self
            .client
            .get_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .presigned(presigning_config)
            .await
            .map_err(|e| {
                error!("S3 presign get_object failed: {}, error={:?}", location, e);
                sign_error(DisplayErrorContext(&e).to_string())
            })?;

        Ok(presigned_request.uri().to_string())
    }
}

fn upload_error(location: &ObjectLocation, message: String) -> StageError {
    StageError::Upload {
        location: location.clone(),
        message,
    }
}

fn sdk_upload_error<E: std::error::Error>(
    location: &ObjectLocation,
    operation: &str,
    e: &E,
) -> StageError {
    let message = DisplayErrorContext(e).to_string();
    error!("S3 {} failed: {}, error={}", operation, location, message);
    upload_error(location, message)
}

/// At least `preferred`, and large enough that `file_size` fits in
/// `MAX_PARTS` parts.
fn part_size_for(file_size: u64, preferred: usize) -> usize {
    let smallest = file_size.div_ceil(MAX_PARTS) as usize;
    preferred.max(smallest).max(1)
}

/// Fills `buffer` from `reader`; a short count means end of input.
async fn read_part<R>(reader: &mut R, buffer: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut n = 0;
    while n < buffer.len() {
        let read = reader.read(&mut buffer[n..]).await?;
        if read == 0 {
            break;
        }
        n += read;
    }
    Ok(n)
}
