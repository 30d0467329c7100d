use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tracing::info;

use crate::screening::store::{ResumeArchive, StoreError};

/// Raw uploads in an S3 (or MinIO) bucket.
#[derive(Clone)]
pub struct S3ResumeArchive {
    client: S3Client,
    bucket: String,
}

impl S3ResumeArchive {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ResumeArchive for S3ResumeArchive {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), StoreError> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StoreError::Storage(format!("S3 upload failed: {e}")))?;

        info!("Archived {size} bytes to s3://{}/{}", self.bucket, key);
        Ok(())
    }
}
