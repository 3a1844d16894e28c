use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client as S3Client;

use crate::config::StorageSettings;
use crate::types::{ImageKey, SignedBlobUrl};

/// Signed URLs become valid this long before they are issued, to absorb clock skew.
pub const SIGNATURE_CLOCK_SKEW: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("failed to sign read URL for {key}: {message}")]
    Presign { key: String, message: String },

    #[error("refusing to hand out a non-HTTPS signed URL for {0}")]
    InsecureUrl(String),

    #[error("failed to delete blob {key}: {message}")]
    Delete { key: String, message: String },
}

/// The blob half of the storage pair.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Time-limited, read-only, HTTPS URL for an existing blob.
    async fn presign_read(&self, key: &ImageKey) -> Result<SignedBlobUrl, BlobError>;

    /// Removes the blob. An absent blob is not an error.
    async fn delete_if_exists(&self, key: &ImageKey) -> Result<(), BlobError>;
}

pub struct S3BlobStore {
    client: S3Client,
    bucket: String,
    read_url_expiry: Duration,
}

impl S3BlobStore {
    /// Builds the client from the connection string credentials so signed
    /// URLs outlive any short-lived role session.
    pub fn new(sdk_config: &aws_config::SdkConfig, settings: &StorageSettings) -> Self {
        let credentials = Credentials::new(
            settings.connection.account_name.clone(),
            settings.connection.account_key.clone(),
            None,
            None,
            "storage-connection-string",
        );

        let mut builder =
            aws_sdk_s3::config::Builder::from(sdk_config).credentials_provider(credentials);
        if let Some(region) = &settings.connection.region {
            builder = builder.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &settings.connection.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: S3Client::from_conf(builder.build()),
            bucket: settings.bucket.clone(),
            read_url_expiry: settings.read_url_expiry,
        }
    }

    /// Validity runs from `now - skew` to `now + expiry`.
    fn presigning_config(&self, now: SystemTime) -> Result<PresigningConfig, String> {
        PresigningConfig::builder()
            .start_time(now - SIGNATURE_CLOCK_SKEW)
            .expires_in(self.read_url_expiry + SIGNATURE_CLOCK_SKEW)
            .build()
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn presign_read(&self, key: &ImageKey) -> Result<SignedBlobUrl, BlobError> {
        let s3_key = key.blob_path();
        let presign_error = |message: String| BlobError::Presign {
            key: s3_key.clone(),
            message,
        };

        let config = self
            .presigning_config(SystemTime::now())
            .map_err(presign_error)?;

        let presigned_request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&s3_key)
            .presigned(config)
            .await
            .map_err(|e| presign_error(DisplayErrorContext(&e).to_string()))?;

        tracing::debug!("🔏 Signed read URL for s3://{}/{}", self.bucket, s3_key);
        signed_url_from_uri(presigned_request.uri(), &s3_key)
    }

    async fn delete_if_exists(&self, key: &ImageKey) -> Result<(), BlobError> {
        let s3_key = key.blob_path();

        // DeleteObject succeeds whether or not the key exists
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&s3_key)
            .send()
            .await
            .map_err(|e| BlobError::Delete {
                key: s3_key.clone(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        tracing::info!("🗑️ Deleted s3://{}/{}", self.bucket, s3_key);
        Ok(())
    }
}

/// Splits a presigned URI into its canonical location and the signed form.
fn signed_url_from_uri(uri: &str, s3_key: &str) -> Result<SignedBlobUrl, BlobError> {
    if !uri.starts_with("https://") {
        return Err(BlobError::InsecureUrl(s3_key.to_string()));
    }

    let url = uri.split_once('?').map(|(base, _)| base).unwrap_or(uri);
    Ok(SignedBlobUrl {
        url: url.to_string(),
        signed_url: uri.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection_string::StorageConnection;

    fn settings(endpoint: Option<&str>) -> StorageSettings {
        StorageSettings {
            connection: StorageConnection {
                account_name: "AKIDEXAMPLE".to_string(),
                account_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string(),
                region: Some("eu-west-1".to_string()),
                endpoint: endpoint.map(str::to_string),
            },
            bucket: "photos".to_string(),
            read_url_expiry: Duration::from_secs(3600),
        }
    }

    fn store(endpoint: Option<&str>) -> S3BlobStore {
        let sdk_config = aws_config::SdkConfig::builder()
            .behavior_version(aws_config::BehaviorVersion::latest())
            .build();
        S3BlobStore::new(&sdk_config, &settings(endpoint))
    }

    fn key() -> ImageKey {
        ImageKey {
            album: "myalbum".to_string(),
            name: "cat.jpg".to_string(),
        }
    }

    #[test]
    fn canonical_url_drops_the_query() {
        let signed = signed_url_from_uri(
            "https://photos.s3.us-east-1.amazonaws.com/a/b.jpg?X-Amz-Signature=abc",
            "a/b.jpg",
        )
        .unwrap();
        assert_eq!(signed.url, "https://photos.s3.us-east-1.amazonaws.com/a/b.jpg");
        assert!(signed.signed_url.ends_with("X-Amz-Signature=abc"));
    }

    #[test]
    fn plain_http_urls_are_refused() {
        let err = signed_url_from_uri("http://localhost:9000/photos/a/b.jpg?sig=1", "a/b.jpg")
            .unwrap_err();
        assert!(matches!(err, BlobError::InsecureUrl(k) if k == "a/b.jpg"));
    }

    #[tokio::test]
    async fn presigning_window_covers_skew_and_expiry() {
        let now = SystemTime::now();
        let config = store(None).presigning_config(now).unwrap();
        assert_eq!(config.start_time(), now - SIGNATURE_CLOCK_SKEW);
        assert_eq!(config.expires(), Duration::from_secs(3600 + 60));
    }

    #[tokio::test]
    async fn presigned_read_url_is_a_signed_get() {
        let signed = store(None).presign_read(&key()).await.unwrap();

        assert_eq!(
            signed.url,
            "https://photos.s3.eu-west-1.amazonaws.com/myalbum/cat.jpg"
        );
        assert!(signed.signed_url.starts_with(&signed.url));
        assert!(signed.signed_url.contains("X-Amz-Signature="));
        assert!(signed.signed_url.contains("X-Amz-Expires=3660"));
        assert!(signed.signed_url.contains("X-Amz-Credential=AKIDEXAMPLE"));
    }

    #[tokio::test]
    async fn custom_endpoint_uses_path_style() {
        let signed = store(Some("https://objects.example.com"))
            .presign_read(&key())
            .await
            .unwrap();
        assert_eq!(
            signed.url,
            "https://objects.example.com/photos/myalbum/cat.jpg"
        );
    }
}
