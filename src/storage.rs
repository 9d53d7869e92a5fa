// src/storage.rs

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;

use crate::config::Config;
use crate::error::AppError;

/// Presigned download links stay valid for one hour.
pub const PRESIGN_TTL_SECS: u64 = 3600;

/// Object-store operations the application needs: upload, delete, and
/// time-limited read links. Implementations must be safe to call from
/// concurrent request tasks.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), AppError>;

    async fn delete(&self, key: &str) -> Result<(), AppError>;

    /// Generates a presigned GET URL. URLs are never persisted; callers
    /// regenerate them on every read.
    async fn presign_get(&self, key: &str, ttl_secs: u64) -> Result<String, AppError>;
}

/// S3-backed implementation used in production.
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Store {
    pub async fn connect(config: &Config) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.s3_region.clone()))
            .load()
            .await;

        Self {
            client: aws_sdk_s3::Client::new(&sdk_config),
            bucket: config.s3_bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("upload of '{}' failed: {}", key, e)))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("delete of '{}' failed: {}", key, e)))?;

        Ok(())
    }

    async fn presign_get(&self, key: &str, ttl_secs: u64) -> Result<String, AppError> {
        let presigning = PresigningConfig::expires_in(Duration::from_secs(ttl_secs))
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| AppError::Storage(format!("presign of '{}' failed: {}", key, e)))?;

        Ok(presigned.uri().to_string())
    }
}

/// Key for a property image, namespaced so keys never collide across owners
/// or listings.
pub fn property_image_key(owner_id: &str, property_id: &str, filename: &str) -> String {
    format!(
        "properties/{}/{}/{}",
        owner_id,
        property_id,
        sanitize_filename(filename)
    )
}

/// Key for a user's profile picture.
pub fn profile_picture_key(user_id: &str, filename: &str) -> String {
    format!("profiles/{}/{}", user_id, sanitize_filename(filename))
}

/// Strips any path components a client may have smuggled into the upload
/// filename, keeping keys flat within their namespace.
fn sanitize_filename(filename: &str) -> &str {
    filename
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("unnamed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_keys_are_namespaced_by_owner_and_property() {
        let key = property_image_key("owner1", "prop9", "front.jpg");
        assert_eq!(key, "properties/owner1/prop9/front.jpg");
    }

    #[test]
    fn filenames_are_stripped_of_path_components() {
        assert_eq!(
            property_image_key("o", "p", "../../etc/passwd"),
            "properties/o/p/passwd"
        );
        assert_eq!(
            profile_picture_key("u", "C:\\photos\\me.png"),
            "profiles/u/me.png"
        );
    }

    #[test]
    fn empty_filename_falls_back_to_placeholder() {
        assert_eq!(profile_picture_key("u", ""), "profiles/u/unnamed");
        assert_eq!(profile_picture_key("u", "dir/"), "profiles/u/unnamed");
    }
}
