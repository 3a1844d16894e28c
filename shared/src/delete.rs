use crate::error::ApiError;
use crate::images::{ImageRecords, RecordError};
use crate::s3::BlobStore;
use crate::types::AlbumImageRequest;

pub const MISSING_FIELDS: &str = "album + name required";

/// Removes the blob, then its metadata record, returning the deleted id.
///
/// The two deletes are not coordinated: if the record delete fails after the
/// blob is gone, the record is left pointing at a missing object. That case
/// is logged and reported as an internal error; nothing is rolled back. A
/// record that was already missing is reported the same way but not logged
/// here.
pub async fn delete_image(
    blobs: &impl BlobStore,
    records: &impl ImageRecords,
    body: &[u8],
) -> Result<String, ApiError> {
    let key = AlbumImageRequest::key_from_body(body)
        .ok_or(ApiError::InvalidRequest(MISSING_FIELDS))?;
    let id = key.id();

    blobs.delete_if_exists(&key).await?;

    if let Err(e) = records.delete(&key.album, &id).await {
        if leaves_dangling_record(&e) {
            tracing::warn!(
                "⚠️ Blob {} removed but metadata record {} may remain: {}",
                key.blob_path(),
                id,
                e
            );
        }
        return Err(e.into());
    }

    tracing::info!("🗑️ Deleted image {}", id);
    Ok(id)
}

/// A missing record means nothing was left behind; any other failure may
/// leave a record whose blob is gone.
fn leaves_dangling_record(error: &RecordError) -> bool {
    !matches!(error, RecordError::NotFound(_))
}

/// Success body: `{"ok": true, "deleted": id}`
pub fn success_body(id: &str) -> serde_json::Value {
    serde_json::json!({ "ok": true, "deleted": id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{BlobCall, MemoryBlobStore, MemoryImageRecords, RecordCall};
    use crate::types::ImageRecord;
    use lambda_http::http::StatusCode;

    fn stored(album: &str, name: &str) -> ImageRecord {
        ImageRecord {
            id: format!("{}::{}", album, name),
            album: album.to_string(),
            name: name.to_string(),
            url: format!("https://photos.s3.amazonaws.com/{}/{}", album, name),
            tags: vec!["cat".to_string()],
            caption: Some("a cat".to_string()),
            created_at: "2026-10-19T08:15:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn deletes_blob_and_record() {
        let blobs = MemoryBlobStore::with_blobs(&["myalbum/cat.jpg", "myalbum/dog.jpg"]);
        let records = MemoryImageRecords::with_records(vec![
            stored("myalbum", "cat.jpg"),
            stored("myalbum", "dog.jpg"),
        ]);

        let id = delete_image(&blobs, &records, br#"{"album":"myalbum","name":"cat.jpg"}"#)
            .await
            .unwrap();

        assert_eq!(id, "myalbum::cat.jpg");
        assert_eq!(
            success_body(&id),
            serde_json::json!({"ok": true, "deleted": "myalbum::cat.jpg"})
        );
        assert!(!blobs.contains("myalbum/cat.jpg"));
        assert!(blobs.contains("myalbum/dog.jpg"));
        assert_eq!(records.get("myalbum", "myalbum::cat.jpg"), None);
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn absent_blob_still_attempts_record_delete() {
        let blobs = MemoryBlobStore::default();
        let records = MemoryImageRecords::with_records(vec![stored("myalbum", "cat.jpg")]);

        let id = delete_image(&blobs, &records, br#"{"album":"myalbum","name":"cat.jpg"}"#)
            .await
            .unwrap();

        assert_eq!(id, "myalbum::cat.jpg");
        assert_eq!(blobs.calls(), vec![BlobCall::Delete("myalbum/cat.jpg".to_string())]);
        assert_eq!(
            records.calls(),
            vec![RecordCall::Delete("myalbum::cat.jpg".to_string())]
        );
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn missing_record_is_internal_error_after_blob_delete() {
        let blobs = MemoryBlobStore::with_blobs(&["myalbum/cat.jpg"]);
        let records = MemoryImageRecords::default();

        let err = delete_image(&blobs, &records, br#"{"album":"myalbum","name":"cat.jpg"}"#)
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.body(),
            serde_json::json!({"error": "image record not found: myalbum::cat.jpg"})
        );
        assert!(!blobs.contains("myalbum/cat.jpg"));
    }

    #[tokio::test]
    async fn store_failure_after_blob_delete_is_internal_error() {
        let blobs = MemoryBlobStore::with_blobs(&["myalbum/cat.jpg"]);
        let records = MemoryImageRecords::with_records(vec![stored("myalbum", "cat.jpg")]);
        records.fail_with("throttled");

        let err = delete_image(&blobs, &records, br#"{"album":"myalbum","name":"cat.jpg"}"#)
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.body(),
            serde_json::json!({"error": "metadata store error: throttled"})
        );
        assert!(!blobs.contains("myalbum/cat.jpg"));
        assert!(records.get("myalbum", "myalbum::cat.jpg").is_some());
    }

    #[test]
    fn only_store_failures_leave_a_dangling_record() {
        assert!(!leaves_dangling_record(&RecordError::NotFound(
            "myalbum::cat.jpg".to_string()
        )));
        assert!(leaves_dangling_record(&RecordError::Store("throttled".to_string())));
        assert!(leaves_dangling_record(&RecordError::Malformed("id")));
    }

    #[tokio::test]
    async fn missing_fields_make_no_external_calls() {
        let blobs = MemoryBlobStore::default();
        let records = MemoryImageRecords::default();

        let err = delete_image(&blobs, &records, br#"{"name":"cat.jpg"}"#)
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body(), serde_json::json!({"error": "album + name required"}));
        assert!(blobs.calls().is_empty());
        assert!(records.calls().is_empty());
    }
}
