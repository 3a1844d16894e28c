use crate::error::ApiError;
use crate::images::ImageRecords;
use crate::s3::BlobStore;
use crate::types::{AlbumImageRequest, ImageRecord};
use crate::vision::ImageTagger;

pub const MISSING_FIELDS: &str = "album and name required";

/// Signs a read URL for the blob, has the vision service tag it and upserts
/// the resulting record. Steps run strictly one after another.
pub async fn analyze_image(
    blobs: &impl BlobStore,
    records: &impl ImageRecords,
    tagger: &impl ImageTagger,
    body: &[u8],
) -> Result<ImageRecord, ApiError> {
    let key = AlbumImageRequest::key_from_body(body)
        .ok_or(ApiError::InvalidRequest(MISSING_FIELDS))?;

    tracing::info!("🔍 Analyzing {}", key.blob_path());

    let signed = blobs.presign_read(&key).await?;
    let analysis = tagger.analyze(&signed.signed_url).await?;

    let record = ImageRecord::new(&key, signed.url, analysis, chrono::Utc::now());
    records.upsert(&record).await?;

    tracing::info!(
        "✅ Stored {} with {} tags, caption: {}",
        record.id,
        record.tags.len(),
        record.caption.is_some()
    );
    Ok(record)
}

/// Success body: `{"ok": true, "doc": record}`
pub fn success_body(record: &ImageRecord) -> serde_json::Value {
    serde_json::json!({ "ok": true, "doc": record })
}
