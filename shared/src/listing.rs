use crate::error::ApiError;
use crate::images::ImageRecords;
use crate::types::ImageRecord;

pub const MISSING_ALBUM: &str = "album query param required";

/// All records of an album, newest first.
pub async fn list_album_images(
    records: &impl ImageRecords,
    album: Option<&str>,
) -> Result<Vec<ImageRecord>, ApiError> {
    let album = album
        .filter(|a| !a.is_empty())
        .ok_or(ApiError::InvalidRequest(MISSING_ALBUM))?;

    let mut images = records.list_by_album(album).await?;

    // createdAt is fixed-width UTC, so string order is time order
    images.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    tracing::info!("📚 Album {} has {} images", album, images.len());
    Ok(images)
}
