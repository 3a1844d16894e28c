use serde::{Deserialize, Serialize};

// ========== IMAGE KEY ==========
/// Validated two-part key shared by the blob store and the metadata table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageKey {
    pub album: String,
    pub name: String,
}

impl ImageKey {
    /// Record id: `<album>::<name>`
    pub fn id(&self) -> String {
        format!("{}::{}", self.album, self.name)
    }

    /// Object key inside the bucket: `<album>/<name>`
    pub fn blob_path(&self) -> String {
        format!("{}/{}", self.album, self.name)
    }
}

// Request body for analyze and delete
#[derive(Debug, Default, Deserialize)]
pub struct AlbumImageRequest {
    pub album: Option<String>,
    pub name: Option<String>,
}

impl AlbumImageRequest {
    /// Parses a raw request body. Anything that does not carry two non-empty
    /// strings yields `None`.
    pub fn key_from_body(body: &[u8]) -> Option<ImageKey> {
        if body.is_empty() {
            return None;
        }
        let req: AlbumImageRequest = serde_json::from_slice(body).ok()?;
        req.into_key()
    }

    pub fn into_key(self) -> Option<ImageKey> {
        match (self.album, self.name) {
            (Some(album), Some(name)) if !album.is_empty() && !name.is_empty() => {
                Some(ImageKey { album, name })
            }
            _ => None,
        }
    }
}

// ========== IMAGE RECORD ==========
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub id: String,
    pub album: String,
    pub name: String,
    pub url: String,
    pub tags: Vec<String>,
    pub caption: Option<String>,
    pub created_at: String, // RFC 3339, millisecond precision, UTC
}

impl ImageRecord {
    pub fn new(
        key: &ImageKey,
        url: String,
        analysis: ImageAnalysis,
        created_at: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        Self {
            id: key.id(),
            album: key.album.clone(),
            name: key.name.clone(),
            url,
            tags: analysis.tags,
            caption: analysis.caption,
            created_at: created_at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }
}

// ========== VISION ==========
/// What the vision service told us about an image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageAnalysis {
    pub tags: Vec<String>,
    pub caption: Option<String>,
}

// ========== BLOB URL ==========
#[derive(Debug, Clone, PartialEq)]
pub struct SignedBlobUrl {
    /// Unsigned location of the blob
    pub url: String,
    /// `url` plus the signing query string
    pub signed_url: String,
}
