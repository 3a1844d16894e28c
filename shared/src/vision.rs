use async_trait::async_trait;
use serde::Deserialize;

use crate::config::VisionSettings;
use crate::types::ImageAnalysis;

const ANALYZE_PATH: &str = "vision/v3.2/analyze?visualFeatures=Tags,Description";
const API_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    /// The service answered, but not with a 2xx
    #[error("vision service returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("vision request failed: {0}")]
    Transport(String),

    #[error("vision response could not be decoded: {0}")]
    Decode(String),
}

/// Something that can tag and caption an image reachable at a URL.
#[async_trait]
pub trait ImageTagger: Send + Sync {
    async fn analyze(&self, image_url: &str) -> Result<ImageAnalysis, VisionError>;
}

// Response shape of the analyze call; only the fields we keep.
#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    tags: Option<Vec<TagResult>>,
    description: Option<DescriptionResult>,
}

#[derive(Debug, Deserialize)]
struct TagResult {
    name: String,
}

#[derive(Debug, Deserialize)]
struct DescriptionResult {
    captions: Option<Vec<CaptionResult>>,
}

#[derive(Debug, Deserialize)]
struct CaptionResult {
    text: String,
}

impl From<AnalyzeResponse> for ImageAnalysis {
    fn from(response: AnalyzeResponse) -> Self {
        let tags = response
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.name)
            .collect();

        let caption = response
            .description
            .and_then(|d| d.captions)
            .and_then(|captions| captions.into_iter().next())
            .map(|c| c.text)
            .filter(|text| !text.is_empty());

        ImageAnalysis { tags, caption }
    }
}

pub struct VisionClient {
    http: reqwest::Client,
    analyze_url: String,
    api_key: String,
}

impl VisionClient {
    pub fn new(settings: &VisionSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            analyze_url: analyze_url(&settings.endpoint),
            api_key: settings.api_key.clone(),
        }
    }
}

fn analyze_url(endpoint: &str) -> String {
    format!("{}/{}", endpoint.trim_end_matches('/'), ANALYZE_PATH)
}

/// Decodes a 2xx body into tags and caption.
pub fn parse_analysis(body: &[u8]) -> Result<ImageAnalysis, VisionError> {
    serde_json::from_slice::<AnalyzeResponse>(body)
        .map(ImageAnalysis::from)
        .map_err(|e| VisionError::Decode(e.to_string()))
}

#[async_trait]
impl ImageTagger for VisionClient {
    async fn analyze(&self, image_url: &str) -> Result<ImageAnalysis, VisionError> {
        let response = self
            .http
            .post(&self.analyze_url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&serde_json::json!({ "url": image_url }))
            .send()
            .await
            .map_err(|e| VisionError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| VisionError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(VisionError::Upstream {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        parse_analysis(&body)
    }
}
