// API client module: wire types for the Vision `images:annotate` endpoint and
// a small blocking HTTP client that calls it. The `Annotator` trait is the
// seam the UI layer talks to, so tests can swap in canned responses.

use crate::auth::{CredentialSource, Credentials, DefaultCredentials};
use crate::config::Config;
use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::debug;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Results requested per feature.
pub const MAX_RESULTS: u32 = 10;

/// Detection kinds this tool asks for, in request order.
pub const REQUESTED_FEATURES: [FeatureType; 5] = [
    FeatureType::LabelDetection,
    FeatureType::FaceDetection,
    FeatureType::LandmarkDetection,
    FeatureType::LogoDetection,
    FeatureType::TextDetection,
];

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureType {
    LabelDetection,
    FaceDetection,
    LandmarkDetection,
    LogoDetection,
    TextDetection,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: FeatureType,
    pub max_results: u32,
}

/// Image payload; `content` is the base64 of the raw file bytes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub content: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AnnotateImageRequest {
    pub image: Image,
    pub features: Vec<Feature>,
}

impl AnnotateImageRequest {
    /// Build the request for one image with every feature in
    /// [`REQUESTED_FEATURES`], each capped at [`MAX_RESULTS`].
    pub fn for_image(bytes: &[u8]) -> Self {
        AnnotateImageRequest {
            image: Image {
                content: STANDARD.encode(bytes),
            },
            features: REQUESTED_FEATURES
                .iter()
                .map(|&kind| Feature {
                    kind,
                    max_results: MAX_RESULTS,
                })
                .collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BatchAnnotateImagesRequest {
    pub requests: Vec<AnnotateImageRequest>,
}

impl From<AnnotateImageRequest> for BatchAnnotateImagesRequest {
    fn from(req: AnnotateImageRequest) -> Self {
        BatchAnnotateImagesRequest {
            requests: vec![req],
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct BatchAnnotateImagesResponse {
    #[serde(default)]
    pub responses: Vec<AnnotateImageResponse>,
}

/// Annotations for a single image. Categories the service found nothing
/// for are omitted from the JSON and decode as empty.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AnnotateImageResponse {
    pub label_annotations: Vec<EntityAnnotation>,
    pub face_annotations: Vec<FaceAnnotation>,
    pub logo_annotations: Vec<EntityAnnotation>,
    pub landmark_annotations: Vec<EntityAnnotation>,
    pub text_annotations: Vec<EntityAnnotation>,
    pub error: Option<Status>,
}

/// Shared shape of label, logo, landmark and text results.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EntityAnnotation {
    pub mid: String,
    pub description: String,
    pub score: f64,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct FaceAnnotation {
    pub anger_likelihood: Likelihood,
    pub joy_likelihood: Likelihood,
    pub sorrow_likelihood: Likelihood,
    pub surprise_likelihood: Likelihood,
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Likelihood {
    VeryUnlikely,
    Unlikely,
    Possible,
    Likely,
    VeryLikely,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Likelihood {
    pub fn as_str(self) -> &'static str {
        match self {
            Likelihood::Unknown => "UNKNOWN",
            Likelihood::VeryUnlikely => "VERY_UNLIKELY",
            Likelihood::Unlikely => "UNLIKELY",
            Likelihood::Possible => "POSSIBLE",
            Likelihood::Likely => "LIKELY",
            Likelihood::VeryLikely => "VERY_LIKELY",
        }
    }
}

impl fmt::Display for Likelihood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error status, either per image or wrapped in an HTTP error body.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Status {
    pub code: i32,
    pub message: String,
    pub status: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Status,
}

/// The one operation the rest of the crate needs from the service.
pub trait Annotator {
    fn annotate(&self, batch: &BatchAnnotateImagesRequest) -> Result<BatchAnnotateImagesResponse>;
}

/// Blocking client for the Vision REST API.
pub struct VisionClient {
    client: Client,
    url: String,
    credentials: Credentials,
}

impl VisionClient {
    /// Build a client for `config`, resolving credentials through the
    /// default discovery chain.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        let credentials = DefaultCredentials::new(config, client.clone()).credentials()?;
        Ok(Self::with_credentials(client, config, credentials))
    }

    pub fn with_credentials(client: Client, config: &Config, credentials: Credentials) -> Self {
        VisionClient {
            client,
            url: config.annotate_url(),
            credentials,
        }
    }
}

impl Annotator for VisionClient {
    fn annotate(&self, batch: &BatchAnnotateImagesRequest) -> Result<BatchAnnotateImagesResponse> {
        debug!("POST {} ({} image(s))", self.url, batch.requests.len());
        let req = self.client.post(&self.url).json(batch);
        let res = self
            .credentials
            .authorize(req)
            .send()
            .context("Failed to send annotate request")?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_else(|_| "".into());
            let msg = match serde_json::from_str::<ErrorEnvelope>(&txt) {
                Ok(env) if !env.error.message.is_empty() => env.error.message,
                _ => txt,
            };
            bail!("Annotate request failed: {} - {}", status, msg);
        }
        let resp: BatchAnnotateImagesResponse =
            res.json().context("Parsing annotate response json")?;
        debug!("received {} response(s)", resp.responses.len());
        Ok(resp)
    }
}
