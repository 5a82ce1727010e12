//! Client for the external face-swap generation endpoint.
//!
//! The endpoint takes a JSON body naming a garment image and a face image and
//! answers with the generated picture itself (not JSON). Its address and even
//! its request schema have shifted over time, so both are configuration.

use std::future::Future;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::TryOnConfig;

/// Used when the endpoint does not label its image.
const FALLBACK_MIME: &str = "image/png";

/// Errors from a single generation request.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Transport failure, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("Generation endpoint returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The endpoint answered 2xx with no image bytes.
    #[error("Generation endpoint returned an empty image")]
    EmptyImage,
}

/// Body of a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub garment_url: String,
    pub model_face_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub garment_type: Option<String>,
}

/// Something that turns a garment and a face into a try-on image.
pub trait Generator: Send + Sync {
    /// Generate one image, returned as a `data:` URL.
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

impl<G: Generator> Generator for Arc<G> {
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send {
        (**self).generate(request)
    }
}

/// [`Generator`] backed by the HTTP endpoint.
#[derive(Clone)]
pub struct HttpGenerator {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpGenerator {
    /// Create a client for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &TryOnConfig) -> Result<Self, GenerationError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: config.endpoint.clone(),
        })
    }

    /// The endpoint requests are sent to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl Generator for HttpGenerator {
    #[instrument(skip(self, request), fields(garment = %request.garment_url))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(200)
                .collect();
            warn!(status = %status, "Generation endpoint returned non-success status");
            return Err(GenerationError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let mime = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(image_mime)
            .unwrap_or_else(|| FALLBACK_MIME.to_owned());

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(GenerationError::EmptyImage);
        }

        debug!(bytes = bytes.len(), %mime, "Try-on image generated");
        Ok(to_data_url(&mime, &bytes))
    }
}

/// The bare `image/*` type of a `Content-Type` header value.
fn image_mime(content_type: &str) -> Option<String> {
    let mime = content_type.split(';').next()?.trim().to_ascii_lowercase();
    mime.starts_with("image/").then_some(mime)
}

/// Encode image bytes as a `data:` URL.
#[must_use]
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Split a base64 `data:` URL into its MIME type and decoded bytes.
#[must_use]
pub fn decode_data_url(data_url: &str) -> Option<(String, Vec<u8>)> {
    let rest = data_url.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(";base64,")?;
    let bytes = STANDARD.decode(payload).ok()?;
    Some((mime.to_owned(), bytes))
}
