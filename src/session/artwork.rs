use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument, warn};

use super::{Artwork, ArtworkError};
use crate::config::ArtworkConfig;

/// Where an artwork reference points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtworkSource {
    /// Remote image fetched over HTTP(S)
    Http(String),

    /// Inline base64 payload
    DataUri {
        /// Declared MIME type
        mime_type: Option<String>,
        /// Base64 text after the `;base64,` marker
        payload: String,
    },

    /// Reference the resolver cannot fetch (`blob:`, file paths, ...)
    Unsupported(String),
}

impl ArtworkSource {
    /// Classify an artwork `src`. Empty strings yield `None`.
    pub fn parse(src: &str) -> Option<Self> {
        const BASE64_MARKER: &str = ";base64,";

        let src = src.trim();
        if src.is_empty() {
            return None;
        }
        if src.starts_with("blob:") {
            return Some(Self::Unsupported(src.to_string()));
        }
        if src.starts_with("http://") || src.starts_with("https://") {
            return Some(Self::Http(src.to_string()));
        }
        if let Some(index) = src.find(BASE64_MARKER) {
            let mime_type = src[..index]
                .strip_prefix("data:")
                .filter(|mime| !mime.is_empty())
                .map(str::to_string);
            return Some(Self::DataUri {
                mime_type,
                payload: src[index + BASE64_MARKER.len()..].to_string(),
            });
        }
        Some(Self::Unsupported(src.to_string()))
    }
}

/// Resolves an artwork reference to image data, off the reconcile path.
#[async_trait]
pub trait ArtworkResolver: Send + Sync {
    /// Fetch or decode the image behind `source`.
    ///
    /// # Errors
    /// Returns `ArtworkError` for unsupported schemes, network or decode failures.
    async fn resolve(&self, source: &ArtworkSource) -> Result<Artwork, ArtworkError>;
}

/// Decodes inline data URIs and fetches HTTP(S) images.
#[derive(Debug, Clone)]
pub struct DefaultArtworkResolver {
    client: reqwest::Client,
    enabled: bool,
    max_bytes: usize,
}

impl DefaultArtworkResolver {
    /// Build a resolver from configuration.
    ///
    /// # Errors
    /// Returns `ArtworkError::Fetch` if the HTTP client cannot be constructed.
    pub fn new(config: &ArtworkConfig) -> Result<Self, ArtworkError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()
            .map_err(|e| ArtworkError::Fetch(format!("HTTP client setup failed: {e}")))?;

        Ok(Self {
            client,
            enabled: config.enabled,
            max_bytes: config.max_bytes,
        })
    }

    fn decode_data_uri(
        &self,
        mime_type: Option<&str>,
        payload: &str,
    ) -> Result<Artwork, ArtworkError> {
        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(ArtworkError::InvalidDataUri("empty payload".to_string()));
        }

        let bytes = general_purpose::STANDARD.decode(compact)?;
        self.check_size(bytes.len())?;
        Ok(Artwork::new(bytes, mime_type.map(str::to_string)))
    }

    async fn fetch(&self, url: &str) -> Result<Artwork, ArtworkError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| ArtworkError::Fetch(e.to_string()))?;

        if let Some(length) = response.content_length() {
            self.check_size(usize::try_from(length).unwrap_or(usize::MAX))?;
        }
        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ArtworkError::Fetch(e.to_string()))?;
        self.check_size(bytes.len())?;
        Ok(Artwork::new(bytes.to_vec(), mime_type))
    }

    fn check_size(&self, size: usize) -> Result<(), ArtworkError> {
        if size == 0 {
            return Err(ArtworkError::Empty);
        }
        if size > self.max_bytes {
            return Err(ArtworkError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ArtworkResolver for DefaultArtworkResolver {
    async fn resolve(&self, source: &ArtworkSource) -> Result<Artwork, ArtworkError> {
        if !self.enabled {
            return Err(ArtworkError::Disabled);
        }

        match source {
            ArtworkSource::Http(url) => self.fetch(url).await,
            ArtworkSource::DataUri { mime_type, payload } => {
                self.decode_data_uri(mime_type.as_deref(), payload)
            }
            ArtworkSource::Unsupported(src) => Err(ArtworkError::UnsupportedScheme(src.clone())),
        }
    }
}

/// Pending artwork resolution issued by the session.
///
/// The generation lets the session discard results superseded by a newer
/// request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkRequest {
    /// Monotonic request number
    pub generation: u64,

    /// Reference to resolve
    pub source: ArtworkSource,
}

/// Finished artwork resolution, handed back to the session.
#[derive(Debug)]
pub struct ArtworkOutcome {
    /// Generation of the originating request
    pub generation: u64,

    /// Resolved image or the reason it is unavailable
    pub result: Result<Artwork, ArtworkError>,
}

/// Resolve `request` with `resolver`. Failures are logged and carried in the outcome.
#[instrument(skip(resolver), fields(generation = request.generation))]
pub async fn resolve_request(
    resolver: &dyn ArtworkResolver,
    request: ArtworkRequest,
) -> ArtworkOutcome {
    let result = resolver.resolve(&request.source).await;
    match &result {
        Ok(artwork) => debug!(bytes = artwork.bytes().len(), "artwork resolved"),
        Err(ArtworkError::UnsupportedScheme(src)) => {
            debug!(src = %src, "artwork source not supported, skipping")
        }
        Err(e) => warn!(error = %e, "unable to resolve artwork"),
    }

    ArtworkOutcome {
        generation: request.generation,
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> DefaultArtworkResolver {
        DefaultArtworkResolver::new(&ArtworkConfig::default()).unwrap()
    }

    #[test]
    fn classifies_sources() {
        assert_eq!(ArtworkSource::parse("   "), None);
        assert_eq!(
            ArtworkSource::parse("https://example.com/cover.jpg"),
            Some(ArtworkSource::Http("https://example.com/cover.jpg".to_string()))
        );
        assert!(matches!(
            ArtworkSource::parse("blob:https://example.com/1234"),
            Some(ArtworkSource::Unsupported(_))
        ));
        assert!(matches!(
            ArtworkSource::parse("/local/cover.png"),
            Some(ArtworkSource::Unsupported(_))
        ));
        assert_eq!(
            ArtworkSource::parse("data:image/png;base64,AAEC"),
            Some(ArtworkSource::DataUri {
                mime_type: Some("image/png".to_string()),
                payload: "AAEC".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn decodes_base64_data_uri() {
        let source = ArtworkSource::parse("data:image/png;base64,AAEC\nAw==").unwrap();

        let artwork = resolver().resolve(&source).await.unwrap();

        assert_eq!(artwork.bytes(), &[0, 1, 2, 3]);
        assert_eq!(artwork.mime_type(), Some("image/png"));
    }

    #[tokio::test]
    async fn rejects_corrupt_payload() {
        let source = ArtworkSource::parse("data:image/png;base64,@@@").unwrap();

        let result = resolver().resolve(&source).await;

        assert!(matches!(result, Err(ArtworkError::Decode(_))));
    }

    #[tokio::test]
    async fn enforces_size_limit() {
        let config = ArtworkConfig {
            max_bytes: 2,
            ..ArtworkConfig::default()
        };
        let resolver = DefaultArtworkResolver::new(&config).unwrap();
        let source = ArtworkSource::parse("data:;base64,AAEC").unwrap();

        let result = resolver.resolve(&source).await;

        assert!(matches!(
            result,
            Err(ArtworkError::TooLarge { size: 3, limit: 2 })
        ));
    }

    #[tokio::test]
    async fn outcome_keeps_request_generation() {
        let request = ArtworkRequest {
            generation: 7,
            source: ArtworkSource::parse("blob:abc").unwrap(),
        };

        let outcome = resolve_request(&resolver(), request).await;

        assert_eq!(outcome.generation, 7);
        assert!(matches!(outcome.result, Err(ArtworkError::UnsupportedScheme(_))));
    }
}
