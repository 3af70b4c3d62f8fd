//! Content analyzer: fetch a source URL, hash it, derive a display name.

use crate::error::UploadError;
use bytes::{Bytes, BytesMut};
use relink_core::asset::name_from_hint;
use relink_core::config::FetchConfig;
use relink_core::ContentHash;

/// Result of analyzing one source URL.
#[derive(Debug, Clone)]
pub struct Analyzed {
    /// The fetched bytes.
    pub bytes: Bytes,
    /// SHA-256 of the bytes.
    pub hash: ContentHash,
    /// Display name suffix, possibly empty.
    pub name: String,
}

/// Fetches source media and derives the queue's file descriptors.
pub struct Analyzer {
    client: reqwest::Client,
    max_size: u64,
}

impl Analyzer {
    /// Create an analyzer with the configured timeout and size limit.
    pub fn new(config: &FetchConfig) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| UploadError::Fetch(e.to_string()))?;
        Ok(Self {
            client,
            max_size: config.max_size,
        })
    }

    /// Fetch `url` and compute its hash and name.
    ///
    /// The response body is streamed with the size limit enforced per
    /// chunk, so an oversized or lying upstream never materializes more
    /// than `max_size` bytes. The name comes from the caller's hint when
    /// given, otherwise from the response content type.
    pub async fn analyze(&self, url: &str, hint: Option<&str>) -> Result<Analyzed, UploadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| UploadError::Fetch(e.to_string()))?;

        if let Some(len) = response.content_length() {
            if len > self.max_size {
                return Err(UploadError::TooLarge {
                    size: len,
                    max: self.max_size,
                });
            }
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let mut body = BytesMut::new();
        let mut response = response;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| UploadError::Fetch(e.to_string()))?
        {
            if (body.len() + chunk.len()) as u64 > self.max_size {
                return Err(UploadError::TooLarge {
                    size: (body.len() + chunk.len()) as u64,
                    max: self.max_size,
                });
            }
            body.extend_from_slice(&chunk);
        }
        let bytes = body.freeze();

        let hash = ContentHash::compute(&bytes);
        let name = match hint {
            Some(hint) if !hint.trim().is_empty() => name_from_hint(hint),
            _ => extension_for(content_type.as_deref()),
        };

        Ok(Analyzed { bytes, hash, name })
    }
}

/// Map a media content type to a filename extension suffix.
fn extension_for(content_type: Option<&str>) -> String {
    let Some(content_type) = content_type else {
        return String::new();
    };
    // Parameters like "; charset=..." are irrelevant here.
    let essence = content_type.split(';').next().unwrap_or("").trim();
    let ext = match essence {
        "image/png" => ".png",
        "image/jpeg" => ".jpg",
        "image/gif" => ".gif",
        "image/webp" => ".webp",
        "image/bmp" => ".bmp",
        "image/svg+xml" => ".svg",
        "audio/mpeg" => ".mp3",
        "audio/ogg" => ".ogg",
        "audio/wav" | "audio/x-wav" => ".wav",
        "audio/flac" => ".flac",
        "audio/mp4" => ".m4a",
        "video/mp4" => ".mp4",
        "video/webm" => ".webm",
        "video/quicktime" => ".mov",
        "video/x-matroska" => ".mkv",
        _ => "",
    };
    ext.to_string()
}
