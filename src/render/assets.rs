//! Remote image loading for voucher logos and illustrations.
//!
//! Fetch failures are recoverable by design: the composer substitutes a
//! placeholder block of identical geometry, so a dead logo URL never aborts
//! document generation.

use std::io::Cursor;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset request failed: {0}")]
    Request(String),
    #[error("asset responded with status {0}")]
    Status(u16),
    #[error("asset is not a decodable image: {0}")]
    Decode(String),
}

/// A raster image converted to RGB JPEG, ready for PDF embedding.
/// The original encoding (PNG or JPEG) is not preserved; re-encoding is
/// cosmetic only.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ImageAsset {
    /// Fit the image into a bounding box, preserving aspect ratio.
    /// Returns `(w, h)` in the box's units, centered placement left to the
    /// caller.
    pub fn fit(&self, box_w: f64, box_h: f64) -> (f64, f64) {
        let aspect = self.width as f64 / self.height as f64;
        if aspect > box_w / box_h {
            (box_w, box_w / aspect)
        } else {
            (box_h * aspect, box_h)
        }
    }
}

/// Decode PNG/JPEG bytes into an embeddable [`ImageAsset`].
pub fn decode_image(bytes: &[u8]) -> Result<ImageAsset, AssetError> {
    let img = image::load_from_memory(bytes).map_err(|e| AssetError::Decode(e.to_string()))?;
    let rgb = img.into_rgb8();
    let (width, height) = (rgb.width(), rgb.height());

    let mut jpeg = Vec::new();
    image::DynamicImage::from(rgb)
        .write_to(&mut Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
        .map_err(|e| AssetError::Decode(e.to_string()))?;

    Ok(ImageAsset {
        jpeg,
        width,
        height,
    })
}

/// Byte source for remote assets; injectable so the composer is testable
/// without a network.
pub trait AssetFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, AssetError>> + Send;
}

/// Production fetcher backed by reqwest with a bounded request timeout, so
/// a hanging host degrades to the placeholder instead of stalling the
/// render.
#[derive(Clone)]
pub struct HttpAssetFetcher {
    client: reqwest::Client,
}

impl HttpAssetFetcher {
    /// Builder failure is a startup error; a fetcher without its timeout
    /// would let a hanging host stall the render.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Shared HTTP client, also used for non-asset outbound lookups.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AssetError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(AssetError::Status(resp.status().as_u16()));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| AssetError::Request(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Fetch and decode in one step.
pub async fn load_image_asset<F: AssetFetcher>(
    fetcher: &F,
    url: &str,
) -> Result<ImageAsset, AssetError> {
    let bytes = fetcher.fetch(url).await?;
    decode_image(&bytes)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::collections::HashMap;

    /// In-memory fetcher: known URLs resolve to canned bytes, everything
    /// else errors like an unreachable host.
    pub struct StubFetcher {
        pub responses: HashMap<String, Vec<u8>>,
    }

    impl StubFetcher {
        pub fn empty() -> Self {
            Self {
                responses: HashMap::new(),
            }
        }

        pub fn with(url: &str, bytes: Vec<u8>) -> Self {
            let mut responses = HashMap::new();
            responses.insert(url.to_string(), bytes);
            Self { responses }
        }
    }

    impl AssetFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetError> {
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| AssetError::Request(format!("unreachable host: {url}")))
        }
    }

    /// Tiny valid PNG (2x2, opaque) for decode tests.
    pub fn sample_png() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(2, 2, image::Rgb([200, 30, 30]));
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(
                &mut std::io::Cursor::new(&mut out),
                image::ImageFormat::Png,
            )
            .unwrap();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn decodes_png_into_jpeg_asset() {
        let asset = decode_image(&sample_png()).unwrap();
        assert_eq!((asset.width, asset.height), (2, 2));
        // JPEG SOI marker
        assert_eq!(&asset.jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn rejects_non_image_bytes() {
        assert!(decode_image(b"definitely not an image").is_err());
    }

    #[test]
    fn fit_preserves_aspect_ratio() {
        let asset = ImageAsset {
            jpeg: Vec::new(),
            width: 200,
            height: 100,
        };
        let (w, h) = asset.fit(50.0, 50.0);
        assert_eq!((w, h), (50.0, 25.0));
        let (w, h) = asset.fit(10.0, 50.0);
        assert_eq!((w, h), (10.0, 5.0));
    }

    #[tokio::test]
    async fn stub_fetcher_errors_on_unknown_url() {
        let fetcher = StubFetcher::empty();
        let err = load_image_asset(&fetcher, "https://nowhere.invalid/logo.png")
            .await
            .unwrap_err();
        assert!(matches!(err, AssetError::Request(_)));
    }
}
