//! QR payload provider: reuse a pre-rendered payload when the voucher
//! carries one, otherwise synthesize from the redemption code. Synthesized
//! codes are drawn as vector module rects, which stay crisp at print size
//! and keep the output deterministic.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use qrcode::{EcLevel, QrCode};
use thiserror::Error;

use super::assets::{ImageAsset, decode_image};
use super::color::Rgb;
use super::pdf::PdfPage;

#[derive(Debug, Error)]
pub enum QrSynthError {
    #[error("QR encoding failed: {0}")]
    Encode(String),
    #[error("pre-rendered QR payload is not a data URI")]
    BadDataUri,
    #[error("pre-rendered QR payload failed to decode: {0}")]
    BadImage(String),
}

/// Dark-module bitmap of a synthesized code.
pub struct QrMatrix {
    modules: Vec<bool>,
    width: usize,
    dark: Rgb,
}

pub enum QrPayload {
    /// Pre-rendered payload supplied with the voucher, used unmodified.
    Image(ImageAsset),
    /// Synthesized on demand from the redemption code.
    Matrix(QrMatrix),
}

/// Synthesize a QR code: error-correction level M, dark modules in the
/// voucher's text color, light modules left to the page background.
pub fn synthesize(data: &str, dark: Rgb) -> Result<QrMatrix, QrSynthError> {
    let code = QrCode::with_error_correction_level(data, EcLevel::M)
        .map_err(|e| QrSynthError::Encode(e.to_string()))?;
    let width = code.width();
    let modules = code
        .to_colors()
        .into_iter()
        .map(|c| c == qrcode::Color::Dark)
        .collect();
    Ok(QrMatrix {
        modules,
        width,
        dark,
    })
}

/// Decode a `data:image/...;base64,` payload into an embeddable image.
pub fn decode_data_uri(uri: &str) -> Result<ImageAsset, QrSynthError> {
    let encoded = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, data)| data)
        .ok_or(QrSynthError::BadDataUri)?;
    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|e| QrSynthError::BadImage(e.to_string()))?;
    decode_image(&bytes).map_err(|e| QrSynthError::BadImage(e.to_string()))
}

/// Resolve the QR payload for a voucher: pre-rendered payload first, then
/// synthesis from `code`, falling back to the voucher id when the code is
/// empty.
pub fn ensure_qr_payload(
    pre_rendered: Option<&str>,
    code: &str,
    id: &str,
    dark: Rgb,
) -> Result<QrPayload, QrSynthError> {
    if let Some(uri) = pre_rendered.filter(|s| !s.is_empty()) {
        return decode_data_uri(uri).map(QrPayload::Image);
    }
    let data = if code.is_empty() { id } else { code };
    synthesize(data, dark).map(QrPayload::Matrix)
}

/// Draw the payload as a square of side `size` mm at `(x, y)` top-left,
/// with a white backing and a 1-module quiet zone for matrix payloads.
pub fn draw_qr(page: &mut PdfPage, payload: &QrPayload, x: f64, y: f64, size: f64) {
    match payload {
        QrPayload::Image(asset) => {
            page.draw_jpeg(asset.jpeg.clone(), asset.width, asset.height, x, y, size, size);
        }
        QrPayload::Matrix(matrix) => {
            page.fill_rect(x, y, size, size, Rgb::WHITE);
            let quiet = 1.0;
            let module = size / (matrix.width as f64 + 2.0 * quiet);
            for row in 0..matrix.width {
                for col in 0..matrix.width {
                    if matrix.modules[row * matrix.width + col] {
                        page.fill_rect(
                            x + (col as f64 + quiet) * module,
                            y + (row as f64 + quiet) * module,
                            module,
                            module,
                            matrix.dark,
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::assets::test_support::sample_png;

    #[test]
    fn synthesizes_matrix_from_code() {
        let matrix = synthesize("GIFT2024ABC123", Rgb::BLACK).unwrap();
        assert!(matrix.width >= 21);
        assert_eq!(matrix.modules.len(), matrix.width * matrix.width);
        assert!(matrix.modules.iter().any(|&m| m));
    }

    #[test]
    fn prefers_pre_rendered_payload() {
        let uri = format!("data:image/png;base64,{}", BASE64.encode(sample_png()));
        let payload = ensure_qr_payload(Some(&uri), "CODE", "id", Rgb::BLACK).unwrap();
        assert!(matches!(payload, QrPayload::Image(_)));
    }

    #[test]
    fn falls_back_to_id_when_code_empty() {
        let payload = ensure_qr_payload(None, "", "a-voucher-id", Rgb::BLACK).unwrap();
        assert!(matches!(payload, QrPayload::Matrix(_)));
    }

    #[test]
    fn rejects_non_data_uri_payload() {
        assert!(matches!(
            decode_data_uri("https://example.com/qr.png"),
            Err(QrSynthError::BadDataUri)
        ));
    }
}
