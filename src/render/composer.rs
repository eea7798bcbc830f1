//! The layout composer: one shared, single-pass composition routine fed by
//! per-template parameter records. Elements are painted back-to-front;
//! optional assets degrade to placeholders or omission without ever
//! aborting the document.

use thiserror::Error;

use crate::models::Voucher;

use super::assets::{AssetFetcher, ImageAsset, load_image_asset};
use super::color::{ColorFormatError, Rgb, hex_to_rgb};
use super::pdf::{Align, Font, PdfPage};
use super::qr::{draw_qr, ensure_qr_payload};
use super::shapes::{draw_border_decorations, draw_seal, draw_star};
use super::template::{Corner, FrameStyle, Template};

const MARGIN: f64 = 10.0;
const TEXT_GRAY: Rgb = Rgb::new(78, 78, 78);
const PLACEHOLDER_GRAY: Rgb = Rgb::new(229, 229, 229);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Color(#[from] ColorFormatError),
}

/// Issuer identity shown in the header zone. The thumbnail comes from the
/// account's company logo, independent of the voucher's illustration.
#[derive(Debug, Clone, Default)]
pub struct BrandHeader {
    pub company: String,
    pub tagline: Option<String>,
    pub logo_url: Option<String>,
}

/// Compose the print-ready voucher document.
///
/// The two remote fetches (header thumbnail, side illustration) run
/// concurrently; composition joins on both before drawing. The output
/// contains no timestamps, so identical input renders byte-identical
/// bytes.
pub async fn render_voucher_document<F: AssetFetcher>(
    voucher: &Voucher,
    brand: &BrandHeader,
    fetcher: &F,
) -> Result<Vec<u8>, RenderError> {
    let primary = hex_to_rgb(&voucher.primary_color)?;
    let secondary = hex_to_rgb(&voucher.secondary_color)?;
    let text_color = hex_to_rgb(&voucher.text_color)?;

    let template = Template::parse(&voucher.template).unwrap_or(Template::Classic);
    let spec = template.spec();

    let thumb_url = brand.logo_url.as_deref().filter(|u| !u.is_empty());
    let illus_url = voucher.logo_url.as_deref().filter(|u| !u.is_empty());

    let (thumbnail, illustration) = tokio::join!(
        fetch_optional(fetcher, voucher.show_logo.then_some(thumb_url).flatten()),
        fetch_optional(fetcher, illus_url),
    );

    let qr = if voucher.show_qr_code {
        match ensure_qr_payload(
            voucher.qr_code.as_deref(),
            &voucher.code,
            &voucher.id.to_string(),
            text_color,
        ) {
            Ok(payload) => Some(payload),
            Err(err) => {
                tracing::warn!(voucher_id = %voucher.id, error = %err, "QR synthesis failed, omitting QR area");
                None
            }
        }
    } else {
        None
    };

    let mut page = PdfPage::a5_landscape();
    let (w, h) = (page.width(), page.height());

    // 1. background
    page.fill_rect(0.0, 0.0, w, h, Rgb::WHITE);

    // 2. frame
    match spec.frame {
        FrameStyle::None => {}
        FrameStyle::Rule => page.stroke_rect(6.0, 6.0, w - 12.0, h - 12.0, secondary, 0.35),
        FrameStyle::Ornate => draw_border_decorations(&mut page, w, h, primary),
    }

    // 3. header zone
    let header_h = if spec.header_band { 20.0 } else { 14.0 };
    let header_text = if spec.header_band {
        page.fill_rect(0.0, 0.0, w, header_h, primary);
        text_color
    } else {
        secondary
    };
    page.text(
        Font::HelveticaBold,
        16.0,
        MARGIN,
        12.0,
        header_text,
        Align::Left,
        &brand.company,
    );
    if let Some(tagline) = brand.tagline.as_deref().filter(|t| !t.is_empty()) {
        page.text(
            Font::Helvetica,
            8.0,
            MARGIN,
            17.0,
            header_text,
            Align::Left,
            tagline,
        );
    }

    // 11. status badge, anchored top-right (drawn early so the header band
    // sits under it, but nothing later overlaps the corner)
    let badge_label = voucher.status.to_uppercase();
    let badge_w = page.text_width(Font::HelveticaBold, 8.0, &badge_label) + 6.0;
    let badge_x = w - MARGIN - badge_w;
    let badge_y = if spec.header_band { header_h + 2.0 } else { 5.0 };
    page.fill_rect(badge_x, badge_y, badge_w, 7.0, status_color(&voucher.status));
    page.text(
        Font::HelveticaBold,
        8.0,
        badge_x + badge_w / 2.0,
        badge_y + 5.0,
        Rgb::WHITE,
        Align::Center,
        &badge_label,
    );

    // header thumbnail, left of the badge
    if voucher.show_logo {
        let size = spec.logo_size;
        let x = badge_x - size - 6.0;
        let y = (header_h - size).max(1.0) / 2.0;
        match &thumbnail {
            Some(asset) => {
                let (dw, dh) = asset.fit(size, size);
                page.draw_jpeg(
                    asset.jpeg.clone(),
                    asset.width,
                    asset.height,
                    x + (size - dw) / 2.0,
                    y + (size - dh) / 2.0,
                    dw,
                    dh,
                );
            }
            None if thumb_url.is_some() => draw_placeholder(&mut page, x, y, size, size),
            None => {}
        }
    }

    // text column width: never collide with the right-side image region
    let reserve = if illus_url.is_some() {
        w / 2.5 + MARGIN
    } else if voucher.show_logo {
        spec.logo_size + MARGIN
    } else {
        0.0
    };
    let max_text_w = w - 2.0 * MARGIN - reserve;

    // 4. title
    let title = if voucher.name.trim().is_empty() {
        "Gift Voucher"
    } else {
        voucher.name.as_str()
    };
    let mut cursor = header_h + 14.0;
    for line in page.wrap(spec.title_font, spec.title_size, max_text_w, title) {
        page.text(
            spec.title_font,
            spec.title_size,
            MARGIN,
            cursor,
            secondary,
            Align::Left,
            &line,
        );
        cursor += spec.title_size * 0.45;
    }
    cursor += 2.0;

    // 5. description
    if let Some(description) = voucher.description.as_deref().filter(|d| !d.is_empty()) {
        for line in page.wrap(Font::Helvetica, 11.0, max_text_w, description) {
            page.text(
                Font::Helvetica,
                11.0,
                MARGIN,
                cursor,
                TEXT_GRAY,
                Align::Left,
                &line,
            );
            cursor += 5.0;
        }
        cursor += 1.5;
    }

    // rating glyphs
    if spec.star_row {
        for i in 0..5 {
            draw_star(&mut page, MARGIN + 4.0 + i as f64 * 9.0, cursor + 2.0, 3.2, primary);
        }
        cursor += 10.0;
    }

    // 6. amount
    if let Some(amount) = voucher.amount {
        let currency = voucher.currency.as_deref().unwrap_or("");
        page.text(
            Font::HelveticaBold,
            15.0,
            MARGIN,
            cursor + 4.0,
            primary,
            Align::Left,
            &format_amount(amount, currency),
        );
        cursor += 11.0;
    }

    // 7. voucher code block
    page.text(
        Font::Helvetica,
        7.5,
        MARGIN,
        cursor + 3.0,
        TEXT_GRAY,
        Align::Left,
        "VOUCHER CODE",
    );
    page.text(
        Font::Courier,
        12.0,
        MARGIN,
        cursor + 9.0,
        Rgb::BLACK,
        Align::Left,
        &voucher.code,
    );

    // 8. QR code + caption
    if let Some(payload) = &qr {
        let qr_x = match spec.qr_corner {
            Corner::BottomLeft => MARGIN,
            Corner::BottomRight => w - MARGIN - spec.qr_size,
        };
        let qr_y = h - spec.qr_size - 20.0;
        draw_qr(&mut page, payload, qr_x, qr_y, spec.qr_size);
        page.text(
            Font::Helvetica,
            8.0,
            qr_x + spec.qr_size / 2.0,
            qr_y + spec.qr_size + 4.5,
            TEXT_GRAY,
            Align::Center,
            "Scan to validate",
        );
    }

    // 9. side illustration, opposite corner from the QR
    if illus_url.is_some() {
        let box_w = w / 2.5;
        let box_h = h / 2.5;
        let box_x = match spec.qr_corner {
            Corner::BottomLeft => w - box_w - MARGIN,
            Corner::BottomRight => MARGIN,
        };
        let box_y = 28.0;
        match &illustration {
            Some(asset) => {
                let (dw, dh) = asset.fit(box_w, box_h);
                page.draw_jpeg(
                    asset.jpeg.clone(),
                    asset.width,
                    asset.height,
                    box_x + (box_w - dw) / 2.0,
                    box_y + (box_h - dh) / 2.0,
                    dw,
                    dh,
                );
            }
            None => draw_placeholder(&mut page, box_x, box_y, box_w, box_h),
        }
    }

    // validity seal, kept clear of the QR block
    if spec.seal {
        let seal_x = match spec.qr_corner {
            Corner::BottomLeft => w - 32.0,
            Corner::BottomRight => 32.0,
        };
        draw_seal(
            &mut page,
            seal_x,
            h - 36.0,
            13.0,
            primary,
            Rgb::WHITE,
            "VALID",
            "1 YEAR",
        );
    }

    // 10. footer
    let footer_text = expiry_statement(voucher);
    if spec.footer_band {
        page.fill_rect(0.0, h - 10.0, w, 10.0, primary);
        page.text(
            Font::HelveticaBold,
            10.0,
            w / 2.0,
            h - 3.5,
            text_color,
            Align::Center,
            &footer_text,
        );
    } else {
        page.text(
            Font::Helvetica,
            9.0,
            w / 2.0,
            h - 6.0,
            TEXT_GRAY,
            Align::Center,
            &footer_text,
        );
    }

    Ok(page.finish())
}

async fn fetch_optional<F: AssetFetcher>(fetcher: &F, url: Option<&str>) -> Option<ImageAsset> {
    let url = url?;
    match load_image_asset(fetcher, url).await {
        Ok(asset) => Some(asset),
        Err(err) => {
            tracing::warn!(url, error = %err, "asset load failed, using placeholder");
            None
        }
    }
}

/// Neutral block with the same bounding box as the intended image, so the
/// rest of the layout is unaffected by a dead URL.
fn draw_placeholder(page: &mut PdfPage, x: f64, y: f64, w: f64, h: f64) {
    page.fill_rect(x, y, w, h, PLACEHOLDER_GRAY);
    page.text(
        Font::Helvetica,
        8.0,
        x + w / 2.0,
        y + h / 2.0 + 1.0,
        TEXT_GRAY,
        Align::Center,
        "Image unavailable",
    );
}

/// Fixed status -> color map. Unrecognized values fall back to neutral
/// gray, never an alarming color.
fn status_color(status: &str) -> Rgb {
    match status {
        "active" => Rgb::new(46, 125, 50),
        "expired" => Rgb::new(198, 40, 40),
        "draft" | "pending" => Rgb::new(249, 168, 37),
        _ => Rgb::new(117, 117, 117),
    }
}

/// `EUR50`, or `EUR12.50` when the amount has cents.
fn format_amount(amount: f64, currency: &str) -> String {
    if (amount - amount.round()).abs() < 1e-9 {
        format!("{currency}{:.0}", amount)
    } else {
        format!("{currency}{:.2}", amount)
    }
}

/// Footer statement: an absolute `dd/mm/yyyy` date when the voucher shows
/// one, otherwise the generic validity line.
fn expiry_statement(voucher: &Voucher) -> String {
    match voucher.expiry_date.filter(|_| voucher.show_expiry_date) {
        Some(date) => format!("Valid until {}", date.format("%d/%m/%Y")),
        None => "Valid for 1 year from issue".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::assets::test_support::{StubFetcher, sample_png};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn sample_voucher() -> Voucher {
        Voucher {
            id: Uuid::nil(),
            owner_id: Uuid::nil(),
            code: "GIFT2024ABC123".into(),
            name: "Beach Ride".into(),
            description: Some("An unforgettable experience by the sea".into()),
            amount: Some(50.0),
            currency: Some("EUR".into()),
            qr_code: None,
            template: "classic".into(),
            primary_color: "#F9A825".into(),
            secondary_color: "#4E4E4E".into(),
            text_color: "#FFFFFF".into(),
            logo_url: None,
            show_logo: false,
            show_qr_code: true,
            show_expiry_date: true,
            status: "active".into(),
            redemptions: 0,
            total_redemptions: Some(1),
            expiry_date: Some(Utc.with_ymd_and_hms(2025, 2, 14, 0, 0, 0).unwrap()),
            created_at: Utc.with_ymd_and_hms(2024, 2, 14, 0, 0, 0).unwrap(),
        }
    }

    fn brand() -> BrandHeader {
        BrandHeader {
            company: "ECO SALGADOS".into(),
            tagline: Some("AGROTOURISM & EQUESTRIAN ACTIVITIES".into()),
            logo_url: None,
        }
    }

    #[tokio::test]
    async fn renders_a_structurally_valid_document() {
        let bytes = render_voucher_document(&sample_voucher(), &brand(), &StubFetcher::empty())
            .await
            .unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(bytes.ends_with(b"%%EOF\n"));
        let text = String::from_utf8_lossy(&bytes).to_string();
        assert!(text.contains("(Beach Ride) Tj"));
        assert!(text.contains("(GIFT2024ABC123) Tj"));
        assert!(text.contains("(VOUCHER CODE) Tj"));
        assert!(text.contains("(EUR50) Tj"));
        assert!(text.contains("(ACTIVE) Tj"));
        assert!(text.contains("(Valid until 14/02/2025) Tj"));
        assert!(text.contains("(Scan to validate) Tj"));
    }

    #[tokio::test]
    async fn rerender_is_byte_identical() {
        let voucher = sample_voucher();
        let fetcher = StubFetcher::empty();
        let first = render_voucher_document(&voucher, &brand(), &fetcher)
            .await
            .unwrap();
        let second = render_voucher_document(&voucher, &brand(), &fetcher)
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn unreachable_illustration_degrades_to_placeholder() {
        let mut voucher = sample_voucher();
        voucher.logo_url = Some("https://unreachable.invalid/horse.png".into());
        let bytes = render_voucher_document(&voucher, &brand(), &StubFetcher::empty())
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&bytes).to_string();
        assert!(text.contains("(Image unavailable) Tj"));
    }

    #[tokio::test]
    async fn reachable_illustration_is_embedded() {
        let mut voucher = sample_voucher();
        voucher.logo_url = Some("https://cdn.example/horse.png".into());
        let fetcher = StubFetcher::with("https://cdn.example/horse.png", sample_png());
        let bytes = render_voucher_document(&voucher, &brand(), &fetcher)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&bytes).to_string();
        assert!(text.contains("/Subtype /Image"));
        assert!(!text.contains("(Image unavailable) Tj"));
    }

    #[tokio::test]
    async fn empty_name_falls_back_to_template_default() {
        let mut voucher = sample_voucher();
        voucher.name = "  ".into();
        let bytes = render_voucher_document(&voucher, &brand(), &StubFetcher::empty())
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("(Gift Voucher) Tj"));
    }

    #[tokio::test]
    async fn hidden_expiry_uses_generic_statement() {
        let mut voucher = sample_voucher();
        voucher.show_expiry_date = false;
        let bytes = render_voucher_document(&voucher, &brand(), &StubFetcher::empty())
            .await
            .unwrap();
        assert!(
            String::from_utf8_lossy(&bytes).contains("(Valid for 1 year from issue) Tj")
        );
    }

    #[tokio::test]
    async fn all_templates_render() {
        for template in ["classic", "modern", "elegant", "festive"] {
            let mut voucher = sample_voucher();
            voucher.template = template.into();
            let bytes = render_voucher_document(&voucher, &brand(), &StubFetcher::empty())
                .await
                .unwrap();
            assert!(bytes.starts_with(b"%PDF-1.4"), "template {template}");
        }
    }

    #[tokio::test]
    async fn malformed_color_is_an_error() {
        let mut voucher = sample_voucher();
        voucher.primary_color = "#zzz".into();
        let err = render_voucher_document(&voucher, &brand(), &StubFetcher::empty())
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Color(_)));
    }

    #[test]
    fn amount_formatting() {
        assert_eq!(format_amount(50.0, "EUR"), "EUR50");
        assert_eq!(format_amount(12.5, "USD"), "USD12.50");
        assert_eq!(format_amount(7.0, ""), "7");
    }

    #[test]
    fn unknown_status_maps_to_neutral_gray() {
        assert_eq!(status_color("banana"), Rgb::new(117, 117, 117));
        assert_eq!(status_color("used"), Rgb::new(117, 117, 117));
        assert_ne!(status_color("active"), status_color("expired"));
    }
}
