//! Decorative vector primitives drawn straight onto the page canvas.
//! None of these read voucher data; they are parameterized by geometry
//! and color only.

use std::f64::consts::PI;

use super::color::Rgb;
use super::pdf::{Align, Font, PdfPage};

/// Five-point star centered at `(cx, cy)` with the given outer radius.
/// Inner radius is 40% of the outer, matching the bevelled glyph used for
/// rating rows.
pub fn draw_star(page: &mut PdfPage, cx: f64, cy: f64, size: f64, color: Rgb) {
    let mut points = Vec::with_capacity(10);
    for i in 0..10 {
        let r = if i % 2 == 0 { size } else { size * 0.4 };
        // Start at the top point and go clockwise.
        let angle = -PI / 2.0 + (i as f64) * PI / 5.0;
        points.push((cx + r * angle.cos(), cy + r * angle.sin()));
    }
    page.fill_polygon(&points, color);
}

/// Four-point rhombus centered at `(cx, cy)`.
pub fn draw_diamond(page: &mut PdfPage, cx: f64, cy: f64, size: f64, color: Rgb) {
    page.fill_polygon(
        &[
            (cx, cy - size),
            (cx + size, cy),
            (cx, cy + size),
            (cx - size, cy),
        ],
        color,
    );
}

/// Symmetric L-shaped corner brackets at a fixed inset, plus small diamond
/// accents spaced along the top and left edges.
pub fn draw_border_decorations(page: &mut PdfPage, width: f64, height: f64, color: Rgb) {
    let inset = 6.0;
    let arm = 10.0;
    let thickness = 1.2;

    // (corner x, corner y, x direction, y direction)
    let corners = [
        (inset, inset, 1.0, 1.0),
        (width - inset, inset, -1.0, 1.0),
        (inset, height - inset, 1.0, -1.0),
        (width - inset, height - inset, -1.0, -1.0),
    ];
    for (cx, cy, dx, dy) in corners {
        // horizontal arm
        let x = if dx > 0.0 { cx } else { cx - arm };
        page.fill_rect(x, cy.min(cy + dy * thickness), arm, thickness, color);
        // vertical arm
        let y = if dy > 0.0 { cy } else { cy - arm };
        page.fill_rect(cx.min(cx + dx * thickness), y, thickness, arm, color);
    }

    let accent = 1.1;
    let step = (width - 2.0 * inset - 2.0 * arm) / 6.0;
    for i in 1..6 {
        let x = inset + arm + step * i as f64;
        draw_diamond(page, x, inset + thickness / 2.0, accent, color);
    }
    let step_v = (height - 2.0 * inset - 2.0 * arm) / 4.0;
    for i in 1..4 {
        let y = inset + arm + step_v * i as f64;
        draw_diamond(page, inset + thickness / 2.0, y, accent, color);
    }
}

/// Circular "validity" seal: filled outer disc, inset disc of the page
/// background (so the rim reads as a ring), two short bold caption lines,
/// and a ring of dots at equal angular spacing.
pub fn draw_seal(
    page: &mut PdfPage,
    cx: f64,
    cy: f64,
    radius: f64,
    color: Rgb,
    background: Rgb,
    line1: &str,
    line2: &str,
) {
    page.fill_circle(cx, cy, radius, color);
    page.fill_circle(cx, cy, radius * 0.82, background);

    page.text(
        Font::HelveticaBold,
        radius * 0.55,
        cx,
        cy - radius * 0.05,
        color,
        Align::Center,
        line1,
    );
    page.text(
        Font::HelveticaBold,
        radius * 0.42,
        cx,
        cy + radius * 0.35,
        color,
        Align::Center,
        line2,
    );

    let dots = 16;
    for i in 0..dots {
        let angle = (i as f64) * 2.0 * PI / dots as f64;
        let r = radius * 0.91;
        page.fill_circle(cx + r * angle.cos(), cy + r * angle.sin(), radius * 0.045, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_emits_a_closed_filled_path() {
        let mut page = PdfPage::a5_landscape();
        draw_star(&mut page, 50.0, 50.0, 8.0, Rgb::new(249, 168, 37));
        let text = String::from_utf8_lossy(&page.finish()).to_string();
        assert!(text.contains("h f"));
    }

    #[test]
    fn seal_draws_caption_text() {
        let mut page = PdfPage::a5_landscape();
        draw_seal(
            &mut page,
            100.0,
            70.0,
            14.0,
            Rgb::BLACK,
            Rgb::WHITE,
            "VALID",
            "1 YEAR",
        );
        let text = String::from_utf8_lossy(&page.finish()).to_string();
        assert!(text.contains("(VALID) Tj"));
        assert!(text.contains("(1 YEAR) Tj"));
    }
}
