//! Single-page PDF canvas written as raw PDF 1.4 syntax.
//!
//! The voucher composer needs only a small drawing surface: solid fills,
//! simple filled paths, base-14 text and JPEG images. Writing the byte
//! stream directly keeps the output fully deterministic, which is what
//! makes re-rendering the same voucher byte-identical.

use std::fmt::Write as _;

use super::color::Rgb;

/// A5 landscape, in millimetres.
pub const PAGE_W_MM: f64 = 210.0;
pub const PAGE_H_MM: f64 = 148.0;

const MM_TO_PT: f64 = 72.0 / 25.4;

/// Bezier circle constant.
const KAPPA: f64 = 0.552_284_749_830_793_4;

/// The four base-14 fonts the composer draws with. Base-14 fonts ship with
/// every PDF viewer, so nothing needs embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Helvetica,
    HelveticaBold,
    Courier,
    TimesItalic,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
            Font::Courier => "F3",
            Font::TimesItalic => "F4",
        }
    }

    fn base_name(self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
            Font::Courier => "Courier",
            Font::TimesItalic => "Times-Italic",
        }
    }

    /// Advance width of `c` in 1/1000 em. Base-14 fonts carry no metrics in
    /// the document, so a class-based approximation is used; it only has to
    /// be good enough for wrap decisions, with a margin of error absorbed by
    /// the layout's side margins.
    fn char_width(self, c: char) -> f64 {
        if self == Font::Courier {
            return 600.0;
        }
        let w = match c {
            ' ' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' | 'i' | 'j' | 'l' | 'I' | 't'
            | 'f' | '(' | ')' | '[' | ']' => 278.0,
            'r' => 333.0,
            'm' | 'M' | 'W' => 889.0,
            'w' => 722.0,
            c if c.is_ascii_uppercase() => 667.0,
            _ => 556.0,
        };
        match self {
            Font::HelveticaBold => w * 1.08,
            Font::TimesItalic => w * 0.92,
            _ => w,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Align {
    Left,
    Center,
}

struct EmbeddedJpeg {
    data: Vec<u8>,
    px_width: u32,
    px_height: u32,
}

/// Drawing surface with a top-left millimetre coordinate system; the
/// conversion to PDF's bottom-left point space happens at operator emission.
pub struct PdfPage {
    width: f64,
    height: f64,
    content: String,
    images: Vec<EmbeddedJpeg>,
}

impl PdfPage {
    pub fn a5_landscape() -> Self {
        Self {
            width: PAGE_W_MM,
            height: PAGE_H_MM,
            content: String::new(),
            images: Vec::new(),
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    fn x_pt(&self, x: f64) -> f64 {
        x * MM_TO_PT
    }

    fn y_pt(&self, y: f64) -> f64 {
        (self.height - y) * MM_TO_PT
    }

    fn set_fill(&mut self, color: Rgb) {
        let _ = writeln!(
            self.content,
            "{:.3} {:.3} {:.3} rg",
            color.r as f64 / 255.0,
            color.g as f64 / 255.0,
            color.b as f64 / 255.0
        );
    }

    /// Solid rectangle; `(x, y)` is the top-left corner.
    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb) {
        self.set_fill(color);
        let _ = writeln!(
            self.content,
            "{:.2} {:.2} {:.2} {:.2} re f",
            self.x_pt(x),
            self.y_pt(y + h),
            w * MM_TO_PT,
            h * MM_TO_PT
        );
    }

    /// Rectangle outline with the given stroke width in millimetres.
    pub fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb, line_w: f64) {
        let _ = writeln!(
            self.content,
            "{:.3} {:.3} {:.3} RG\n{:.2} w",
            color.r as f64 / 255.0,
            color.g as f64 / 255.0,
            color.b as f64 / 255.0,
            line_w * MM_TO_PT
        );
        let _ = writeln!(
            self.content,
            "{:.2} {:.2} {:.2} {:.2} re S",
            self.x_pt(x),
            self.y_pt(y + h),
            w * MM_TO_PT,
            h * MM_TO_PT
        );
    }

    /// Filled polygon given absolute page coordinates.
    pub fn fill_polygon(&mut self, points: &[(f64, f64)], color: Rgb) {
        if points.len() < 3 {
            return;
        }
        self.set_fill(color);
        let (x0, y0) = points[0];
        let _ = writeln!(self.content, "{:.2} {:.2} m", self.x_pt(x0), self.y_pt(y0));
        for &(x, y) in &points[1..] {
            let _ = writeln!(self.content, "{:.2} {:.2} l", self.x_pt(x), self.y_pt(y));
        }
        let _ = writeln!(self.content, "h f");
    }

    /// Filled circle approximated with four Bezier arcs.
    pub fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, color: Rgb) {
        self.set_fill(color);
        let (cx, cy, r) = (self.x_pt(cx), self.y_pt(cy), r * MM_TO_PT);
        let k = KAPPA * r;
        let _ = writeln!(self.content, "{:.2} {:.2} m", cx + r, cy);
        let _ = writeln!(
            self.content,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            cx + r,
            cy + k,
            cx + k,
            cy + r,
            cx,
            cy + r
        );
        let _ = writeln!(
            self.content,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            cx - k,
            cy + r,
            cx - r,
            cy + k,
            cx - r,
            cy
        );
        let _ = writeln!(
            self.content,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            cx - r,
            cy - k,
            cx - k,
            cy - r,
            cx,
            cy - r
        );
        let _ = writeln!(
            self.content,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            cx + k,
            cy - r,
            cx + r,
            cy - k,
            cx + r,
            cy
        );
        let _ = writeln!(self.content, "h f");
    }

    /// Width of `text` in millimetres at the given size.
    pub fn text_width(&self, font: Font, size_pt: f64, text: &str) -> f64 {
        let units: f64 = text.chars().map(|c| font.char_width(c)).sum();
        units / 1000.0 * size_pt / MM_TO_PT
    }

    /// Draw a single line of text; `y` is the baseline measured from the top.
    pub fn text(
        &mut self,
        font: Font,
        size_pt: f64,
        x: f64,
        y: f64,
        color: Rgb,
        align: Align,
        text: &str,
    ) {
        let x = match align {
            Align::Left => x,
            Align::Center => x - self.text_width(font, size_pt, text) / 2.0,
        };
        self.set_fill(color);
        let _ = writeln!(
            self.content,
            "BT\n/{} {:.1} Tf\n{:.2} {:.2} Td\n({}) Tj\nET",
            font.resource(),
            size_pt,
            self.x_pt(x),
            self.y_pt(y),
            escape_pdf_text(text)
        );
    }

    /// Break `text` into lines no wider than `max_width` millimetres.
    /// Splits on whitespace; a single over-long word gets its own line.
    pub fn wrap(&self, font: Font, size_pt: f64, max_width: f64, text: &str) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        for word in text.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if self.text_width(font, size_pt, &candidate) <= max_width || current.is_empty() {
                current = candidate;
            } else {
                lines.push(std::mem::take(&mut current));
                current = word.to_string();
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    /// Place a JPEG image; `(x, y)` is the top-left corner, `w`/`h` in mm.
    pub fn draw_jpeg(&mut self, data: Vec<u8>, px_width: u32, px_height: u32, x: f64, y: f64, w: f64, h: f64) {
        self.images.push(EmbeddedJpeg {
            data,
            px_width,
            px_height,
        });
        let index = self.images.len();
        let _ = writeln!(
            self.content,
            "q\n{:.2} 0 0 {:.2} {:.2} {:.2} cm\n/Im{} Do\nQ",
            w * MM_TO_PT,
            h * MM_TO_PT,
            self.x_pt(x),
            self.y_pt(y + h),
            index
        );
    }

    /// Assemble the final PDF byte stream.
    ///
    /// Object layout: 1 catalog, 2 pages tree, 3 page, 4 content stream,
    /// 5-8 the base-14 fonts, 9+ image XObjects. The content stream is left
    /// uncompressed so tests can assert on drawn text.
    pub fn finish(self) -> Vec<u8> {
        let total_objs = 8 + self.images.len();
        let mut buf: Vec<u8> = Vec::with_capacity(64 * 1024 + self.content.len());
        let mut offsets = vec![0usize; total_objs + 1];

        macro_rules! w {
            ($($arg:tt)*) => { { use std::io::Write; write!(buf, $($arg)*).unwrap() } }
        }

        w!("%PDF-1.4\n");
        buf.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        offsets[1] = buf.len();
        w!("1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

        offsets[2] = buf.len();
        w!("2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n");

        let xobjects: String = (0..self.images.len())
            .map(|i| format!("/Im{} {} 0 R ", i + 1, 9 + i))
            .collect();
        offsets[3] = buf.len();
        w!(
            "3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] /Contents 4 0 R /Resources << /Font << /F1 5 0 R /F2 6 0 R /F3 7 0 R /F4 8 0 R >> /XObject << {}>> >> >>\nendobj\n",
            self.width * MM_TO_PT,
            self.height * MM_TO_PT,
            xobjects
        );

        let content_bytes = self.content.as_bytes();
        offsets[4] = buf.len();
        w!("4 0 obj\n<< /Length {} >>\nstream\n", content_bytes.len());
        buf.extend_from_slice(content_bytes);
        w!("\nendstream\nendobj\n");

        for (i, font) in [
            Font::Helvetica,
            Font::HelveticaBold,
            Font::Courier,
            Font::TimesItalic,
        ]
        .into_iter()
        .enumerate()
        {
            let id = 5 + i;
            offsets[id] = buf.len();
            w!(
                "{} 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>\nendobj\n",
                id,
                font.base_name()
            );
        }

        for (i, img) in self.images.iter().enumerate() {
            let id = 9 + i;
            offsets[id] = buf.len();
            w!(
                "{} 0 obj\n<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode /Length {} >>\nstream\n",
                id,
                img.px_width,
                img.px_height,
                img.data.len()
            );
            buf.extend_from_slice(&img.data);
            w!("\nendstream\nendobj\n");
        }

        let xref_pos = buf.len();
        w!("xref\n0 {}\n", total_objs + 1);
        w!("0000000000 65535 f \n");
        for &offset in offsets[1..=total_objs].iter() {
            w!("{:010} 00000 n \n", offset);
        }
        w!("trailer\n<< /Size {} /Root 1 0 R >>\n", total_objs + 1);
        w!("startxref\n{}\n%%EOF\n", xref_pos);

        buf
    }
}

/// Escape a PDF literal string. Latin-1 characters are emitted as octal
/// escapes (WinAnsiEncoding); anything beyond becomes `?`.
fn escape_pdf_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\\' => out.push_str("\\\\"),
            c if c.is_ascii_graphic() || c == ' ' => out.push(c),
            c if (c as u32) >= 0xA0 && (c as u32) <= 0xFF => {
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            _ => out.push('?'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_page_is_structurally_valid() {
        let page = PdfPage::a5_landscape();
        let bytes = page.finish();
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(bytes.ends_with(b"%%EOF\n"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("1 0 obj"));
        assert!(text.contains("/BaseFont /Helvetica"));
        // 8 objects plus the free head entry
        assert!(text.contains("xref\n0 9\n"));
    }

    #[test]
    fn drawn_text_appears_in_content_stream() {
        let mut page = PdfPage::a5_landscape();
        page.text(
            Font::HelveticaBold,
            18.0,
            10.0,
            12.0,
            Rgb::BLACK,
            Align::Left,
            "GIFT VOUCHER",
        );
        let bytes = page.finish();
        assert!(String::from_utf8_lossy(&bytes).contains("(GIFT VOUCHER) Tj"));
    }

    #[test]
    fn escapes_parentheses_and_latin1() {
        assert_eq!(escape_pdf_text("(a)"), "\\(a\\)");
        assert_eq!(escape_pdf_text("V\u{e1}lido"), "V\\341lido");
        assert_eq!(escape_pdf_text("\u{4e16}"), "?");
    }

    #[test]
    fn wrap_respects_max_width() {
        let page = PdfPage::a5_landscape();
        let lines = page.wrap(
            Font::Helvetica,
            12.0,
            50.0,
            "an unusually long voucher name that cannot possibly fit one line",
        );
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(page.text_width(Font::Helvetica, 12.0, line) <= 50.0);
        }
    }

    #[test]
    fn wrap_keeps_single_long_word() {
        let page = PdfPage::a5_landscape();
        let lines = page.wrap(Font::Helvetica, 12.0, 5.0, "incompressible");
        assert_eq!(lines, vec!["incompressible".to_string()]);
    }

    #[test]
    fn courier_is_fixed_pitch() {
        let page = PdfPage::a5_landscape();
        let narrow = page.text_width(Font::Courier, 10.0, "iiii");
        let wide = page.text_width(Font::Courier, 10.0, "MMMM");
        assert!((narrow - wide).abs() < f64::EPSILON);
    }
}
