//! Layout templates. Each variant is a record of layout parameters consumed
//! by the one shared composer; the variants differ only in ornaments,
//! fonts and fixed element sizes, never in composition logic.

use super::pdf::Font;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Classic,
    Modern,
    Elegant,
    Festive,
}

impl Template {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "classic" => Some(Template::Classic),
            "modern" => Some(Template::Modern),
            "elegant" => Some(Template::Elegant),
            "festive" => Some(Template::Festive),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Template::Classic => "classic",
            Template::Modern => "modern",
            Template::Elegant => "elegant",
            Template::Festive => "festive",
        }
    }

    pub fn spec(self) -> TemplateSpec {
        match self {
            // Banded header/footer, star row, illustration on the right --
            // the ornate "gift certificate" look.
            Template::Classic => TemplateSpec {
                header_band: true,
                footer_band: true,
                frame: FrameStyle::None,
                star_row: true,
                seal: false,
                qr_corner: Corner::BottomLeft,
                title_font: Font::TimesItalic,
                title_size: 26.0,
                logo_size: 18.0,
                qr_size: 28.0,
            },
            // Minimalist monochrome: thin rule, no ornaments.
            Template::Modern => TemplateSpec {
                header_band: false,
                footer_band: false,
                frame: FrameStyle::Rule,
                star_row: false,
                seal: false,
                qr_corner: Corner::BottomRight,
                title_font: Font::HelveticaBold,
                title_size: 22.0,
                logo_size: 15.0,
                qr_size: 22.0,
            },
            // Corner brackets, diamond accents and a validity seal.
            Template::Elegant => TemplateSpec {
                header_band: false,
                footer_band: false,
                frame: FrameStyle::Ornate,
                star_row: false,
                seal: true,
                qr_corner: Corner::BottomLeft,
                title_font: Font::TimesItalic,
                title_size: 24.0,
                logo_size: 16.0,
                qr_size: 24.0,
            },
            Template::Festive => TemplateSpec {
                header_band: true,
                footer_band: true,
                frame: FrameStyle::Ornate,
                star_row: true,
                seal: true,
                qr_corner: Corner::BottomRight,
                title_font: Font::HelveticaBold,
                title_size: 24.0,
                logo_size: 18.0,
                qr_size: 26.0,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStyle {
    None,
    /// Thin border rule inset from the page edge.
    Rule,
    /// Corner brackets plus diamond accents.
    Ornate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    BottomLeft,
    BottomRight,
}

/// Fixed-size decorative elements scale with the template, not the page.
#[derive(Debug, Clone, Copy)]
pub struct TemplateSpec {
    pub header_band: bool,
    pub footer_band: bool,
    pub frame: FrameStyle,
    pub star_row: bool,
    pub seal: bool,
    pub qr_corner: Corner,
    pub title_font: Font,
    pub title_size: f64,
    /// Logo thumbnail square, mm.
    pub logo_size: f64,
    /// QR block square, mm.
    pub qr_size: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_known_variants() {
        for t in [
            Template::Classic,
            Template::Modern,
            Template::Elegant,
            Template::Festive,
        ] {
            assert_eq!(Template::parse(t.as_str()), Some(t));
        }
    }

    #[test]
    fn unknown_variant_is_rejected() {
        assert_eq!(Template::parse("baroque"), None);
        assert_eq!(Template::parse(""), None);
    }
}
