use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid hex color {0:?}")]
pub struct ColorFormatError(pub String);

/// RGB color with 8-bit channels, as used by the PDF canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Parse a 3- or 6-digit hex color, with or without a leading `#`.
///
/// Three-digit colors expand by digit duplication (`f0a` -> `ff00aa`).
/// Anything else, including non-hex characters, is rejected.
pub fn hex_to_rgb(hex: &str) -> Result<Rgb, ColorFormatError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);

    // Hex digits only, checked up front so the byte slicing below always
    // lands on char boundaries regardless of what the caller sent.
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ColorFormatError(hex.to_string()));
    }

    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return Err(ColorFormatError(hex.to_string())),
    };

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&expanded[range], 16).map_err(|_| ColorFormatError(hex.to_string()))
    };

    Ok(Rgb {
        r: channel(0..2)?,
        g: channel(2..4)?,
        b: channel(4..6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_digit_with_hash() {
        assert_eq!(hex_to_rgb("#F9A825").unwrap(), Rgb::new(249, 168, 37));
    }

    #[test]
    fn six_digit_without_hash() {
        assert_eq!(hex_to_rgb("4e4e4e").unwrap(), Rgb::new(78, 78, 78));
    }

    #[test]
    fn three_digit_expands_by_duplication() {
        assert_eq!(hex_to_rgb("f0a").unwrap(), Rgb::new(255, 0, 170));
        assert_eq!(hex_to_rgb("#fff").unwrap(), hex_to_rgb("#ffffff").unwrap());
        assert_eq!(hex_to_rgb("#fff").unwrap(), Rgb::WHITE);
    }

    #[test]
    fn rejects_bad_length() {
        assert!(hex_to_rgb("#ffff").is_err());
        assert!(hex_to_rgb("").is_err());
    }

    #[test]
    fn rejects_non_hex_characters() {
        assert!(hex_to_rgb("#gghhii").is_err());
        assert!(hex_to_rgb("zzz").is_err());
    }

    #[test]
    fn rejects_multibyte_input_without_panicking() {
        // Multibyte strings can hit the 3- or 6-byte lengths of valid input.
        assert!(hex_to_rgb("\u{20ac}\u{20ac}").is_err());
        assert!(hex_to_rgb("\u{e9}f").is_err());
        assert!(hex_to_rgb("#\u{4e16}\u{4e16}").is_err());
    }
}
