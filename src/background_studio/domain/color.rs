use super::error::DomainError;
use image::Rgba;
use std::fmt;
use std::str::FromStr;

/// Opaque background color parsed from `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }
}

impl FromStr for Color {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidColor(s.to_string());

        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_colors() {
        assert_eq!("#FF0000".parse::<Color>(), Ok(Color::new(255, 0, 0)));
        assert_eq!("#00ff7f".parse::<Color>(), Ok(Color::new(0, 255, 127)));
        assert_eq!("#000000".parse::<Color>(), Ok(Color::new(0, 0, 0)));
    }

    #[test]
    fn test_parse_rejects_missing_hash_and_bad_length() {
        for input in ["FF0000", "#FFF", "#FF00000", "#FF000000", "", "#"] {
            assert!(
                matches!(input.parse::<Color>(), Err(DomainError::InvalidColor(_))),
                "expected InvalidColor for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_parse_rejects_non_hex_digits() {
        assert!("#GG0000".parse::<Color>().is_err());
        assert!("#12 456".parse::<Color>().is_err());
        // 7 bytes but multi-byte chars
        assert!("#ééé".parse::<Color>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let color = Color::new(18, 52, 171);
        assert_eq!(color.to_string(), "#1234AB");
        assert_eq!(color.to_string().parse::<Color>(), Ok(color));
    }

    #[test]
    fn test_to_rgba_is_opaque() {
        assert_eq!(Color::new(1, 2, 3).to_rgba(), Rgba([1, 2, 3, 255]));
    }
}
