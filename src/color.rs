//! 24-bit hex color parsing and RENDER wire conversion

use anyhow::bail;
use std::fmt;
use std::str::FromStr;
use x11rb::protocol::render::Color;

/// Packed 24-bit RGB color, rendered fully opaque
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor(pub u32);

impl HexColor {
    pub fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Widen to the RENDER wire format: 16 bits per channel, full opacity
    pub fn to_render_color(self) -> Color {
        Color {
            red: widen(self.red()),
            green: widen(self.green()),
            blue: widen(self.blue()),
            alpha: u16::MAX,
        }
    }
}

/// Expand an 8-bit channel to 16 bits so 0xFF maps to 0xFFFF, not 0xFF00
fn widen(channel: u8) -> u16 {
    (u16::from(channel) << 8) | u16::from(channel)
}

impl FromStr for HexColor {
    type Err = anyhow::Error;

    /// Accepts exactly six hex digits, with an optional `#` or `0x` prefix
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('#')
            .or_else(|| s.strip_prefix("0x"))
            .unwrap_or(s);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            bail!("expected an RRGGBB hex color, got '{}'", s);
        }
        // The digit check above means this cannot fail
        Ok(HexColor(u32::from_str_radix(digits, 16)?))
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_hex() {
        assert_eq!("928374".parse::<HexColor>().unwrap(), HexColor(0x928374));
    }

    #[test]
    fn test_parse_hash_prefix() {
        assert_eq!("#ff00ff".parse::<HexColor>().unwrap(), HexColor(0xFF00FF));
    }

    #[test]
    fn test_parse_0x_prefix() {
        assert_eq!("0x00AABB".parse::<HexColor>().unwrap(), HexColor(0x00AABB));
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!("12345".parse::<HexColor>().is_err());
        assert!("1234567".parse::<HexColor>().is_err());
        assert!("".parse::<HexColor>().is_err());
    }

    #[test]
    fn test_rejects_non_hex_digits() {
        assert!("gggggg".parse::<HexColor>().is_err());
        // from_str_radix would accept a sign here; the digit check must not
        assert!("+12345".parse::<HexColor>().is_err());
    }

    #[test]
    fn test_channel_extraction() {
        let color = HexColor(0x928374);
        assert_eq!(color.red(), 0x92);
        assert_eq!(color.green(), 0x83);
        assert_eq!(color.blue(), 0x74);
    }

    #[test]
    fn test_render_color_is_fully_opaque() {
        let rendered = HexColor(0xFFFFFF).to_render_color();
        assert_eq!(rendered.red, 0xFFFF);
        assert_eq!(rendered.green, 0xFFFF);
        assert_eq!(rendered.blue, 0xFFFF);
        assert_eq!(rendered.alpha, 0xFFFF);
    }

    #[test]
    fn test_display_round_trip() {
        let color = HexColor(0x00AB12);
        assert_eq!(color.to_string().parse::<HexColor>().unwrap(), color);
    }
}
