//! Command line interface

use clap::Parser;

use crate::color::HexColor;
use crate::config::Config;
use crate::constants::defaults;
use crate::font::FontSpec;

/// The "Activate Linux" watermark: a click-through, always-on-top
/// reminder in the bottom-right corner of the screen
#[derive(Debug, Parser)]
#[command(name = "activate-linux", version, about)]
pub struct Cli {
    /// Font for the header line, in fontconfig syntax (e.g. "Roboto:size=15")
    #[arg(long, default_value = defaults::HEADER_FONT)]
    header_font: FontSpec,

    /// Font for the footer line
    #[arg(long, default_value = defaults::FOOTER_FONT)]
    footer_font: FontSpec,

    /// First text line
    #[arg(long, default_value = defaults::HEADER_TEXT)]
    header_text: String,

    /// Second text line
    #[arg(long, default_value = defaults::FOOTER_TEXT)]
    footer_text: String,

    /// Text color as an RRGGBB hex value
    #[arg(long, default_value = defaults::FOREGROUND)]
    foreground: HexColor,

    /// Distance from the right screen edge in pixels
    #[arg(long, default_value_t = defaults::XPAD)]
    xpad: u16,

    /// Distance from the bottom screen edge in pixels
    #[arg(long, default_value_t = defaults::YPAD)]
    ypad: u16,
}

impl Cli {
    pub fn into_config(self) -> Config {
        Config {
            header_font: self.header_font,
            footer_font: self.footer_font,
            header_text: self.header_text,
            footer_text: self.footer_text,
            foreground: self.foreground,
            xpad: self.xpad,
            ypad: self.ypad,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = Cli::try_parse_from(["activate-linux"]).unwrap().into_config();
        assert_eq!(config.header_text, "Activate Linux");
        assert_eq!(config.footer_text, "Go to Settings to activate Linux");
        assert_eq!(config.header_font.family, "Roboto");
        // 15pt and 11pt at 96dpi
        assert_eq!(config.header_font.pixel_size, 20.0);
        assert_eq!(config.footer_font.pixel_size, 1056.0 / 72.0);
        assert_eq!(config.foreground, HexColor(0x928374));
        assert_eq!(config.xpad, 25);
        assert_eq!(config.ypad, 49);
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = Cli::try_parse_from([
            "activate-linux",
            "--header-text",
            "Activate FreeBSD",
            "--foreground",
            "aabbcc",
            "--xpad",
            "100",
            "--header-font",
            "DejaVu Sans:pixelsize=24",
        ])
        .unwrap()
        .into_config();
        assert_eq!(config.header_text, "Activate FreeBSD");
        assert_eq!(config.foreground, HexColor(0xAABBCC));
        assert_eq!(config.xpad, 100);
        assert_eq!(config.header_font.family, "DejaVu Sans");
        assert_eq!(config.header_font.pixel_size, 24.0);
    }

    #[test]
    fn test_bad_values_are_usage_errors() {
        assert!(Cli::try_parse_from(["activate-linux", "--foreground", "redish"]).is_err());
        assert!(Cli::try_parse_from(["activate-linux", "--header-font", ":size=15"]).is_err());
        assert!(Cli::try_parse_from(["activate-linux", "--xpad", "70000"]).is_err());
    }
}
