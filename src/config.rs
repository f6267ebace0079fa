//! Resolved runtime configuration shared across the overlay modules

use crate::color::HexColor;
use crate::font::FontSpec;

/// Settings for one overlay run, assembled from the command line.
///
/// Padding values are distances in pixels from the bottom-right screen
/// corner to the bottom-right corner of the text box.
#[derive(Debug, Clone)]
pub struct Config {
    pub header_font: FontSpec,
    pub footer_font: FontSpec,
    pub header_text: String,
    pub footer_text: String,
    pub foreground: HexColor,
    pub xpad: u16,
    pub ypad: u16,
}
