//! Font descriptor parsing, fontconfig lookup, and line rasterization

use anyhow::{Context, Result, bail};
use fontconfig::{Fontconfig, Pattern};
use fontdue::{Font, FontSettings};
use std::ffi::CString;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::constants::font::{DEFAULT_SIZE_PT, DPI, POINTS_PER_INCH};
use crate::layout::LineExtent;

/// Parsed font descriptor: a family plus optional style and size.
///
/// Accepted forms are `Family`, `Family-12`, `Family:size=12`,
/// `Family:pixelsize=16` and `Family:style=Bold`, with `:`-separated
/// properties combining freely. `size` is in points and converted at a
/// fixed 96 dpi; `pixelsize` is taken verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub style: Option<String>,
    pub pixel_size: f32,
}

impl FromStr for FontSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments = s.split(':');
        // split always yields at least one segment
        let head = segments.next().unwrap_or("").trim();
        let (family, mut pixel_size) = split_size_shorthand(head);
        if family.is_empty() {
            bail!("font descriptor '{}' has no family name", s);
        }

        let mut style = None;
        for segment in segments {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            match segment.split_once('=').map(|(k, v)| (k.trim(), v.trim())) {
                Some(("size", value)) => pixel_size = Some(points_to_pixels(parse_size(value)?)),
                Some(("pixelsize", value)) => pixel_size = Some(parse_size(value)?),
                Some(("style", value)) => style = Some(value.to_string()),
                _ => warn!(property = segment, "ignoring unsupported font property"),
            }
        }

        let pixel_size = pixel_size.unwrap_or_else(|| points_to_pixels(DEFAULT_SIZE_PT));
        if !pixel_size.is_finite() || pixel_size <= 0.0 {
            bail!("font size in '{}' must be a positive number", s);
        }

        Ok(FontSpec {
            family: family.to_string(),
            style,
            pixel_size,
        })
    }
}

impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:pixelsize={}", self.family, self.pixel_size)?;
        if let Some(style) = &self.style {
            write!(f, ":style={}", style)?;
        }
        Ok(())
    }
}

/// Xft shorthand: a trailing `-N` on the family segment is a point size
fn split_size_shorthand(head: &str) -> (&str, Option<f32>) {
    if let Some((name, points)) = head.rsplit_once('-')
        && let Ok(pt) = points.trim().parse::<f32>()
    {
        return (name.trim(), Some(points_to_pixels(pt)));
    }
    (head, None)
}

fn parse_size(value: &str) -> Result<f32> {
    value
        .parse::<f32>()
        .with_context(|| format!("invalid font size '{}'", value))
}

/// Convert a point size to pixels at the fixed 96 dpi assumption
fn points_to_pixels(points: f32) -> f32 {
    points * DPI / POINTS_PER_INCH
}

/// Resolve a font family (and optional style) to a file path via fontconfig.
///
/// Fontconfig substitutes a fallback family when the requested one is not
/// installed; that substitute is rejected here so a typoed family name
/// fails loudly instead of silently rendering with an unrelated font.
pub fn find_font_path(family: &str, style: Option<&str>) -> Result<PathBuf> {
    let fc = Fontconfig::new().context("Failed to initialize fontconfig")?;

    let mut pattern = Pattern::new(&fc);
    let family_cstr =
        CString::new(family).with_context(|| format!("Invalid family name: {}", family))?;
    pattern.add_string(fontconfig::FC_FAMILY, &family_cstr);
    if let Some(style) = style {
        let style_cstr =
            CString::new(style).with_context(|| format!("Invalid style name: {}", style))?;
        pattern.add_string(fontconfig::FC_STYLE, &style_cstr);
    }

    let matched = pattern.font_match();

    if let Some(matched_family) = matched.get_string(fontconfig::FC_FAMILY)
        && !matched_family.eq_ignore_ascii_case(family)
    {
        warn!(
            requested = family,
            matched = matched_family,
            "Fontconfig returned different font family - requested font may not be installed"
        );
        bail!(
            "Font '{}' not found - fontconfig returned family '{}' instead",
            family,
            matched_family
        );
    }

    let file_path = matched
        .filename()
        .with_context(|| format!("No font file found for '{}'", family))?;
    let path = PathBuf::from(file_path);
    if !path.exists() {
        bail!("Font file path '{}' does not exist", path.display());
    }

    debug!(family = family, style = ?style, path = %path.display(), "Resolved font path");
    Ok(path)
}

/// Alpha coverage for one rasterized text line, rows top to bottom
pub struct RasterizedLine {
    pub width: usize,
    pub height: usize,
    pub coverage: Vec<u8>,
}

/// A font loaded at a fixed pixel size, ready to rasterize overlay lines
#[derive(Debug)]
pub struct OverlayFont {
    font: Font,
    pixel_size: f32,
}

impl OverlayFont {
    /// Resolve the descriptor through fontconfig and load the font file
    pub fn open(spec: &FontSpec) -> Result<Self> {
        let path = find_font_path(&spec.family, spec.style.as_deref())
            .with_context(|| format!("Failed to resolve font '{}'", spec.family))?;
        let font_data = fs::read(&path)
            .with_context(|| format!("Failed to read font file: {}", path.display()))?;
        let font = Font::from_bytes(font_data, FontSettings::default())
            .map_err(|e| anyhow::anyhow!("Failed to parse font {}: {}", path.display(), e))?;
        info!(family = %spec.family, path = %path.display(), pixel_size = spec.pixel_size, "Loaded font");
        Ok(Self {
            font,
            pixel_size: spec.pixel_size,
        })
    }

    /// Measure a line: advance-summed width plus the font's line ascent/descent
    pub fn line_extent(&self, text: &str) -> LineExtent {
        let (ascent, descent) = self.vertical_metrics(text);
        let mut advance = 0.0f32;
        for ch in text.chars() {
            advance += self.font.metrics(ch, self.pixel_size).advance_width;
        }
        LineExtent {
            width: advance.ceil() as u16,
            ascent,
            descent,
        }
    }

    /// Line ascent and descent in pixels.
    ///
    /// An empty line still reports the full line height so a blank header
    /// or footer keeps its slot in the stacked text box.
    fn vertical_metrics(&self, text: &str) -> (u16, u16) {
        if let Some(metrics) = self.font.horizontal_line_metrics(self.pixel_size) {
            // fontdue reports descent as a negative offset below the baseline
            return (
                metrics.ascent.ceil() as u16,
                (-metrics.descent).ceil() as u16,
            );
        }
        // Font carries no line metrics: fall back to the glyphs at hand
        let mut max_ascent = 0i32;
        let mut max_descent = 0i32;
        for ch in text.chars() {
            let metrics = self.font.metrics(ch, self.pixel_size);
            max_ascent = max_ascent.max(metrics.height as i32 + metrics.ymin);
            max_descent = max_descent.max(-metrics.ymin);
        }
        (max_ascent.max(0) as u16, max_descent.max(0) as u16)
    }

    /// Rasterize a line into a coverage bitmap sized by [`Self::line_extent`],
    /// with the baseline sitting at the font ascent
    pub fn rasterize_line(&self, text: &str) -> RasterizedLine {
        let extent = self.line_extent(text);
        let width = usize::from(extent.width);
        let height = usize::from(extent.height());
        if width == 0 || height == 0 {
            return RasterizedLine {
                width: 0,
                height: 0,
                coverage: Vec::new(),
            };
        }

        let mut coverage = vec![0u8; width * height];
        let ascent = i32::from(extent.ascent);
        let mut pen_x = 0.0f32;
        for ch in text.chars() {
            let (metrics, bitmap) = self.font.rasterize(ch, self.pixel_size);
            let glyph_x = pen_x as i32 + metrics.xmin;
            let glyph_y = ascent - (metrics.height as i32 + metrics.ymin);
            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let px = glyph_x + gx as i32;
                    let py = glyph_y + gy as i32;
                    if px < 0 || py < 0 || px >= width as i32 || py >= height as i32 {
                        continue;
                    }
                    let idx = py as usize * width + px as usize;
                    // Overlapping glyphs keep the denser sample
                    coverage[idx] = coverage[idx].max(bitmap[gy * metrics.width + gx]);
                }
            }
            pen_x += metrics.advance_width;
        }

        RasterizedLine {
            width,
            height,
            coverage,
        }
    }
}
