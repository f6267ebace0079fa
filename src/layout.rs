//! Pure geometry: text box sizing and bottom-right corner placement.
//!
//! Nothing here talks to the X server, so every rule is unit-testable
//! with plain numbers.

/// Horizontal and vertical extent of one rasterized text line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineExtent {
    /// Sum of glyph advances, rounded up to whole pixels
    pub width: u16,
    /// Pixels above the baseline
    pub ascent: u16,
    /// Pixels below the baseline
    pub descent: u16,
}

impl LineExtent {
    pub fn height(&self) -> u16 {
        self.ascent + self.descent
    }
}

/// Tight bounding box around the stacked text lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBox {
    pub width: u16,
    pub height: u16,
}

/// Top-left window coordinates relative to the root window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i16,
    pub y: i16,
}

/// Size the box that fits every line: widest line wide, all line heights tall
pub fn text_box(lines: &[LineExtent]) -> TextBox {
    TextBox {
        width: lines.iter().map(|l| l.width).max().unwrap_or(0),
        height: lines.iter().map(LineExtent::height).sum(),
    }
}

/// Vertical offset of each line's top edge inside the box, in order
pub fn line_tops(lines: &[LineExtent]) -> Vec<u16> {
    let mut tops = Vec::with_capacity(lines.len());
    let mut y = 0;
    for line in lines {
        tops.push(y);
        y += line.height();
    }
    tops
}

/// Place the box so its bottom-right corner sits `xpad`/`ypad` pixels in
/// from the screen's bottom-right corner.
///
/// The result is not clamped to the screen: padding larger than the
/// screen yields negative coordinates and the overlay hangs offscreen,
/// matching what the user asked for.
pub fn bottom_right(
    screen_width: u16,
    screen_height: u16,
    text: TextBox,
    xpad: u16,
    ypad: u16,
) -> Placement {
    let x = i32::from(screen_width) - i32::from(xpad) - i32::from(text.width);
    let y = i32::from(screen_height) - i32::from(ypad) - i32::from(text.height);
    Placement {
        x: to_wire(x),
        y: to_wire(y),
    }
}

/// X11 window coordinates are i16 on the wire; saturate rather than wrap
fn to_wire(v: i32) -> i16 {
    v.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: LineExtent = LineExtent {
        width: 140,
        ascent: 14,
        descent: 4,
    };
    const FOOTER: LineExtent = LineExtent {
        width: 210,
        ascent: 10,
        descent: 3,
    };

    #[test]
    fn test_box_spans_widest_line_and_sums_heights() {
        let text = text_box(&[HEADER, FOOTER]);
        assert_eq!(text.width, 210);
        assert_eq!(text.height, 31);
    }

    #[test]
    fn test_box_of_single_line_matches_its_extent() {
        let text = text_box(&[HEADER]);
        assert_eq!(text.width, HEADER.width);
        assert_eq!(text.height, HEADER.height());
    }

    #[test]
    fn test_empty_box_is_zero_sized() {
        assert_eq!(text_box(&[]), TextBox { width: 0, height: 0 });
    }

    #[test]
    fn test_line_tops_accumulate_heights() {
        assert_eq!(line_tops(&[HEADER, FOOTER]), vec![0, 18]);
    }

    #[test]
    fn test_baselines_stack_header_over_footer() {
        // A line's baseline sits at its ascent below its top edge
        let lines = [HEADER, FOOTER];
        let tops = line_tops(&lines);
        assert_eq!(tops[0] + lines[0].ascent, 14);
        assert_eq!(tops[1] + lines[1].ascent, 28);
    }

    #[test]
    fn test_placement_on_full_hd_screen() {
        let text = text_box(&[HEADER, FOOTER]);
        let placed = bottom_right(1920, 1080, text, 25, 49);
        assert_eq!(placed, Placement { x: 1685, y: 1000 });
    }

    #[test]
    fn test_box_plus_padding_reaches_the_screen_edge() {
        let text = TextBox {
            width: 210,
            height: 31,
        };
        let placed = bottom_right(1920, 1080, text, 25, 49);
        assert_eq!(i32::from(placed.x) + i32::from(text.width) + 25, 1920);
        assert_eq!(i32::from(placed.y) + i32::from(text.height) + 49, 1080);
    }

    #[test]
    fn test_padding_larger_than_screen_goes_negative() {
        let text = TextBox {
            width: 210,
            height: 31,
        };
        let placed = bottom_right(640, 480, text, 700, 500);
        assert_eq!(placed.x, -270);
        assert_eq!(placed.y, -51);
    }

    #[test]
    fn test_zero_padding_touches_the_corner() {
        let text = TextBox {
            width: 100,
            height: 20,
        };
        let placed = bottom_right(800, 600, text, 0, 0);
        assert_eq!(placed, Placement { x: 700, y: 580 });
    }
}
