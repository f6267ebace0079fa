//! The overlay window: creation, click-through input shape, raising
//! and redraw.
//!
//! Text is prepared once at startup. Each line is rasterized into an
//! alpha coverage bitmap, uploaded to a depth-32 pixmap and wrapped in
//! a RENDER picture. A redraw clears the window and composites the
//! foreground fill through each line's coverage mask, so repeating it
//! is harmless no matter what state the window contents are in.

use anyhow::{Context, Result};
use tracing::{debug, info};
use x11rb::connection::Connection;
use x11rb::protocol::render::{
    ConnectionExt as RenderExt, CreatePictureAux, PictOp, Pictformat, Picture,
};
use x11rb::protocol::shape;
use x11rb::protocol::xfixes::ConnectionExt as XfixesExt;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as WrapperExt;

use crate::config::Config;
use crate::constants::x11;
use crate::font::OverlayFont;
use crate::layout;
use crate::x11_utils::{ReleaseStack, ServerResource, find_argb_visual, get_pictformat};

/// One text line ready for compositing
struct PreparedLine {
    /// Coverage mask wrapping the rasterized text
    picture: Picture,
    width: u16,
    height: u16,
    /// Offset of the line's top edge from the window's top edge
    top: i16,
}

/// The always-on-top watermark window and its server-side resources
pub struct Overlay<'a> {
    conn: &'a RustConnection,
    window: Window,
    window_picture: Picture,
    fill: Picture,
    lines: Vec<PreparedLine>,
    width: u16,
    height: u16,
    resources: ReleaseStack<'a>,
}

impl<'a> Overlay<'a> {
    /// Create the overlay window in the bottom-right screen corner and
    /// prepare every text line for compositing.
    ///
    /// Resources are pushed onto a release stack as they are acquired,
    /// so an error partway through unwinds whatever already exists on
    /// the server.
    pub fn new(
        conn: &'a RustConnection,
        screen: &Screen,
        config: &Config,
        text_lines: &[(&str, &OverlayFont)],
    ) -> Result<Self> {
        let extents: Vec<_> = text_lines
            .iter()
            .map(|(text, font)| font.line_extent(text))
            .collect();
        let text = layout::text_box(&extents);
        let tops = layout::line_tops(&extents);
        let placed = layout::bottom_right(
            screen.width_in_pixels,
            screen.height_in_pixels,
            text,
            config.xpad,
            config.ypad,
        );
        // Zero-sized windows are a protocol error; an all-empty overlay
        // still gets a 1x1 fully transparent window
        let width = text.width.max(1);
        let height = text.height.max(1);
        info!(
            x = placed.x,
            y = placed.y,
            width = width,
            height = height,
            "Placing overlay at bottom-right corner"
        );

        let visual = find_argb_visual(screen, x11::ARGB_DEPTH)?;
        let mut resources = ReleaseStack::new(conn);

        let colormap = conn
            .generate_id()
            .context("Failed to generate X11 colormap ID")?;
        conn.create_colormap(ColormapAlloc::NONE, colormap, screen.root, visual)
            .context("Failed to create colormap for the ARGB visual")?;
        resources.push(ServerResource::Colormap(colormap));

        let window = conn
            .generate_id()
            .context("Failed to generate X11 window ID")?;
        conn.create_window(
            x11::ARGB_DEPTH,
            window,
            screen.root,
            placed.x,
            placed.y,
            width,
            height,
            0,
            WindowClass::INPUT_OUTPUT,
            visual,
            // border_pixel and colormap are mandatory when the depth
            // differs from the parent, otherwise CreateWindow is a BadMatch
            &CreateWindowAux::new()
                .background_pixel(x11::TRANSPARENT_PIXEL)
                .border_pixel(x11::TRANSPARENT_PIXEL)
                .override_redirect(x11::OVERRIDE_REDIRECT)
                .colormap(colormap)
                .event_mask(EventMask::EXPOSURE | EventMask::VISIBILITY_CHANGE),
        )
        .context("Failed to create overlay window")?
        // The one request whose rejection must abort startup instead of
        // drifting into the event queue
        .check()
        .context("Overlay window creation was rejected by the server")?;
        resources.push(ServerResource::Window(window));

        conn.change_property8(
            PropMode::REPLACE,
            window,
            AtomEnum::WM_CLASS,
            AtomEnum::STRING,
            x11::WM_CLASS,
        )
        .context("Failed to set WM_CLASS on the overlay window")?;

        let gc = conn
            .generate_id()
            .context("Failed to generate ID for upload graphics context")?;
        conn.create_gc(gc, window, &CreateGCAux::new())
            .context("Failed to create graphics context for text upload")?;
        resources.push(ServerResource::Gcontext(gc));

        let fill = conn
            .generate_id()
            .context("Failed to generate ID for foreground fill picture")?;
        conn.render_create_solid_fill(fill, config.foreground.to_render_color())
            .context("Failed to create foreground fill picture")?;
        resources.push(ServerResource::Picture(fill));

        let argb_format = get_pictformat(conn, x11::ARGB_DEPTH, true)
            .context("Failed to get ARGB picture format for the overlay")?;

        let window_picture = conn
            .generate_id()
            .context("Failed to generate ID for window picture")?;
        conn.render_create_picture(window_picture, window, argb_format, &CreatePictureAux::new())
            .context("Failed to create picture for the overlay window")?;
        resources.push(ServerResource::Picture(window_picture));

        let mut lines = Vec::with_capacity(text_lines.len());
        for ((text, font), top) in text_lines.iter().zip(tops) {
            if let Some(line) =
                upload_line(conn, &mut resources, window, gc, argb_format, font, text, top)?
            {
                lines.push(line);
            }
        }

        Ok(Self {
            conn,
            window,
            window_picture,
            fill,
            lines,
            width,
            height,
            resources,
        })
    }

    pub fn window(&self) -> Window {
        self.window
    }

    /// Replace the input shape with an empty region so every click,
    /// scroll and hover falls through to whatever is underneath
    pub fn make_click_through(&self) -> Result<()> {
        let version = self
            .conn
            .xfixes_query_version(x11::XFIXES_MAJOR, x11::XFIXES_MINOR)
            .context("Failed to query XFixes version")?
            .reply()
            .context("Failed to get reply for XFixes version query (check XFixes extension support)")?;
        debug!(
            "XFixes version {}.{}",
            version.major_version, version.minor_version
        );

        let region = self
            .conn
            .generate_id()
            .context("Failed to generate ID for the empty input region")?;
        self.conn
            .xfixes_create_region(region, &[])
            .context("Failed to create empty input region")?;
        self.conn
            .xfixes_set_window_shape_region(self.window, shape::SK::INPUT, 0, 0, region)
            .context("Failed to set the overlay input shape")?;
        self.conn
            .xfixes_destroy_region(region)
            .context("Failed to destroy input region")?;
        Ok(())
    }

    /// Map the window. The first Expose event follows and triggers the
    /// initial draw.
    pub fn map(&self) -> Result<()> {
        self.conn
            .map_window(self.window)
            .context("Failed to map the overlay window")?;
        self.conn
            .flush()
            .context("Failed to flush X11 connection after mapping the overlay")?;
        info!(window = self.window, "Mapped overlay window");
        Ok(())
    }

    /// Put the overlay back on top of the stacking order
    pub fn raise(&self) -> Result<()> {
        self.conn
            .configure_window(
                self.window,
                &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE),
            )
            .context("Failed to raise the overlay window")?;
        self.conn
            .flush()
            .context("Failed to flush X11 connection after raising the overlay")?;
        Ok(())
    }

    /// Repaint the whole window from the prepared lines
    pub fn redraw(&self) -> Result<()> {
        self.conn
            .render_composite(
                PictOp::CLEAR,
                self.window_picture,
                0u32,
                self.window_picture,
                0,
                0,
                0,
                0,
                0,
                0,
                self.width,
                self.height,
            )
            .context("Failed to clear the overlay window")?;

        for line in &self.lines {
            self.conn
                .render_composite(
                    PictOp::OVER,
                    self.fill,
                    line.picture,
                    self.window_picture,
                    0,
                    0,
                    0,
                    0,
                    0,
                    line.top,
                    line.width,
                    line.height,
                )
                .with_context(|| format!("Failed to composite text line at y={}", line.top))?;
        }

        self.conn
            .flush()
            .context("Failed to flush X11 connection after redraw")?;
        Ok(())
    }
}

/// Rasterize one line and park it on the server as a RENDER picture.
///
/// Empty lines upload nothing; they already claimed their vertical slot
/// through the layout.
fn upload_line(
    conn: &RustConnection,
    resources: &mut ReleaseStack<'_>,
    window: Window,
    gc: Gcontext,
    argb_format: Pictformat,
    font: &OverlayFont,
    text: &str,
    top: u16,
) -> Result<Option<PreparedLine>> {
    let rastered = font.rasterize_line(text);
    if rastered.width == 0 || rastered.height == 0 {
        return Ok(None);
    }
    let width = rastered.width as u16;
    let height = rastered.height as u16;

    let pixmap = conn
        .generate_id()
        .context("Failed to generate ID for text pixmap")?;
    conn.create_pixmap(x11::ARGB_DEPTH, pixmap, window, width, height)
        .with_context(|| format!("Failed to create text pixmap for '{}'", text))?;

    // Coverage becomes an alpha-only ARGB mask; the color arrives at
    // composite time from the solid fill. X11 wants little-endian BGRA.
    let mut image_data = Vec::with_capacity(rastered.coverage.len() * 4);
    for sample in &rastered.coverage {
        image_data.push(0); // B
        image_data.push(0); // G
        image_data.push(0); // R
        image_data.push(*sample); // A
    }

    conn.put_image(
        ImageFormat::Z_PIXMAP,
        pixmap,
        gc,
        width,
        height,
        0,
        0,
        0,
        x11::ARGB_DEPTH,
        &image_data,
    )
    .with_context(|| format!("Failed to upload text image for '{}'", text))?;

    let picture = conn
        .generate_id()
        .context("Failed to generate ID for text picture")?;
    conn.render_create_picture(picture, pixmap, argb_format, &CreatePictureAux::new())
        .with_context(|| format!("Failed to create text picture for '{}'", text))?;
    resources.push(ServerResource::Picture(picture));

    // The picture keeps the pixel storage alive
    conn.free_pixmap(pixmap)
        .context("Failed to free text pixmap")?;

    Ok(Some(PreparedLine {
        picture,
        width,
        height,
        top: top as i16,
    }))
}
