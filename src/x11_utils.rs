use anyhow::{Context, Result};
use tracing::{debug, error};
use x11rb::connection::Connection;
use x11rb::protocol::render::{ConnectionExt as RenderExt, Pictformat, Picture};
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

/// Find a TrueColor visual of the given depth on this screen.
///
/// Depth 32 gives an alpha channel, which is what lets the overlay
/// background stay transparent under a compositor.
#[tracing::instrument(skip(screen))]
pub fn find_argb_visual(screen: &Screen, depth: u8) -> Result<Visualid> {
    if let Some(visual) = screen
        .allowed_depths
        .iter()
        .filter(|d| d.depth == depth)
        .flat_map(|d| d.visuals.iter())
        .find(|v| v.class == VisualClass::TRUE_COLOR)
    {
        debug!("using visual: {} (depth {})", visual.visual_id, depth);
        Ok(visual.visual_id)
    } else {
        anyhow::bail!(
            "Could not find a TrueColor visual (depth={}). Check Composite extension support.",
            depth
        )
    }
}

#[tracing::instrument]
pub fn get_pictformat(conn: &RustConnection, depth: u8, alpha: bool) -> Result<Pictformat> {
    if let Some(format) = conn
        .render_query_pict_formats()
        .context("Failed to query RENDER picture formats")?
        .reply()
        .context("Failed to get reply for RENDER picture formats query")?
        .formats
        .iter()
        .find(|format| {
            format.depth == depth
                && if alpha {
                    format.direct.alpha_mask != 0
                } else {
                    format.direct.alpha_mask == 0
                }
        })
    {
        debug!(
            "using Pictformat: {}, {}",
            format.depth, format.direct.alpha_mask
        );
        Ok(format.id)
    } else {
        anyhow::bail!("Could not find suitable picture format (depth={}, alpha={}). Check RENDER extension support.", depth, alpha)
    }
}

/// A server-side resource owned by the overlay
#[derive(Debug, Clone, Copy)]
pub enum ServerResource {
    Colormap(Colormap),
    Window(Window),
    Gcontext(Gcontext),
    Picture(Picture),
}

/// Releases acquired X11 resources in reverse acquisition order on drop.
///
/// Resources are pushed as they are created, so a constructor that fails
/// halfway unwinds cleanly: whatever was already acquired gets released
/// and the rest was never created.
pub struct ReleaseStack<'a> {
    conn: &'a RustConnection,
    acquired: Vec<ServerResource>,
}

impl<'a> ReleaseStack<'a> {
    pub fn new(conn: &'a RustConnection) -> Self {
        Self {
            conn,
            acquired: Vec::new(),
        }
    }

    pub fn push(&mut self, resource: ServerResource) {
        self.acquired.push(resource);
    }
}

impl Drop for ReleaseStack<'_> {
    fn drop(&mut self) {
        // Release each resource independently so one failure does not
        // strand the rest
        while let Some(resource) = self.acquired.pop() {
            let released = match resource {
                ServerResource::Colormap(colormap) => self.conn.free_colormap(colormap),
                ServerResource::Window(window) => self.conn.destroy_window(window),
                ServerResource::Gcontext(gc) => self.conn.free_gc(gc),
                ServerResource::Picture(picture) => self.conn.render_free_picture(picture),
            };
            if let Err(e) = released {
                error!("Failed to release {:?}: {}", resource, e);
            }
        }
        let _ = self.conn.flush();
    }
}
