//! Event semantics: translate raw X11 events into the overlay's small
//! vocabulary and react to them.
//!
//! Translation and reaction are pure functions over plain data, so the
//! raise and redraw rules are testable without a running X server.

use anyhow::{Context, Result};
use tracing::debug;
use x11rb::connection::Connection;
use x11rb::protocol::Event;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

use crate::overlay::Overlay;

/// The three event kinds the overlay cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayEvent {
    /// The overlay's visibility changed; anything but unobscured means
    /// another window covers some of it
    VisibilityChanged { state: Visibility },
    /// A child of the root was restacked, moved, resized or mapped
    StackingChanged { window: Window },
    /// The last Expose of a batch arrived
    ExposureRequested,
}

/// What the overlay does in response to an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Raise,
    Redraw,
}

/// Map a raw X11 event onto the overlay vocabulary.
///
/// Expose events carry a count of still-pending exposures; everything
/// but the final one of a batch is dropped here so a redraw runs once.
pub fn translate(event: &Event) -> Option<OverlayEvent> {
    match event {
        Event::VisibilityNotify(e) => Some(OverlayEvent::VisibilityChanged { state: e.state }),
        Event::ConfigureNotify(e) => Some(OverlayEvent::StackingChanged { window: e.window }),
        Event::Expose(e) if e.count == 0 => Some(OverlayEvent::ExposureRequested),
        _ => None,
    }
}

/// Decide the reaction, given which window is the overlay's own.
///
/// Restack reports about the overlay itself are ignored, otherwise the
/// overlay's raise would report back and feed another raise forever.
pub fn decide(overlay: Window, event: OverlayEvent) -> Option<Reaction> {
    match event {
        OverlayEvent::VisibilityChanged { state } => {
            (state != Visibility::UNOBSCURED).then_some(Reaction::Raise)
        }
        OverlayEvent::StackingChanged { window } => (window != overlay).then_some(Reaction::Raise),
        OverlayEvent::ExposureRequested => Some(Reaction::Redraw),
    }
}

/// Blocking iterator over translated events. It never ends on its own;
/// the only way out is a connection error.
pub struct OverlayEvents<'a> {
    conn: &'a RustConnection,
}

impl<'a> OverlayEvents<'a> {
    pub fn new(conn: &'a RustConnection) -> Self {
        Self { conn }
    }
}

impl Iterator for OverlayEvents<'_> {
    type Item = Result<OverlayEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let event = match self.conn.wait_for_event() {
                Ok(event) => event,
                Err(e) => return Some(Err(e).context("Lost connection to the X server")),
            };
            // Asynchronous errors from earlier requests land here; they
            // are not fatal to the overlay
            if let Event::Error(e) = &event {
                debug!("X11 error event: {:?}", e);
                continue;
            }
            if let Some(translated) = translate(&event) {
                return Some(Ok(translated));
            }
        }
    }
}

/// Subscribe to restack reports on the root, map the overlay and pump
/// events until the connection drops.
pub fn run(conn: &RustConnection, screen: &Screen, overlay: &Overlay) -> Result<()> {
    conn.change_window_attributes(
        screen.root,
        &ChangeWindowAttributesAux::new().event_mask(EventMask::SUBSTRUCTURE_NOTIFY),
    )
    .context("Failed to subscribe to root window structure events")?;

    // Map after subscribing so the first Expose is not missed
    overlay.map()?;

    for event in OverlayEvents::new(conn) {
        let event = event?;
        let Some(reaction) = decide(overlay.window(), event) else {
            continue;
        };
        debug!(event = ?event, reaction = ?reaction, "Reacting to event");
        match reaction {
            Reaction::Raise => overlay.raise().context("Failed to raise the overlay")?,
            Reaction::Redraw => overlay.redraw().context("Failed to redraw the overlay")?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    const OVERLAY: Window = 42;
    const OTHER: Window = 99;

    #[test]
    fn test_obscured_overlay_raises() {
        for state in [Visibility::PARTIALLY_OBSCURED, Visibility::FULLY_OBSCURED] {
            assert_eq!(
                decide(OVERLAY, OverlayEvent::VisibilityChanged { state }),
                Some(Reaction::Raise)
            );
        }
        assert_eq!(
            decide(
                OVERLAY,
                OverlayEvent::VisibilityChanged {
                    state: Visibility::UNOBSCURED
                }
            ),
            None
        );
    }

    #[test]
    fn test_foreign_restack_raises_but_own_does_not() {
        assert_eq!(
            decide(OVERLAY, OverlayEvent::StackingChanged { window: OTHER }),
            Some(Reaction::Raise)
        );
        assert_eq!(
            decide(OVERLAY, OverlayEvent::StackingChanged { window: OVERLAY }),
            None
        );
    }

    #[test]
    fn test_exposure_redraws() {
        assert_eq!(
            decide(OVERLAY, OverlayEvent::ExposureRequested),
            Some(Reaction::Redraw)
        );
    }

    #[test]
    fn test_translate_visibility_notify() {
        let event = Event::VisibilityNotify(VisibilityNotifyEvent {
            response_type: VISIBILITY_NOTIFY_EVENT,
            sequence: 1,
            window: OVERLAY,
            state: Visibility::FULLY_OBSCURED,
        });
        assert_eq!(
            translate(&event),
            Some(OverlayEvent::VisibilityChanged {
                state: Visibility::FULLY_OBSCURED
            })
        );
    }

    #[test]
    fn test_translate_configure_notify() {
        let event = Event::ConfigureNotify(ConfigureNotifyEvent {
            response_type: CONFIGURE_NOTIFY_EVENT,
            sequence: 4,
            event: 1,
            window: OTHER,
            above_sibling: 0,
            x: 10,
            y: 20,
            width: 300,
            height: 200,
            border_width: 0,
            override_redirect: false,
        });
        assert_eq!(
            translate(&event),
            Some(OverlayEvent::StackingChanged { window: OTHER })
        );
    }

    #[test]
    fn test_translate_keeps_only_final_expose() {
        let expose = |count| {
            Event::Expose(ExposeEvent {
                response_type: EXPOSE_EVENT,
                sequence: 9,
                window: OVERLAY,
                x: 0,
                y: 0,
                width: 210,
                height: 31,
                count,
            })
        };
        assert_eq!(translate(&expose(2)), None);
        assert_eq!(translate(&expose(1)), None);
        assert_eq!(
            translate(&expose(0)),
            Some(OverlayEvent::ExposureRequested)
        );
    }

    #[test]
    fn test_translate_ignores_unrelated_events() {
        let event = Event::NoExposure(NoExposureEvent {
            response_type: NO_EXPOSURE_EVENT,
            sequence: 2,
            drawable: OVERLAY,
            minor_opcode: 0,
            major_opcode: 0,
        });
        assert_eq!(translate(&event), None);
    }

    #[test]
    fn test_raise_feedback_settles() {
        // Toy stacking model: last element is on top. Raising moves the
        // overlay to the end and the server reports that restack too.
        let mut stack: Vec<Window> = vec![OVERLAY, 7, 9];
        let mut reports: VecDeque<Window> = VecDeque::from(vec![7, 9]);
        let mut raises = 0;

        while let Some(window) = reports.pop_front() {
            if decide(OVERLAY, OverlayEvent::StackingChanged { window })
                == Some(Reaction::Raise)
            {
                stack.retain(|&w| w != OVERLAY);
                stack.push(OVERLAY);
                reports.push_back(OVERLAY);
                raises += 1;
                assert!(raises <= 4, "raise feedback loop did not settle");
            }
        }

        assert_eq!(stack.last(), Some(&OVERLAY));
        assert_eq!(raises, 2);
    }
}
