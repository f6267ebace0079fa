//! Compile-time constants grouped by concern

/// Built-in defaults for every command line option
pub mod defaults {
    pub const HEADER_FONT: &str = "Roboto:size=15";
    pub const FOOTER_FONT: &str = "Roboto:size=11";
    pub const HEADER_TEXT: &str = "Activate Linux";
    pub const FOOTER_TEXT: &str = "Go to Settings to activate Linux";
    /// Muted gray, readable on both light and dark wallpapers
    pub const FOREGROUND: &str = "928374";
    pub const XPAD: u16 = 25;
    pub const YPAD: u16 = 49;
}

/// X11 protocol values
pub mod x11 {
    /// Window depth with an alpha channel
    pub const ARGB_DEPTH: u8 = 32;
    /// Keep the window manager's hands off the overlay
    pub const OVERRIDE_REDIRECT: u32 = 1;
    /// Premultiplied ARGB zero, fully transparent
    pub const TRANSPARENT_PIXEL: u32 = 0;
    /// res_name and res_class, each NUL-terminated
    pub const WM_CLASS: &[u8] = b"overlay\0Overlay\0";
    /// XFixes protocol version announced to the server; input shape
    /// regions need 2.0 or later
    pub const XFIXES_MAJOR: u32 = 5;
    pub const XFIXES_MINOR: u32 = 0;
}

/// Font sizing conventions
pub mod font {
    /// Point sizes are converted to pixels at this fixed resolution
    pub const DPI: f32 = 96.0;
    pub const POINTS_PER_INCH: f32 = 72.0;
    /// Point size used when a descriptor names no size
    pub const DEFAULT_SIZE_PT: f32 = 12.0;
}
