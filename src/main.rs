#![forbid(unsafe_code)]

mod cli;
mod color;
mod config;
mod constants;
mod event_loop;
mod font;
mod layout;
mod overlay;
mod x11_utils;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{Level as TraceLevel, info};
use tracing_subscriber::FmtSubscriber;
use x11rb::connection::Connection;

use cli::Cli;
use font::OverlayFont;
use overlay::Overlay;

fn main() -> Result<()> {
    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;

    let config = Cli::parse().into_config();
    info!("config={:#?}", config);

    let (conn, screen_num) = x11rb::connect(None).context("Failed to connect to the X server")?;
    let screen = &conn.setup().roots[screen_num];
    info!(
        "successfully connected to x11: screen={screen_num}, dimensions={}x{}",
        screen.width_in_pixels, screen.height_in_pixels
    );

    let header_font = OverlayFont::open(&config.header_font)
        .with_context(|| format!("Failed to open header font '{}'", config.header_font))?;
    let footer_font = OverlayFont::open(&config.footer_font)
        .with_context(|| format!("Failed to open footer font '{}'", config.footer_font))?;

    let overlay = Overlay::new(
        &conn,
        screen,
        &config,
        &[
            (config.header_text.as_str(), &header_font),
            (config.footer_text.as_str(), &footer_font),
        ],
    )
    .context("Failed to create the overlay window")?;
    overlay
        .make_click_through()
        .context("Failed to make the overlay click-through")?;

    event_loop::run(&conn, screen, &overlay)
}
