//! # Winwrap - background window layer
//!
//! Runs a headless compositor session with the background layer loaded.
//! Windows of the configured class (`--spawn kitty-bg`) are stretched over
//! all outputs and painted behind everything else; the frame loop keeps
//! committing new content to them so the commit hooks are exercised.

use anyhow::Result;
use clap::Parser;
use log::{error, info, warn};
use serde::Serialize;
use std::time::Duration;

use winwrap::config::OutputConfig;
use winwrap::logging::init_logging;
use winwrap::window::{Buffer, WindowHandle};
use winwrap::{Compositor, WinwrapConfig, WinwrapPlugin};

/// Client windows push a new buffer every this many frames
const COMMIT_INTERVAL: u64 = 2;

#[derive(Parser)]
#[command(name = "winwrap")]
#[command(about = "Run any window as the desktop background, across every output")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "~/.config/winwrap/winwrap.toml")]
    config: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Stop after this many frames (0 runs until Ctrl+C)
    #[arg(short, long, default_value_t = 0)]
    frames: u64,

    /// Open a client window of this class at startup (repeatable)
    #[arg(short, long = "spawn", value_name = "CLASS")]
    spawn: Vec<String>,

    /// Print a JSON session report on exit
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct SessionReport {
    version: &'static str,
    api_version: String,
    frames: u64,
    outputs: Vec<OutputReport>,
    windows: Vec<WindowReport>,
    background_windows: usize,
    paints: usize,
    background_paints: usize,
    notifications: Vec<String>,
}

#[derive(Debug, Serialize)]
struct OutputReport {
    name: String,
    position: [f64; 2],
    size: [f64; 2],
}

#[derive(Debug, Serialize)]
struct WindowReport {
    id: u64,
    class: String,
    position: [f64; 2],
    size: [f64; 2],
    floating: bool,
    pinned: bool,
    hidden: bool,
    focused: bool,
    buffer: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.debug)?;

    info!("🚀 Starting winwrap {}", winwrap::VERSION);
    info!("📄 Built {}", env!("BUILD_DATE"));

    // Load configuration
    let mut config = match WinwrapConfig::load(&cli.config) {
        Ok(config) => {
            info!("✅ Configuration loaded from: {}", cli.config);
            config
        }
        Err(e) => {
            error!("❌ Failed to load configuration: {:#}", e);
            info!("📝 Using default configuration");
            WinwrapConfig::default()
        }
    };

    if config.outputs.is_empty() {
        info!("🖥️ No outputs configured, using a single 1920x1080 output");
        config.outputs.push(OutputConfig {
            name: "HEADLESS-1".to_string(),
            position: [0.0, 0.0],
            size: [1920.0, 1080.0],
        });
    }

    let report = run_session(&cli, config).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        info!(
            "🛑 Session finished: {} frames, {} paints ({} background)",
            report.frames, report.paints, report.background_paints
        );
    }

    Ok(())
}

async fn run_session(cli: &Cli, config: WinwrapConfig) -> Result<SessionReport> {
    let mut compositor = Compositor::new(config.clone());

    let plugin = WinwrapPlugin::new();
    let registry = plugin.registry();
    if let Err(e) = compositor.load_plugin(Box::new(plugin)) {
        warn!("⚠️ Running without the background layer: {}", e);
    }

    // Config is parsed after plugins load, so their reload handlers run
    compositor.reload_config(config);

    let mut clients: Vec<WindowHandle> = Vec::new();
    for class in &cli.spawn {
        let window = compositor.open_window(class, class);
        present(&mut compositor, &window, 1);
        clients.push(window);
    }

    let fps = compositor.config().general.max_fps.max(1);
    let mut ticker = tokio::time::interval(Duration::from_secs(1) / fps);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut frames = 0u64;
    let mut paints = 0usize;
    let mut background_paints = 0usize;

    info!("🎬 Rendering at {} fps", fps);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                frames += 1;
                if frames % COMMIT_INTERVAL == 0 {
                    for window in &clients {
                        present(&mut compositor, window, frames);
                    }
                }

                compositor.render_frame();
                for paint in compositor.take_paints() {
                    paints += 1;
                    if paint.options.background {
                        background_paints += 1;
                    }
                }

                if cli.frames > 0 && frames >= cli.frames {
                    break;
                }
            }
            _ = &mut shutdown => {
                info!("📨 Received Ctrl+C, shutting down gracefully");
                break;
            }
        }
    }

    let focused = compositor.focused_window();
    let report = SessionReport {
        version: winwrap::VERSION,
        api_version: compositor.api_version().to_string(),
        frames,
        outputs: compositor
            .outputs()
            .iter()
            .map(|o| OutputReport {
                name: o.name.clone(),
                position: [o.position.x, o.position.y],
                size: [o.size.x, o.size.y],
            })
            .collect(),
        windows: compositor
            .windows()
            .iter()
            .map(|window| {
                let w = window.borrow();
                WindowReport {
                    id: w.id.0,
                    class: w.class.clone(),
                    position: [w.position.x, w.position.y],
                    size: [w.size.x, w.size.y],
                    floating: w.floating,
                    pinned: w.pinned,
                    hidden: w.hidden,
                    focused: focused == Some(w.id),
                    buffer: w.surface.current.map(|b| b.serial),
                }
            })
            .collect(),
        background_windows: registry.borrow().live().len(),
        paints,
        background_paints,
        notifications: compositor.notifications().iter().map(|n| n.text.clone()).collect(),
    };

    Ok(report)
}

/// Simulate the client drawing a new frame
fn present(compositor: &mut Compositor, window: &WindowHandle, serial: u64) {
    let size = window.borrow().size;
    compositor.attach_buffer(window, Buffer { serial, size });
    compositor.commit_window(window);
}
