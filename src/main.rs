//! vmc-retarget - Main Entry Point
//!
//! Listens for VMC bone poses and shows the retargeted rig in a viewer window.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vmc_retarget::{
    config::{self, AppConfig},
    FrameBridge, InMemoryScene, ReceiverHandle, RigViewerApp, UpdateDriver,
};

#[derive(Parser)]
#[command(name = "vmc-retarget", about = "Retarget VMC motion capture onto a rig", version)]
struct Args {
    /// Config file (defaults to config.toml in the app data directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the UDP listen address, e.g. 0.0.0.0:39539
    #[arg(long)]
    bind: Option<String>,

    /// Write the effective config back to the config file and exit
    #[arg(long)]
    write_config: bool,

    /// Drive the rig from the built-in motion generator
    #[cfg(feature = "synthetic-source")]
    #[arg(long)]
    synthetic: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging();

    tracing::info!("Starting vmc-retarget {}", env!("CARGO_PKG_VERSION"));

    let config_path = args
        .config
        .clone()
        .or_else(config::default_config_path)
        .context("Could not determine a config file location")?;
    let mut config = AppConfig::load_or_default(&config_path)?;
    if let Some(bind) = args.bind {
        config.receiver.bind_addr = bind;
        config.validate()?;
    }

    if args.write_config {
        config.save(&config_path)?;
        println!("Wrote {}", config_path.display());
        return Ok(());
    }

    let bridge = Arc::new(FrameBridge::new());
    let scene = InMemoryScene::new().with_rotation_order(config.retarget.rotation_order);
    let driver = UpdateDriver::from_config(&config.retarget, Arc::clone(&bridge), scene)?;

    #[cfg(feature = "synthetic-source")]
    let synthetic = args.synthetic || config.synthetic.enabled;
    #[cfg(not(feature = "synthetic-source"))]
    let synthetic = false;

    // Without the network there is still a viewer to show, so a bind failure
    // is reported in the window instead of aborting.
    let (receiver, startup_error) = if synthetic {
        (None, None)
    } else {
        match ReceiverHandle::spawn(&config.receiver, Arc::clone(&bridge)) {
            Ok(handle) => (Some(handle), None),
            Err(e) => {
                tracing::error!("Failed to start OSC receiver: {}", e);
                (None, Some(e.to_string()))
            }
        }
    };

    let [width, height] = config.viewer.window_size;
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width, height])
            .with_min_inner_size([640.0, 400.0])
            .with_title("VMC Retarget"),
        ..Default::default()
    };

    let viewer_config = config.viewer.clone();
    #[cfg(feature = "synthetic-source")]
    let synthetic_source = if synthetic {
        Some(vmc_retarget::backend::SyntheticSource::spawn(
            Arc::clone(&bridge),
            config.synthetic.rate_hz,
        )?)
    } else {
        None
    };

    eframe::run_native(
        "VMC Retarget",
        native_options,
        Box::new(move |cc| {
            let mut app = RigViewerApp::new(cc, driver, receiver, viewer_config);
            if let Some(message) = startup_error {
                app = app.with_startup_error(message);
            }
            #[cfg(feature = "synthetic-source")]
            if let Some(source) = synthetic_source {
                app = app.with_synthetic_source(source);
            }
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Viewer failed: {}", e))?;

    tracing::info!("Shutting down...");
    Ok(())
}

/// Console logging plus a daily log file in the app data directory.
///
/// The returned guard flushes the file writer when dropped.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = || {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,vmc_retarget=debug"))
    };

    // Console only when the app data directory is unusable
    let file_writer = config::ensure_log_dir().ok().map(|dir| {
        tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "vmc-retarget.log"))
    });

    match file_writer {
        Some((writer, guard)) => {
            tracing_subscriber::registry()
                .with(filter())
                .with(tracing_subscriber::fmt::layer())
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter())
                .with(tracing_subscriber::fmt::layer())
                .init();
            None
        }
    }
}
