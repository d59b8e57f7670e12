//! Entry point for **hyprview**.
//!
//! Queries Hyprland once for the monitor, workspaces and windows, then shows
//! the overview until Escape is pressed.
//!
//! When the `visualizer-gtk` feature is enabled the main thread runs the
//! GLib main loop.  Without the feature, the computed tile layout is logged
//! and the process exits.

use hyprview::config::Config;
use hyprview::hyprland::compositor::HyprlandCompositor;
use hyprview::overlay::OverlayController;
use hyprview::traits::Compositor;
use log::{error, info};

/// Resolve the config directory (`$XDG_CONFIG_HOME/hyprview`).
fn config_dir() -> std::path::PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    std::path::PathBuf::from(base).join("hyprview")
}

/// Try to load the config from `$XDG_CONFIG_HOME/hyprview/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

/// Resolve the CSS stylesheet path.
#[cfg(feature = "visualizer-gtk")]
fn css_path() -> std::path::PathBuf {
    config_dir().join("style.css")
}

//  Main

fn main() {
    env_logger::init();

    let config = load_config();

    let controller = match OverlayController::new(HyprlandCompositor::new(), &config) {
        Ok(c) => c,
        Err(e) => {
            error!("failed to start overview: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        "monitor {} {}x{}, {} windows",
        controller.monitor_name(),
        controller.monitor_size().width,
        controller.monitor_size().height,
        controller.tiles().len()
    );

    start_overlay(controller, config);
}

#[cfg(feature = "visualizer-gtk")]
fn start_overlay<C: Compositor + 'static>(controller: OverlayController<C>, config: Config) {
    hyprview::visualizer::gtk::run_main_loop(controller, Some(css_path()), &config.overlay);
}

#[cfg(not(feature = "visualizer-gtk"))]
fn start_overlay<C: Compositor>(controller: OverlayController<C>, _config: Config) {
    info!("built without a renderer, printing layout");
    for cell in controller.grid().cells() {
        info!(
            "cell {:<12} at ({}, {}) {}",
            controller.cell_caption(cell),
            cell.origin.x,
            cell.origin.y,
            if controller.is_occupied(cell.workspace) { "occupied" } else { "" }
        );
    }
    for tile in controller.tiles() {
        info!(
            "tile {} {:?} on {} at ({}, {}) size {}x{}",
            tile.address(),
            tile.title(),
            tile.workspace(),
            tile.origin().x,
            tile.origin().y,
            tile.size().width,
            tile.size().height
        );
    }
}
