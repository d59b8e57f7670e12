//! Overview demo without a running compositor.
//!
//! Seeds an in-memory compositor with a handful of windows spread over a few
//! workspaces and shows the real overlay on top of it.  Drags, menu moves
//! and kills all act on the in-memory state.
//!
//! Run with:
//!     RUST_LOG=info cargo run --bin hyprview-demo
//!
//! Press Escape to quit.

use hyprview::config::Config;
use hyprview::memory::MemoryCompositor;
use hyprview::model::{Client, Point, Size, WorkspaceId};
use hyprview::overlay::OverlayController;
use log::error;

fn window(
    address: &str,
    title: &str,
    workspace: WorkspaceId,
    at: (i32, i32),
    size: (i32, i32),
) -> Client {
    Client {
        address: address.into(),
        title: title.into(),
        workspace: Some(workspace),
        at: Point::new(at.0, at.1),
        size: Size::new(size.0, size.1),
    }
}

fn main() {
    env_logger::init();

    let (ws1, ws2, ws4) = (
        WorkspaceId::Regular(1),
        WorkspaceId::Regular(2),
        WorkspaceId::Regular(4),
    );
    let compositor = MemoryCompositor::new(1920, 1080)
        .with_client(window("0xa1", "kitty ~/src/hyprview", ws1, (10, 10), (945, 1060)))
        .with_client(window("0xa2", "Firefox - Hyprland Wiki", ws1, (965, 10), (945, 1060)))
        .with_client(window("0xa3", "mpv", ws2, (480, 270), (960, 540)))
        .with_client(window("0xa4", "Thunderbird", ws4, (0, 0), (1920, 1080)))
        .with_client(window("0xa5", "pavucontrol", WorkspaceId::Special, (660, 240), (600, 600)));

    let config = Config::default();
    let controller = match OverlayController::new(compositor, &config) {
        Ok(c) => c,
        Err(e) => {
            error!("demo setup failed: {}", e);
            std::process::exit(1);
        }
    };

    hyprview::visualizer::gtk::run_main_loop(controller, None, &config.overlay);
}
