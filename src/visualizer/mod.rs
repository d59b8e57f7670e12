//! Renderers for the workspace overview.
//!
//! When the `visualizer-gtk` feature is enabled, [`gtk::run_main_loop`]
//! takes over the main thread and draws the overlay through the GLib main
//! loop.

#[cfg(feature = "visualizer-gtk")]
pub mod gtk;
