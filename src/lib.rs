//! **hyprview**: a drag-and-drop workspace overview for Hyprland.
//!
//! Every workspace is drawn as a cell in a fixed `cols × rows` grid, with the
//! special workspace in its own cell underneath.  Every window is drawn as a
//! tile inside its workspace's cell, scaled down from its monitor position.
//! Dragging a tile into another cell moves the window there; right-click
//! opens a context menu and middle-click kills the window.
//!
//! # Architecture
//!
//! * [`traits::Compositor`] abstracts the compositor queries and commands so
//!   the overlay logic is not coupled to Hyprland.
//! * [`client::CompositorClient`] wraps a compositor and owns the failure
//!   policy: list queries degrade to empty, commands are fire-and-forget.
//! * [`grid`] is pure geometry: cell layout, scaling and snapping.
//! * [`tile::WindowTile`] is the per-window drag state machine.
//! * [`overlay::OverlayController`] ties them together; the GTK renderer in
//!   [`visualizer`] only forwards pointer events and redraws.
//!
//! Concrete compositors live in [`hyprland`] (Hyprland IPC) and [`memory`]
//! (in-memory, for tests and the demo binary).

pub mod client;
pub mod config;
pub mod grid;
pub mod hyprland;
pub mod memory;
pub mod model;
pub mod overlay;
pub mod tile;
pub mod traits;
pub mod visualizer;
