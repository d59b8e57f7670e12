//! The trait that decouples hyprview from any specific compositor.
//!
//! The [`OverlayController`](crate::overlay::OverlayController) never talks
//! to Hyprland directly.  It goes through a
//! [`CompositorClient`](crate::client::CompositorClient), which in turn wraps
//! any implementation of [`Compositor`]: the Hyprland IPC backend, the
//! in-memory [`MemoryCompositor`](crate::memory::MemoryCompositor), or a
//! recording mock in tests.

use crate::model::{Client, Monitor, Workspace};

/// Raw query/command surface of a compositor.
///
/// Every method is a single blocking call.  Implementations report failures
/// through [`Self::Error`]; deciding what a failure *means* for the overlay
/// is the job of [`CompositorClient`](crate::client::CompositorClient), not
/// of the backend.
pub trait Compositor {
    /// The error type produced by this compositor.
    type Error: std::error::Error + Send + 'static;

    /// Every monitor, in the order the compositor reports them.
    fn monitors(&self) -> Result<Vec<Monitor>, Self::Error>;

    /// Every mapped window.
    fn clients(&self) -> Result<Vec<Client>, Self::Error>;

    /// Every workspace that currently exists.
    fn workspaces(&self) -> Result<Vec<Workspace>, Self::Error>;

    /// Move the window at `address` to `workspace` without following it.
    ///
    /// `workspace` is a dispatcher argument: a numeric id or the
    /// `special` token, as produced by
    /// [`WorkspaceId::dispatch_token`](crate::model::WorkspaceId::dispatch_token).
    fn move_to_workspace_silent(&self, address: &str, workspace: &str) -> Result<(), Self::Error>;

    /// Make `workspace_id` the active workspace.
    fn dispatch_workspace(&self, workspace_id: i32) -> Result<(), Self::Error>;

    /// Ask the window at `address` to close.
    fn kill_window(&self, address: &str) -> Result<(), Self::Error>;
}
