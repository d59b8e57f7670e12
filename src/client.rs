//! Query/command facade over a [`Compositor`].
//!
//! [`CompositorClient`] owns the overlay's failure policy:
//!
//! * [`monitor`](CompositorClient::monitor) and
//!   [`monitor_size`](CompositorClient::monitor_size) are the only calls that
//!   report a typed error.
//! * List queries degrade to an empty `Vec` when the compositor fails, so
//!   "no windows" and "query failed" look the same to callers.
//! * Commands are fire-and-forget.  A failure is logged and swallowed.
//!
//! Nothing is cached and nothing is retried: every method is exactly one
//! call into the backend.

use crate::model::{Client, Monitor, Size, Workspace, WorkspaceId};
use crate::traits::Compositor;
use log::{debug, error};

/// Errors surfaced by [`CompositorClient::monitor`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The requested monitor does not exist.
    #[error("monitor index {index} out of range (have {available})")]
    IndexOutOfRange { index: usize, available: usize },
    /// The compositor call itself failed.
    #[error("compositor command failed: {0}")]
    Command(String),
}

/// Stateless facade around a [`Compositor`] backend.
pub struct CompositorClient<C: Compositor> {
    compositor: C,
}

impl<C: Compositor> CompositorClient<C> {
    pub fn new(compositor: C) -> Self {
        Self { compositor }
    }

    /// The wrapped backend.
    pub fn compositor(&self) -> &C {
        &self.compositor
    }

    /// The monitor at `index`, in the order the compositor lists them.
    pub fn monitor(&self, index: usize) -> Result<Monitor, ClientError> {
        let mut monitors = self
            .compositor
            .monitors()
            .map_err(|e| ClientError::Command(e.to_string()))?;
        let available = monitors.len();
        if index >= available {
            return Err(ClientError::IndexOutOfRange { index, available });
        }
        Ok(monitors.swap_remove(index))
    }

    /// Resolution of the monitor at `index`.
    pub fn monitor_size(&self, index: usize) -> Result<Size, ClientError> {
        self.monitor(index).map(|m| m.size())
    }

    /// All windows, or an empty list if the query failed.
    pub fn list_clients(&self) -> Vec<Client> {
        self.compositor.clients().unwrap_or_else(|e| {
            error!("failed to query clients: {}", e);
            Vec::new()
        })
    }

    /// All workspaces, or an empty list if the query failed.
    pub fn list_workspaces(&self) -> Vec<Workspace> {
        self.compositor.workspaces().unwrap_or_else(|e| {
            error!("failed to query workspaces: {}", e);
            Vec::new()
        })
    }

    /// Move `address` to `workspace` without changing focus.
    pub fn move_to_workspace(&self, address: &str, workspace: WorkspaceId) {
        let token = workspace.dispatch_token();
        debug!("move {} -> {}", address, token);
        if let Err(e) = self.compositor.move_to_workspace_silent(address, &token) {
            error!("failed to move {} to {}: {}", address, token, e);
        }
    }

    /// Switch the active workspace to `id`.
    pub fn dispatch_workspace(&self, id: i32) {
        debug!("focus workspace {}", id);
        if let Err(e) = self.compositor.dispatch_workspace(id) {
            error!("failed to switch to workspace {}: {}", id, e);
        }
    }

    /// Close the window at `address`.
    pub fn kill_window(&self, address: &str) {
        debug!("kill {}", address);
        if let Err(e) = self.compositor.kill_window(address) {
            error!("failed to kill {}: {}", address, e);
        }
    }
}
