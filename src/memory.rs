//! An in-memory [`Compositor`].
//!
//! [`MemoryCompositor`] keeps a monitor list, a client list and an active
//! workspace, and applies commands to that state the way Hyprland would:
//! a silent move rewrites the client's workspace, a kill removes the client.
//! It backs the `hyprview-demo` binary and the controller tests.

use crate::model::{Client, Monitor, Workspace, WorkspaceId};
use crate::traits::Compositor;
use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;

/// Errors produced by [`MemoryCompositor`].
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("no client with address {0}")]
    UnknownClient(String),
    #[error("invalid workspace argument {0:?}")]
    InvalidWorkspace(String),
    #[error("compositor unavailable")]
    Unavailable,
}

/// Compositor state held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryCompositor {
    monitors: Vec<Monitor>,
    clients: RefCell<Vec<Client>>,
    active_workspace: Cell<i32>,
    offline: Cell<bool>,
}

impl MemoryCompositor {
    /// A compositor with a single monitor of the given resolution and no
    /// clients.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            monitors: vec![Monitor {
                name: "MEM-1".into(),
                width,
                height,
            }],
            clients: RefCell::new(Vec::new()),
            active_workspace: Cell::new(1),
            offline: Cell::new(false),
        }
    }

    /// Add a client (builder style).
    pub fn with_client(self, client: Client) -> Self {
        self.clients.borrow_mut().push(client);
        self
    }

    /// Snapshot of the current clients.
    pub fn snapshot(&self) -> Vec<Client> {
        self.clients.borrow().clone()
    }

    /// Workspace id most recently focused via `dispatch_workspace`.
    pub fn active_workspace(&self) -> i32 {
        self.active_workspace.get()
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    fn check_online(&self) -> Result<(), MemoryError> {
        if self.offline.get() {
            Err(MemoryError::Unavailable)
        } else {
            Ok(())
        }
    }
}

fn parse_workspace_arg(arg: &str) -> Result<WorkspaceId, MemoryError> {
    if arg == crate::model::SPECIAL_WORKSPACE_TOKEN {
        return Ok(WorkspaceId::Special);
    }
    match arg.parse::<i32>() {
        Ok(id) if id > 0 => Ok(WorkspaceId::Regular(id)),
        _ => Err(MemoryError::InvalidWorkspace(arg.to_string())),
    }
}

impl Compositor for MemoryCompositor {
    type Error = MemoryError;

    fn monitors(&self) -> Result<Vec<Monitor>, MemoryError> {
        self.check_online()?;
        Ok(self.monitors.clone())
    }

    fn clients(&self) -> Result<Vec<Client>, MemoryError> {
        self.check_online()?;
        Ok(self.snapshot())
    }

    fn workspaces(&self) -> Result<Vec<Workspace>, MemoryError> {
        self.check_online()?;
        let mut ids: BTreeSet<i32> = BTreeSet::new();
        ids.insert(self.active_workspace.get());
        ids.extend(self.clients.borrow().iter().filter_map(|c| c.workspace).map(|w| w.raw()));
        Ok(ids
            .into_iter()
            .map(|raw| {
                let id = WorkspaceId::from_raw(raw);
                let name = match id {
                    WorkspaceId::Special => "special:special".to_string(),
                    WorkspaceId::Regular(n) => n.to_string(),
                };
                Workspace { id, name }
            })
            .collect())
    }

    fn move_to_workspace_silent(&self, address: &str, workspace: &str) -> Result<(), MemoryError> {
        self.check_online()?;
        let target = parse_workspace_arg(workspace)?;
        let mut clients = self.clients.borrow_mut();
        let client = clients
            .iter_mut()
            .find(|c| c.address == address)
            .ok_or_else(|| MemoryError::UnknownClient(address.to_string()))?;
        client.workspace = Some(target);
        Ok(())
    }

    fn dispatch_workspace(&self, workspace_id: i32) -> Result<(), MemoryError> {
        self.check_online()?;
        if workspace_id <= 0 {
            return Err(MemoryError::InvalidWorkspace(workspace_id.to_string()));
        }
        self.active_workspace.set(workspace_id);
        Ok(())
    }

    fn kill_window(&self, address: &str) -> Result<(), MemoryError> {
        self.check_online()?;
        let mut clients = self.clients.borrow_mut();
        let before = clients.len();
        clients.retain(|c| c.address != address);
        if clients.len() == before {
            return Err(MemoryError::UnknownClient(address.to_string()));
        }
        Ok(())
    }
}
