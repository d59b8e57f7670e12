//! [`Compositor`] implementation backed by Hyprland IPC.
//!
//! Communicates directly with Hyprland through its Unix socket at
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`.
//! No `hyprctl` child process is spawned.

use crate::model::{Client, Monitor, Point, Size, Workspace, WorkspaceId};
use crate::traits::Compositor;
use serde::Deserialize;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

/// Hyprland-backed compositor.
///
/// Each method opens a short-lived connection to the command socket, sends
/// one request and reads the whole reply.
#[derive(Debug, Default)]
pub struct HyprlandCompositor;

/// Errors that can occur when talking to Hyprland.
#[derive(Debug, thiserror::Error)]
#[error("hyprland IPC error: {0}")]
pub struct HyprlandError(String);

impl HyprlandCompositor {
    pub fn new() -> Self {
        Self
    }
}

//  Socket plumbing

/// Resolve the Hyprland command socket path.
fn socket_path() -> Result<PathBuf, HyprlandError> {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
        .map_err(|_| HyprlandError("XDG_RUNTIME_DIR not set".into()))?;
    let his = std::env::var("HYPRLAND_INSTANCE_SIGNATURE")
        .map_err(|_| HyprlandError("HYPRLAND_INSTANCE_SIGNATURE not set".into()))?;
    Ok(PathBuf::from(format!("{}/hypr/{}/.socket.sock", runtime_dir, his)))
}

/// Send a raw request and return the reply as a string.
fn ipc_request(request: &str) -> Result<String, HyprlandError> {
    let path = socket_path()?;
    let mut stream = UnixStream::connect(&path)
        .map_err(|e| HyprlandError(format!("connect to {}: {}", path.display(), e)))?;

    stream
        .write_all(request.as_bytes())
        .map_err(|e| HyprlandError(format!("write: {}", e)))?;

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .map_err(|e| HyprlandError(format!("read: {}", e)))?;

    String::from_utf8(response).map_err(|e| HyprlandError(format!("utf-8: {}", e)))
}

/// Run a JSON data query (`j/<command>`) and deserialize the reply.
fn ipc_json<T: for<'de> Deserialize<'de>>(query: &str) -> Result<T, HyprlandError> {
    let json = ipc_request(&format!("j/{}", query))?;
    serde_json::from_str(&json).map_err(|e| HyprlandError(format!("parse {}: {}", query, e)))
}

/// Send a dispatch command and check for `"ok"`.
fn ipc_dispatch(args: &str) -> Result<(), HyprlandError> {
    let response = ipc_request(&format!("/dispatch {}", args))?;
    check_dispatch_reply(&response)
}

fn check_dispatch_reply(response: &str) -> Result<(), HyprlandError> {
    if response.trim() == "ok" {
        Ok(())
    } else {
        Err(HyprlandError(format!("dispatch error: {}", response.trim())))
    }
}

//  Minimal serde structs for the JSON we care about

/// Subset of an object returned by `j/monitors`.
#[derive(Deserialize)]
struct MonitorJson {
    name: String,
    width: i32,
    height: i32,
}

/// The `workspace` field nested in each `j/clients` object.
#[derive(Deserialize)]
struct WorkspaceRefJson {
    id: i32,
}

/// Subset of an object returned by `j/clients`.
#[derive(Deserialize)]
struct ClientJson {
    address: String,
    #[serde(default = "unknown_title")]
    title: String,
    #[serde(default)]
    workspace: Option<WorkspaceRefJson>,
    #[serde(default)]
    at: [i32; 2],
    #[serde(default = "default_client_size")]
    size: [i32; 2],
}

fn unknown_title() -> String {
    "Unknown".into()
}

fn default_client_size() -> [i32; 2] {
    [100, 100]
}

/// Subset of an object returned by `j/workspaces`.
#[derive(Deserialize)]
struct WorkspaceJson {
    id: i32,
    #[serde(default)]
    name: String,
}

impl From<MonitorJson> for Monitor {
    fn from(m: MonitorJson) -> Self {
        Monitor {
            name: m.name,
            width: m.width,
            height: m.height,
        }
    }
}

impl From<ClientJson> for Client {
    fn from(c: ClientJson) -> Self {
        Client {
            address: c.address,
            title: c.title,
            workspace: c.workspace.map(|w| WorkspaceId::from_raw(w.id)),
            at: Point::new(c.at[0], c.at[1]),
            size: Size::new(c.size[0], c.size[1]),
        }
    }
}

impl From<WorkspaceJson> for Workspace {
    fn from(w: WorkspaceJson) -> Self {
        Workspace {
            id: WorkspaceId::from_raw(w.id),
            name: w.name,
        }
    }
}

fn parse_clients(json: &str) -> Result<Vec<Client>, serde_json::Error> {
    let clients: Vec<ClientJson> = serde_json::from_str(json)?;
    Ok(clients.into_iter().map(Client::from).collect())
}

//  Dispatch arguments

fn move_args(address: &str, workspace: &str) -> String {
    format!("movetoworkspacesilent {},address:{}", workspace, address)
}

fn workspace_args(workspace_id: i32) -> String {
    format!("workspace {}", workspace_id)
}

fn kill_args(address: &str) -> String {
    format!("killwindow address:{}", address)
}

//  Compositor implementation

impl Compositor for HyprlandCompositor {
    type Error = HyprlandError;

    fn monitors(&self) -> Result<Vec<Monitor>, Self::Error> {
        let monitors: Vec<MonitorJson> = ipc_json("monitors")?;
        Ok(monitors.into_iter().map(Monitor::from).collect())
    }

    fn clients(&self) -> Result<Vec<Client>, Self::Error> {
        let json = ipc_request("j/clients")?;
        parse_clients(&json).map_err(|e| HyprlandError(format!("parse clients: {}", e)))
    }

    fn workspaces(&self) -> Result<Vec<Workspace>, Self::Error> {
        let workspaces: Vec<WorkspaceJson> = ipc_json("workspaces")?;
        Ok(workspaces.into_iter().map(Workspace::from).collect())
    }

    fn move_to_workspace_silent(&self, address: &str, workspace: &str) -> Result<(), Self::Error> {
        ipc_dispatch(&move_args(address, workspace))
    }

    fn dispatch_workspace(&self, workspace_id: i32) -> Result<(), Self::Error> {
        ipc_dispatch(&workspace_args(workspace_id))
    }

    fn kill_window(&self, address: &str) -> Result<(), Self::Error> {
        ipc_dispatch(&kill_args(address))
    }
}
