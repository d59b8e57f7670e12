//! Window tiles and their drag-snap state machine.
//!
//! A [`WindowTile`] is the overlay's stand-in for one compositor window.  It
//! lives for exactly one snapshot: the controller throws every tile away and
//! builds new ones on each refresh, so nothing here survives a refresh.
//!
//! # State machine
//!
//! ```text
//!            primary press                 primary release
//!   Idle ───────────────────▶ Dragging ─────────────────────▶ Idle
//!    │ ▲                       │    ▲          (snap + move + refresh)
//!    │ │ secondary press       └────┘
//!    │ │ (menu)                pointer motion
//!    │ └──────────┐
//!    │ tertiary press (kill, clear, delayed refresh)
//!    └────────────┘
//! ```
//!
//! Tiles never decide *when* to refresh; they report what happened through a
//! [`TileResponse`] and the [`OverlayController`](crate::overlay::OverlayController)
//! acts on it.

use crate::client::CompositorClient;
use crate::grid::{scale_position, scale_size, Grid};
use crate::model::{Client, Point, Size, WorkspaceId};
use crate::traits::Compositor;
use log::{debug, info};

/// Pointer buttons the overlay reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Drag and snap.
    Primary,
    /// Open the context menu.
    Secondary,
    /// Close the window.
    Tertiary,
}

impl MouseButton {
    /// Map a GDK/X11 button number (1 = left, 2 = middle, 3 = right).
    pub fn from_button_number(n: u32) -> Option<Self> {
        match n {
            1 => Some(MouseButton::Primary),
            2 => Some(MouseButton::Tertiary),
            3 => Some(MouseButton::Secondary),
            _ => None,
        }
    }
}

/// Drag state of a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// `grab_offset` is the press point relative to the tile origin.
    Dragging { grab_offset: Point },
}

/// What a context menu entry does when selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Close,
    /// Switch the active workspace to the tile's current workspace.
    FocusWorkspace(i32),
    MoveTo(WorkspaceId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: String,
    pub action: MenuAction,
}

/// Context menu contents for one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextMenu {
    /// Top-level entries ("Close Window", "Go to Workspace").
    pub actions: Vec<MenuEntry>,
    /// Entries of the "Move to Workspace" submenu, one per grid cell in build
    /// order.
    pub move_targets: Vec<MenuEntry>,
}

impl ContextMenu {
    pub const MOVE_SUBMENU_LABEL: &'static str = "Move to Workspace";

    /// Every entry, top-level first.
    pub fn entries(&self) -> impl Iterator<Item = &MenuEntry> {
        self.actions.iter().chain(self.move_targets.iter())
    }
}

/// Outcome of feeding an event to a tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileResponse {
    /// The event did not apply in the current state.
    Ignored,
    /// A drag started; the tile should be drawn above its siblings.
    Raised,
    /// The tile moved while dragging.
    Moved,
    /// A command may have changed the compositor; rebuild all tiles now.
    Refresh,
    /// The window was killed; clear all tiles and rebuild after a delay.
    Killed,
    /// Show this menu at the pointer.
    ShowMenu(ContextMenu),
}

/// Visual proxy for one compositor window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowTile {
    address: String,
    title: String,
    label: String,
    /// The workspace the window is known to occupy.
    workspace: WorkspaceId,
    origin: Point,
    size: Size,
    drag: DragState,
}

impl WindowTile {
    /// Place `client` in its workspace's cell.
    ///
    /// Returns `None` when the client has no workspace or the grid has no
    /// cell for it; such windows are not shown at all.
    pub fn for_client(
        client: &Client,
        grid: &Grid,
        monitor: Size,
        min_size: Size,
        wrap_width: usize,
    ) -> Option<Self> {
        let workspace = client.workspace?;
        let cell = grid.cell_for_workspace(workspace)?;
        let offset = scale_position(monitor, cell.size, client.at);
        Some(Self {
            address: client.address.clone(),
            title: client.title.clone(),
            label: wrap_title(&client.title, wrap_width),
            workspace,
            origin: cell.origin + offset,
            size: scale_size(monitor, cell.size, client.size, min_size),
            drag: DragState::Idle,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Title as displayed, word-wrapped.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn workspace(&self) -> WorkspaceId {
        self.workspace
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2,
            self.origin.y + self.size.height / 2,
        )
    }

    /// Whether `point` lies inside the tile's current rectangle.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.origin.x
            && point.y >= self.origin.y
            && point.x < self.origin.x + self.size.width
            && point.y < self.origin.y + self.size.height
    }

    //  Events

    /// A button went down at `point` (overlay coordinates).
    pub fn press<C: Compositor>(
        &mut self,
        button: MouseButton,
        point: Point,
        grid: &Grid,
        client: &CompositorClient<C>,
    ) -> TileResponse {
        if self.drag != DragState::Idle {
            return TileResponse::Ignored;
        }
        match button {
            MouseButton::Primary => {
                let grab_offset = point - self.origin;
                debug!("drag start {} grab={:?}", self.address, grab_offset);
                self.drag = DragState::Dragging { grab_offset };
                TileResponse::Raised
            }
            MouseButton::Secondary => TileResponse::ShowMenu(self.context_menu(grid)),
            MouseButton::Tertiary => self.kill(client),
        }
    }

    /// The pointer moved to `point`.
    pub fn motion(&mut self, point: Point) -> TileResponse {
        match self.drag {
            DragState::Dragging { grab_offset } => {
                self.origin = point - grab_offset;
                TileResponse::Moved
            }
            DragState::Idle => TileResponse::Ignored,
        }
    }

    /// A button was released at `point`.
    ///
    /// Releasing the primary button ends a drag and snaps the tile into the
    /// nearest cell.  The window is moved only if that cell belongs to a
    /// different workspace than the one it is known to be on.
    pub fn release<C: Compositor>(
        &mut self,
        button: MouseButton,
        point: Point,
        grid: &Grid,
        client: &CompositorClient<C>,
    ) -> TileResponse {
        if button != MouseButton::Primary {
            return TileResponse::Ignored;
        }
        if self.motion(point) == TileResponse::Ignored {
            return TileResponse::Ignored;
        }
        self.drag = DragState::Idle;

        let cell = grid.nearest_cell(self.center());
        self.origin = cell.centered_origin(self.size);
        if cell.workspace != self.workspace {
            info!(
                "snap {} from {} to {}",
                self.address, self.workspace, cell.workspace
            );
            client.move_to_workspace(&self.address, cell.workspace);
            self.workspace = cell.workspace;
        } else {
            debug!("snap {} back into {}", self.address, cell.workspace);
        }
        TileResponse::Refresh
    }

    /// Run a context menu entry.
    pub fn select<C: Compositor>(
        &mut self,
        action: MenuAction,
        client: &CompositorClient<C>,
    ) -> TileResponse {
        match action {
            MenuAction::Close => self.kill(client),
            MenuAction::FocusWorkspace(id) => {
                info!("focus workspace {}", id);
                client.dispatch_workspace(id);
                TileResponse::Refresh
            }
            MenuAction::MoveTo(target) => {
                info!("move {} to {} (menu)", self.address, target);
                client.move_to_workspace(&self.address, target);
                TileResponse::Refresh
            }
        }
    }

    /// Menu for this tile: close, focus, and one move entry per cell.
    pub fn context_menu(&self, grid: &Grid) -> ContextMenu {
        let mut actions = vec![MenuEntry {
            label: "Close Window".into(),
            action: MenuAction::Close,
        }];
        if let WorkspaceId::Regular(id) = self.workspace {
            actions.push(MenuEntry {
                label: "Go to Workspace".into(),
                action: MenuAction::FocusWorkspace(id),
            });
        }
        let move_targets = grid
            .cells()
            .map(|cell| MenuEntry {
                label: cell.workspace.to_string(),
                action: MenuAction::MoveTo(cell.workspace),
            })
            .collect();
        ContextMenu {
            actions,
            move_targets,
        }
    }

    fn kill<C: Compositor>(&self, client: &CompositorClient<C>) -> TileResponse {
        info!("kill {} ({})", self.address, self.title);
        client.kill_window(&self.address);
        TileResponse::Killed
    }
}

/// Greedy word wrap for tile labels.
///
/// Titles no longer than `width` characters are returned unchanged.  Longer
/// titles are split on whitespace into lines of at most `width` characters;
/// a single word longer than `width` gets a line of its own.
pub fn wrap_title(title: &str, width: usize) -> String {
    if title.chars().count() <= width {
        return title.to_string();
    }
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in title.split_whitespace() {
        let candidate = current.chars().count() + 1 + word.chars().count();
        if candidate <= width {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        } else {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}
