//! The overlay controller.
//!
//! [`OverlayController`] owns the [`Grid`] and the current set of
//! [`WindowTile`]s.  It routes pointer events to the right tile and turns
//! each [`TileResponse`] into an [`OverlayResponse`] the renderer acts on.
//!
//! The grid is built once, from the configuration, when the controller is
//! created.  Tiles are not: every mutating action (snap, menu move, kill)
//! throws all tiles away and rebuilds them from a fresh client query.  There
//! is no diffing and no tile identity survives a refresh.

use crate::client::{ClientError, CompositorClient};
use crate::config::Config;
use crate::grid::{build_grid, Grid, GridCell};
use crate::model::{Monitor, Point, Size, Workspace, WorkspaceId};
use crate::tile::{ContextMenu, MenuAction, MouseButton, TileResponse, WindowTile};
use crate::traits::Compositor;
use log::{debug, info, warn};
use std::cell::RefCell;
use std::rc::Weak;
use std::time::Duration;

/// Errors that prevent an overlay from being created.
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("cannot read monitor geometry: {0}")]
    Monitor(#[from] ClientError),
}

/// What the renderer has to do after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayResponse {
    /// Nothing visible changed.
    Nothing,
    /// Draw the tile above all others.
    Raise,
    /// Move the tile to its new origin.
    Reposition,
    /// The tile set was replaced; redraw every tile.
    Rebuild,
    /// Show a context menu for the tile.
    ShowMenu(ContextMenu),
    /// The tile set was cleared; call [`OverlayController::refresh`] once
    /// this delay has elapsed.
    RefreshAfter(Duration),
}

/// Tile placement settings taken from the configuration.
#[derive(Debug, Clone)]
struct TileSettings {
    min_size: Size,
    wrap_width: usize,
    own_title: String,
    kill_refresh_delay: Duration,
}

/// Owns the grid and the tiles of one overlay instance.
///
/// Generic over the [`Compositor`] backend so tests can drive it with a fake.
pub struct OverlayController<C: Compositor> {
    client: CompositorClient<C>,
    grid: Grid,
    monitor: Size,
    monitor_name: String,
    /// Workspaces that existed when the overlay opened.
    workspaces: Vec<Workspace>,
    tiles: Vec<WindowTile>,
    settings: TileSettings,
}

impl<C: Compositor> OverlayController<C> {
    /// Query the compositor, build the grid and create the initial tiles.
    ///
    /// Fails only if the configured monitor cannot be read.
    pub fn new(compositor: C, config: &Config) -> Result<Self, OverlayError> {
        let client = CompositorClient::new(compositor);
        let Monitor {
            name: monitor_name,
            width,
            height,
        } = client.monitor(config.overlay.monitor)?;
        let monitor = Size::new(width, height);
        let workspaces = client.list_workspaces();
        let grid = build_grid(&config.grid.spec(), config.overlay.size());
        info!(
            "overlay: monitor {} {}x{}, {} cells, {} workspaces",
            monitor_name,
            monitor.width,
            monitor.height,
            grid.len(),
            workspaces.len()
        );

        let mut controller = Self {
            client,
            grid,
            monitor,
            monitor_name,
            workspaces,
            tiles: Vec::new(),
            settings: TileSettings {
                min_size: config.grid.min_tile_size(),
                wrap_width: config.overlay.title_wrap,
                own_title: config.overlay.title.clone(),
                kill_refresh_delay: config.overlay.kill_refresh_delay(),
            },
        };
        controller.refresh();
        Ok(controller)
    }

    //  Accessors

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Tiles in drawing order (last drawn on top).
    pub fn tiles(&self) -> &[WindowTile] {
        &self.tiles
    }

    pub fn tile(&self, address: &str) -> Option<&WindowTile> {
        self.tiles.iter().find(|t| t.address() == address)
    }

    pub fn monitor_size(&self) -> Size {
        self.monitor
    }

    /// Name of the monitor tiles are scaled from.
    pub fn monitor_name(&self) -> &str {
        &self.monitor_name
    }

    pub fn client(&self) -> &CompositorClient<C> {
        &self.client
    }

    /// Caption for a cell: the workspace's name if it existed when the
    /// overlay opened, its default label otherwise.
    pub fn cell_caption(&self, cell: &GridCell) -> String {
        self.workspaces
            .iter()
            .find(|w| w.id == cell.workspace && !w.name.is_empty())
            .map(|w| match w.id {
                WorkspaceId::Special => WorkspaceId::Special.to_string(),
                WorkspaceId::Regular(_) => w.name.clone(),
            })
            .unwrap_or_else(|| cell.workspace.to_string())
    }

    /// Whether any tile currently sits on `workspace`.
    pub fn is_occupied(&self, workspace: WorkspaceId) -> bool {
        self.tiles.iter().any(|t| t.workspace() == workspace)
    }

    /// The topmost tile under `point`, in overlay coordinates.
    pub fn tile_at(&self, point: Point) -> Option<&WindowTile> {
        self.tiles.iter().rev().find(|t| t.contains(point))
    }

    //  Tile set

    /// Drop every tile and rebuild the set from a fresh client query.
    ///
    /// The grid and the workspace snapshot are left untouched.
    pub fn refresh(&mut self) {
        self.tiles.clear();
        let clients = self.client.list_clients();
        let total = clients.len();
        self.tiles = clients
            .iter()
            .filter(|c| c.title != self.settings.own_title)
            .filter_map(|c| {
                let tile = WindowTile::for_client(
                    c,
                    &self.grid,
                    self.monitor,
                    self.settings.min_size,
                    self.settings.wrap_width,
                );
                if tile.is_none() {
                    debug!("skip {} ({:?}): no cell", c.address, c.workspace);
                }
                tile
            })
            .collect();
        info!("refresh: {} tiles from {} clients", self.tiles.len(), total);
    }

    /// Remove every tile without querying the compositor.
    pub fn clear_tiles(&mut self) {
        self.tiles.clear();
    }

    //  Events

    /// A button went down on the tile for `address`.
    pub fn press(&mut self, address: &str, button: MouseButton, point: Point) -> OverlayResponse {
        let Some(index) = self.tile_index(address) else {
            return self.unknown_tile(address);
        };
        let response = self.tiles[index].press(button, point, &self.grid, &self.client);
        if response == TileResponse::Raised {
            let tile = self.tiles.remove(index);
            self.tiles.push(tile);
        }
        self.apply(response)
    }

    /// The pointer moved while over (or grabbed by) the tile for `address`.
    pub fn motion(&mut self, address: &str, point: Point) -> OverlayResponse {
        let Some(index) = self.tile_index(address) else {
            return self.unknown_tile(address);
        };
        let response = self.tiles[index].motion(point);
        self.apply(response)
    }

    /// A button was released on the tile for `address`.
    pub fn release(&mut self, address: &str, button: MouseButton, point: Point) -> OverlayResponse {
        let Some(index) = self.tile_index(address) else {
            return self.unknown_tile(address);
        };
        let response = self.tiles[index].release(button, point, &self.grid, &self.client);
        self.apply(response)
    }

    /// A context menu entry was chosen for the tile for `address`.
    pub fn select(&mut self, address: &str, action: MenuAction) -> OverlayResponse {
        let Some(index) = self.tile_index(address) else {
            return self.unknown_tile(address);
        };
        let response = self.tiles[index].select(action, &self.client);
        self.apply(response)
    }

    //  Internal

    fn tile_index(&self, address: &str) -> Option<usize> {
        self.tiles.iter().position(|t| t.address() == address)
    }

    fn unknown_tile(&self, address: &str) -> OverlayResponse {
        warn!("event for unknown tile {}", address);
        OverlayResponse::Nothing
    }

    fn apply(&mut self, response: TileResponse) -> OverlayResponse {
        match response {
            TileResponse::Ignored => OverlayResponse::Nothing,
            TileResponse::Raised => OverlayResponse::Raise,
            TileResponse::Moved => OverlayResponse::Reposition,
            TileResponse::ShowMenu(menu) => OverlayResponse::ShowMenu(menu),
            TileResponse::Refresh => {
                self.refresh();
                OverlayResponse::Rebuild
            }
            TileResponse::Killed => {
                // The compositor applies the kill asynchronously; querying
                // right away could still list the window.
                self.clear_tiles();
                OverlayResponse::RefreshAfter(self.settings.kill_refresh_delay)
            }
        }
    }
}

/// Refresh the controller behind `weak` if it is still alive.
///
/// Used by delayed refreshes, which may fire after the overlay was closed.
/// Returns whether a refresh happened.
pub fn refresh_if_alive<C: Compositor>(weak: &Weak<RefCell<OverlayController<C>>>) -> bool {
    match weak.upgrade() {
        Some(controller) => {
            controller.borrow_mut().refresh();
            true
        }
        None => {
            debug!("delayed refresh after overlay closed, ignoring");
            false
        }
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCompositor;
    use crate::model::Client;
    use std::rc::Rc;

    fn client(address: &str, title: &str, ws: i32, at: (i32, i32)) -> Client {
        Client {
            address: address.into(),
            title: title.into(),
            workspace: Some(WorkspaceId::from_raw(ws)),
            at: Point::new(at.0, at.1),
            size: Size::new(800, 600),
        }
    }

    fn controller(compositor: MemoryCompositor) -> OverlayController<MemoryCompositor> {
        OverlayController::new(compositor, &Config::default()).unwrap()
    }

    /// Two windows on ws 1, one on ws 3.
    fn three_windows() -> MemoryCompositor {
        MemoryCompositor::new(1920, 1080)
            .with_client(client("0x1", "kitty", 1, (0, 0)))
            .with_client(client("0x2", "firefox", 1, (960, 540)))
            .with_client(client("0x3", "mpv", 3, (100, 100)))
    }

    fn tiles_in(ctl: &OverlayController<MemoryCompositor>, cell: &GridCell) -> usize {
        ctl.tiles()
            .iter()
            .filter(|t| {
                let o = t.origin();
                o.x >= cell.origin.x
                    && o.y >= cell.origin.y
                    && o.x < cell.origin.x + cell.size.width
                    && o.y < cell.origin.y + cell.size.height
            })
            .count()
    }

    /// Drag the tile for `address` so its center lands on `target`.
    fn drag(
        ctl: &mut OverlayController<MemoryCompositor>,
        address: &str,
        target: Point,
    ) -> OverlayResponse {
        let start = ctl.tile(address).unwrap().center();
        assert_eq!(
            ctl.press(address, MouseButton::Primary, start),
            OverlayResponse::Raise
        );
        assert_eq!(ctl.motion(address, target), OverlayResponse::Reposition);
        ctl.release(address, MouseButton::Primary, target)
    }

    #[test]
    fn tiles_land_in_their_workspace_cells() {
        let ctl = controller(three_windows());
        let grid = ctl.grid().clone();
        assert_eq!(ctl.tiles().len(), 3);
        for cell in grid.cells() {
            let expected = match cell.workspace {
                WorkspaceId::Regular(1) => 2,
                WorkspaceId::Regular(3) => 1,
                _ => 0,
            };
            assert_eq!(tiles_in(&ctl, cell), expected, "cell {}", cell.workspace);
        }
    }

    #[test]
    fn tiles_on_same_workspace_overlap_in_one_cell() {
        let ctl = controller(three_windows());
        let cell = *ctl.grid().cell_for_workspace(WorkspaceId::Regular(1)).unwrap();
        assert_eq!(ctl.tile("0x1").unwrap().origin(), cell.origin);
        assert_eq!(
            ctl.tile("0x2").unwrap().origin(),
            cell.origin + Point::new(90, 60)
        );
    }

    #[test]
    fn own_window_and_cellless_clients_are_skipped() {
        let compositor = three_windows()
            .with_client(client("0x9", "Hyprland-Overview", 1, (0, 0)))
            .with_client(client("0xa", "far away", 42, (0, 0)))
            .with_client(client("0xb", "named scratch", -98, (0, 0)));
        let ctl = controller(compositor);
        assert_eq!(ctl.tiles().len(), 3);
        assert!(ctl.tile("0x9").is_none());
        assert!(ctl.tile("0xa").is_none());
        assert!(ctl.tile("0xb").is_none());
    }

    #[test]
    fn scales_from_the_configured_monitor() {
        let ctl = controller(three_windows());
        assert_eq!(ctl.monitor_name(), "MEM-1");
        assert_eq!(ctl.monitor_size(), Size::new(1920, 1080));
    }

    #[test]
    fn missing_monitor_is_fatal() {
        let config = Config {
            overlay: crate::config::OverlayConfig {
                monitor: 3,
                ..Default::default()
            },
            ..Default::default()
        };
        let result = OverlayController::new(three_windows(), &config);
        assert!(matches!(
            result,
            Err(OverlayError::Monitor(ClientError::IndexOutOfRange { index: 3, .. }))
        ));
    }

    #[test]
    fn failed_client_query_means_no_tiles() {
        let mut ctl = controller(three_windows());
        ctl.client().compositor().set_offline(true);
        ctl.refresh();
        assert!(ctl.tiles().is_empty());
    }

    #[test]
    fn snap_moves_window_and_rebuilds() {
        let mut ctl = controller(three_windows());
        let target = ctl
            .grid()
            .cell_for_workspace(WorkspaceId::Regular(7))
            .unwrap()
            .center();
        assert_eq!(drag(&mut ctl, "0x3", target), OverlayResponse::Rebuild);

        let snapshot = ctl.client().compositor().snapshot();
        let moved = snapshot.iter().find(|c| c.address == "0x3").unwrap();
        assert_eq!(moved.workspace, Some(WorkspaceId::Regular(7)));

        // The rebuilt tile comes from the new snapshot: placed by its raw
        // position inside the ws 7 cell, not where it was dropped.
        let cell = *ctl.grid().cell_for_workspace(WorkspaceId::Regular(7)).unwrap();
        let tile = ctl.tile("0x3").unwrap();
        assert_eq!(tile.workspace(), WorkspaceId::Regular(7));
        assert_eq!(tile.origin(), cell.origin + Point::new(9, 11));
        assert_eq!(ctl.tiles().len(), 3);
    }

    #[test]
    fn snap_to_special_moves_to_special() {
        let mut ctl = controller(three_windows());
        let target = ctl.grid().special_cell().center();
        drag(&mut ctl, "0x1", target);
        let snapshot = ctl.client().compositor().snapshot();
        assert_eq!(snapshot[0].workspace, Some(WorkspaceId::Special));
        assert_eq!(ctl.tile("0x1").unwrap().workspace(), WorkspaceId::Special);
    }

    #[test]
    fn raised_tile_is_drawn_last() {
        let mut ctl = controller(three_windows());
        let start = ctl.tile("0x1").unwrap().center();
        ctl.press("0x1", MouseButton::Primary, start);
        assert_eq!(ctl.tiles().last().unwrap().address(), "0x1");
    }

    #[test]
    fn menu_move_then_refresh() {
        let mut ctl = controller(three_windows());
        let start = ctl.tile("0x2").unwrap().center();
        let menu = match ctl.press("0x2", MouseButton::Secondary, start) {
            OverlayResponse::ShowMenu(menu) => menu,
            other => panic!("expected menu, got {:?}", other),
        };
        let entry = menu
            .move_targets
            .iter()
            .find(|e| e.label == "Workspace 10")
            .unwrap();
        assert_eq!(ctl.select("0x2", entry.action), OverlayResponse::Rebuild);
        assert_eq!(
            ctl.tile("0x2").unwrap().workspace(),
            WorkspaceId::Regular(10)
        );
    }

    #[test]
    fn menu_focus_switches_workspace() {
        let mut ctl = controller(three_windows());
        assert_eq!(
            ctl.select("0x3", MenuAction::FocusWorkspace(3)),
            OverlayResponse::Rebuild
        );
        assert_eq!(ctl.client().compositor().active_workspace(), 3);
    }

    #[test]
    fn kill_clears_tiles_then_delayed_refresh_drops_window() {
        let mut ctl = controller(three_windows());
        let start = ctl.tile("0x2").unwrap().center();
        let response = ctl.press("0x2", MouseButton::Tertiary, start);
        assert_eq!(
            response,
            OverlayResponse::RefreshAfter(Duration::from_millis(20))
        );
        assert!(ctl.tiles().is_empty(), "tiles are cleared immediately");

        ctl.refresh();
        assert_eq!(ctl.tiles().len(), 2);
        assert!(ctl.tile("0x2").is_none());
    }

    #[test]
    fn menu_close_behaves_like_middle_click() {
        let mut ctl = controller(three_windows());
        let response = ctl.select("0x1", MenuAction::Close);
        assert!(matches!(response, OverlayResponse::RefreshAfter(_)));
        assert!(ctl.tiles().is_empty());
    }

    #[test]
    fn tile_count_after_each_action() {
        let compositor = three_windows()
            .with_client(client("0x9", "Hyprland-Overview", 2, (0, 0)))
            .with_client(client("0xa", "far away", 42, (0, 0)));
        let mut ctl = controller(compositor);
        // 5 clients - own window - one without a cell.
        assert_eq!(ctl.tiles().len(), 3);

        let target = ctl.grid().cell_for_workspace(WorkspaceId::Regular(5)).unwrap().center();
        drag(&mut ctl, "0x1", target);
        assert_eq!(ctl.tiles().len(), 3);

        ctl.select("0x2", MenuAction::MoveTo(WorkspaceId::Regular(9)));
        assert_eq!(ctl.tiles().len(), 3);

        ctl.select("0x3", MenuAction::Close);
        ctl.refresh();
        assert_eq!(ctl.tiles().len(), 2);
    }

    #[test]
    fn events_for_unknown_tiles_do_nothing() {
        let mut ctl = controller(three_windows());
        assert_eq!(
            ctl.press("0xdead", MouseButton::Primary, Point::new(0, 0)),
            OverlayResponse::Nothing
        );
        assert_eq!(ctl.motion("0xdead", Point::new(0, 0)), OverlayResponse::Nothing);
        assert_eq!(ctl.tiles().len(), 3);
    }

    #[test]
    fn occupancy_and_captions() {
        let ctl = controller(three_windows());
        assert!(ctl.is_occupied(WorkspaceId::Regular(1)));
        assert!(!ctl.is_occupied(WorkspaceId::Regular(2)));
        let special = *ctl.grid().special_cell();
        assert_eq!(ctl.cell_caption(&special), "Special");
        let ws3 = *ctl.grid().cell_for_workspace(WorkspaceId::Regular(3)).unwrap();
        assert_eq!(ctl.cell_caption(&ws3), "3");
        let ws4 = *ctl.grid().cell_for_workspace(WorkspaceId::Regular(4)).unwrap();
        assert_eq!(ctl.cell_caption(&ws4), "Workspace 4");
    }

    #[test]
    fn delayed_refresh_is_a_noop_once_closed() {
        let ctl = Rc::new(RefCell::new(controller(three_windows())));
        let weak = Rc::downgrade(&ctl);
        ctl.borrow_mut().clear_tiles();
        assert!(refresh_if_alive(&weak));
        assert_eq!(ctl.borrow().tiles().len(), 3);
        drop(ctl);
        assert!(!refresh_if_alive(&weak));
    }

    #[test]
    fn tile_at_picks_the_topmost_tile() {
        // 0x4 overlaps 0x1 inside the ws 1 cell at (40, 40).
        let compositor = three_windows().with_client(client("0x4", "htop", 1, (100, 100)));
        let mut ctl = controller(compositor);
        let overlap = Point::new(60, 60);
        assert_eq!(ctl.tile_at(overlap).unwrap().address(), "0x4");

        ctl.press("0x1", MouseButton::Primary, overlap);
        assert_eq!(ctl.tile_at(overlap).unwrap().address(), "0x1");
        assert!(ctl.tile_at(Point::new(5, 5)).is_none());
    }

    #[test]
    fn drag_driven_by_overlay_points_follows_pointer() {
        let mut ctl = controller(three_windows());
        let press = Point::new(50, 50);
        let address = ctl.tile_at(press).unwrap().address().to_string();
        assert_eq!(address, "0x1");
        let origin = ctl.tile(&address).unwrap().origin();

        ctl.press(&address, MouseButton::Primary, press);
        for dx in [50, 100, 250] {
            let point = press + Point::new(dx, 0);
            assert_eq!(ctl.motion(&address, point), OverlayResponse::Reposition);
            assert_eq!(ctl.tile(&address).unwrap().origin(), origin + Point::new(dx, 0));
        }

        // Grab offset (10, 10), tile 75x67: the center lands at (500, 100),
        // the middle of the ws 3 cell.
        let drop = Point::new(473, 77);
        assert_eq!(
            ctl.release(&address, MouseButton::Primary, drop),
            OverlayResponse::Rebuild
        );
        let snapshot = ctl.client().compositor().snapshot();
        let moved = snapshot.iter().find(|c| c.address == "0x1").unwrap();
        assert_eq!(moved.workspace, Some(WorkspaceId::Regular(3)));
    }
}
