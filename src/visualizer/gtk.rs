//! GTK4 + layer-shell renderer that runs on the **main thread**.
//!
//! # Widget tree
//!
//! ```text
//! window                      (layer-shell, transparent)
//! └ .overview               (GtkFixed, absolute positioning)
//!     ├ .grid-cell          (one per regular workspace)
//!     ├ .special-cell       (special workspace)
//!     ├ .window-tile        (one per window, drawn above the cells)
//!     └ .tile-menu          (popover, while a context menu is open)
//! ```
//!
//! # CSS selectors
//!
//! | Selector               | Targets                                  |
//! |------------------------|------------------------------------------|
//! | `window`               | The overlay window (keep transparent)    |
//! | `.overview`            | Container for cells and tiles            |
//! | `.grid-cell`           | Regular workspace cell                   |
//! | `.special-cell`        | Special workspace cell                   |
//! | `.occupied`            | Added to cells holding at least one tile |
//! | `.window-tile`         | A window                                 |
//! | `.tile-menu`           | Context menu popover                     |
//! | `.menu-header`         | "Move to Workspace" caption in the menu  |
//!
//! All state lives in the [`OverlayController`]; this module only forwards
//! pointer events to it and redraws according to the [`OverlayResponse`].

use crate::config::OverlayConfig;
use crate::model::{Point, WorkspaceId};
use crate::overlay::{refresh_if_alive, OverlayController, OverlayResponse};
use crate::tile::{ContextMenu, MenuEntry, MouseButton};
use crate::traits::Compositor;
use gtk4::prelude::*;
use gtk4::{gdk, glib};
use gtk4_layer_shell::LayerShell;
use log::{debug, info, warn};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::{Rc, Weak};

//  Default CSS

const DEFAULT_CSS: &str = r#"
window,
window.background {
    background-color: transparent;
    background: none;
}

.overview {
    background-color: rgba(0, 0, 0, 0.75);
    border-radius: 16px;
}

.grid-cell,
.special-cell {
    background-color: rgba(255, 255, 255, 0.08);
    border-radius: 8px;
    color: rgba(255, 255, 255, 0.35);
    font-size: 11px;
}

.special-cell {
    border: 1px dashed rgba(255, 255, 255, 0.25);
}

.grid-cell.occupied,
.special-cell.occupied {
    background-color: rgba(255, 255, 255, 0.16);
}

.window-tile {
    background-color: rgba(92, 148, 230, 0.85);
    border: 1px solid rgba(255, 255, 255, 0.6);
    border-radius: 4px;
    color: white;
    font-size: 9px;
}

.menu-header {
    font-weight: bold;
    margin: 4px 6px 2px 6px;
}
"#;

type Shared<C> = Rc<RefCell<OverlayController<C>>>;

/// Widgets owned by the overlay window.
struct View {
    fixed: gtk4::Fixed,
    cells: Vec<(WorkspaceId, gtk4::Label)>,
    /// `(address, widget)` for every tile currently drawn.
    tiles: RefCell<Vec<(String, gtk4::Label)>>,
}

impl View {
    fn tile_widget(&self, address: &str) -> Option<gtk4::Label> {
        self.tiles
            .borrow()
            .iter()
            .find(|(a, _)| a == address)
            .map(|(_, w)| w.clone())
    }
}

/// Weak handles captured by signal closures.
///
/// Closures never keep the view or the controller alive: once the main loop
/// returns and [`run_main_loop`] drops its strong references, late signals
/// and timers find nothing to act on.
struct Handles<C: Compositor> {
    view: Weak<View>,
    controller: Weak<RefCell<OverlayController<C>>>,
}

impl<C: Compositor> Clone for Handles<C> {
    fn clone(&self) -> Self {
        Self {
            view: self.view.clone(),
            controller: self.controller.clone(),
        }
    }
}

impl<C: Compositor> Handles<C> {
    fn upgrade(&self) -> Option<(Rc<View>, Shared<C>)> {
        Some((self.view.upgrade()?, self.controller.upgrade()?))
    }
}

//  Public API

/// Show the overlay for `controller` and run the GLib main loop on the
/// **current** (main) thread until the user presses Escape.
pub fn run_main_loop<C: Compositor + 'static>(
    controller: OverlayController<C>,
    css_path: Option<PathBuf>,
    config: &OverlayConfig,
) {
    gtk4::init().expect("failed to initialise GTK4");
    info!("GTK4 initialised on main thread");

    load_css(&css_path);

    //  Layer-shell overlay window
    let window = gtk4::Window::new();
    window.init_layer_shell();
    window.set_layer(gtk4_layer_shell::Layer::Overlay);
    window.set_namespace("hyprview");
    window.set_keyboard_mode(gtk4_layer_shell::KeyboardMode::Exclusive);
    window.set_title(Some(config.title.as_str()));
    window.set_decorated(false);
    window.set_default_size(config.width, config.height);
    window.remove_css_class("background");

    let fixed = gtk4::Fixed::new();
    fixed.add_css_class("overview");
    fixed.set_size_request(config.width, config.height);
    window.set_child(Some(&fixed));

    //  Grid cells (built once)
    let mut cells = Vec::new();
    for cell in controller.grid().cells() {
        let label = gtk4::Label::new(Some(controller.cell_caption(cell).as_str()));
        label.add_css_class(if cell.workspace.is_special() {
            "special-cell"
        } else {
            "grid-cell"
        });
        label.set_size_request(cell.size.width, cell.size.height);
        label.set_can_target(false);
        fixed.put(&label, cell.origin.x as f64, cell.origin.y as f64);
        cells.push((cell.workspace, label));
    }

    let view = Rc::new(View {
        fixed,
        cells,
        tiles: RefCell::new(Vec::new()),
    });
    let controller: Shared<C> = Rc::new(RefCell::new(controller));
    let handles = Handles {
        view: Rc::downgrade(&view),
        controller: Rc::downgrade(&controller),
    };
    rebuild_tiles(&view, &controller);
    attach_pointer(&view.fixed, &handles);

    //  Escape closes the overlay
    let main_loop = glib::MainLoop::new(None, false);
    let keys = gtk4::EventControllerKey::new();
    {
        let main_loop = main_loop.clone();
        keys.connect_key_pressed(move |_, key, _, _| {
            if key == gdk::Key::Escape {
                info!("escape pressed, closing overlay");
                main_loop.quit();
                glib::Propagation::Stop
            } else {
                glib::Propagation::Proceed
            }
        });
    }
    window.add_controller(keys);
    {
        let main_loop = main_loop.clone();
        window.connect_close_request(move |_| {
            main_loop.quit();
            glib::Propagation::Proceed
        });
    }

    window.present();
    info!(
        "overlay shown: {}x{}, {} tiles",
        config.width,
        config.height,
        controller.borrow().tiles().len()
    );

    info!("entering GLib main loop");
    main_loop.run();
    info!("GLib main loop exited");

    window.destroy();
    drop(view);
    drop(controller);
}

//  Tile widgets

/// Replace every tile widget with fresh ones built from the controller.
fn rebuild_tiles<C: Compositor>(view: &View, controller: &Shared<C>) {
    for (_, widget) in view.tiles.borrow_mut().drain(..) {
        view.fixed.remove(&widget);
    }

    let ctl = controller.borrow();
    let mut tiles = Vec::with_capacity(ctl.tiles().len());
    for tile in ctl.tiles() {
        let label = gtk4::Label::new(Some(tile.label()));
        label.add_css_class("window-tile");
        label.set_wrap(true);
        label.set_justify(gtk4::Justification::Center);
        label.set_ellipsize(gtk4::pango::EllipsizeMode::End);
        label.set_tooltip_text(Some(tile.title()));
        label.set_size_request(tile.size().width, tile.size().height);
        view.fixed.put(&label, tile.origin().x as f64, tile.origin().y as f64);
        tiles.push((tile.address().to_string(), label));
    }

    for (workspace, cell) in &view.cells {
        if ctl.is_occupied(*workspace) {
            cell.add_css_class("occupied");
        } else {
            cell.remove_css_class("occupied");
        }
    }

    debug!("drew {} tiles", tiles.len());
    *view.tiles.borrow_mut() = tiles;
}

/// Rebuild from an idle callback, so a widget is never removed from inside
/// one of its own signal handlers.
fn schedule_rebuild<C: Compositor + 'static>(handles: &Handles<C>) {
    let handles = handles.clone();
    glib::idle_add_local_once(move || {
        if let Some((view, controller)) = handles.upgrade() {
            rebuild_tiles(&view, &controller);
        }
    });
}

//  Pointer input

/// The tile held by the current primary-button drag.
struct Grab {
    address: String,
    /// Press point in overlay coordinates.
    start: Point,
}

fn overlay_point(x: f64, y: f64) -> Point {
    Point::new(x.round() as i32, y.round() as i32)
}

/// Attach pointer gestures to the overlay container.
///
/// The gestures live on the `GtkFixed`, which never moves, so every
/// coordinate they report is already in overlay space.  Tiles are found by
/// hit-testing the controller, not by which widget was clicked.
fn attach_pointer<C: Compositor + 'static>(fixed: &gtk4::Fixed, handles: &Handles<C>) {
    //  Primary button: drag
    let drag = gtk4::GestureDrag::new();
    drag.set_button(gdk::BUTTON_PRIMARY);
    let grab: Rc<RefCell<Option<Grab>>> = Rc::new(RefCell::new(None));
    {
        let (handles, grab) = (handles.clone(), grab.clone());
        drag.connect_drag_begin(move |_, x, y| {
            let Some((view, controller)) = handles.upgrade() else { return };
            let point = overlay_point(x, y);
            let address = match controller.borrow().tile_at(point) {
                Some(tile) => tile.address().to_string(),
                None => return,
            };
            let response = controller
                .borrow_mut()
                .press(&address, MouseButton::Primary, point);
            handle_response(&view, &controller, &handles, &address, response, point);
            *grab.borrow_mut() = Some(Grab {
                address,
                start: point,
            });
        });
    }
    {
        let (handles, grab) = (handles.clone(), grab.clone());
        drag.connect_drag_update(move |_, dx, dy| {
            let Some((view, controller)) = handles.upgrade() else { return };
            let Some((address, point)) = grab
                .borrow()
                .as_ref()
                .map(|g| (g.address.clone(), g.start + overlay_point(dx, dy)))
            else {
                return;
            };
            let response = controller.borrow_mut().motion(&address, point);
            handle_response(&view, &controller, &handles, &address, response, point);
        });
    }
    {
        let handles = handles.clone();
        drag.connect_drag_end(move |_, dx, dy| {
            let Some(Grab { address, start }) = grab.borrow_mut().take() else { return };
            let Some((view, controller)) = handles.upgrade() else { return };
            let point = start + overlay_point(dx, dy);
            let response = controller
                .borrow_mut()
                .release(&address, MouseButton::Primary, point);
            handle_response(&view, &controller, &handles, &address, response, point);
        });
    }
    fixed.add_controller(drag);

    //  Secondary / tertiary buttons
    let click = gtk4::GestureClick::new();
    click.set_button(0);
    {
        let handles = handles.clone();
        click.connect_pressed(move |gesture, _, x, y| {
            let button = match MouseButton::from_button_number(gesture.current_button()) {
                Some(MouseButton::Primary) | None => return,
                Some(button) => button,
            };
            let Some((view, controller)) = handles.upgrade() else { return };
            let point = overlay_point(x, y);
            let address = match controller.borrow().tile_at(point) {
                Some(tile) => tile.address().to_string(),
                None => return,
            };
            let response = controller.borrow_mut().press(&address, button, point);
            handle_response(&view, &controller, &handles, &address, response, point);
        });
    }
    fixed.add_controller(click);
}

fn handle_response<C: Compositor + 'static>(
    view: &Rc<View>,
    controller: &Shared<C>,
    handles: &Handles<C>,
    address: &str,
    response: OverlayResponse,
    at: Point,
) {
    match response {
        OverlayResponse::Nothing => {}
        OverlayResponse::Raise => {
            if let Some(widget) = view.tile_widget(address) {
                widget.insert_before(&view.fixed, None::<&gtk4::Widget>);
            }
        }
        OverlayResponse::Reposition => {
            let origin = controller.borrow().tile(address).map(|t| t.origin());
            if let (Some(origin), Some(widget)) = (origin, view.tile_widget(address)) {
                view.fixed.move_(&widget, origin.x as f64, origin.y as f64);
            }
        }
        OverlayResponse::Rebuild => schedule_rebuild(handles),
        OverlayResponse::ShowMenu(menu) => show_menu(view, handles, address, &menu, at),
        OverlayResponse::RefreshAfter(delay) => {
            schedule_rebuild(handles);
            let handles = handles.clone();
            glib::timeout_add_local_once(delay, move || {
                if refresh_if_alive(&handles.controller) {
                    schedule_rebuild(&handles);
                }
            });
        }
    }
}

//  Context menu

fn show_menu<C: Compositor + 'static>(
    view: &Rc<View>,
    handles: &Handles<C>,
    address: &str,
    menu: &ContextMenu,
    at: Point,
) {
    let popover = gtk4::Popover::new();
    popover.add_css_class("tile-menu");
    popover.set_has_arrow(false);
    popover.set_parent(&view.fixed);
    popover.set_pointing_to(Some(&gdk::Rectangle::new(at.x, at.y, 1, 1)));

    let list = gtk4::Box::new(gtk4::Orientation::Vertical, 2);
    for entry in &menu.actions {
        list.append(&menu_button(&popover, handles, address, entry));
    }
    list.append(&gtk4::Separator::new(gtk4::Orientation::Horizontal));
    let header = gtk4::Label::new(Some(ContextMenu::MOVE_SUBMENU_LABEL));
    header.add_css_class("menu-header");
    header.set_xalign(0.0);
    list.append(&header);
    for entry in &menu.move_targets {
        list.append(&menu_button(&popover, handles, address, entry));
    }
    popover.set_child(Some(&list));

    popover.connect_closed(|popover| {
        let popover = popover.clone();
        glib::idle_add_local_once(move || popover.unparent());
    });
    popover.popup();
}

fn menu_button<C: Compositor + 'static>(
    popover: &gtk4::Popover,
    handles: &Handles<C>,
    address: &str,
    entry: &MenuEntry,
) -> gtk4::Button {
    let button = gtk4::Button::with_label(&entry.label);
    button.add_css_class("flat");

    let popover = popover.downgrade();
    let handles = handles.clone();
    let address = address.to_string();
    let action = entry.action;
    button.connect_clicked(move |_| {
        if let Some(popover) = popover.upgrade() {
            popover.popdown();
        }
        let Some((view, controller)) = handles.upgrade() else { return };
        let response = controller.borrow_mut().select(&address, action);
        handle_response(&view, &controller, &handles, &address, response, Point::default());
    });
    button
}

//  CSS loading

fn load_css(css_path: &Option<PathBuf>) {
    let provider = gtk4::CssProvider::new();

    let css_content = match css_path.as_ref().filter(|p| p.exists()) {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(content) => {
                info!("user CSS: {} ({} bytes)", p.display(), content.len());
                content
            }
            Err(e) => {
                warn!("CSS read failed ({}): {}, using built-in", p.display(), e);
                DEFAULT_CSS.to_string()
            }
        },
        None => {
            info!("no user CSS, using built-in default");
            DEFAULT_CSS.to_string()
        }
    };

    #[allow(deprecated)]
    provider.load_from_data(&css_content);

    if let Some(display) = gdk::Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
        info!("CSS registered on display");
    } else {
        warn!("no GDK display, CSS will not be applied");
    }
}
