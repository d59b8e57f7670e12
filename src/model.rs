//! Data types shared by every hyprview component.
//!
//! Everything here is a plain snapshot: values are produced by a
//! [`Compositor`](crate::traits::Compositor) query and replaced wholesale on
//! the next query, never mutated in place.

use std::fmt;
use std::ops::{Add, Sub};

/// Raw workspace id Hyprland reports for the special workspace.
pub const SPECIAL_WORKSPACE_ID: i32 = -99;

/// Token Hyprland's dispatchers accept in place of the special workspace id.
pub const SPECIAL_WORKSPACE_TOKEN: &str = "special";

/// A point in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan (taxicab) distance to `other`.
    pub fn manhattan_distance(self, other: Point) -> i64 {
        (self.x as i64 - other.x as i64).abs() + (self.y as i64 - other.y as i64).abs()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Identifies a workspace the overlay can display.
///
/// Hyprland numbers regular workspaces with positive integers and reports
/// the special workspace as [`SPECIAL_WORKSPACE_ID`].  Dispatchers, however,
/// expect the literal token `special` for it, so the sentinel never leaves
/// this type in raw form: use [`dispatch_token`](Self::dispatch_token).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkspaceId {
    Regular(i32),
    Special,
}

impl WorkspaceId {
    /// Interpret a raw id as reported in Hyprland's JSON.
    pub fn from_raw(id: i32) -> Self {
        if id == SPECIAL_WORKSPACE_ID {
            WorkspaceId::Special
        } else {
            WorkspaceId::Regular(id)
        }
    }

    /// The raw id, with the special workspace mapped back to its sentinel.
    pub fn raw(self) -> i32 {
        match self {
            WorkspaceId::Regular(id) => id,
            WorkspaceId::Special => SPECIAL_WORKSPACE_ID,
        }
    }

    /// The argument a dispatcher expects for this workspace.
    pub fn dispatch_token(self) -> String {
        match self {
            WorkspaceId::Regular(id) => id.to_string(),
            WorkspaceId::Special => SPECIAL_WORKSPACE_TOKEN.to_string(),
        }
    }

    pub fn is_special(self) -> bool {
        matches!(self, WorkspaceId::Special)
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkspaceId::Regular(id) => write!(f, "Workspace {}", id),
            WorkspaceId::Special => write!(f, "Special"),
        }
    }
}

/// Geometry of one monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monitor {
    /// Name Hyprland uses for this output (e.g. `"DP-1"`).
    pub name: String,
    pub width: i32,
    pub height: i32,
}

impl Monitor {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// A workspace as reported by the compositor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: String,
}

/// A single compositor window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    /// Opaque, stable identifier (e.g. `"0x55d0c3a8e2f0"`).
    pub address: String,
    pub title: String,
    /// `None` when the compositor did not report a workspace for the window.
    pub workspace: Option<WorkspaceId>,
    /// Top-left corner in monitor pixels.
    pub at: Point,
    pub size: Size,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_sentinel_round_trips_through_raw() {
        assert_eq!(WorkspaceId::from_raw(-99), WorkspaceId::Special);
        assert_eq!(WorkspaceId::Special.raw(), -99);
        assert_eq!(WorkspaceId::from_raw(4), WorkspaceId::Regular(4));
    }

    #[test]
    fn other_negative_ids_are_not_special() {
        // Named special workspaces get other negative ids.
        assert_eq!(WorkspaceId::from_raw(-98), WorkspaceId::Regular(-98));
    }

    #[test]
    fn dispatch_token_never_leaks_sentinel() {
        assert_eq!(WorkspaceId::Special.dispatch_token(), "special");
        assert_eq!(WorkspaceId::Regular(7).dispatch_token(), "7");
    }

    #[test]
    fn display_labels() {
        assert_eq!(WorkspaceId::Regular(3).to_string(), "Workspace 3");
        assert_eq!(WorkspaceId::Special.to_string(), "Special");
    }

    #[test]
    fn manhattan_distance_is_symmetric() {
        let a = Point::new(10, -4);
        let b = Point::new(-2, 6);
        assert_eq!(a.manhattan_distance(b), 22);
        assert_eq!(b.manhattan_distance(a), 22);
    }

    #[test]
    fn point_arithmetic() {
        assert_eq!(Point::new(5, 7) - Point::new(2, 3), Point::new(3, 4));
        assert_eq!(Point::new(5, 7) + Point::new(2, 3), Point::new(7, 10));
    }
}
