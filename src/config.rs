//! Application configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/hyprview/config.json`.
//! Every field is optional; a missing file, or a minimal `{}`, gives the
//! compiled-in defaults.
//!
//! # Example
//!
//! ```json
//! {
//!   "grid": {
//!     "columns": 4,
//!     "rows": 3,
//!     "cell_width": 200,
//!     "cell_height": 112
//!   },
//!   "overlay": {
//!     "width": 1100,
//!     "height": 620,
//!     "kill_refresh_delay_ms": 40
//!   }
//! }
//! ```

use crate::grid::GridSpec;
use crate::model::Size;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Grid geometry.
    #[serde(default)]
    pub grid: GridConfig,

    /// Overlay window and behaviour settings.
    #[serde(default)]
    pub overlay: OverlayConfig,
}

/// Grid geometry, in overlay pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub columns: usize,
    pub rows: usize,
    pub cell_width: i32,
    pub cell_height: i32,
    /// Gap between columns.
    pub h_spacing: i32,
    /// Gap between rows.
    pub v_spacing: i32,
    /// Distance from the top of the overlay to the first row.
    pub margin_top: i32,
    /// Gap between the last row and the special workspace cell.
    pub special_gap: i32,
    /// Smallest tile drawn, so tiny windows stay draggable.
    pub min_tile_width: i32,
    pub min_tile_height: i32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 5,
            rows: 2,
            cell_width: 180,
            cell_height: 120,
            h_spacing: 5,
            v_spacing: 5,
            margin_top: 40,
            special_gap: 20,
            min_tile_width: 40,
            min_tile_height: 30,
        }
    }
}

impl GridConfig {
    pub fn spec(&self) -> GridSpec {
        GridSpec {
            columns: self.columns,
            rows: self.rows,
            cell_size: Size::new(self.cell_width, self.cell_height),
            spacing: Size::new(self.h_spacing, self.v_spacing),
            margin_top: self.margin_top,
            special_gap: self.special_gap,
        }
    }

    pub fn min_tile_size(&self) -> Size {
        Size::new(self.min_tile_width, self.min_tile_height)
    }
}

/// Overlay window and behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Overlay width in pixels.
    pub width: i32,
    /// Overlay height in pixels.
    pub height: i32,
    /// Index of the monitor whose geometry tiles are scaled from.
    pub monitor: usize,
    /// Window title of the overlay.  Clients with this title are never
    /// drawn as tiles.
    pub title: String,
    /// Delay between killing a window and re-querying clients (ms).
    pub kill_refresh_delay_ms: u64,
    /// Tile labels longer than this many characters are word-wrapped.
    pub title_wrap: usize,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 500,
            monitor: 0,
            title: "Hyprland-Overview".into(),
            kill_refresh_delay_ms: 20,
            title_wrap: 20,
        }
    }
}

impl OverlayConfig {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn kill_refresh_delay(&self) -> Duration {
        Duration::from_millis(self.kill_refresh_delay_ms)
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_config() {
        let json = r#"{
            "grid": {
                "columns": 4,
                "rows": 3,
                "cell_width": 200,
                "cell_height": 112,
                "h_spacing": 8,
                "v_spacing": 6,
                "margin_top": 30,
                "special_gap": 24,
                "min_tile_width": 32,
                "min_tile_height": 24
            },
            "overlay": {
                "width": 1100,
                "height": 620,
                "monitor": 1,
                "title": "overview",
                "kill_refresh_delay_ms": 40,
                "title_wrap": 16
            }
        }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        let spec = cfg.grid.spec();
        assert_eq!(spec.columns, 4);
        assert_eq!(spec.rows, 3);
        assert_eq!(spec.cell_size, Size::new(200, 112));
        assert_eq!(spec.spacing, Size::new(8, 6));
        assert_eq!(spec.margin_top, 30);
        assert_eq!(spec.special_gap, 24);
        assert_eq!(cfg.grid.min_tile_size(), Size::new(32, 24));
        assert_eq!(cfg.overlay.size(), Size::new(1100, 620));
        assert_eq!(cfg.overlay.monitor, 1);
        assert_eq!(cfg.overlay.title, "overview");
        assert_eq!(cfg.overlay.kill_refresh_delay(), Duration::from_millis(40));
        assert_eq!(cfg.overlay.title_wrap, 16);
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.grid.spec(), GridSpec::default());
        assert_eq!(cfg.grid.min_tile_size(), Size::new(40, 30));
        let od = OverlayConfig::default();
        assert_eq!(cfg.overlay.size(), od.size());
        assert_eq!(cfg.overlay.title, "Hyprland-Overview");
        assert_eq!(cfg.overlay.kill_refresh_delay(), Duration::from_millis(20));
    }

    #[test]
    fn deserialize_partial_grid() {
        let json = r#"{ "grid": { "columns": 3 } }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.grid.columns, 3);
        assert_eq!(cfg.grid.rows, GridConfig::default().rows);
    }

    #[test]
    fn unknown_top_level_keys_ignored() {
        let json = r#"{ "grid": {}, "future_section": { "key": 42 } }"#;
        let _cfg: Config = serde_json::from_str(json).unwrap();
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = std::env::temp_dir().join("hyprview-definitely-missing.json");
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn load_reads_a_written_file() {
        let dir = std::env::temp_dir().join(format!("hyprview-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");

        let mut written = Config::default();
        written.grid.columns = 3;
        written.overlay.title = "overview".into();
        written.overlay.kill_refresh_delay_ms = 50;
        std::fs::write(&path, serde_json::to_string_pretty(&written).unwrap()).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.grid.spec(), written.grid.spec());
        assert_eq!(loaded.overlay.title, "overview");
        assert_eq!(loaded.overlay.kill_refresh_delay(), Duration::from_millis(50));

        std::fs::write(&path, "{ not json").unwrap();
        assert!(Config::load(&path).is_err());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
