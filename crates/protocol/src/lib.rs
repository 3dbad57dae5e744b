use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentClass {
    Warrior,
    Mage,
    Ranger,
    Rogue,
    Cleric,
    Gatherer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Fighting,
    Farming,
    Banking,
    Idle,
    Moving,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaType {
    City,
    Dungeon,
    Zone,
    Bank,
}

/// Integer position on the world grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: i64,
    pub y: i64,
}

impl WorldPoint {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Canvas position in CSS pixels, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub display_name: String,
    pub class: AgentClass,
    pub level: u32,
    pub x: i64,
    pub y: i64,
    pub server_id: String,
    pub status: AgentStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub last_update: OffsetDateTime,
}

impl Agent {
    pub fn position(&self) -> WorldPoint {
        WorldPoint::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementEvent {
    pub agent_id: String,
    pub from: WorldPoint,
    pub to: WorldPoint,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(default)]
    pub activity: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaRect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl AreaRect {
    /// Half-open containment test in world units.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let (x0, y0) = (self.x as f64, self.y as f64);
        x >= x0 && x < x0 + self.width as f64 && y >= y0 && y < y0 + self.height as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapArea {
    pub id: String,
    pub name: String,
    pub rect: AreaRect,
    #[serde(rename = "type")]
    pub area_type: AreaType,
    #[serde(default)]
    pub level_range: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayFlags {
    #[serde(default = "yes")]
    pub show_labels: bool,
    #[serde(default = "yes")]
    pub show_paths: bool,
    #[serde(default = "yes")]
    pub show_areas: bool,
}

fn yes() -> bool {
    true
}

impl Default for DisplayFlags {
    fn default() -> Self {
        Self {
            show_labels: true,
            show_paths: true,
            show_areas: true,
        }
    }
}

/// Canvas size in CSS pixels plus the device pixel ratio of the host surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
    #[serde(default = "unit_ratio")]
    pub dpr: f64,
}

fn unit_ratio() -> f64 {
    1.0
}

impl CanvasSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            dpr: 1.0,
        }
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.width * 0.5, self.height * 0.5)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerEvent {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    Wheel { x: f64, y: f64, delta_y: f64 },
    Click { x: f64, y: f64 },
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackCommand {
    Play,
    Pause,
    Toggle,
    SkipToStart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackPhase {
    Stopped,
    Paused,
    Playing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub zoom: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl ViewportState {
    pub fn zoom_percent(&self) -> u32 {
        (self.zoom * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub index: Option<usize>,
    pub playing: bool,
    pub len: usize,
    pub phase: PlaybackPhase,
}

/// Everything the surrounding UI may read from the map core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub hovered_agent_id: Option<String>,
    pub hovered_area_id: Option<String>,
    pub selected_agent_id: Option<String>,
    pub viewport: ViewportState,
    pub playback: PlaybackState,
    pub flags: DisplayFlags,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Swap {
    #[default]
    Replace,
    Merge,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patch {
    pub target: String,
    #[serde(default)]
    pub swap: Swap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
}

impl Patch {
    pub fn html(target: &str, html: impl Into<String>) -> Self {
        Self {
            target: target.to_string(),
            swap: Swap::Replace,
            html: Some(html.into()),
            payload: None,
            trigger: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiUpdate {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    pub patches: Vec<Patch>,
}

impl UiUpdate {
    pub fn new(event: impl Into<String>, patches: Vec<Patch>) -> Self {
        Self {
            event: event.into(),
            payload: None,
            patches,
        }
    }
}

pub mod targets {
    pub const PANEL_DETAILS: &str = "panel.details";
    pub const PANEL_BOTTOM_BAR: &str = "panel.bottom.bar";
    pub const PANEL_TRANSPORT: &str = "panel.transport";
}
