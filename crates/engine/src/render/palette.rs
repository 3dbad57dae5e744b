//! Colour and glyph lookups keyed by the protocol enums.

use fleetview_protocol::{AgentClass, AgentStatus, AreaType};
use serde::{Deserialize, Serialize};

/// Straight (non-premultiplied) RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(r, g, b, 255)
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self(self.0, self.1, self.2, a)
    }

    /// Scales the alpha channel by `factor` in `[0, 1]`.
    pub fn faded(self, factor: f64) -> Self {
        let a = (self.3 as f64 * factor.clamp(0.0, 1.0)).round() as u8;
        self.with_alpha(a)
    }
}

pub const BACKDROP: Rgba = Rgba::rgb(5, 9, 19);
pub const GRID_MINOR: Rgba = Rgba(127, 203, 255, 24);
pub const GRID_MAJOR: Rgba = Rgba(127, 203, 255, 60);
pub const AXIS: Rgba = Rgba(111, 248, 255, 150);
pub const TEXT: Rgba = Rgba(230, 251, 255, 230);
pub const TEXT_MUTED: Rgba = Rgba(138, 163, 190, 220);
pub const LABEL_PLATE: Rgba = Rgba(8, 20, 39, 200);
pub const MARKER_EDGE: Rgba = Rgba(2, 6, 14, 230);
pub const HALO_SELECTED: Rgba = Rgba(255, 208, 107, 110);
pub const HALO_HOVER: Rgba = Rgba(230, 251, 255, 80);
pub const PATH_ORPHAN: Rgba = Rgba(138, 163, 190, 200);
pub const PLAYHEAD: Rgba = Rgba(255, 208, 107, 230);

pub fn status_color(status: AgentStatus) -> Rgba {
    match status {
        AgentStatus::Fighting => Rgba::rgb(255, 113, 152),
        AgentStatus::Farming => Rgba::rgb(77, 245, 191),
        AgentStatus::Banking => Rgba::rgb(255, 208, 107),
        AgentStatus::Idle => Rgba::rgb(104, 199, 255),
        AgentStatus::Moving => Rgba::rgb(111, 248, 255),
        AgentStatus::Offline => Rgba::rgb(90, 102, 120),
    }
}

pub fn class_glyph(class: AgentClass) -> &'static str {
    match class {
        AgentClass::Warrior => "⚔",
        AgentClass::Mage => "✦",
        AgentClass::Ranger => "➶",
        AgentClass::Rogue => "†",
        AgentClass::Cleric => "✚",
        AgentClass::Gatherer => "⛏",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaStyle {
    pub fill: Rgba,
    pub border: Rgba,
    pub text: Rgba,
}

pub fn area_style(kind: AreaType, hovered: bool) -> AreaStyle {
    let base = match kind {
        AreaType::City => Rgba::rgb(104, 199, 255),
        AreaType::Dungeon => Rgba::rgb(255, 113, 152),
        AreaType::Zone => Rgba::rgb(77, 245, 191),
        AreaType::Bank => Rgba::rgb(255, 208, 107),
    };
    if hovered {
        AreaStyle {
            fill: base.with_alpha(80),
            border: base.with_alpha(240),
            text: TEXT,
        }
    } else {
        AreaStyle {
            fill: base.with_alpha(36),
            border: base.with_alpha(150),
            text: TEXT_MUTED,
        }
    }
}
