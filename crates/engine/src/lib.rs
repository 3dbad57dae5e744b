//! Map viewport core for Fleetview.
//!
//! The world snapshot ([`world`]) is replaced wholesale by an external feed. The
//! [`viewport`] maps it to the screen, [`input`] turns pointer events into pan,
//! zoom, hover and selection, [`playback`] replays the movement timeline, and
//! [`render`] draws a frame. [`MapSession`] ties them together for hosts.

pub mod config;
pub mod error;
pub mod input;
pub mod playback;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod viewport;
pub mod world;

#[cfg(test)]
mod testutil;
#[cfg(test)]
mod tests;

pub use config::{EndOfPlayback, MapConfig, ZoomAnchor};
pub use error::{EngineError, Result};
pub use input::{hit_test_agent, hit_test_area, HoverState, InputOutcome, InputRouter};
pub use playback::PlaybackController;
pub use render::{render, Background, DisplayList, DrawCmd, Frame, ImageBounds, Layer};
pub use scheduler::RedrawScheduler;
pub use session::MapSession;
pub use viewport::{Viewport, WorldRect};
pub use world::WorldModel;
