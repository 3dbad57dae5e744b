//! Umbrella crate for Fleetview.
//!
//! This crate is intentionally small: it re-exports the engine and protocol crates
//! so downstream code can depend on a single crate name (`fleetview`).

pub use fleetview_engine as engine;
pub use fleetview_protocol as protocol;
