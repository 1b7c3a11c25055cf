//! Underground Colony - Simulation Core
//!
//! A fixed-timestep ECS simulation of an underground ant colony: a
//! procedurally carved cave world of destructible dirt tiles, autonomous
//! foraging ants, queens spawning workers from a shared food stockpile,
//! and simple faction combat. Uses `bevy_ecs` for the
//! entity-component-system architecture.
//!
//! Rendering, input capture, and UI are external collaborators: they read
//! the serializable [`Snapshot`]/[`TileSnapshot`] views and feed a
//! normalized direction vector into [`SimWorld::set_input`] once per tick.

pub mod api;
pub mod colony;
pub mod components;
pub mod config;
pub mod path;
pub mod spatial;
pub mod systems;
pub mod tiles;
pub mod world;
pub mod worldgen;

pub use api::{RunOutcome, SimWorld};
pub use colony::{Colonies, Colony};
pub use components::*;
pub use config::SimConfig;
pub use path::find_path;
pub use spatial::{SpatialEntry, SpatialGrid};
pub use systems::*;
pub use tiles::{Tile, TileGrid, TileKind, TileMap, TileSnapshot};
pub use world::Snapshot;
pub use worldgen::{generate, GeneratedWorld};
