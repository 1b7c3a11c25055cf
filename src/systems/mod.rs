//! ECS systems for the colony simulation.
//!
//! Systems contain the game logic that operates on components. The
//! schedule (built in `api.rs`) runs them as one fixed-order chain per
//! tick, so mutations are immediately visible to later systems in the
//! same tick:
//!
//! 1. `spatial_grid_update_system` - rebuilds the hostile-lookup grid
//! 2. `timer_tick_system` - advances per-ant countdowns
//! 3. `player_input_system` - applies the tick's input direction
//! 4. `behavior_system` - wander / seek / carry state machine
//! 5. `queen_spawn_system` - spawn-timer economics
//! 6. `movement_system` - velocity integration with dig-on-block
//! 7. `combat_system` - gather and apply attacks
//! 8. `lifecycle_system` - death drops, despawns, terminal conditions

pub mod behavior;
pub mod combat;
pub mod lifecycle;
pub mod movement;
pub mod spawn;

pub use behavior::*;
pub use combat::*;
pub use lifecycle::*;
pub use movement::*;
pub use spawn::*;
