//! Lifecycle system - death drops, despawns, and terminal conditions.
//!
//! Runs last in the tick so every death caused by this tick's combat is
//! swept immediately: carried food drops where the ant died, rosters are
//! updated, and the run outcome flips when the player or their queen is
//! lost.

use crate::colony::{Colonies, PLAYER_COLONY_ID};
use crate::components::*;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Terminal state of the run. `Running` until the player ant dies or the
/// player colony's queen is lost; once set, stepping becomes a no-op.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunOutcome {
    #[default]
    Running,
    PlayerDied,
    QueenLost,
}

impl RunOutcome {
    pub fn is_over(&self) -> bool {
        *self != RunOutcome::Running
    }
}

/// System that sweeps dead ants and depleted food sources.
pub fn lifecycle_system(
    mut commands: Commands,
    mut colonies: ResMut<Colonies>,
    mut outcome: ResMut<RunOutcome>,
    ants: Query<(
        Entity,
        &Position,
        &ColonyId,
        &AntRole,
        &Health,
        &Carrying,
        Option<&PlayerControlled>,
    )>,
    food: Query<(Entity, &FoodAmount), With<FoodSource>>,
) {
    for (entity, pos, colony, role, health, carrying, player) in ants.iter() {
        if health.is_alive() {
            continue;
        }

        // Carried food is not lost; it drops where the ant fell.
        if carrying.0 > 0.0 {
            commands.spawn(FoodBundle::new(pos.x, pos.y, carrying.0));
        }

        if role.is_queen() {
            colonies.remove_queen(colony.0, entity);
            if colony.0 == PLAYER_COLONY_ID && !outcome.is_over() {
                *outcome = RunOutcome::QueenLost;
            }
        } else {
            colonies.remove_worker(colony.0, entity);
        }

        if player.is_some() && !outcome.is_over() {
            *outcome = RunOutcome::PlayerDied;
        }

        commands.entity(entity).despawn();
    }

    for (entity, amount) in food.iter() {
        if amount.is_depleted() {
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    fn lifecycle_world() -> World {
        let mut world = World::new();
        world.insert_resource(Colonies::default());
        world.insert_resource(RunOutcome::default());
        world
    }

    fn schedule() -> Schedule {
        let mut schedule = Schedule::default();
        schedule.add_systems(lifecycle_system);
        schedule
    }

    fn dead_ant(world: &mut World, role: AntRole, colony: u32, carrying: f32) -> Entity {
        let config = SimConfig::default();
        let mut bundle = AntBundle::new(
            AntId(1),
            role,
            ColonyId(colony),
            6.0,
            6.0,
            config.max_health(role),
            config.stats_for(role),
        );
        bundle.health.current = 0.0;
        bundle.carrying = Carrying(carrying);
        world.spawn(bundle).id()
    }

    #[test]
    fn test_dead_worker_drops_food_and_leaves_roster() {
        let mut world = lifecycle_world();
        let ant = dead_ant(&mut world, AntRole::Worker, 0, 7.0);
        world.resource_mut::<Colonies>().insert(0).workers.push(ant);

        schedule().run(&mut world);

        assert!(world.get_entity(ant).is_err());
        assert!(world.resource::<Colonies>().get(0).unwrap().workers.is_empty());

        let mut dropped = world.query_filtered::<(&Position, &FoodAmount), With<FoodSource>>();
        let (pos, amount) = dropped.get_single(&world).unwrap();
        assert_eq!((pos.x, pos.y), (6.0, 6.0));
        assert_eq!(amount.amount, 7.0);
        // A mere worker death never ends the run.
        assert_eq!(*world.resource::<RunOutcome>(), RunOutcome::Running);
    }

    #[test]
    fn test_player_queen_death_ends_the_run() {
        let mut world = lifecycle_world();
        let queen = dead_ant(&mut world, AntRole::Queen, PLAYER_COLONY_ID, 0.0);
        world.resource_mut::<Colonies>().insert(PLAYER_COLONY_ID).queen = Some(queen);

        schedule().run(&mut world);

        assert_eq!(*world.resource::<RunOutcome>(), RunOutcome::QueenLost);
        assert_eq!(
            world
                .resource::<Colonies>()
                .get(PLAYER_COLONY_ID)
                .unwrap()
                .queen,
            None
        );
    }

    #[test]
    fn test_enemy_queen_death_does_not_end_the_run() {
        let mut world = lifecycle_world();
        let queen = dead_ant(&mut world, AntRole::EnemyQueen, 1, 0.0);
        world.resource_mut::<Colonies>().insert(1).queen = Some(queen);

        schedule().run(&mut world);

        assert_eq!(*world.resource::<RunOutcome>(), RunOutcome::Running);
        assert_eq!(world.resource::<Colonies>().get(1).unwrap().queen, None);
    }

    #[test]
    fn test_player_death_sets_outcome() {
        let mut world = lifecycle_world();
        world.resource_mut::<Colonies>().insert(PLAYER_COLONY_ID);
        let config = SimConfig::default();
        let mut bundle = AntBundle::new(
            AntId(0),
            AntRole::Worker,
            ColonyId(PLAYER_COLONY_ID),
            3.0,
            3.0,
            config.player_max_health(),
            config.player_stats(),
        );
        bundle.health.current = 0.0;
        world.spawn((bundle, PlayerControlled));

        schedule().run(&mut world);

        assert_eq!(*world.resource::<RunOutcome>(), RunOutcome::PlayerDied);
    }

    #[test]
    fn test_depleted_food_is_despawned() {
        let mut world = lifecycle_world();
        let mut bundle = FoodBundle::new(4.0, 4.0, 10.0);
        bundle.amount.amount = 0.0;
        let food = world.spawn(bundle).id();
        let full = world.spawn(FoodBundle::new(8.0, 8.0, 10.0)).id();

        schedule().run(&mut world);

        assert!(world.get_entity(food).is_err());
        assert!(world.get_entity(full).is_ok());
    }
}
