//! Combat system - gather-then-apply melee resolution.
//!
//! Attacks are collected into a result buffer first and applied after, so
//! the outcome of a tick never depends on entity iteration order. Damage
//! is flat per hit; an attack is legal whenever a hostile stands inside
//! attack range and the attacker's cooldown has elapsed.

use crate::components::*;
use crate::spatial::SpatialGrid;
use bevy_ecs::prelude::*;

/// Buffered hits for one tick.
struct Hit {
    target: Entity,
    damage: f32,
}

/// System that resolves melee attacks between hostile ants.
///
/// Every combat-capable ant auto-attacks the nearest hostile inside its
/// attack range, the player included; queens defend their chamber the
/// same way. Only the attacker's cooldown resets on a landed hit.
pub fn combat_system(
    grid: Res<SpatialGrid>,
    mut ants: Query<(
        Entity,
        &Position,
        &ColonyId,
        &AntStats,
        &mut Health,
        &mut AntTimers,
    )>,
) {
    let mut hits: Vec<Hit> = Vec::new();

    // Gather phase: pick targets and arm cooldowns.
    for (_, pos, colony, stats, health, mut timers) in ants.iter_mut() {
        if !health.is_alive() || timers.attack > 0.0 {
            continue;
        }
        if let Some(target) = grid.nearest_hostile(pos.x, pos.y, stats.attack_range, colony.0) {
            hits.push(Hit {
                target: target.entity,
                damage: stats.attack_damage,
            });
            timers.attack = stats.attack_cooldown;
        }
    }

    // Apply phase: order-independent damage.
    for hit in hits {
        if let Ok((_, _, _, _, mut health, _)) = ants.get_mut(hit.target) {
            health.damage(hit.damage);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::spatial::spatial_grid_update_system;

    fn combat_world() -> World {
        let mut world = World::new();
        world.insert_resource(SpatialGrid::default());
        world
    }

    fn fighter(world: &mut World, colony: u32, x: f32, role: AntRole) -> Entity {
        let config = SimConfig::default();
        world
            .spawn(AntBundle::new(
                AntId(colony),
                role,
                ColonyId(colony),
                x,
                5.0,
                config.max_health(role),
                config.stats_for(role),
            ))
            .id()
    }

    fn schedule() -> Schedule {
        let mut schedule = Schedule::default();
        schedule.add_systems((spatial_grid_update_system, combat_system).chain());
        schedule
    }

    #[test]
    fn test_both_sides_land_exactly_one_hit() {
        let mut world = combat_world();
        let worker = fighter(&mut world, 0, 5.0, AntRole::Worker);
        let enemy = fighter(&mut world, 1, 5.8, AntRole::EnemyWorker);
        let config = SimConfig::default();

        schedule().run(&mut world);

        // Fresh timers mean both strike once on the same tick.
        let worker_hp = world.get::<Health>(worker).unwrap().current;
        let enemy_hp = world.get::<Health>(enemy).unwrap().current;
        assert_eq!(
            worker_hp,
            config.max_health(AntRole::Worker) - config.attack_damage_enemy
        );
        assert_eq!(
            enemy_hp,
            config.max_health(AntRole::EnemyWorker) - config.attack_damage_worker
        );
    }

    #[test]
    fn test_no_second_hit_inside_cooldown() {
        let mut world = combat_world();
        let worker = fighter(&mut world, 0, 5.0, AntRole::Worker);
        let enemy = fighter(&mut world, 1, 5.8, AntRole::EnemyWorker);

        let mut sched = schedule();
        sched.run(&mut world);
        let hp_after_first = world.get::<Health>(worker).unwrap().current;

        // Timers were not ticked, so the cooldown still blocks both.
        sched.run(&mut world);
        assert_eq!(world.get::<Health>(worker).unwrap().current, hp_after_first);
        assert!(world.get::<Health>(enemy).unwrap().is_alive());
    }

    #[test]
    fn test_out_of_range_hostile_is_ignored() {
        let mut world = combat_world();
        let worker = fighter(&mut world, 0, 5.0, AntRole::Worker);
        let enemy = fighter(&mut world, 1, 9.0, AntRole::EnemyWorker);

        schedule().run(&mut world);

        let config = SimConfig::default();
        assert_eq!(
            world.get::<Health>(worker).unwrap().current,
            config.max_health(AntRole::Worker)
        );
        assert_eq!(
            world.get::<Health>(enemy).unwrap().current,
            config.max_health(AntRole::EnemyWorker)
        );
    }

    #[test]
    fn test_same_colony_never_fights() {
        let mut world = combat_world();
        let a = fighter(&mut world, 0, 5.0, AntRole::Worker);
        let b = fighter(&mut world, 0, 5.5, AntRole::Worker);

        schedule().run(&mut world);

        let config = SimConfig::default();
        assert_eq!(
            world.get::<Health>(a).unwrap().current,
            config.max_health(AntRole::Worker)
        );
        assert_eq!(
            world.get::<Health>(b).unwrap().current,
            config.max_health(AntRole::Worker)
        );
    }
}
