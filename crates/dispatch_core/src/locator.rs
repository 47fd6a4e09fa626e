//! Driver matching: nearest eligible drivers around a pickup point.
//!
//! Matching always runs against the live World snapshot: candidate lists
//! are never cached or reused across rejections.

use std::collections::HashSet;

use bevy_ecs::prelude::{Entity, World};

use crate::config::MAX_CANDIDATES;
use crate::ecs::{Driver, Position};
use crate::spatial::distance_m_between_cells;

/// Up to [`MAX_CANDIDATES`] eligible drivers within `radius_m` of `origin`,
/// closest first, with their distance in metres. Eligible means available,
/// not banned, subscription active, and outside the exclusion set.
pub fn find_available_drivers(
    world: &mut World,
    origin: h3o::CellIndex,
    radius_m: f64,
    exclude: &HashSet<Entity>,
) -> Vec<(Entity, f64)> {
    let mut query = world.query::<(Entity, &Driver, &Position)>();
    let mut candidates: Vec<(Entity, f64)> = query
        .iter(world)
        .filter(|(entity, driver, _)| driver.is_eligible() && !exclude.contains(entity))
        .map(|(entity, _, position)| (entity, distance_m_between_cells(origin, position.0)))
        .filter(|(_, distance_m)| *distance_m <= radius_m)
        .collect();

    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
    candidates.truncate(MAX_CANDIDATES);
    candidates
}
