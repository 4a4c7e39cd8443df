//! Spatial partitioning for neighbor queries.
//!
//! Units are bucketed by `floor(x / cell_size), floor(y / cell_size)`. A query
//! inspects the 3x3 block of cells around the queried point, so its cost is
//! bounded by local density rather than army size.

use crate::components::{GridCell, Health, Position, Side};
use bevy_ecs::prelude::*;
use std::collections::HashMap;

/// Uniform grid over live units.
#[derive(Resource, Debug)]
pub struct SpatialGrid {
    /// Cell size in pixels.
    pub cell_size: f32,
    cells: HashMap<(i32, i32), Vec<SpatialEntry>>,
    count: usize,
    /// Roster changed since the last rebuild.
    dirty: bool,
}

/// Entry in a spatial cell. Position is captured at rebuild time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialEntry {
    pub entity: Entity,
    pub x: f32,
    pub y: f32,
    pub side: Side,
}

impl SpatialEntry {
    pub fn distance_sq(&self, pos: &Position) -> f32 {
        let dx = self.x - pos.x;
        let dy = self.y - pos.y;
        dx * dx + dy * dy
    }
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(50.0)
    }
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            count: 0,
            dirty: true,
        }
    }

    /// Convert world coordinates to cell coordinates.
    #[inline]
    pub fn cell_key(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.count = 0;
    }

    pub fn insert(&mut self, entity: Entity, x: f32, y: f32, side: Side) {
        let cell = self.cell_key(x, y);
        self.cells
            .entry(cell)
            .or_default()
            .push(SpatialEntry { entity, x, y, side });
        self.count += 1;
    }

    /// Clear and repopulate from scratch.
    pub fn rebuild<I>(&mut self, units: I)
    where
        I: IntoIterator<Item = (Entity, Position, Side)>,
    {
        self.clear();
        for (entity, pos, side) in units {
            self.insert(entity, pos.x, pos.y, side);
        }
        self.dirty = false;
    }

    /// Force a rebuild on the next grid update.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Units in the 3x3 block around `pos`, on the opposing side of `side`
    /// when `want_opposing` is set and on the same side otherwise.
    /// Unordered; callers break ties.
    pub fn query_nearby(&self, pos: &Position, side: Side, want_opposing: bool) -> Vec<SpatialEntry> {
        let (cx, cy) = self.cell_key(pos.x, pos.y);
        let mut results = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(entries) = self.cells.get(&(cx + dx, cy + dy)) {
                    results.extend(
                        entries
                            .iter()
                            .filter(|e| (e.side != side) == want_opposing)
                            .copied(),
                    );
                }
            }
        }
        results
    }

    pub fn cell_count(&self, cell: (i32, i32)) -> usize {
        self.cells.get(&cell).map(|v| v.len()).unwrap_or(0)
    }

    pub fn total_count(&self) -> usize {
        self.count
    }
}

/// System that refreshes the grid when any unit changed cell or the roster changed.
pub fn spatial_grid_update_system(
    mut grid: ResMut<SpatialGrid>,
    mut query: Query<(Entity, &Position, &Side, &Health, &mut GridCell)>,
) {
    let mut moved = false;
    for (_, pos, _, _, mut cell) in query.iter_mut() {
        let key = grid.cell_key(pos.x, pos.y);
        if cell.0 != Some(key) {
            cell.0 = Some(key);
            moved = true;
        }
    }

    if !moved && !grid.is_dirty() {
        return;
    }

    grid.rebuild(
        query
            .iter()
            .filter(|(_, _, _, health, _)| health.is_alive())
            .map(|(entity, pos, side, _, _)| (entity, *pos, *side)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::UnitBundle;

    #[test]
    fn test_query_covers_neighbor_cells_only() {
        let mut grid = SpatialGrid::new(50.0);
        let near = Entity::from_raw(1);
        let diagonal = Entity::from_raw(2);
        let far = Entity::from_raw(3);

        grid.insert(near, 60.0, 60.0, Side::Enemy);
        grid.insert(diagonal, 140.0, 140.0, Side::Enemy);
        grid.insert(far, 160.0, 60.0, Side::Enemy);

        // Query cell (1, 1): neighbors span cells 0..=2
        let found = grid.query_nearby(&Position::new(75.0, 75.0), Side::Ally, true);
        let entities: Vec<_> = found.iter().map(|e| e.entity).collect();
        assert!(entities.contains(&near));
        assert!(entities.contains(&diagonal));
        assert!(!entities.contains(&far));
    }

    #[test]
    fn test_side_filter() {
        let mut grid = SpatialGrid::new(50.0);
        grid.insert(Entity::from_raw(1), 10.0, 10.0, Side::Ally);
        grid.insert(Entity::from_raw(2), 20.0, 10.0, Side::Ally);
        grid.insert(Entity::from_raw(3), 30.0, 10.0, Side::Enemy);

        let origin = Position::new(0.0, 0.0);
        let opposing = grid.query_nearby(&origin, Side::Ally, true);
        assert_eq!(opposing.len(), 1);
        assert_eq!(opposing[0].side, Side::Enemy);

        let friendlies = grid.query_nearby(&origin, Side::Ally, false);
        assert_eq!(friendlies.len(), 2);
        assert!(friendlies.iter().all(|e| e.side == Side::Ally));
    }

    #[test]
    fn test_negative_coordinates_floor() {
        let grid = SpatialGrid::new(50.0);
        assert_eq!(grid.cell_key(-1.0, 49.9), (-1, 0));
    }

    #[test]
    fn test_update_system_rebuilds_on_cell_change() {
        let mut world = World::new();
        world.insert_resource(SpatialGrid::new(50.0));
        let unit = world
            .spawn(UnitBundle {
                position: Position::new(10.0, 10.0),
                ..Default::default()
            })
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(spatial_grid_update_system);
        schedule.run(&mut world);

        assert_eq!(world.resource::<SpatialGrid>().cell_count((0, 0)), 1);
        assert_eq!(world.get::<GridCell>(unit), Some(&GridCell(Some((0, 0)))));
        assert!(!world.resource::<SpatialGrid>().is_dirty());

        world.get_mut::<Position>(unit).unwrap().x = 120.0;
        schedule.run(&mut world);

        let grid = world.resource::<SpatialGrid>();
        assert_eq!(grid.cell_count((0, 0)), 0);
        assert_eq!(grid.cell_count((2, 0)), 1);
        assert_eq!(grid.total_count(), 1);
    }
}
