#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement planning over the battle grid.
//!
//! [`reachable_cells`] is the planner used for highlighting: a breadth-first
//! search that fixes each cell's remaining budget the first time the cell is
//! dequeued. On uneven terrain this can miss cells that a cheaper but
//! later-discovered path would reach. [`cheapest_reachable_cells`] is the
//! cost-ordered alternative that always finds the full set; callers opt into
//! it explicitly.

use std::{
    cmp::Reverse,
    collections::{BTreeMap, BTreeSet, BinaryHeap, VecDeque},
};

use skirmish_core::{Cell, CoreError, MoveClass, UnitState};
use skirmish_world::TerrainGrid;

/// Cells a unit of `move_class` can reach from `origin` within `budget`.
///
/// The origin is always part of the result. A cell is marked visited the
/// first time it leaves the frontier and is never expanded again, even if a
/// cheaper path to it is still queued.
pub fn reachable_cells(
    origin: Cell,
    budget: i32,
    move_class: MoveClass,
    grid: &TerrainGrid,
) -> Result<BTreeSet<Cell>, CoreError> {
    let budget = validate(origin, budget, grid)?;

    let mut visited: BTreeSet<Cell> = BTreeSet::new();
    let mut frontier: VecDeque<(Cell, u32)> = VecDeque::new();
    frontier.push_back((origin, budget));

    while let Some((cell, remaining)) = frontier.pop_front() {
        if !visited.insert(cell) {
            continue;
        }

        for neighbor in cell.neighbors() {
            if visited.contains(&neighbor) {
                continue;
            }
            let Some(cost) = step_cost(grid, neighbor, move_class) else {
                continue;
            };
            if cost <= remaining {
                frontier.push_back((neighbor, remaining - cost));
            }
        }
    }

    Ok(visited)
}

/// Cost-ordered variant of [`reachable_cells`].
///
/// Expands cells in order of accumulated cost so every cell whose cheapest
/// path fits the budget is returned. This deliberately differs from the
/// default planner on uneven terrain.
pub fn cheapest_reachable_cells(
    origin: Cell,
    budget: i32,
    move_class: MoveClass,
    grid: &TerrainGrid,
) -> Result<BTreeSet<Cell>, CoreError> {
    let budget = validate(origin, budget, grid)?;

    let mut best: BTreeMap<Cell, u32> = BTreeMap::new();
    let mut open: BinaryHeap<Reverse<(u32, Cell)>> = BinaryHeap::new();
    let _ = best.insert(origin, 0);
    open.push(Reverse((0, origin)));

    while let Some(Reverse((spent, cell))) = open.pop() {
        if best.get(&cell).is_some_and(|known| *known < spent) {
            continue;
        }

        for neighbor in cell.neighbors() {
            let Some(cost) = step_cost(grid, neighbor, move_class) else {
                continue;
            };
            let total = spent.saturating_add(cost);
            if total > budget {
                continue;
            }
            if best.get(&neighbor).is_some_and(|known| *known <= total) {
                continue;
            }
            let _ = best.insert(neighbor, total);
            open.push(Reverse((total, neighbor)));
        }
    }

    Ok(best.into_keys().collect())
}

/// Cells the provided unit can reach this turn using its class budget.
pub fn reachable_for(unit: &UnitState, grid: &TerrainGrid) -> Result<BTreeSet<Cell>, CoreError> {
    reachable_cells(
        unit.position,
        unit.move_class.default_budget(),
        unit.move_class,
        grid,
    )
}

fn validate(origin: Cell, budget: i32, grid: &TerrainGrid) -> Result<u32, CoreError> {
    let _ = grid.terrain_at(origin)?;
    u32::try_from(budget)
        .map_err(|_| CoreError::InvalidArgument(format!("movement budget {budget} is negative")))
}

fn step_cost(grid: &TerrainGrid, cell: Cell, move_class: MoveClass) -> Option<u32> {
    let cost = grid.cost_at(cell, move_class).ok()?;
    cost.is_passable().then(|| cost.get())
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::TerrainRect;

    #[test]
    fn zero_budget_yields_only_origin() {
        let grid = TerrainGrid::plain();
        let cells = reachable_cells(Cell::new(3, 3), 0, MoveClass::Infantry, &grid)
            .expect("origin on board");
        assert_eq!(cells, BTreeSet::from([Cell::new(3, 3)]));
    }

    #[test]
    fn negative_budget_is_rejected() {
        let grid = TerrainGrid::plain();
        assert!(matches!(
            reachable_cells(Cell::new(0, 0), -1, MoveClass::Infantry, &grid),
            Err(CoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            cheapest_reachable_cells(Cell::new(0, 0), -3, MoveClass::Flying, &grid),
            Err(CoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn off_board_origin_is_rejected() {
        let grid = TerrainGrid::plain();
        assert_eq!(
            reachable_cells(Cell::new(0, 8), 2, MoveClass::Infantry, &grid),
            Err(CoreError::OutOfBounds { row: 0, column: 8 })
        );
    }

    #[test]
    fn origin_is_kept_even_when_its_terrain_is_impassable() {
        let grid = TerrainGrid::from_rects(&[TerrainRect::new(
            Cell::new(1, 1),
            Cell::new(1, 1),
            "water",
        )]);
        let cells = reachable_cells(Cell::new(1, 1), 1, MoveClass::Infantry, &grid)
            .expect("origin on board");
        assert!(cells.contains(&Cell::new(1, 1)));
        assert_eq!(cells.len(), 5);
    }

    #[test]
    fn cavalry_cannot_enter_forest() {
        let grid = TerrainGrid::from_rects(&[TerrainRect::new(
            Cell::new(0, 1),
            Cell::new(5, 1),
            "forest",
        )]);
        let cells = reachable_cells(Cell::new(0, 0), 3, MoveClass::Cavalry, &grid)
            .expect("origin on board");
        assert!(cells.iter().all(|cell| cell.column() == 0));
        assert_eq!(cells.len(), 4);
    }

    #[test]
    fn first_visit_search_can_miss_cells_the_cost_ordered_search_finds() {
        let grid = TerrainGrid::from_rects(&[TerrainRect::new(
            Cell::new(0, 1),
            Cell::new(0, 1),
            "forest",
        )]);

        let first_visit = reachable_cells(Cell::new(0, 0), 3, MoveClass::Infantry, &grid)
            .expect("origin on board");
        let cheapest = cheapest_reachable_cells(Cell::new(0, 0), 3, MoveClass::Infantry, &grid)
            .expect("origin on board");

        assert!(!first_visit.contains(&Cell::new(1, 2)));
        assert!(cheapest.contains(&Cell::new(1, 2)));
        assert!(first_visit.is_subset(&cheapest));
    }

    #[test]
    fn reachable_for_uses_class_budget() {
        let grid = TerrainGrid::plain();
        let mut unit = skirmish_registry::UnitRegistry::builtin().instantiate(
            "Sela",
            skirmish_core::Group::Ally,
            Cell::new(5, 4),
        );
        let cavalry = reachable_for(&unit, &grid).expect("origin on board");
        assert!(cavalry.contains(&Cell::new(2, 4)));

        unit.move_class = MoveClass::Armored;
        let armored = reachable_for(&unit, &grid).expect("origin on board");
        assert_eq!(armored.len(), 4);
    }
}
