//! Fixed-size terrain grid painted from rectangle specifications.

use skirmish_core::{
    Cell, CoreError, MoveClass, MoveCost, Terrain, TerrainRect, BOARD_COLUMNS, BOARD_ROWS,
};
use tracing::warn;

/// Dense terrain layout covering the whole battle board.
///
/// Cells default to [`Terrain::Plain`]. The grid is immutable once built;
/// rectangles that failed validation are kept as diagnostics so adapters can
/// surface them next to the map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerrainGrid {
    cells: Vec<Terrain>,
    diagnostics: Vec<CoreError>,
}

impl TerrainGrid {
    /// Creates a grid where every cell is plain ground.
    #[must_use]
    pub fn plain() -> Self {
        Self {
            cells: vec![Terrain::Plain; cell_count()],
            diagnostics: Vec::new(),
        }
    }

    /// Paints the provided rectangles in order over a plain grid.
    ///
    /// Later rectangles overwrite earlier ones where they overlap. Invalid
    /// rectangles are skipped and logged rather than aborting construction.
    #[must_use]
    pub fn from_rects(rects: &[TerrainRect]) -> Self {
        let mut grid = Self::plain();
        for (index, rect) in rects.iter().enumerate() {
            if let Err(error) = grid.paint(rect) {
                warn!(rect = index, %error, "skipping terrain rectangle");
                grid.diagnostics.push(error);
            }
        }
        grid
    }

    /// Terrain covering the provided cell.
    pub fn terrain_at(&self, cell: Cell) -> Result<Terrain, CoreError> {
        let index = index(cell).ok_or_else(|| CoreError::out_of_bounds(cell))?;
        Ok(self.cells[index])
    }

    /// Cost of entering `terrain` for a unit of `move_class`.
    #[must_use]
    pub const fn cost_for(&self, terrain: Terrain, move_class: MoveClass) -> MoveCost {
        terrain.cost_for(move_class)
    }

    /// Cost of entering the provided cell for a unit of `move_class`.
    pub fn cost_at(&self, cell: Cell, move_class: MoveClass) -> Result<MoveCost, CoreError> {
        self.terrain_at(cell)
            .map(|terrain| self.cost_for(terrain, move_class))
    }

    /// Errors recorded for rectangles skipped during construction.
    #[must_use]
    pub fn diagnostics(&self) -> &[CoreError] {
        &self.diagnostics
    }

    /// Iterator over every cell in row-major order with its terrain.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, Terrain)> + '_ {
        self.cells.iter().enumerate().map(|(offset, terrain)| {
            let offset = offset as i32;
            (
                Cell::new(offset / BOARD_COLUMNS, offset % BOARD_COLUMNS),
                *terrain,
            )
        })
    }

    fn paint(&mut self, rect: &TerrainRect) -> Result<(), CoreError> {
        let terrain = rect.terrain.parse::<Terrain>()?;
        let top_left = rect.top_left;
        let bottom_right = rect.bottom_right;

        if !top_left.is_on_board() || !bottom_right.is_on_board() {
            return Err(CoreError::InvalidTerrainSpec(format!(
                "rectangle {top_left}..{bottom_right} extends beyond the board"
            )));
        }
        if top_left.row() > bottom_right.row() || top_left.column() > bottom_right.column() {
            return Err(CoreError::InvalidTerrainSpec(format!(
                "rectangle {top_left}..{bottom_right} has inverted corners"
            )));
        }

        for row in top_left.row()..=bottom_right.row() {
            for column in top_left.column()..=bottom_right.column() {
                if let Some(index) = index(Cell::new(row, column)) {
                    self.cells[index] = terrain;
                }
            }
        }
        Ok(())
    }
}

impl Default for TerrainGrid {
    fn default() -> Self {
        Self::plain()
    }
}

fn cell_count() -> usize {
    usize::try_from(BOARD_ROWS * BOARD_COLUMNS).unwrap_or(0)
}

fn index(cell: Cell) -> Option<usize> {
    if !cell.is_on_board() {
        return None;
    }
    let row = usize::try_from(cell.row()).ok()?;
    let column = usize::try_from(cell.column()).ok()?;
    let width = usize::try_from(BOARD_COLUMNS).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_spec_yields_plain_board() {
        let grid = TerrainGrid::from_rects(&[]);
        assert_eq!(grid.iter().count(), 48);
        assert!(grid.iter().all(|(_, terrain)| terrain == Terrain::Plain));
        assert!(grid.diagnostics().is_empty());
    }

    #[test]
    fn later_rectangles_overwrite_earlier_ones() {
        let grid = TerrainGrid::from_rects(&[
            TerrainRect::new(Cell::new(0, 0), Cell::new(2, 2), "forest"),
            TerrainRect::new(Cell::new(1, 1), Cell::new(1, 3), "Water"),
        ]);

        assert_eq!(grid.terrain_at(Cell::new(0, 0)), Ok(Terrain::Forest));
        assert_eq!(grid.terrain_at(Cell::new(1, 1)), Ok(Terrain::Water));
        assert_eq!(grid.terrain_at(Cell::new(1, 3)), Ok(Terrain::Water));
        assert_eq!(grid.terrain_at(Cell::new(2, 2)), Ok(Terrain::Forest));
        assert_eq!(grid.terrain_at(Cell::new(3, 3)), Ok(Terrain::Plain));
    }

    #[test]
    fn out_of_bounds_rectangles_are_skipped() {
        let grid = TerrainGrid::from_rects(&[
            TerrainRect::new(Cell::new(4, 6), Cell::new(6, 7), "wall"),
            TerrainRect::new(Cell::new(0, 0), Cell::new(0, 0), "mountain"),
        ]);

        assert_eq!(grid.terrain_at(Cell::new(4, 6)), Ok(Terrain::Plain));
        assert_eq!(grid.terrain_at(Cell::new(0, 0)), Ok(Terrain::Mountain));
        assert_eq!(grid.diagnostics().len(), 1);
        assert!(matches!(
            grid.diagnostics()[0],
            CoreError::InvalidTerrainSpec(_)
        ));
    }

    #[test]
    fn unknown_terrain_names_are_skipped() {
        let grid = TerrainGrid::from_rects(&[TerrainRect::new(
            Cell::new(0, 0),
            Cell::new(1, 1),
            "lava",
        )]);

        assert_eq!(grid.terrain_at(Cell::new(1, 1)), Ok(Terrain::Plain));
        assert_eq!(grid.diagnostics().len(), 1);
    }

    #[test]
    fn inverted_rectangles_are_skipped() {
        let grid = TerrainGrid::from_rects(&[TerrainRect::new(
            Cell::new(3, 3),
            Cell::new(1, 1),
            "forest",
        )]);

        assert_eq!(grid.terrain_at(Cell::new(2, 2)), Ok(Terrain::Plain));
        assert_eq!(grid.diagnostics().len(), 1);
    }

    #[test]
    fn terrain_lookup_rejects_cells_off_the_board() {
        let grid = TerrainGrid::plain();
        assert_eq!(
            grid.terrain_at(Cell::new(6, 0)),
            Err(CoreError::OutOfBounds { row: 6, column: 0 })
        );
        assert_eq!(
            grid.cost_at(Cell::new(0, -1), MoveClass::Flying),
            Err(CoreError::OutOfBounds { row: 0, column: -1 })
        );
    }

    #[test]
    fn cost_lookup_delegates_to_terrain_table() {
        let grid = TerrainGrid::from_rects(&[TerrainRect::new(
            Cell::new(2, 2),
            Cell::new(2, 2),
            "forest",
        )]);
        assert_eq!(
            grid.cost_at(Cell::new(2, 2), MoveClass::Infantry),
            Ok(MoveCost::new(2))
        );
        assert_eq!(
            grid.cost_for(Terrain::Forest, MoveClass::Cavalry),
            MoveCost::IMPASSABLE
        );
    }
}
