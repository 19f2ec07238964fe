//! Dense structure layer covering the square grid.

use lanesim_core::{CellCoord, Catalog, PlacementError, Side, UnitKind, BOARD_SIZE};
use serde::{Deserialize, Serialize};

/// A stationary unit occupying exactly one arena cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    kind: UnitKind,
    health: f64,
    upgraded: bool,
}

impl Structure {
    /// Creates a structure with explicit health and upgrade status.
    #[must_use]
    pub const fn new(kind: UnitKind, health: f64, upgraded: bool) -> Self {
        Self {
            kind,
            health,
            upgraded,
        }
    }

    /// Kind of structure.
    #[must_use]
    pub const fn kind(&self) -> UnitKind {
        self.kind
    }

    /// Remaining health; may drop below zero until the board clears it.
    #[must_use]
    pub const fn health(&self) -> f64 {
        self.health
    }

    /// Whether the structure has been upgraded.
    #[must_use]
    pub const fn upgraded(&self) -> bool {
        self.upgraded
    }
}

/// Exclusive owner of every structure in the arena.
///
/// At most one structure occupies a cell. Cells outside the diamond never
/// hold a structure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PlacedStructure>", into = "Vec<PlacedStructure>")]
pub struct Board {
    cells: Vec<Option<Structure>>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Creates an empty board.
    #[must_use]
    pub fn new() -> Self {
        let capacity = usize::try_from(BOARD_SIZE * BOARD_SIZE).unwrap_or(0);
        Self {
            cells: vec![None; capacity],
        }
    }

    /// Structure occupying `cell`, if any.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<&Structure> {
        index(cell).and_then(|index| self.cells[index].as_ref())
    }

    /// Reports whether walkers may traverse `cell`.
    #[must_use]
    pub fn is_open(&self, cell: CellCoord) -> bool {
        index(cell).is_some_and(|index| self.cells[index].is_none())
    }

    /// Places a structure built by the live engine or a planner, replacing any occupant.
    pub fn place(&mut self, cell: CellCoord, structure: Structure) -> Result<(), PlacementError> {
        let index = index(cell).ok_or(PlacementError::OutOfArena)?;
        self.cells[index] = Some(structure);
        Ok(())
    }

    /// Builds a fresh structure of `kind` on an empty cell.
    pub fn build(
        &mut self,
        kind: UnitKind,
        cell: CellCoord,
        catalog: &Catalog,
    ) -> Result<(), PlacementError> {
        let index = index(cell).ok_or(PlacementError::OutOfArena)?;
        if !kind.is_structure() {
            return Err(PlacementError::NotAStructure);
        }
        if self.cells[index].is_some() {
            return Err(PlacementError::Occupied);
        }

        let health = catalog.base(kind).start_health;
        self.cells[index] = Some(Structure::new(kind, health, false));
        Ok(())
    }

    /// Upgrades the structure on `cell`, adjusting its health by the
    /// difference between the upgraded and base starting health.
    pub fn upgrade(&mut self, cell: CellCoord, catalog: &Catalog) -> Result<(), PlacementError> {
        let index = index(cell).ok_or(PlacementError::OutOfArena)?;
        let structure = self.cells[index]
            .as_mut()
            .ok_or(PlacementError::EmptyCell)?;
        if structure.upgraded {
            return Err(PlacementError::AlreadyUpgraded);
        }

        let delta =
            catalog.upgraded(structure.kind).start_health - catalog.base(structure.kind).start_health;
        structure.upgraded = true;
        structure.health += delta;
        Ok(())
    }

    /// Clears `cell`, returning the structure that occupied it.
    pub fn remove(&mut self, cell: CellCoord) -> Option<Structure> {
        index(cell).and_then(|index| self.cells[index].take())
    }

    /// Subtracts `amount` from the structure on `cell`, returning its remaining health.
    pub fn damage(&mut self, cell: CellCoord, amount: f64) -> Option<f64> {
        let index = index(cell)?;
        let structure = self.cells[index].as_mut()?;
        structure.health -= amount;
        Some(structure.health)
    }

    /// Clears every structure whose health dropped to zero or below.
    ///
    /// The cleared cells are returned in coordinate order.
    pub fn remove_dead(&mut self) -> Vec<CellCoord> {
        let mut removed = Vec::new();
        for (offset, slot) in self.cells.iter_mut().enumerate() {
            if slot.is_some_and(|structure| structure.health <= 0.0) {
                *slot = None;
                removed.push(cell_at(offset));
            }
        }
        removed
    }

    /// Iterates every structure in coordinate order.
    pub fn structures(&self) -> impl Iterator<Item = (CellCoord, &Structure)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(offset, slot)| slot.as_ref().map(|structure| (cell_at(offset), structure)))
    }

    /// Iterates the structures owned by `side` in coordinate order.
    pub fn structures_of(&self, side: Side) -> impl Iterator<Item = (CellCoord, &Structure)> + '_ {
        self.structures()
            .filter(move |(cell, _)| cell.owner() == side)
    }

    /// Number of structures on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|slot| slot.is_some()).count()
    }

    /// Reports whether the board holds no structures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }
}

/// Serialized form of a single occupied board cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedStructure {
    /// Cell occupied by the structure.
    pub cell: CellCoord,
    /// Kind of structure.
    pub kind: UnitKind,
    /// Remaining health.
    pub health: f64,
    /// Whether the structure has been upgraded.
    #[serde(default)]
    pub upgraded: bool,
}

impl TryFrom<Vec<PlacedStructure>> for Board {
    type Error = PlacementError;

    fn try_from(placed: Vec<PlacedStructure>) -> Result<Self, Self::Error> {
        let mut board = Board::new();
        for entry in placed {
            if !entry.kind.is_structure() {
                return Err(PlacementError::NotAStructure);
            }
            if board.get(entry.cell).is_some() {
                return Err(PlacementError::Occupied);
            }
            board.place(
                entry.cell,
                Structure::new(entry.kind, entry.health, entry.upgraded),
            )?;
        }
        Ok(board)
    }
}

impl From<Board> for Vec<PlacedStructure> {
    fn from(board: Board) -> Self {
        board
            .structures()
            .map(|(cell, structure)| PlacedStructure {
                cell,
                kind: structure.kind,
                health: structure.health,
                upgraded: structure.upgraded,
            })
            .collect()
    }
}

fn index(cell: CellCoord) -> Option<usize> {
    if !cell.in_arena() {
        return None;
    }
    usize::try_from(cell.column() * BOARD_SIZE + cell.row()).ok()
}

fn cell_at(offset: usize) -> CellCoord {
    let size = usize::try_from(BOARD_SIZE).unwrap_or(1);
    let column = i32::try_from(offset / size).unwrap_or(i32::MAX);
    let row = i32::try_from(offset % size).unwrap_or(i32::MAX);
    CellCoord::new(column, row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_empty_arena_cell_and_structure_kind() {
        let catalog = Catalog::standard();
        let mut board = Board::new();
        let cell = CellCoord::new(13, 10);

        assert_eq!(board.build(UnitKind::Turret, cell, &catalog), Ok(()));
        assert_eq!(
            board.build(UnitKind::Wall, cell, &catalog),
            Err(PlacementError::Occupied)
        );
        assert_eq!(
            board.build(UnitKind::Scout, CellCoord::new(13, 11), &catalog),
            Err(PlacementError::NotAStructure)
        );
        assert_eq!(
            board.build(UnitKind::Wall, CellCoord::new(0, 0), &catalog),
            Err(PlacementError::OutOfArena)
        );

        let turret = board.get(cell).expect("turret was built");
        assert_eq!(turret.kind(), UnitKind::Turret);
        assert!((turret.health() - 75.0).abs() < f64::EPSILON);
        assert!(!turret.upgraded());
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn upgrade_applies_health_delta_once() {
        let catalog = Catalog::standard();
        let mut board = Board::new();
        let cell = CellCoord::new(13, 12);
        board
            .place(cell, Structure::new(UnitKind::Wall, 10.0, false))
            .expect("cell in arena");

        assert_eq!(board.upgrade(cell, &catalog), Ok(()));
        let wall = board.get(cell).expect("wall present");
        assert!(wall.upgraded());
        assert!((wall.health() - 70.0).abs() < f64::EPSILON);

        assert_eq!(
            board.upgrade(cell, &catalog),
            Err(PlacementError::AlreadyUpgraded)
        );
        assert_eq!(
            board.upgrade(CellCoord::new(14, 12), &catalog),
            Err(PlacementError::EmptyCell)
        );
    }

    #[test]
    fn remove_dead_clears_only_depleted_structures() {
        let mut board = Board::new();
        let alive = CellCoord::new(13, 5);
        let dead = CellCoord::new(12, 5);
        board
            .place(alive, Structure::new(UnitKind::Wall, 5.0, false))
            .expect("cell in arena");
        board
            .place(dead, Structure::new(UnitKind::Wall, 5.0, false))
            .expect("cell in arena");

        assert_eq!(board.damage(dead, 7.5), Some(-2.5));
        assert_eq!(board.damage(CellCoord::new(14, 5), 1.0), None);
        assert_eq!(board.remove_dead(), vec![dead]);
        assert!(board.is_open(dead));
        assert!(!board.is_open(alive));
        assert!(!board.is_open(CellCoord::new(0, 0)));
    }

    #[test]
    fn structures_iterate_in_coordinate_order() {
        let mut board = Board::new();
        let cells = [
            CellCoord::new(14, 20),
            CellCoord::new(13, 3),
            CellCoord::new(13, 1),
        ];
        for cell in cells {
            board
                .place(cell, Structure::new(UnitKind::Wall, 1.0, false))
                .expect("cell in arena");
        }

        let order: Vec<_> = board.structures().map(|(cell, _)| cell).collect();
        assert_eq!(
            order,
            vec![
                CellCoord::new(13, 1),
                CellCoord::new(13, 3),
                CellCoord::new(14, 20)
            ]
        );
        assert_eq!(board.structures_of(Side::Top).count(), 1);
    }

    #[test]
    fn snapshot_rejects_duplicate_cells() {
        let json = r#"[
            { "cell": { "column": 13, "row": 13 }, "kind": "wall", "health": 60 },
            { "cell": { "column": 13, "row": 13 }, "kind": "turret", "health": 75 }
        ]"#;
        let error = serde_json::from_str::<Board>(json).expect_err("duplicate cell");
        assert!(error.to_string().contains("occupied"));
    }

    #[test]
    fn snapshot_restores_health_and_upgrades() {
        let json = r#"[
            { "cell": { "column": 13, "row": 13 }, "kind": "DF", "health": 40.5, "upgraded": true }
        ]"#;
        let board: Board = serde_json::from_str(json).expect("snapshot parses");
        let turret = board.get(CellCoord::new(13, 13)).expect("turret restored");
        assert!(turret.upgraded());
        assert!((turret.health() - 40.5).abs() < f64::EPSILON);
    }
}
