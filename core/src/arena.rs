//! Diamond arena geometry: cells, owning sides, edges and movement axes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of cells along each side of the square grid enclosing the arena.
pub const BOARD_SIZE: i32 = 28;

/// Number of rows owned by each side.
pub const HALF_SIZE: i32 = BOARD_SIZE / 2;

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Coordinates are signed so neighbourhood and window scans may step past
/// the grid boundary; [`CellCoord::in_arena`] decides validity. Cells order
/// by column first and row second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Reports whether the cell lies inside the playable diamond.
    #[must_use]
    pub const fn in_arena(&self) -> bool {
        let (column, row) = (self.column, self.row);
        if row < 0 || row >= BOARD_SIZE {
            return false;
        }
        if row < HALF_SIZE {
            column >= HALF_SIZE - 1 - row && column <= HALF_SIZE + row
        } else {
            column >= row - HALF_SIZE && column <= 3 * HALF_SIZE - 1 - row
        }
    }

    /// Side owning the row that contains the cell.
    #[must_use]
    pub const fn owner(&self) -> Side {
        Side::owning_row(self.row)
    }

    /// Euclidean distance between two cells, used for every range check.
    #[must_use]
    pub fn distance(self, other: CellCoord) -> f64 {
        let dx = f64::from(self.column - other.column);
        let dy = f64::from(self.row - other.row);
        dx.hypot(dy)
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Cardinal neighbours in the fixed order up, right, down, left.
    ///
    /// Neighbours are not filtered against the arena.
    #[must_use]
    pub const fn neighbors(self) -> [CellCoord; 4] {
        [
            CellCoord::new(self.column, self.row + 1),
            CellCoord::new(self.column + 1, self.row),
            CellCoord::new(self.column, self.row - 1),
            CellCoord::new(self.column - 1, self.row),
        ]
    }

    /// Axis travelled when stepping from this cell to `next`.
    #[must_use]
    pub const fn axis_to(self, next: CellCoord) -> Axis {
        if self.column == next.column {
            Axis::Vertical
        } else {
            Axis::Horizontal
        }
    }

    /// Iterates every arena cell in column-major coordinate order.
    pub fn arena_cells() -> impl Iterator<Item = CellCoord> {
        (0..BOARD_SIZE)
            .flat_map(|column| (0..BOARD_SIZE).map(move |row| CellCoord::new(column, row)))
            .filter(CellCoord::in_arena)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// One of the two competing players, identified by the half they defend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Player defending rows `0..14`.
    Bottom,
    /// Player defending rows `14..28`.
    Top,
}

impl Side {
    /// Side owning the provided row.
    #[must_use]
    pub const fn owning_row(row: i32) -> Self {
        if row < HALF_SIZE {
            Self::Bottom
        } else {
            Self::Top
        }
    }

    /// The competing side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Bottom => Self::Top,
            Self::Top => Self::Bottom,
        }
    }

    /// Row furthest from the front line on this side.
    #[must_use]
    pub const fn back_row(self) -> i32 {
        match self {
            Self::Bottom => 0,
            Self::Top => BOARD_SIZE - 1,
        }
    }

    /// Number of rows separating `row` from this side's back row.
    #[must_use]
    pub const fn rows_from_back(self, row: i32) -> i32 {
        (row - self.back_row()).abs()
    }
}

/// Axis of a single cardinal step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Step that changes the column.
    Horizontal,
    /// Step that changes the row.
    Vertical,
}

/// The four diagonal edge segments bounding the diamond arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    /// Upper-right segment, cells with `column + row == 41`.
    TopRight,
    /// Upper-left segment, cells with `row - column == 14`.
    TopLeft,
    /// Lower-left segment, cells with `column + row == 13`.
    BottomLeft,
    /// Lower-right segment, cells with `column - row == 14`.
    BottomRight,
}

impl Edge {
    /// Every edge, in the order spawn cells are matched against them.
    pub const SPAWN_ORDER: [Edge; 4] = [
        Edge::BottomLeft,
        Edge::BottomRight,
        Edge::TopLeft,
        Edge::TopRight,
    ];

    /// Steps remaining to the edge under the edge's Manhattan-style metric.
    ///
    /// The value is zero exactly on the edge and never negative inside the
    /// arena; a single cardinal step changes it by at most one.
    #[must_use]
    pub const fn distance(self, cell: CellCoord) -> i32 {
        let (column, row) = (cell.column(), cell.row());
        match self {
            Self::BottomLeft => column + row - (HALF_SIZE - 1),
            Self::BottomRight => HALF_SIZE - (column - row),
            Self::TopLeft => HALF_SIZE - (row - column),
            Self::TopRight => 3 * HALF_SIZE - 1 - (column + row),
        }
    }

    /// Reports whether the arena cell lies on this edge.
    #[must_use]
    pub const fn contains(self, cell: CellCoord) -> bool {
        cell.in_arena() && self.distance(cell) == 0
    }

    /// Edge across the arena from this one.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::TopRight => Self::BottomLeft,
            Self::TopLeft => Self::BottomRight,
            Self::BottomLeft => Self::TopRight,
            Self::BottomRight => Self::TopLeft,
        }
    }

    /// Side whose half of the arena contains the edge.
    #[must_use]
    pub const fn side(self) -> Side {
        match self {
            Self::TopRight | Self::TopLeft => Side::Top,
            Self::BottomLeft | Self::BottomRight => Side::Bottom,
        }
    }

    /// Edge that a walker spawned on `cell` belongs to, if any.
    #[must_use]
    pub fn spawn_edge_of(cell: CellCoord) -> Option<Self> {
        Self::SPAWN_ORDER
            .into_iter()
            .find(|edge| edge.contains(cell))
    }

    /// Cells composing the edge, ordered by row.
    #[must_use]
    pub fn cells(self) -> Vec<CellCoord> {
        let rows = match self.side() {
            Side::Bottom => 0..HALF_SIZE,
            Side::Top => HALF_SIZE..BOARD_SIZE,
        };
        rows.map(|row| {
            let column = match self {
                Self::BottomLeft => HALF_SIZE - 1 - row,
                Self::BottomRight => HALF_SIZE + row,
                Self::TopLeft => row - HALF_SIZE,
                Self::TopRight => 3 * HALF_SIZE - 1 - row,
            };
            CellCoord::new(column, row)
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_is_a_diamond() {
        assert!(CellCoord::new(13, 0).in_arena());
        assert!(CellCoord::new(14, 0).in_arena());
        assert!(!CellCoord::new(12, 0).in_arena());
        assert!(!CellCoord::new(15, 0).in_arena());
        assert!(CellCoord::new(0, 13).in_arena());
        assert!(CellCoord::new(27, 14).in_arena());
        assert!(CellCoord::new(13, 27).in_arena());
        assert!(!CellCoord::new(12, 27).in_arena());
        assert!(!CellCoord::new(14, -1).in_arena());
        assert_eq!(CellCoord::arena_cells().count(), 2 * (2 + 28) * 14 / 2);
    }

    #[test]
    fn every_edge_has_fourteen_cells() {
        for edge in Edge::SPAWN_ORDER {
            let cells = edge.cells();
            assert_eq!(cells.len(), 14);
            assert!(cells.iter().all(|cell| edge.contains(*cell)));
        }
    }

    #[test]
    fn edge_cells_belong_to_exactly_one_edge() {
        for cell in CellCoord::arena_cells() {
            let count = Edge::SPAWN_ORDER
                .iter()
                .filter(|edge| edge.contains(cell))
                .count();
            assert!(count <= 1, "{cell} lies on {count} edges");
        }
    }

    #[test]
    fn edge_distance_is_non_negative_inside_the_arena() {
        for cell in CellCoord::arena_cells() {
            for edge in Edge::SPAWN_ORDER {
                assert!(edge.distance(cell) >= 0);
            }
        }
    }

    #[test]
    fn spawn_edges_map_to_their_owning_side() {
        assert_eq!(Edge::spawn_edge_of(CellCoord::new(13, 0)), Some(Edge::BottomLeft));
        assert_eq!(Edge::spawn_edge_of(CellCoord::new(14, 0)), Some(Edge::BottomRight));
        assert_eq!(Edge::spawn_edge_of(CellCoord::new(0, 14)), Some(Edge::TopLeft));
        assert_eq!(Edge::spawn_edge_of(CellCoord::new(27, 14)), Some(Edge::TopRight));
        assert_eq!(Edge::spawn_edge_of(CellCoord::new(13, 13)), None);
        assert_eq!(Edge::BottomLeft.opposite(), Edge::TopRight);
        assert_eq!(Edge::TopLeft.side(), Side::Top);
    }

    #[test]
    fn opposite_edge_distance_from_corner_spans_the_arena() {
        assert_eq!(Edge::TopRight.distance(CellCoord::new(13, 0)), 28);
        assert_eq!(Edge::TopLeft.distance(CellCoord::new(14, 0)), 28);
    }

    #[test]
    fn rows_split_between_sides() {
        assert_eq!(CellCoord::new(13, 13).owner(), Side::Bottom);
        assert_eq!(CellCoord::new(13, 14).owner(), Side::Top);
        assert_eq!(Side::Top.rows_from_back(27), 0);
        assert_eq!(Side::Top.rows_from_back(14), 13);
        assert_eq!(Side::Bottom.rows_from_back(5), 5);
    }

    #[test]
    fn axis_follows_the_changed_coordinate() {
        let origin = CellCoord::new(5, 5);
        assert_eq!(origin.axis_to(CellCoord::new(5, 6)), Axis::Vertical);
        assert_eq!(origin.axis_to(CellCoord::new(6, 5)), Axis::Horizontal);
    }

    #[test]
    fn euclidean_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 5);
        assert!((origin.distance(destination) - 5.0).abs() < 1e-9);
        assert_eq!(origin.manhattan_distance(destination), 7);
    }
}
