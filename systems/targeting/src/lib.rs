#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that picks deterministic attack targets from the simulation state.
//!
//! Every attacker, tower or walker, applies the same rule: mobile targets
//! beat structures, then smaller distance, then lower remaining health, then
//! the candidate further advanced into the attacker's own half. Candidates
//! with no remaining health are never eligible.

use lanesim_core::{CellCoord, Side, BOARD_SIZE};
use lanesim_world::{Board, MobileGroup};

/// Position, allegiance and reach of a unit looking for a target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attacker {
    /// Cell the attack originates from.
    pub cell: CellCoord,
    /// Side the attacker fights for.
    pub side: Side,
    /// Maximum euclidean distance to a target.
    pub range: f64,
}

impl Attacker {
    /// Creates an attacker description.
    #[must_use]
    pub const fn new(cell: CellCoord, side: Side, range: f64) -> Self {
        Self { cell, side, range }
    }

    fn reaches(&self, cell: CellCoord) -> Option<f64> {
        let distance = self.cell.distance(cell);
        (distance <= self.range).then_some(distance)
    }
}

/// Target chosen for a single attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// Index of a walker group in the slice that was searched.
    Mobile(usize),
    /// Cell of an enemy structure.
    Structure(CellCoord),
}

/// Selects the best enemy walker group in range.
///
/// Ties that survive distance and health go to the group closest to the
/// attacker's back row, then to the earliest group in `groups`.
#[must_use]
pub fn select_mobile_target(groups: &[MobileGroup], attacker: &Attacker) -> Option<usize> {
    let mut best: Option<MobileCandidate> = None;

    for (index, group) in groups.iter().enumerate() {
        if group.side() == attacker.side {
            continue;
        }
        let health = group.target_health();
        if health <= 0.0 {
            continue;
        }
        let Some(distance) = attacker.reaches(group.cell()) else {
            continue;
        };

        let current = MobileCandidate {
            distance,
            health,
            depth: attacker.side.rows_from_back(group.cell().row()),
            index,
        };
        match &mut best {
            Some(existing) => {
                if current.precedes(existing) {
                    *existing = current;
                }
            }
            None => best = Some(current),
        }
    }

    best.map(|candidate| candidate.index)
}

/// Selects the best enemy structure in range.
///
/// Rows are scanned from the attacker's back row toward the far side and
/// columns left to right, so the first candidate at the minimal distance
/// already satisfies the row tie-break.
#[must_use]
pub fn select_structure_target(board: &Board, attacker: &Attacker) -> Option<CellCoord> {
    let reach = window_reach(attacker.range);
    let origin = attacker.cell;
    let low_row = (origin.row() - reach).max(0);
    let high_row = (origin.row() + reach).min(BOARD_SIZE - 1);
    let low_column = (origin.column() - reach).max(0);
    let high_column = (origin.column() + reach).min(BOARD_SIZE - 1);
    if low_row > high_row || low_column > high_column {
        return None;
    }

    let mut best: Option<StructureCandidate> = None;
    for offset in 0..=high_row - low_row {
        let row = match attacker.side {
            Side::Bottom => low_row + offset,
            Side::Top => high_row - offset,
        };
        if Side::owning_row(row) == attacker.side {
            continue;
        }
        for column in low_column..=high_column {
            let cell = CellCoord::new(column, row);
            let Some(structure) = board.get(cell) else {
                continue;
            };
            if structure.health() <= 0.0 {
                continue;
            }
            let Some(distance) = attacker.reaches(cell) else {
                continue;
            };

            let current = StructureCandidate {
                distance,
                health: structure.health(),
                cell,
            };
            match &mut best {
                Some(existing) => {
                    if current.precedes(existing) {
                        *existing = current;
                    }
                }
                None => best = Some(current),
            }
        }
    }

    best.map(|candidate| candidate.cell)
}

/// Selects a target for an attacker that may damage walkers and, when
/// `targets_structures` is set, enemy structures.
///
/// A walker in range always wins over any structure.
#[must_use]
pub fn select_target(
    board: &Board,
    groups: &[MobileGroup],
    attacker: &Attacker,
    targets_structures: bool,
) -> Option<Target> {
    if let Some(index) = select_mobile_target(groups, attacker) {
        return Some(Target::Mobile(index));
    }
    if !targets_structures {
        return None;
    }
    select_structure_target(board, attacker).map(Target::Structure)
}

fn window_reach(range: f64) -> i32 {
    if range.is_finite() && range > 0.0 {
        range.ceil().min(f64::from(BOARD_SIZE)) as i32
    } else {
        0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct MobileCandidate {
    distance: f64,
    health: f64,
    depth: i32,
    index: usize,
}

impl MobileCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance != other.distance {
            return self.distance < other.distance;
        }

        if self.health != other.health {
            return self.health < other.health;
        }

        if self.depth != other.depth {
            return self.depth < other.depth;
        }

        self.index < other.index
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct StructureCandidate {
    distance: f64,
    health: f64,
    cell: CellCoord,
}

impl StructureCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance != other.distance {
            return self.distance < other.distance;
        }

        self.health < other.health
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(distance: f64, health: f64, depth: i32, index: usize) -> MobileCandidate {
        MobileCandidate {
            distance,
            health,
            depth,
            index,
        }
    }

    #[test]
    fn mobile_candidates_rank_by_distance_health_depth_then_index() {
        assert!(candidate(1.0, 50.0, 9, 9).precedes(&candidate(2.0, 1.0, 0, 0)));
        assert!(candidate(1.0, 5.0, 9, 9).precedes(&candidate(1.0, 6.0, 0, 0)));
        assert!(candidate(1.0, 5.0, 3, 9).precedes(&candidate(1.0, 5.0, 4, 0)));
        assert!(candidate(1.0, 5.0, 3, 1).precedes(&candidate(1.0, 5.0, 3, 2)));
        assert!(!candidate(1.0, 5.0, 3, 2).precedes(&candidate(1.0, 5.0, 3, 2)));
    }

    #[test]
    fn structure_candidates_keep_the_earlier_scan_on_full_ties() {
        let first = StructureCandidate {
            distance: 2.0,
            health: 10.0,
            cell: CellCoord::new(13, 15),
        };
        let later = StructureCandidate {
            cell: CellCoord::new(14, 16),
            ..first
        };
        assert!(!later.precedes(&first));
    }

    #[test]
    fn window_reach_rounds_up_and_rejects_nonsense() {
        assert_eq!(window_reach(2.5), 3);
        assert_eq!(window_reach(3.0), 3);
        assert_eq!(window_reach(0.0), 0);
        assert_eq!(window_reach(f64::NAN), 0);
        assert_eq!(window_reach(1e9), BOARD_SIZE);
    }
}
