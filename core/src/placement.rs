//! Hypothetical placements a planner asks the simulator to evaluate.

use serde::{Deserialize, Serialize};

use crate::{CellCoord, UnitKind};

/// What a placement does to its cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementAction {
    /// Builds a structure or spawns a walker group of the given kind.
    Spawn(UnitKind),
    /// Clears whatever structure occupies the cell.
    Remove,
    /// Upgrades the structure occupying the cell.
    Upgrade,
}

/// A single `(cell, action, quantity)` entry of a scenario.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    /// Cell the placement applies to.
    pub cell: CellCoord,
    /// Mutation requested at the cell.
    pub action: PlacementAction,
    /// Number of units requested; only walker groups use values above one.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

impl Placement {
    /// Creates a placement spawning `quantity` units of `kind` at `cell`.
    #[must_use]
    pub const fn spawn(cell: CellCoord, kind: UnitKind, quantity: u32) -> Self {
        Self {
            cell,
            action: PlacementAction::Spawn(kind),
            quantity,
        }
    }

    /// Creates a placement removing the structure at `cell`.
    #[must_use]
    pub const fn remove(cell: CellCoord) -> Self {
        Self {
            cell,
            action: PlacementAction::Remove,
            quantity: 1,
        }
    }

    /// Creates a placement upgrading the structure at `cell`.
    #[must_use]
    pub const fn upgrade(cell: CellCoord) -> Self {
        Self {
            cell,
            action: PlacementAction::Upgrade,
            quantity: 1,
        }
    }
}

const fn default_quantity() -> u32 {
    1
}

/// Reasons a placement request may be rejected.
///
/// Rejections never mutate the simulation.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error,
)]
pub enum PlacementError {
    /// The cell lies outside the diamond arena.
    #[error("cell lies outside the arena")]
    OutOfArena,
    /// A structure already occupies the cell.
    #[error("cell is already occupied by a structure")]
    Occupied,
    /// The requested kind cannot be built as a structure.
    #[error("unit kind is not a structure")]
    NotAStructure,
    /// The action requires a structure but the cell is empty.
    #[error("no structure occupies the cell")]
    EmptyCell,
    /// The structure at the cell is already upgraded.
    #[error("structure is already upgraded")]
    AlreadyUpgraded,
    /// Walker groups must spawn on one of the four arena edges.
    #[error("walkers must spawn on an arena edge")]
    NotOnEdge,
    /// The requested quantity was zero.
    #[error("quantity must be positive")]
    InvalidQuantity,
    /// Walker groups waiting on the cell prevent building over them.
    #[error("walker groups occupy the cell")]
    BlockedByUnits,
    /// The action phase has already started resolving frames.
    #[error("the action phase has already started")]
    PhaseStarted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_list_parses_with_default_quantity() {
        let json = r#"[
            { "cell": { "column": 13, "row": 0 }, "action": { "spawn": "scout" }, "quantity": 5 },
            { "cell": { "column": 13, "row": 13 }, "action": { "spawn": "DF" } },
            { "cell": { "column": 13, "row": 13 }, "action": "upgrade" }
        ]"#;
        let placements: Vec<Placement> = serde_json::from_str(json).expect("placements parse");

        assert_eq!(
            placements,
            vec![
                Placement::spawn(CellCoord::new(13, 0), UnitKind::Scout, 5),
                Placement::spawn(CellCoord::new(13, 13), UnitKind::Turret, 1),
                Placement::upgrade(CellCoord::new(13, 13)),
            ]
        );
    }
}
