#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the lane simulator.
//!
//! This crate defines the vocabulary every other crate speaks: arena cells
//! and edges, the closed set of unit kinds with their capability table, the
//! statistics catalog loaded once per process, the placement requests a
//! planner submits, and the [`Outcome`] the combat simulator reports once an
//! action phase resolves. Nothing here mutates simulation state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

mod arena;
mod catalog;
mod placement;

pub use arena::{Axis, CellCoord, Edge, Side, BOARD_SIZE, HALF_SIZE};
pub use catalog::{
    Capabilities, Catalog, CatalogError, Category, Mechanics, UnitKind, UnitStats,
};
pub use placement::{Placement, PlacementAction, PlacementError};

/// Identifier the live engine assigned to a structure.
///
/// Lower identifiers were created earlier and resolve their attacks first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EngineId(u64);

impl EngineId {
    /// Creates a new engine identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Losses suffered by one side during an action phase.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SideLosses {
    /// Walkers of the opposing side that reached this side's edge.
    pub lives_lost: u32,
    /// Currency-equivalent value of structure health this side lost.
    pub resources_lost: f64,
    /// Cells where one of this side's structures was destroyed.
    pub structures_lost: BTreeSet<CellCoord>,
}

/// Aggregate statistics produced by a resolved action phase.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Losses suffered by the bottom side.
    pub bottom: SideLosses,
    /// Losses suffered by the top side.
    pub top: SideLosses,
    /// Cells occupied by the lead walker group at the start of every frame.
    pub lead_path: Vec<CellCoord>,
    /// Number of frames simulated before the last group resolved.
    pub frames: u32,
}

impl Outcome {
    /// Losses suffered by `side`.
    #[must_use]
    pub const fn losses(&self, side: Side) -> &SideLosses {
        match side {
            Side::Bottom => &self.bottom,
            Side::Top => &self.top,
        }
    }

    /// Mutable access to the losses suffered by `side`.
    pub fn losses_mut(&mut self, side: Side) -> &mut SideLosses {
        match side {
            Side::Bottom => &mut self.bottom,
            Side::Top => &mut self.top,
        }
    }
}
