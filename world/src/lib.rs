#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for the lane simulator.
//!
//! The structure layer ([`Board`]) and the walker layer ([`MobileGroup`]) are
//! kept apart: the board exclusively owns every structure on a dense grid,
//! while walker groups carry their own coordinates and live in a flat
//! collection owned by the combat simulator.

mod board;
mod group;

pub use board::{Board, PlacedStructure, Structure};
pub use group::MobileGroup;
