//! Batches of identical walkers that spawn, move and fight together.

use std::collections::{BTreeSet, VecDeque};

use lanesim_core::{Axis, CellCoord, Edge, Side, UnitKind};

/// Walkers of one kind spawned together on the same cell.
///
/// Members share a cell and a path but track their own health. Damage from
/// single-target attacks always lands on the last living member, so dead
/// members collect at the back of the list until they are dropped.
#[derive(Clone, Debug, PartialEq)]
pub struct MobileGroup {
    kind: UnitKind,
    healths: Vec<f64>,
    cell: CellCoord,
    target: Edge,
    last_axis: Axis,
    shielded_by: BTreeSet<CellCoord>,
    path: VecDeque<CellCoord>,
}

impl MobileGroup {
    /// Creates a group of `quantity` walkers with full health heading for `target`.
    #[must_use]
    pub fn new(
        kind: UnitKind,
        quantity: u32,
        start_health: f64,
        cell: CellCoord,
        target: Edge,
    ) -> Self {
        let members = usize::try_from(quantity).unwrap_or(0);
        Self {
            kind,
            healths: vec![start_health; members],
            cell,
            target,
            last_axis: Axis::Horizontal,
            shielded_by: BTreeSet::new(),
            path: VecDeque::new(),
        }
    }

    /// Kind shared by every member.
    #[must_use]
    pub const fn kind(&self) -> UnitKind {
        self.kind
    }

    /// Cell occupied by the group.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Edge the group is trying to reach; fixed at spawn.
    #[must_use]
    pub const fn target(&self) -> Edge {
        self.target
    }

    /// Side that spawned the group.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.target.side().opponent()
    }

    /// Axis of the group's most recent step.
    #[must_use]
    pub const fn last_axis(&self) -> Axis {
        self.last_axis
    }

    /// Per-member health, living members first.
    #[must_use]
    pub fn healths(&self) -> &[f64] {
        &self.healths
    }

    /// Number of members still tracked, including those killed this frame.
    #[must_use]
    pub fn members(&self) -> usize {
        self.healths.len()
    }

    /// Number of members with positive health.
    #[must_use]
    pub fn living_members(&self) -> usize {
        self.healths.iter().filter(|health| **health > 0.0).count()
    }

    /// Reports whether every member has been dropped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.healths.is_empty()
    }

    /// Health of the member that absorbs the next single-target hit.
    ///
    /// Returns zero or less when no member is alive.
    #[must_use]
    pub fn target_health(&self) -> f64 {
        self.healths
            .iter()
            .rev()
            .copied()
            .find(|health| *health > 0.0)
            .unwrap_or(0.0)
    }

    /// Applies a single-target hit to the last living member.
    pub fn take_hit(&mut self, damage: f64) {
        if let Some(health) = self.healths.iter_mut().rev().find(|health| **health > 0.0) {
            *health -= damage;
        }
    }

    /// Applies area damage to every member.
    pub fn take_splash(&mut self, damage: f64) {
        for health in &mut self.healths {
            *health -= damage;
        }
    }

    /// Shields every member by `amount` unless the support on `source` already did.
    ///
    /// Returns whether the shield was applied.
    pub fn apply_shield(&mut self, source: CellCoord, amount: f64) -> bool {
        if !self.shielded_by.insert(source) {
            return false;
        }
        self.take_splash(-amount);
        true
    }

    /// Support cells that have already shielded the group.
    #[must_use]
    pub fn shielded_by(&self) -> &BTreeSet<CellCoord> {
        &self.shielded_by
    }

    /// Sets every member's health to zero.
    pub fn kill_all(&mut self) {
        self.healths.fill(0.0);
    }

    /// Drops members whose health reached zero or below.
    pub fn remove_dead(&mut self) {
        self.healths.retain(|health| *health > 0.0);
    }

    /// Remaining cells the group will walk through, in order.
    #[must_use]
    pub fn path(&self) -> &VecDeque<CellCoord> {
        &self.path
    }

    /// Replaces the remaining path.
    pub fn set_path(&mut self, path: VecDeque<CellCoord>) {
        self.path = path;
    }

    /// Steps onto the next path cell, recording the axis of travel.
    ///
    /// Returns the new cell, or `None` when the path is exhausted.
    pub fn advance(&mut self) -> Option<CellCoord> {
        let next = self.path.pop_front()?;
        self.last_axis = self.cell.axis_to(next);
        self.cell = next;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scouts(quantity: u32) -> MobileGroup {
        MobileGroup::new(
            UnitKind::Scout,
            quantity,
            15.0,
            CellCoord::new(13, 0),
            Edge::TopRight,
        )
    }

    #[test]
    fn hits_land_on_the_last_living_member() {
        let mut group = scouts(3);
        group.take_hit(20.0);
        group.take_hit(4.0);

        assert_eq!(group.healths(), &[15.0, 11.0, -5.0]);
        assert!((group.target_health() - 11.0).abs() < f64::EPSILON);
        assert_eq!(group.living_members(), 2);

        group.remove_dead();
        assert_eq!(group.members(), 2);
    }

    #[test]
    fn target_health_is_non_positive_once_all_members_die() {
        let mut group = scouts(2);
        group.take_splash(15.0);
        assert!(group.target_health() <= 0.0);
        group.remove_dead();
        assert!(group.is_empty());
    }

    #[test]
    fn shield_from_one_support_applies_once() {
        let mut group = scouts(2);
        let support = CellCoord::new(13, 3);

        assert!(group.apply_shield(support, 3.0));
        assert!(!group.apply_shield(support, 3.0));
        assert!(group.apply_shield(CellCoord::new(14, 3), 1.0));

        assert_eq!(group.healths(), &[19.0, 19.0]);
        assert_eq!(group.shielded_by().len(), 2);
    }

    #[test]
    fn advance_tracks_axis_and_cell() {
        let mut group = scouts(1);
        assert_eq!(group.side(), Side::Bottom);
        assert_eq!(group.last_axis(), Axis::Horizontal);

        group.set_path(VecDeque::from(vec![CellCoord::new(13, 1), CellCoord::new(14, 1)]));
        assert_eq!(group.advance(), Some(CellCoord::new(13, 1)));
        assert_eq!(group.last_axis(), Axis::Vertical);
        assert_eq!(group.advance(), Some(CellCoord::new(14, 1)));
        assert_eq!(group.last_axis(), Axis::Horizontal);
        assert_eq!(group.advance(), None);
        assert_eq!(group.cell(), CellCoord::new(14, 1));
    }

    #[test]
    fn kill_all_zeroes_every_member() {
        let mut group = scouts(4);
        group.kill_all();
        assert_eq!(group.living_members(), 0);
        group.remove_dead();
        assert!(group.is_empty());
    }
}
