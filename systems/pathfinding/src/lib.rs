#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic shortest-path search that routes walker groups toward their target edge.
//!
//! The search is a uniform-cost expansion over open arena cells guided by
//! the target edge's distance metric. When the edge cannot be reached the
//! route leads to the deepest reachable cell instead, where the group will
//! self-destruct. Ordering among equally short candidates is delegated to a
//! [`FrontierPolicy`] so alternate tie-break rules can be swapped in.

use std::{
    cmp::{Ordering, Reverse},
    collections::{BinaryHeap, VecDeque},
    fmt,
};

use lanesim_core::{Axis, CellCoord, Edge, BOARD_SIZE};
use lanesim_world::Board;

const UNVISITED: i32 = i32::MAX;

/// Search node exposed to a [`FrontierPolicy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrontierNode {
    /// Cell reached by the node.
    pub cell: CellCoord,
    /// Steps taken from the start cell.
    pub steps: i32,
    /// Remaining distance to the target edge.
    pub heuristic: i32,
    /// Two points when the step changed axis, one more when it lowered the heuristic.
    pub idealness: u8,
    /// Monotonic insertion counter; the start node is zero.
    pub insertion: usize,
}

impl FrontierNode {
    /// Estimated total route length through the node.
    #[must_use]
    pub const fn estimate(&self) -> i32 {
        self.steps + self.heuristic
    }
}

/// Ordering applied to frontier nodes; the smallest key is expanded first.
pub trait FrontierPolicy {
    /// Sort key derived from a node.
    type Key: Ord + Copy + fmt::Debug;

    /// Derives the sort key for `node`.
    fn key(&self, node: &FrontierNode) -> Self::Key;
}

/// Canonical ordering: shortest estimate, then axis switch, then heuristic
/// improvement, then most recently inserted.
#[derive(Clone, Copy, Debug, Default)]
pub struct CanonicalPolicy;

impl FrontierPolicy for CanonicalPolicy {
    type Key = (i32, Reverse<u8>, Reverse<usize>);

    fn key(&self, node: &FrontierNode) -> Self::Key {
        (node.estimate(), Reverse(node.idealness), Reverse(node.insertion))
    }
}

/// Alternate ordering: shortest estimate, then earliest inserted.
#[derive(Clone, Copy, Debug, Default)]
pub struct InsertionPolicy;

impl FrontierPolicy for InsertionPolicy {
    type Key = (i32, usize);

    fn key(&self, node: &FrontierNode) -> Self::Key {
        (node.estimate(), node.insertion)
    }
}

/// Path search that reuses its scratch buffers between queries.
#[derive(Debug)]
pub struct Pathfinder<P: FrontierPolicy = CanonicalPolicy> {
    policy: P,
    steps: Vec<i32>,
    nodes: Vec<SearchNode>,
    frontier: BinaryHeap<Reverse<(P::Key, usize)>>,
}

impl Default for Pathfinder<CanonicalPolicy> {
    fn default() -> Self {
        Self::with_policy(CanonicalPolicy)
    }
}

impl Pathfinder<CanonicalPolicy> {
    /// Creates a pathfinder using the canonical tie-break policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: FrontierPolicy> Pathfinder<P> {
    /// Creates a pathfinder using the provided tie-break policy.
    #[must_use]
    pub fn with_policy(policy: P) -> Self {
        let cell_count = usize::try_from(BOARD_SIZE * BOARD_SIZE).unwrap_or(0);
        Self {
            policy,
            steps: vec![UNVISITED; cell_count],
            nodes: Vec::new(),
            frontier: BinaryHeap::new(),
        }
    }

    /// Computes the route from `start` toward `target`, excluding `start`.
    ///
    /// `last_axis` is the axis of the mover's previous step. The route ends on
    /// the target edge when the edge is reachable; otherwise it ends on the
    /// reachable cell deepest into the arena, measured from the mover's own
    /// back row. A blocked start, or a start already on the edge, yields an
    /// empty route.
    pub fn find_path(
        &mut self,
        board: &Board,
        start: CellCoord,
        target: Edge,
        last_axis: Axis,
    ) -> VecDeque<CellCoord> {
        if !board.is_open(start) || target.contains(start) {
            return VecDeque::new();
        }

        self.steps.fill(UNVISITED);
        self.nodes.clear();
        self.frontier.clear();

        let own_side = target.side().opponent();
        let start_node = SearchNode {
            frontier: FrontierNode {
                cell: start,
                steps: 0,
                heuristic: target.distance(start),
                idealness: 0,
                insertion: 0,
            },
            axis: last_axis,
            parent: None,
        };
        self.set_steps(start, 0);
        let _ = self.push(start_node);

        let mut on_edge: Option<usize> = None;
        let mut deepest = 0;
        let mut deepest_depth = own_side.rows_from_back(start.row());

        while on_edge.is_none() {
            let Some(Reverse((_, popped_index))) = self.frontier.pop() else {
                break;
            };
            let popped = self.nodes[popped_index];
            let Some(steps) = self.steps_at(popped.frontier.cell) else {
                continue;
            };

            for neighbor in popped.frontier.cell.neighbors() {
                if !board.is_open(neighbor) {
                    continue;
                }
                let Some(known) = self.steps_at(neighbor) else {
                    continue;
                };
                if known <= steps + 1 {
                    continue;
                }
                self.set_steps(neighbor, steps + 1);

                let heuristic = target.distance(neighbor);
                let axis = popped.frontier.cell.axis_to(neighbor);
                let mut idealness = 0;
                if axis != popped.axis {
                    idealness += 2;
                }
                if heuristic < popped.frontier.heuristic {
                    idealness += 1;
                }

                let index = self.push(SearchNode {
                    frontier: FrontierNode {
                        cell: neighbor,
                        steps: steps + 1,
                        heuristic,
                        idealness,
                        insertion: self.nodes.len(),
                    },
                    axis,
                    parent: Some(popped_index),
                });

                if heuristic == 0 {
                    on_edge = Some(match on_edge {
                        Some(existing) if self.compare(existing, index) != Ordering::Greater => {
                            existing
                        }
                        _ => index,
                    });
                }

                let depth = own_side.rows_from_back(neighbor.row());
                if depth > deepest_depth
                    || (depth == deepest_depth
                        && heuristic < self.nodes[deepest].frontier.heuristic)
                {
                    deepest = index;
                    deepest_depth = depth;
                }
            }
        }

        self.backtrace(on_edge.unwrap_or(deepest))
    }

    fn push(&mut self, node: SearchNode) -> usize {
        let index = self.nodes.len();
        let key = self.policy.key(&node.frontier);
        self.nodes.push(node);
        self.frontier.push(Reverse((key, index)));
        index
    }

    fn compare(&self, left: usize, right: usize) -> Ordering {
        let left = self.policy.key(&self.nodes[left].frontier);
        let right = self.policy.key(&self.nodes[right].frontier);
        left.cmp(&right)
    }

    fn backtrace(&self, mut index: usize) -> VecDeque<CellCoord> {
        let mut path = VecDeque::new();
        while let Some(parent) = self.nodes[index].parent {
            path.push_front(self.nodes[index].frontier.cell);
            index = parent;
        }
        path
    }

    fn steps_at(&self, cell: CellCoord) -> Option<i32> {
        slot(cell).and_then(|slot| self.steps.get(slot).copied())
    }

    fn set_steps(&mut self, cell: CellCoord, steps: i32) {
        if let Some(value) = slot(cell).and_then(|slot| self.steps.get_mut(slot)) {
            *value = steps;
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct SearchNode {
    frontier: FrontierNode,
    axis: Axis,
    parent: Option<usize>,
}

fn slot(cell: CellCoord) -> Option<usize> {
    if !cell.in_arena() {
        return None;
    }
    usize::try_from(cell.column() * BOARD_SIZE + cell.row()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(steps: i32, heuristic: i32, idealness: u8, insertion: usize) -> FrontierNode {
        FrontierNode {
            cell: CellCoord::new(13, 13),
            steps,
            heuristic,
            idealness,
            insertion,
        }
    }

    #[test]
    fn canonical_policy_ranks_estimate_then_idealness_then_recency() {
        let policy = CanonicalPolicy;
        assert!(policy.key(&node(1, 5, 0, 1)) < policy.key(&node(2, 5, 3, 2)));
        assert!(policy.key(&node(2, 5, 3, 1)) < policy.key(&node(2, 5, 2, 9)));
        assert!(policy.key(&node(2, 5, 1, 9)) < policy.key(&node(2, 5, 1, 3)));
    }

    #[test]
    fn insertion_policy_ignores_idealness() {
        let policy = InsertionPolicy;
        assert!(policy.key(&node(2, 5, 0, 1)) < policy.key(&node(2, 5, 3, 2)));
    }

    #[test]
    fn slots_exist_only_inside_the_arena() {
        assert!(slot(CellCoord::new(13, 0)).is_some());
        assert!(slot(CellCoord::new(0, 0)).is_none());
        assert!(slot(CellCoord::new(-1, 14)).is_none());
    }
}
