#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame-by-frame replica of a single action phase.
//!
//! A [`CombatSimulator`] is built from a board snapshot, receives the
//! placements of a hypothetical turn and then [`CombatSimulator::run`]s every
//! frame until no walker group remains. Each frame appends the lead group's
//! cell to the visited path, moves groups whose speed lets them step, applies
//! support shields, resolves tower and walker attacks, clears the dead and
//! re-routes every group when a structure disappeared.

use std::collections::BTreeMap;

use lanesim_core::{
    Catalog, CellCoord, Edge, EngineId, Outcome, Placement, PlacementAction, PlacementError,
    UnitKind, BOARD_SIZE,
};
use lanesim_system_pathfinding::{CanonicalPolicy, FrontierPolicy, Pathfinder};
use lanesim_system_targeting::{
    select_mobile_target, select_structure_target, select_target, Attacker, Target,
};
use lanesim_world::{Board, MobileGroup};
use tracing::{debug, trace};

/// Deterministic action-phase simulator owning its own board and walker groups.
#[derive(Debug)]
pub struct CombatSimulator<'a, P: FrontierPolicy = CanonicalPolicy> {
    catalog: &'a Catalog,
    board: Board,
    roster: Vec<CellCoord>,
    groups: Vec<MobileGroup>,
    pathfinder: Pathfinder<P>,
    outcome: Outcome,
    frame: u32,
    routed: bool,
}

impl<'a> CombatSimulator<'a> {
    /// Creates a simulator over `board`; structures resolve in coordinate order.
    #[must_use]
    pub fn new(catalog: &'a Catalog, board: Board) -> Self {
        Self::with_tracked_ids(catalog, board, &BTreeMap::new())
    }

    /// Creates a simulator whose structures resolve in live-engine order.
    ///
    /// Structures listed in `tracked` act first, lowest identifier first.
    /// Untracked structures follow in coordinate order.
    #[must_use]
    pub fn with_tracked_ids(
        catalog: &'a Catalog,
        board: Board,
        tracked: &BTreeMap<CellCoord, EngineId>,
    ) -> Self {
        Self::with_policy(catalog, board, tracked, CanonicalPolicy)
    }
}

impl<'a, P: FrontierPolicy> CombatSimulator<'a, P> {
    /// Creates a simulator whose walker routes break ties with `policy`.
    #[must_use]
    pub fn with_policy(
        catalog: &'a Catalog,
        board: Board,
        tracked: &BTreeMap<CellCoord, EngineId>,
        policy: P,
    ) -> Self {
        let mut ranked: Vec<(EngineId, CellCoord)> = Vec::new();
        let mut untracked = Vec::new();
        for (cell, _) in board.structures() {
            match tracked.get(&cell) {
                Some(id) => ranked.push((*id, cell)),
                None => untracked.push(cell),
            }
        }
        ranked.sort_unstable();

        let mut roster: Vec<CellCoord> = ranked.into_iter().map(|(_, cell)| cell).collect();
        roster.extend(untracked);

        Self {
            catalog,
            board,
            roster,
            groups: Vec::new(),
            pathfinder: Pathfinder::with_policy(policy),
            outcome: Outcome::default(),
            frame: 0,
            routed: false,
        }
    }

    /// Board as currently mutated by placements.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Walker groups waiting for the action phase, in spawn order.
    #[must_use]
    pub fn groups(&self) -> &[MobileGroup] {
        &self.groups
    }

    /// Losses and visited cells accumulated so far.
    #[must_use]
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Structure cells in the order they resolve each frame.
    #[must_use]
    pub fn resolution_order(&self) -> &[CellCoord] {
        &self.roster
    }

    /// Places `quantity` units of `kind` on `cell`, ignoring cost.
    ///
    /// Walkers form a group heading for the edge opposite their spawn edge.
    /// Structures are built on an empty cell and resolve after every
    /// structure already present. A rejected request leaves the simulator
    /// untouched.
    pub fn spawn_units(
        &mut self,
        cell: CellCoord,
        kind: UnitKind,
        quantity: u32,
    ) -> Result<(), PlacementError> {
        self.check_request(quantity)?;
        if !cell.in_arena() {
            return Err(PlacementError::OutOfArena);
        }

        if kind.is_structure() {
            if self.groups.iter().any(|group| group.cell() == cell) {
                return Err(PlacementError::BlockedByUnits);
            }
            self.board.build(kind, cell, self.catalog)?;
            self.roster.push(cell);
            self.routed = false;
            return Ok(());
        }

        if self.board.get(cell).is_some() {
            return Err(PlacementError::Occupied);
        }
        let spawn_edge = Edge::spawn_edge_of(cell).ok_or(PlacementError::NotOnEdge)?;
        let start_health = self.catalog.base(kind).start_health;
        self.groups.push(MobileGroup::new(
            kind,
            quantity,
            start_health,
            cell,
            spawn_edge.opposite(),
        ));
        self.routed = false;
        Ok(())
    }

    /// Applies a single placement request.
    ///
    /// Every action, removals and upgrades included, requires a positive
    /// quantity and is rejected once the first frame has resolved.
    pub fn apply(&mut self, placement: &Placement) -> Result<(), PlacementError> {
        let result = self
            .check_request(placement.quantity)
            .and_then(|()| match placement.action {
                PlacementAction::Spawn(kind) => {
                    self.spawn_units(placement.cell, kind, placement.quantity)
                }
                PlacementAction::Remove => self.remove_structure(placement.cell),
                PlacementAction::Upgrade => self.board.upgrade(placement.cell, self.catalog),
            });
        match result {
            Ok(()) => self.routed = false,
            Err(error) => {
                debug!(cell = %placement.cell, action = ?placement.action, %error, "placement rejected");
            }
        }
        result
    }

    /// Applies placements in order, reporting each request's result.
    ///
    /// Rejected requests are skipped; later requests still apply.
    pub fn apply_all(&mut self, placements: &[Placement]) -> Vec<Result<(), PlacementError>> {
        placements
            .iter()
            .map(|placement| self.apply(placement))
            .collect()
    }

    fn check_request(&self, quantity: u32) -> Result<(), PlacementError> {
        if self.frame > 0 {
            return Err(PlacementError::PhaseStarted);
        }
        if quantity == 0 {
            return Err(PlacementError::InvalidQuantity);
        }
        Ok(())
    }

    fn remove_structure(&mut self, cell: CellCoord) -> Result<(), PlacementError> {
        if !cell.in_arena() {
            return Err(PlacementError::OutOfArena);
        }
        if self.board.remove(cell).is_some() {
            self.roster.retain(|entry| *entry != cell);
        }
        Ok(())
    }

    /// Resolves the action phase until every walker group has arrived,
    /// self-destructed or died, and reports the accumulated losses.
    #[must_use]
    pub fn run(mut self) -> Outcome {
        while self.step() {}

        debug!(
            frames = self.frame,
            bottom_lives_lost = self.outcome.bottom.lives_lost,
            top_lives_lost = self.outcome.top.lives_lost,
            "action phase resolved"
        );
        self.outcome
    }

    /// Resolves a single frame and reports whether walker groups remain.
    ///
    /// Placements are rejected with [`PlacementError::PhaseStarted`] once a
    /// frame has resolved.
    pub fn step(&mut self) -> bool {
        if self.groups.is_empty() {
            return false;
        }
        if !self.routed {
            self.repath();
            self.routed = true;
        }

        self.frame += 1;
        let frame = self.frame;
        trace!(frame, groups = self.groups.len(), "frame started");

        self.outcome.lead_path.push(self.groups[0].cell());
        self.move_groups(frame);
        self.apply_shields();
        self.structure_attacks();
        self.mobile_attacks();
        if self.resolve_deaths() {
            self.repath();
        }

        self.outcome.frames = frame;
        !self.groups.is_empty()
    }

    fn repath(&mut self) {
        let Self {
            board,
            groups,
            pathfinder,
            ..
        } = self;
        for group in groups.iter_mut() {
            let path = pathfinder.find_path(board, group.cell(), group.target(), group.last_axis());
            group.set_path(path);
        }
        trace!(groups = groups.len(), "paths recomputed");
    }

    fn move_groups(&mut self, frame: u32) {
        let catalog = self.catalog;
        let mut index = 0;
        while index < self.groups.len() {
            let group = &mut self.groups[index];
            let speed = catalog.base(group.kind()).speed;
            if group.living_members() == 0 || !moves_on_frame(frame, speed) {
                index += 1;
                continue;
            }
            if group.advance().is_some() {
                index += 1;
                continue;
            }

            let group = self.groups.remove(index);
            if group.target().contains(group.cell()) {
                let defender = group.target().side();
                let arrived = u32::try_from(group.living_members()).unwrap_or(u32::MAX);
                self.outcome.losses_mut(defender).lives_lost += arrived;
                trace!(cell = %group.cell(), kind = %group.kind(), arrived, "group scored");
            } else {
                self.self_destruct(&group);
            }
        }
    }

    fn self_destruct(&mut self, group: &MobileGroup) {
        let radius = self.catalog.mechanics().self_destruct_radius;
        let members = group.living_members();
        let damage = self.catalog.base(group.kind()).start_health * members as f64;
        let origin = group.cell();
        let side = group.side();
        debug!(cell = %origin, kind = %group.kind(), members, damage, "group self-destructed");

        let reach = radius.max(0.0).floor().min(f64::from(BOARD_SIZE)) as i32;
        for column in origin.column() - reach..=origin.column() + reach {
            for row in origin.row() - reach..=origin.row() + reach {
                let cell = CellCoord::new(column, row);
                if cell.owner() == side || origin.distance(cell) > radius {
                    continue;
                }
                self.damage_structure(cell, damage);
            }
        }

        for other in &mut self.groups {
            if other.side() != side && origin.distance(other.cell()) <= radius {
                other.take_splash(damage);
            }
        }
    }

    fn apply_shields(&mut self) {
        let catalog = self.catalog;
        for cell in &self.roster {
            let Some(structure) = self.board.get(*cell) else {
                continue;
            };
            if structure.health() <= 0.0 {
                continue;
            }
            let stats = catalog.stats(structure.kind(), structure.upgraded());
            if !stats.provides_shield() {
                continue;
            }

            let owner = cell.owner();
            let amount = stats.shield_per_unit
                + stats.shield_bonus_per_row * f64::from(owner.rows_from_back(cell.row()));
            for group in &mut self.groups {
                if group.side() != owner
                    || !group.kind().capabilities().shieldable
                    || cell.distance(group.cell()) > stats.shield_range
                {
                    continue;
                }
                if group.apply_shield(*cell, amount) {
                    trace!(support = %cell, group = %group.cell(), amount, "shield applied");
                }
            }
        }
    }

    fn structure_attacks(&mut self) {
        let catalog = self.catalog;
        for cell in &self.roster {
            let Some(structure) = self.board.get(*cell) else {
                continue;
            };
            if structure.health() <= 0.0 {
                continue;
            }
            let stats = catalog.stats(structure.kind(), structure.upgraded());
            let Some(damage) = stats.damage_vs_mobile else {
                continue;
            };

            let attacker = Attacker::new(*cell, cell.owner(), stats.attack_range);
            if let Some(index) = select_mobile_target(&self.groups, &attacker) {
                self.groups[index].take_hit(damage);
            }
        }
    }

    fn mobile_attacks(&mut self) {
        let catalog = self.catalog;
        let mechanics = catalog.mechanics();
        for index in 0..self.groups.len() {
            let group = &self.groups[index];
            let kind = group.kind();
            let stats = catalog.base(kind);
            let targets_structures = stats.damage_vs_structure.is_some()
                && (kind.capabilities().targets_structures
                    || mechanics.restricted_walkers_damage_structures);
            let targets_mobile = stats.damage_vs_mobile.is_some();
            if !targets_mobile && !targets_structures {
                continue;
            }

            let attacker = Attacker::new(group.cell(), group.side(), stats.attack_range);
            for _ in 0..self.groups[index].living_members() {
                let target = if targets_mobile {
                    select_target(&self.board, &self.groups, &attacker, targets_structures)
                } else {
                    select_structure_target(&self.board, &attacker).map(Target::Structure)
                };

                match target {
                    Some(Target::Mobile(victim)) => {
                        if let Some(damage) = stats.damage_vs_mobile {
                            self.groups[victim].take_hit(damage);
                        }
                    }
                    Some(Target::Structure(cell)) => {
                        if let Some(damage) = stats.damage_vs_structure {
                            self.damage_structure(cell, damage);
                        }
                    }
                    None => break,
                }
            }
        }
    }

    fn damage_structure(&mut self, cell: CellCoord, damage: f64) {
        let catalog = self.catalog;
        let Some(structure) = self.board.get(cell) else {
            return;
        };
        let stats = catalog.stats(structure.kind(), structure.upgraded());
        let absorbed = damage.min(structure.health()).max(0.0);
        let lost = absorbed / stats.start_health * stats.cost;
        self.outcome.losses_mut(cell.owner()).resources_lost += lost;
        let _ = self.board.damage(cell, damage);
    }

    fn resolve_deaths(&mut self) -> bool {
        let destroyed = self.board.remove_dead();
        for cell in &destroyed {
            let _ = self
                .outcome
                .losses_mut(cell.owner())
                .structures_lost
                .insert(*cell);
            debug!(cell = %cell, owner = ?cell.owner(), "structure destroyed");
        }
        if !destroyed.is_empty() {
            let board = &self.board;
            self.roster.retain(|cell| board.get(*cell).is_some());
        }

        for group in &mut self.groups {
            group.remove_dead();
        }
        self.groups.retain(|group| !group.is_empty());

        !destroyed.is_empty()
    }
}

/// Reports whether a walker with `speed` steps on `frame`, counting from one.
#[must_use]
pub fn moves_on_frame(frame: u32, speed: f64) -> bool {
    let now = (f64::from(frame) * speed).floor();
    let before = (f64::from(frame.saturating_sub(1)) * speed).floor();
    now - before > 0.0
}
