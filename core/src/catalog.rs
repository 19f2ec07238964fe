//! Static unit statistics loaded once per process and shared by every simulation.

use std::{fmt, io::Read};

use serde::{Deserialize, Serialize};

/// Every unit type that can occupy the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Cheap blocking structure without an attack.
    #[serde(alias = "FF")]
    Wall,
    /// Structure that shields nearby allied walkers.
    #[serde(alias = "EF")]
    Support,
    /// Structure that attacks enemy walkers in range.
    #[serde(alias = "DF")]
    Turret,
    /// Fast, fragile walker.
    #[serde(alias = "PI")]
    Scout,
    /// Slow walker with long range that excels against structures.
    #[serde(alias = "EI")]
    Demolisher,
    /// Very slow walker restricted to mobile targets.
    #[serde(alias = "SI")]
    Interceptor,
}

impl UnitKind {
    /// Every unit kind in catalog order.
    pub const ALL: [UnitKind; 6] = [
        UnitKind::Wall,
        UnitKind::Support,
        UnitKind::Turret,
        UnitKind::Scout,
        UnitKind::Demolisher,
        UnitKind::Interceptor,
    ];

    /// Capability table entry describing how the kind participates in combat.
    #[must_use]
    pub const fn capabilities(self) -> Capabilities {
        match self {
            Self::Wall => Capabilities {
                category: Category::Wall,
                targets_structures: false,
                shieldable: false,
            },
            Self::Support | Self::Turret => Capabilities {
                category: Category::Tower,
                targets_structures: false,
                shieldable: false,
            },
            Self::Scout | Self::Demolisher => Capabilities {
                category: Category::Walker,
                targets_structures: true,
                shieldable: true,
            },
            Self::Interceptor => Capabilities {
                category: Category::Walker,
                targets_structures: false,
                shieldable: true,
            },
        }
    }

    /// Reports whether the kind occupies a cell as a stationary structure.
    #[must_use]
    pub const fn is_structure(self) -> bool {
        !matches!(self.capabilities().category, Category::Walker)
    }

    /// Short code used by the live engine for the kind.
    #[must_use]
    pub const fn shorthand(self) -> &'static str {
        match self {
            Self::Wall => "FF",
            Self::Support => "EF",
            Self::Turret => "DF",
            Self::Scout => "PI",
            Self::Demolisher => "EI",
            Self::Interceptor => "SI",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Wall => 0,
            Self::Support => 1,
            Self::Turret => 2,
            Self::Scout => 3,
            Self::Demolisher => 4,
            Self::Interceptor => 5,
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.shorthand())
    }
}

/// Broad role of a unit kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Passive blocking structure.
    Wall,
    /// Structure with an active ability (attack or shield).
    Tower,
    /// Mobile unit that walks toward an edge.
    Walker,
}

/// Combat capabilities attached to a unit kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Capabilities {
    /// Broad role of the kind.
    pub category: Category,
    /// Whether the kind may ever select structures as targets.
    pub targets_structures: bool,
    /// Whether supports may shield the kind.
    pub shieldable: bool,
}

/// Immutable statistics for one variant (base or upgraded) of a unit kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitStats {
    /// Currency required to place the variant; upgraded variants hold the cumulative cost.
    pub cost: f64,
    /// Health a freshly placed unit starts with.
    pub start_health: f64,
    /// Cells travelled per frame; fractional speeds move on a subset of frames.
    pub speed: f64,
    /// Euclidean attack radius.
    pub attack_range: f64,
    /// Damage dealt per hit to mobile units, absent when the variant cannot hit them.
    pub damage_vs_mobile: Option<f64>,
    /// Damage dealt per hit to structures, absent when the variant cannot hit them.
    pub damage_vs_structure: Option<f64>,
    /// Euclidean radius of the shield aura.
    pub shield_range: f64,
    /// Base shield granted to each walker in range.
    pub shield_per_unit: f64,
    /// Additional shield per row separating the support from its owner's back row.
    pub shield_bonus_per_row: f64,
}

impl UnitStats {
    const EMPTY: Self = Self {
        cost: 0.0,
        start_health: 0.0,
        speed: 0.0,
        attack_range: 0.0,
        damage_vs_mobile: None,
        damage_vs_structure: None,
        shield_range: 0.0,
        shield_per_unit: 0.0,
        shield_bonus_per_row: 0.0,
    };

    /// Reports whether a structure of this variant attacks walkers.
    #[must_use]
    pub const fn attacks_mobile(&self) -> bool {
        self.damage_vs_mobile.is_some()
    }

    /// Reports whether a structure of this variant projects a shield aura.
    #[must_use]
    pub fn provides_shield(&self) -> bool {
        self.shield_per_unit > 0.0 || self.shield_bonus_per_row > 0.0
    }

    fn with_overrides(mut self, upgrade: &UpgradeEntry) -> Self {
        let overrides = [
            (&mut self.cost, upgrade.cost),
            (&mut self.start_health, upgrade.start_health),
            (&mut self.speed, upgrade.speed),
            (&mut self.attack_range, upgrade.attack_range),
            (&mut self.shield_range, upgrade.shield_range),
            (&mut self.shield_per_unit, upgrade.shield_per_unit),
            (&mut self.shield_bonus_per_row, upgrade.shield_bonus_per_row),
        ];
        for (slot, value) in overrides {
            if let Some(value) = value {
                *slot = value;
            }
        }
        if upgrade.damage_vs_mobile.is_some() {
            self.damage_vs_mobile = upgrade.damage_vs_mobile;
        }
        if upgrade.damage_vs_structure.is_some() {
            self.damage_vs_structure = upgrade.damage_vs_structure;
        }
        self
    }
}

/// Engine rules that are not tied to a single unit kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Mechanics {
    /// Radius of the splash triggered by a blocked walker group.
    pub self_destruct_radius: f64,
    /// Lets walker kinds restricted to mobile targets hit structures when their
    /// stats carry structure damage.
    pub restricted_walkers_damage_structures: bool,
}

impl Default for Mechanics {
    fn default() -> Self {
        Self {
            self_destruct_radius: 1.5,
            restricted_walkers_damage_structures: false,
        }
    }
}

/// Base and upgraded statistics for every unit kind plus the engine mechanics.
#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    base: [UnitStats; 6],
    upgraded: [UnitStats; 6],
    mechanics: Mechanics,
}

impl Catalog {
    /// Parses a catalog from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    /// Parses a catalog from a JSON reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_reader(reader)?;
        Self::from_file(file)
    }

    /// Built-in statistics mirroring the live engine's default configuration.
    #[must_use]
    pub fn standard() -> Self {
        let base = [
            UnitStats {
                cost: 1.0,
                start_health: 60.0,
                ..UnitStats::EMPTY
            },
            UnitStats {
                cost: 4.0,
                start_health: 30.0,
                shield_range: 6.0,
                shield_per_unit: 3.0,
                ..UnitStats::EMPTY
            },
            UnitStats {
                cost: 2.0,
                start_health: 75.0,
                attack_range: 2.5,
                damage_vs_mobile: Some(5.0),
                ..UnitStats::EMPTY
            },
            UnitStats {
                cost: 1.0,
                start_health: 15.0,
                speed: 1.0,
                attack_range: 3.5,
                damage_vs_mobile: Some(2.0),
                damage_vs_structure: Some(2.0),
                ..UnitStats::EMPTY
            },
            UnitStats {
                cost: 3.0,
                start_health: 5.0,
                speed: 0.5,
                attack_range: 4.5,
                damage_vs_mobile: Some(8.0),
                damage_vs_structure: Some(8.0),
                ..UnitStats::EMPTY
            },
            UnitStats {
                cost: 1.0,
                start_health: 40.0,
                speed: 0.25,
                attack_range: 4.5,
                damage_vs_mobile: Some(20.0),
                damage_vs_structure: Some(20.0),
                ..UnitStats::EMPTY
            },
        ];
        let mut upgraded = base;
        upgraded[UnitKind::Wall.index()] = UnitStats {
            cost: 2.0,
            start_health: 120.0,
            ..base[UnitKind::Wall.index()]
        };
        upgraded[UnitKind::Support.index()] = UnitStats {
            cost: 6.0,
            shield_range: 7.0,
            shield_per_unit: 2.0,
            shield_bonus_per_row: 0.34,
            ..base[UnitKind::Support.index()]
        };
        upgraded[UnitKind::Turret.index()] = UnitStats {
            cost: 6.0,
            attack_range: 3.5,
            damage_vs_mobile: Some(16.0),
            ..base[UnitKind::Turret.index()]
        };

        Self {
            base,
            upgraded,
            mechanics: Mechanics::default(),
        }
    }

    /// Statistics for the requested variant of `kind`.
    #[must_use]
    pub const fn stats(&self, kind: UnitKind, upgraded: bool) -> &UnitStats {
        if upgraded {
            &self.upgraded[kind.index()]
        } else {
            &self.base[kind.index()]
        }
    }

    /// Statistics for the base variant of `kind`.
    #[must_use]
    pub const fn base(&self, kind: UnitKind) -> &UnitStats {
        self.stats(kind, false)
    }

    /// Statistics for the upgraded variant of `kind`.
    #[must_use]
    pub const fn upgraded(&self, kind: UnitKind) -> &UnitStats {
        self.stats(kind, true)
    }

    /// Additional currency required to upgrade an existing `kind`.
    #[must_use]
    pub fn upgrade_cost(&self, kind: UnitKind) -> f64 {
        self.upgraded(kind).cost - self.base(kind).cost
    }

    /// Engine rules applied by every simulation sharing this catalog.
    #[must_use]
    pub const fn mechanics(&self) -> &Mechanics {
        &self.mechanics
    }

    /// Returns the catalog with its mechanics replaced.
    #[must_use]
    pub fn with_mechanics(mut self, mechanics: Mechanics) -> Self {
        self.mechanics = mechanics;
        self
    }

    fn from_file(file: CatalogFile) -> Result<Self, CatalogError> {
        let mut base: [Option<UnitStats>; 6] = [None; 6];
        let mut upgraded: [Option<UnitStats>; 6] = [None; 6];

        for entry in file.units {
            let slot = entry.kind.index();
            if base[slot].is_some() {
                return Err(CatalogError::DuplicateKind(entry.kind));
            }

            let stats = entry.stats();
            let upgraded_stats = entry
                .upgrade
                .as_ref()
                .map_or(stats, |upgrade| stats.with_overrides(upgrade));
            validate(entry.kind, &stats)?;
            validate(entry.kind, &upgraded_stats)?;

            base[slot] = Some(stats);
            upgraded[slot] = Some(upgraded_stats);
        }

        let mut catalog = Self {
            base: [UnitStats::EMPTY; 6],
            upgraded: [UnitStats::EMPTY; 6],
            mechanics: file.mechanics,
        };
        for kind in UnitKind::ALL {
            let slot = kind.index();
            catalog.base[slot] = base[slot].ok_or(CatalogError::MissingKind(kind))?;
            catalog.upgraded[slot] = upgraded[slot].ok_or(CatalogError::MissingKind(kind))?;
        }

        if !(catalog.mechanics.self_destruct_radius >= 0.0) {
            return Err(CatalogError::InvalidMechanics {
                field: "selfDestructRadius",
                value: catalog.mechanics.self_destruct_radius,
            });
        }

        Ok(catalog)
    }
}

fn validate(kind: UnitKind, stats: &UnitStats) -> Result<(), CatalogError> {
    let invalid = |stat: &'static str, value: f64| CatalogError::InvalidStat { kind, stat, value };

    if !(stats.start_health > 0.0) {
        return Err(invalid("startHealth", stats.start_health));
    }
    if !(stats.cost >= 0.0) {
        return Err(invalid("cost", stats.cost));
    }
    if !kind.is_structure() && !(stats.speed > 0.0) {
        return Err(invalid("speed", stats.speed));
    }
    if !(stats.attack_range >= 0.0) {
        return Err(invalid("attackRange", stats.attack_range));
    }
    if !(stats.shield_range >= 0.0) {
        return Err(invalid("shieldRange", stats.shield_range));
    }
    Ok(())
}

/// Errors raised while loading a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog document could not be parsed.
    #[error("could not parse catalog: {0}")]
    Json(#[from] serde_json::Error),
    /// A unit kind was listed more than once.
    #[error("unit kind {0} is listed more than once")]
    DuplicateKind(UnitKind),
    /// A unit kind was missing from the document.
    #[error("unit kind {0} is missing from the catalog")]
    MissingKind(UnitKind),
    /// A statistic held a value the simulator cannot work with.
    #[error("unit kind {kind} has invalid {stat}: {value}")]
    InvalidStat {
        /// Kind carrying the invalid statistic.
        kind: UnitKind,
        /// Name of the statistic as spelled in the document.
        stat: &'static str,
        /// Offending value.
        value: f64,
    },
    /// A mechanics field held an unusable value.
    #[error("invalid mechanics {field}: {value}")]
    InvalidMechanics {
        /// Name of the field as spelled in the document.
        field: &'static str,
        /// Offending value.
        value: f64,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogFile {
    units: Vec<UnitEntry>,
    #[serde(default)]
    mechanics: Mechanics,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnitEntry {
    kind: UnitKind,
    #[serde(default)]
    cost: f64,
    start_health: f64,
    #[serde(default)]
    speed: f64,
    #[serde(default)]
    attack_range: f64,
    #[serde(default, alias = "attackDamageWalker")]
    damage_vs_mobile: Option<f64>,
    #[serde(default, alias = "attackDamageTower")]
    damage_vs_structure: Option<f64>,
    #[serde(default)]
    shield_range: f64,
    #[serde(default)]
    shield_per_unit: f64,
    #[serde(default, alias = "shieldBonusPerY")]
    shield_bonus_per_row: f64,
    #[serde(default)]
    upgrade: Option<UpgradeEntry>,
}

impl UnitEntry {
    fn stats(&self) -> UnitStats {
        UnitStats {
            cost: self.cost,
            start_health: self.start_health,
            speed: self.speed,
            attack_range: self.attack_range,
            damage_vs_mobile: self.damage_vs_mobile,
            damage_vs_structure: self.damage_vs_structure,
            shield_range: self.shield_range,
            shield_per_unit: self.shield_per_unit,
            shield_bonus_per_row: self.shield_bonus_per_row,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct UpgradeEntry {
    cost: Option<f64>,
    start_health: Option<f64>,
    speed: Option<f64>,
    attack_range: Option<f64>,
    #[serde(alias = "attackDamageWalker")]
    damage_vs_mobile: Option<f64>,
    #[serde(alias = "attackDamageTower")]
    damage_vs_structure: Option<f64>,
    shield_range: Option<f64>,
    shield_per_unit: Option<f64>,
    #[serde(alias = "shieldBonusPerY")]
    shield_bonus_per_row: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "units": [
            { "kind": "FF", "cost": 1, "startHealth": 60, "upgrade": { "cost": 2, "startHealth": 120 } },
            { "kind": "support", "cost": 4, "startHealth": 30, "shieldRange": 6, "shieldPerUnit": 3,
              "upgrade": { "shieldBonusPerY": 0.3 } },
            { "kind": "turret", "cost": 2, "startHealth": 75, "attackRange": 2.5, "attackDamageWalker": 5 },
            { "kind": "scout", "cost": 1, "startHealth": 15, "speed": 1, "attackRange": 3.5,
              "damageVsMobile": 2, "damageVsStructure": 2 },
            { "kind": "demolisher", "cost": 3, "startHealth": 5, "speed": 0.5, "attackRange": 4.5,
              "damageVsMobile": 8, "damageVsStructure": 8 },
            { "kind": "interceptor", "cost": 1, "startHealth": 40, "speed": 0.25, "attackRange": 4.5,
              "damageVsMobile": 20 }
        ],
        "mechanics": { "restrictedWalkersDamageStructures": true }
    }"#;

    #[test]
    fn upgraded_variant_merges_overrides_onto_base() {
        let catalog = Catalog::from_json_str(MINIMAL).expect("catalog parses");

        let wall = catalog.upgraded(UnitKind::Wall);
        assert!((wall.start_health - 120.0).abs() < f64::EPSILON);
        assert!((catalog.upgrade_cost(UnitKind::Wall) - 1.0).abs() < f64::EPSILON);

        let support = catalog.upgraded(UnitKind::Support);
        assert!((support.shield_per_unit - 3.0).abs() < f64::EPSILON);
        assert!((support.shield_bonus_per_row - 0.3).abs() < f64::EPSILON);

        assert_eq!(catalog.base(UnitKind::Turret).damage_vs_mobile, Some(5.0));
        assert_eq!(catalog.upgraded(UnitKind::Scout), catalog.base(UnitKind::Scout));
        assert!(catalog.mechanics().restricted_walkers_damage_structures);
        assert!((catalog.mechanics().self_destruct_radius - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_kind_is_rejected() {
        let json = r#"{ "units": [ { "kind": "wall", "startHealth": 60 } ] }"#;
        let error = Catalog::from_json_str(json).expect_err("incomplete catalog");
        assert!(matches!(error, CatalogError::MissingKind(UnitKind::Support)));
    }

    #[test]
    fn duplicate_kind_is_rejected() {
        let json = r#"{ "units": [
            { "kind": "wall", "startHealth": 60 },
            { "kind": "FF", "startHealth": 60 }
        ] }"#;
        let error = Catalog::from_json_str(json).expect_err("duplicate kind");
        assert!(matches!(error, CatalogError::DuplicateKind(UnitKind::Wall)));
    }

    #[test]
    fn stationary_walker_is_rejected() {
        let json = MINIMAL.replace("\"speed\": 0.25", "\"speed\": 0");
        let error = Catalog::from_json_str(&json).expect_err("walker without speed");
        assert!(matches!(
            error,
            CatalogError::InvalidStat {
                kind: UnitKind::Interceptor,
                stat: "speed",
                ..
            }
        ));
    }

    #[test]
    fn capability_table_restricts_interceptors() {
        let capabilities = UnitKind::Interceptor.capabilities();
        assert_eq!(capabilities.category, Category::Walker);
        assert!(!capabilities.targets_structures);
        assert!(UnitKind::Demolisher.capabilities().targets_structures);
        assert!(UnitKind::Support.is_structure());
        assert!(!UnitKind::Scout.is_structure());
    }

    #[test]
    fn standard_catalog_passes_validation() {
        let catalog = Catalog::standard();
        for kind in UnitKind::ALL {
            assert!(validate(kind, catalog.base(kind)).is_ok());
            assert!(validate(kind, catalog.upgraded(kind)).is_ok());
        }
        assert!(catalog.base(UnitKind::Turret).attacks_mobile());
        assert!(catalog.base(UnitKind::Support).provides_shield());
        assert!(!catalog.base(UnitKind::Wall).provides_shield());
    }
}
