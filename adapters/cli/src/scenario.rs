use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};

use anyhow::Context as _;
use lanesim_core::{CellCoord, EngineId, Placement};
use lanesim_world::Board;
use serde::{Deserialize, Serialize};

/// Hypothetical turn to evaluate: a board, the engine identities of its
/// structures and the placements queued on top of it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct Scenario {
    pub(crate) board: Board,
    pub(crate) tracked_ids: Vec<TrackedStructure>,
    pub(crate) placements: Vec<Placement>,
}

/// Engine identity attached to the structure on `cell`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct TrackedStructure {
    pub(crate) cell: CellCoord,
    pub(crate) id: EngineId,
}

impl Scenario {
    /// Reads a scenario from a JSON file.
    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open scenario {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to parse scenario {}", path.display()))
    }

    /// Engine identities keyed by cell; later entries win on duplicates.
    pub(crate) fn tracked(&self) -> BTreeMap<CellCoord, EngineId> {
        self.tracked_ids
            .iter()
            .map(|entry| (entry.cell, entry.id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanesim_core::UnitKind;

    #[test]
    fn scenario_sections_are_optional() {
        let scenario: Scenario = serde_json::from_str("{}").expect("empty scenario parses");
        assert_eq!(scenario, Scenario::default());
    }

    #[test]
    fn scenario_parses_every_section() {
        let json = r#"{
            "board": [ { "cell": { "column": 13, "row": 12 }, "kind": "turret", "health": 75 } ],
            "trackedIds": [ { "cell": { "column": 13, "row": 12 }, "id": 41 } ],
            "placements": [ { "cell": { "column": 13, "row": 0 }, "action": { "spawn": "PI" }, "quantity": 4 } ]
        }"#;
        let scenario: Scenario = serde_json::from_str(json).expect("scenario parses");

        assert_eq!(scenario.board.len(), 1);
        assert_eq!(
            scenario.tracked().get(&CellCoord::new(13, 12)),
            Some(&EngineId::new(41))
        );
        assert_eq!(
            scenario.placements,
            vec![Placement::spawn(CellCoord::new(13, 0), UnitKind::Scout, 4)]
        );
    }
}
