//! Reader for the game engine's per-round `state.json`.
//!
//! The engine numbers worms from one; everything past this module numbers
//! them from zero.

use std::{fs, path::Path};

use anyhow::{bail, ensure, Context, Result};
use serde::{de::IgnoredAny, Deserialize};
use worms_core::{
    CellSnapshot, Coord, Profession, RoundSnapshot, SideSnapshot, Terrain, WormSnapshot,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EngineState {
    current_round: u32,
    #[serde(default)]
    consecutive_do_nothing_count: u32,
    my_player: EnginePlayer,
    opponents: Vec<EnginePlayer>,
    map: Vec<Vec<EngineCell>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnginePlayer {
    score: i32,
    current_worm_id: u8,
    #[serde(default)]
    remaining_worm_selections: u32,
    #[serde(default)]
    previous_command: Option<String>,
    worms: Vec<EngineWorm>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EngineWorm {
    id: u8,
    health: i32,
    position: EnginePosition,
    #[serde(default)]
    rounds_until_unfrozen: u32,
    profession: EngineProfession,
    #[serde(default)]
    banana_bombs: Option<EngineWeapon>,
    #[serde(default)]
    snowballs: Option<EngineWeapon>,
}

#[derive(Debug, Deserialize)]
struct EnginePosition {
    x: i32,
    y: i32,
}

#[derive(Debug, Deserialize)]
struct EngineWeapon {
    count: u32,
}

#[derive(Debug, Deserialize)]
struct EngineCell {
    x: i32,
    y: i32,
    #[serde(rename = "type")]
    terrain: EngineTerrain,
    #[serde(default)]
    powerup: Option<IgnoredAny>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum EngineTerrain {
    Dirt,
    Air,
    DeepSpace,
    Lava,
}

/// The engine spells professions in Pascal case, unlike terrain.
#[derive(Clone, Copy, Debug, Deserialize)]
enum EngineProfession {
    Agent,
    Commando,
    Technologist,
}

impl From<EngineTerrain> for Terrain {
    fn from(terrain: EngineTerrain) -> Self {
        match terrain {
            EngineTerrain::Dirt => Terrain::Dirt,
            EngineTerrain::Air => Terrain::Air,
            EngineTerrain::DeepSpace => Terrain::DeepSpace,
            EngineTerrain::Lava => Terrain::Lava,
        }
    }
}

impl From<EngineProfession> for Profession {
    fn from(profession: EngineProfession) -> Self {
        match profession {
            EngineProfession::Agent => Profession::Agent,
            EngineProfession::Commando => Profession::Commando,
            EngineProfession::Technologist => Profession::Technologist,
        }
    }
}

/// Reads and converts the state file at `path`.
pub(crate) fn load(path: &Path) -> Result<RoundSnapshot> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

/// Converts the JSON text of a state file.
pub(crate) fn parse(contents: &str) -> Result<RoundSnapshot> {
    let state: EngineState =
        serde_json::from_str(contents).context("state is not valid engine json")?;

    let Some(opponent) = state.opponents.into_iter().next() else {
        bail!("state lists no opponent");
    };

    let cells = state
        .map
        .into_iter()
        .flatten()
        .map(|cell| CellSnapshot {
            coord: Coord::new(cell.x, cell.y),
            terrain: cell.terrain.into(),
            powerup: cell.powerup.is_some(),
        })
        .collect();

    Ok(RoundSnapshot {
        round: state.current_round,
        consecutive_do_nothings: state.consecutive_do_nothing_count,
        own: side(state.my_player).context("invalid own player")?,
        opponent: side(opponent).context("invalid opponent player")?,
        cells,
    })
}

fn side(player: EnginePlayer) -> Result<SideSnapshot> {
    let mut worms = player.worms;
    worms.sort_by_key(|worm| worm.id);
    for (expected, worm) in (1u8..).zip(&worms) {
        ensure!(
            worm.id == expected,
            "worm ids must run from 1 without gaps, found {}",
            worm.id
        );
    }

    let Some(current_worm) = player.current_worm_id.checked_sub(1) else {
        bail!("current worm id must be at least 1");
    };

    Ok(SideSnapshot {
        score: player.score,
        current_worm,
        selections_remaining: player.remaining_worm_selections,
        previous_command: player.previous_command,
        worms: worms
            .into_iter()
            .map(|worm| WormSnapshot {
                position: Coord::new(worm.position.x, worm.position.y),
                health: worm.health,
                profession: worm.profession.into(),
                rounds_until_unfrozen: worm.rounds_until_unfrozen,
                bananas: worm.banana_bombs.map(|weapon| weapon.count),
                snowballs: worm.snowballs.map(|weapon| weapon.count),
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::parse;
    use worms_core::{Coord, Profession, Terrain};

    const STATE: &str = r#"{
        "currentRound": 12,
        "maxRounds": 400,
        "consecutiveDoNothingCount": 2,
        "myPlayer": {
            "id": 1,
            "score": 130,
            "health": 300,
            "currentWormId": 2,
            "remainingWormSelections": 4,
            "worms": [
                {
                    "id": 2,
                    "health": 100,
                    "position": { "x": 1, "y": 0 },
                    "diggingRange": 1,
                    "movementRange": 1,
                    "roundsUntilUnfrozen": 0,
                    "profession": "Agent",
                    "bananaBombs": { "damage": 20, "range": 5, "count": 2, "damageRadius": 2 }
                },
                {
                    "id": 1,
                    "health": 150,
                    "position": { "x": 0, "y": 0 },
                    "roundsUntilUnfrozen": 1,
                    "profession": "Commando"
                }
            ]
        },
        "opponents": [
            {
                "id": 2,
                "score": 95,
                "currentWormId": 1,
                "remainingWormSelections": 5,
                "previousCommand": "banana 1 1",
                "worms": [
                    {
                        "id": 1,
                        "health": 0,
                        "position": { "x": 1, "y": 1 },
                        "roundsUntilUnfrozen": 0,
                        "profession": "Technologist"
                    }
                ]
            }
        ],
        "map": [
            [
                { "x": 0, "y": 0, "type": "AIR", "occupier": { "id": 1, "playerId": 1 } },
                { "x": 1, "y": 0, "type": "AIR" }
            ],
            [
                { "x": 0, "y": 1, "type": "DEEP_SPACE" },
                { "x": 1, "y": 1, "type": "LAVA", "powerup": { "type": "HEALTH_PACK", "value": 10 } }
            ]
        ]
    }"#;

    #[test]
    fn converts_engine_state_to_zero_based_snapshot() {
        let snapshot = parse(STATE).expect("fixture parses");

        assert_eq!(snapshot.round, 12);
        assert_eq!(snapshot.consecutive_do_nothings, 2);
        assert_eq!(snapshot.own.score, 130);
        assert_eq!(snapshot.own.current_worm, 1);
        assert_eq!(snapshot.own.selections_remaining, 4);
        assert_eq!(snapshot.own.worms[0].profession, Profession::Commando);
        assert_eq!(snapshot.own.worms[0].rounds_until_unfrozen, 1);
        assert_eq!(snapshot.own.worms[0].bananas, None);
        assert_eq!(snapshot.own.worms[1].position, Coord::new(1, 0));
        assert_eq!(snapshot.own.worms[1].bananas, Some(2));

        assert_eq!(snapshot.opponent.current_worm, 0);
        assert_eq!(snapshot.opponent.previous_command.as_deref(), Some("banana 1 1"));
        assert_eq!(snapshot.opponent.worms[0].health, 0);

        assert_eq!(snapshot.cells.len(), 4);
        let lava = snapshot
            .cells
            .iter()
            .find(|cell| cell.coord == Coord::new(1, 1))
            .expect("lava cell");
        assert_eq!(lava.terrain, Terrain::Lava);
        assert!(lava.powerup);
        assert!(snapshot
            .cells
            .iter()
            .any(|cell| cell.terrain == Terrain::DeepSpace));
    }

    #[test]
    fn professions_use_the_engine_spelling() {
        let snapshot = parse(STATE).expect("fixture parses");
        assert_eq!(snapshot.own.worms[1].profession, Profession::Agent);
        assert_eq!(snapshot.opponent.worms[0].profession, Profession::Technologist);

        let shouting = STATE.replace("\"Commando\"", "\"COMMANDO\"");
        assert_ne!(shouting, STATE);
        assert!(parse(&shouting).is_err());
    }

    #[test]
    fn rejects_zero_current_worm() {
        let broken = STATE.replace("\"currentWormId\": 2", "\"currentWormId\": 0");
        assert!(parse(&broken).is_err());
    }

    #[test]
    fn rejects_gaps_in_worm_ids() {
        let broken = STATE.replace(
            "\"id\": 2,\n                    \"health\": 100",
            "\"id\": 3,\n                    \"health\": 100",
        );
        assert_ne!(broken, STATE);
        assert!(parse(&broken).is_err());
    }

    #[test]
    fn rejects_states_without_opponents() {
        let start = STATE.find("\"opponents\"").expect("opponents key");
        let end = STATE.find("\"map\"").expect("map key");
        let broken = format!(
            "{}\"opponents\": [],\n        {}",
            &STATE[..start],
            &STATE[end..]
        );
        assert!(parse(&broken).is_err());
    }
}
