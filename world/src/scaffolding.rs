//! Snapshot builder used by tests across the workspace.
//!
//! The builder starts from an all-air rectangular map with no units and lets
//! callers paint terrain and drop units before producing either the raw
//! [`RoundSnapshot`] or a validated [`RoundState`].

use std::collections::BTreeMap;

use worms_core::{
    AmmoLedger, CellSnapshot, Coord, Profession, RoundSnapshot, Side, SideSnapshot, Terrain,
    WormSnapshot,
};

use crate::{RoundState, SnapshotError};

const DEFAULT_HEALTH: i32 = 100;
const DEFAULT_SELECTIONS: u32 = 5;

/// Fluent builder for round snapshots.
#[derive(Clone, Debug)]
pub struct SnapshotBuilder {
    round: u32,
    consecutive_do_nothings: u32,
    own: SideSnapshot,
    opponent: SideSnapshot,
    cells: BTreeMap<Coord, CellSnapshot>,
}

impl SnapshotBuilder {
    /// Creates an all-air map spanning `width` columns and `height` rows.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        let mut cells = BTreeMap::new();
        for y in 0..height {
            for x in 0..width {
                let coord = Coord::new(x, y);
                let _ = cells.insert(
                    coord,
                    CellSnapshot {
                        coord,
                        terrain: Terrain::Air,
                        powerup: false,
                    },
                );
            }
        }

        Self {
            round: 1,
            consecutive_do_nothings: 0,
            own: empty_side(),
            opponent: empty_side(),
            cells,
        }
    }

    /// Sets the round index.
    #[must_use]
    pub fn round(mut self, round: u32) -> Self {
        self.round = round;
        self
    }

    /// Sets the consecutive do-nothing counter.
    #[must_use]
    pub fn do_nothings(mut self, count: u32) -> Self {
        self.consecutive_do_nothings = count;
        self
    }

    /// Paints the terrain of one cell.
    #[must_use]
    pub fn terrain(mut self, coord: Coord, terrain: Terrain) -> Self {
        let _ = self.cells.insert(
            coord,
            CellSnapshot {
                coord,
                terrain,
                powerup: false,
            },
        );
        self
    }

    /// Paints the terrain of every cell in the provided list.
    #[must_use]
    pub fn terrain_at(self, coords: &[Coord], terrain: Terrain) -> Self {
        coords
            .iter()
            .fold(self, |builder, &coord| builder.terrain(coord, terrain))
    }

    /// Drops a powerup on an existing cell.
    #[must_use]
    pub fn powerup(mut self, coord: Coord) -> Self {
        if let Some(cell) = self.cells.get_mut(&coord) {
            cell.powerup = true;
        }
        self
    }

    /// Appends a healthy, thawed, unarmed unit to a side.
    #[must_use]
    pub fn worm(mut self, side: Side, position: Coord, profession: Profession) -> Self {
        self.side_mut(side).worms.push(WormSnapshot {
            position,
            health: DEFAULT_HEALTH,
            profession,
            rounds_until_unfrozen: 0,
            bananas: None,
            snowballs: None,
        });
        self
    }

    /// Overrides the health of a unit.
    #[must_use]
    pub fn health(mut self, side: Side, index: u8, health: i32) -> Self {
        self.worm_mut(side, index).health = health;
        self
    }

    /// Overrides the banana count reported for a unit.
    #[must_use]
    pub fn bananas(mut self, side: Side, index: u8, count: u32) -> Self {
        self.worm_mut(side, index).bananas = Some(count);
        self
    }

    /// Overrides the snowball count reported for a unit.
    #[must_use]
    pub fn snowballs(mut self, side: Side, index: u8, count: u32) -> Self {
        self.worm_mut(side, index).snowballs = Some(count);
        self
    }

    /// Freezes a unit for the provided number of rounds.
    #[must_use]
    pub fn frozen(mut self, side: Side, index: u8, rounds: u32) -> Self {
        self.worm_mut(side, index).rounds_until_unfrozen = rounds;
        self
    }

    /// Sets which unit acts for a side this round.
    #[must_use]
    pub fn current(mut self, side: Side, index: u8) -> Self {
        self.side_mut(side).current_worm = index;
        self
    }

    /// Sets both scores.
    #[must_use]
    pub fn scores(mut self, own: i32, opponent: i32) -> Self {
        self.own.score = own;
        self.opponent.score = opponent;
        self
    }

    /// Sets the reselections a side has left.
    #[must_use]
    pub fn selections(mut self, side: Side, remaining: u32) -> Self {
        self.side_mut(side).selections_remaining = remaining;
        self
    }

    /// Sets the command a side issued last round.
    #[must_use]
    pub fn previous_command(mut self, side: Side, command: &str) -> Self {
        self.side_mut(side).previous_command = Some(command.to_owned());
        self
    }

    /// Produces the raw snapshot.
    #[must_use]
    pub fn snapshot(self) -> RoundSnapshot {
        RoundSnapshot {
            round: self.round,
            consecutive_do_nothings: self.consecutive_do_nothings,
            own: self.own,
            opponent: self.opponent,
            cells: self.cells.into_values().collect(),
        }
    }

    /// Validates the snapshot with an empty ammo ledger.
    pub fn build(self) -> Result<RoundState, SnapshotError> {
        self.build_with(&AmmoLedger::new())
    }

    /// Validates the snapshot with the provided ammo ledger.
    pub fn build_with(self, ledger: &AmmoLedger) -> Result<RoundState, SnapshotError> {
        RoundState::new(self.snapshot(), ledger)
    }

    fn side_mut(&mut self, side: Side) -> &mut SideSnapshot {
        match side {
            Side::Own => &mut self.own,
            Side::Opponent => &mut self.opponent,
        }
    }

    fn worm_mut(&mut self, side: Side, index: u8) -> &mut WormSnapshot {
        &mut self.side_mut(side).worms[usize::from(index)]
    }
}

fn empty_side() -> SideSnapshot {
    SideSnapshot {
        score: 0,
        current_worm: 0,
        selections_remaining: DEFAULT_SELECTIONS,
        previous_command: None,
        worms: Vec::new(),
    }
}
