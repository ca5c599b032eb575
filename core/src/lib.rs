#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the worms decision engine.
//!
//! This crate defines the vocabulary every other crate speaks. Adapters load
//! a [`RoundSnapshot`] describing the round, the world crate turns it into an
//! immutable round state, systems query that state, and the policy answers
//! with exactly one [`Move`] whose `Display` implementation is the wire
//! command expected by the game engine.

use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};

/// Maximum truncated distance at which a shot can connect.
pub const SHOT_RANGE: u32 = 4;

/// Maximum truncated distance at which bananas and snowballs can be thrown.
pub const THROW_RANGE: u32 = 5;

/// Cell the lava ring contracts toward.
pub const MAP_CENTRE: Coord = Coord::new(16, 16);

/// Bananas an opponent agent is assumed to start the match with.
pub const STARTING_BANANAS: u32 = 3;

/// Snowballs an opponent technologist is assumed to start the match with.
pub const STARTING_SNOWBALLS: u32 = 3;

/// Banana blast offsets paired with the damage dealt at each offset.
pub const BANANA_BLAST: [((i32, i32), u32); 13] = [
    ((-2, 0), 7),
    ((-1, -1), 11),
    ((-1, 0), 13),
    ((-1, 1), 11),
    ((0, -2), 7),
    ((0, -1), 13),
    ((0, 0), 20),
    ((0, 1), 13),
    ((0, 2), 7),
    ((1, -1), 11),
    ((1, 0), 13),
    ((1, 1), 11),
    ((2, 0), 7),
];

/// Snowball freeze offsets. Every offset freezes, there is no magnitude.
pub const SNOWBALL_SPREAD: [(i32, i32); 9] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 0),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Location of a single grid cell.
///
/// Coordinates order row-major (`y` first, then `x`) so that every ordered
/// collection of cells iterates the map the same way the engine lays it out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    x: i32,
    y: i32,
}

impl Coord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the coordinate displaced by the provided offset.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Returns the neighbouring coordinate in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        self.offset(dx, dy)
    }

    /// Euclidean distance between two coordinates.
    #[must_use]
    pub fn distance(self, other: Coord) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }

    /// Euclidean distance truncated toward zero.
    ///
    /// Every weapon range check compares against this value, so a cell at
    /// distance 4.99 is within range 4 while one at exactly 5.0 is not.
    #[must_use]
    pub fn range_to(self, other: Coord) -> u32 {
        self.distance(other) as u32
    }
}

impl Ord for Coord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for Coord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compass directions in which units shoot and step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Decreasing row.
    N,
    /// Decreasing row, increasing column.
    NE,
    /// Increasing column.
    E,
    /// Increasing row and column.
    SE,
    /// Increasing row.
    S,
    /// Increasing row, decreasing column.
    SW,
    /// Decreasing column.
    W,
    /// Decreasing row and column.
    NW,
}

impl Direction {
    /// Every direction in canonical evaluation order.
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    /// Unit offset applied per step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::N => (0, -1),
            Self::NE => (1, -1),
            Self::E => (1, 0),
            Self::SE => (1, 1),
            Self::S => (0, 1),
            Self::SW => (-1, 1),
            Self::W => (-1, 0),
            Self::NW => (-1, -1),
        }
    }

    /// Token used for the direction in engine commands.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::N => "N",
            Self::NE => "NE",
            Self::E => "E",
            Self::SE => "SE",
            Self::S => "S",
            Self::SW => "SW",
            Self::W => "W",
            Self::NW => "NW",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terrain kinds reported by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    /// Diggable soil that blocks movement and shots.
    Dirt,
    /// Open ground.
    Air,
    /// Off-map void. Never materialised in a round state.
    DeepSpace,
    /// Burning ground produced by the shrinking battle ring.
    Lava,
}

/// The two competing players.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// The player this bot controls.
    Own,
    /// The opposing player.
    Opponent,
}

impl Side {
    /// Returns the other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Own => Self::Opponent,
            Self::Opponent => Self::Own,
        }
    }
}

/// Weapon specialisation of a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Profession {
    /// Carries banana bombs.
    Agent,
    /// Rifle only.
    Commando,
    /// Carries snowballs.
    Technologist,
}

/// Stable identity of a unit: its side and its zero-based index on that side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WormId {
    side: Side,
    index: u8,
}

impl WormId {
    /// Creates a new unit identity.
    #[must_use]
    pub const fn new(side: Side, index: u8) -> Self {
        Self { side, index }
    }

    /// Side the unit fights for.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Zero-based index of the unit within its side.
    #[must_use]
    pub const fn index(&self) -> u8 {
        self.index
    }
}

/// The action part of a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Skip the turn.
    Nothing,
    /// Step onto an adjacent open cell.
    Move(Coord),
    /// Dig out an adjacent dirt cell.
    Dig(Coord),
    /// Fire the rifle along a direction.
    Shoot(Direction),
    /// Throw a banana bomb at a cell.
    Banana(Coord),
    /// Throw a snowball at a cell.
    Snowball(Coord),
}

impl Action {
    /// Cell the action targets, if it targets one.
    #[must_use]
    pub const fn target(&self) -> Option<Coord> {
        match self {
            Self::Move(cell)
            | Self::Dig(cell)
            | Self::Banana(cell)
            | Self::Snowball(cell) => Some(*cell),
            Self::Nothing | Self::Shoot(_) => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nothing => f.write_str("nothing"),
            Self::Move(cell) => write!(f, "move {} {}", cell.x(), cell.y()),
            Self::Dig(cell) => write!(f, "dig {} {}", cell.x(), cell.y()),
            Self::Shoot(direction) => write!(f, "shoot {direction}"),
            Self::Banana(cell) => write!(f, "banana {} {}", cell.x(), cell.y()),
            Self::Snowball(cell) => write!(f, "snowball {} {}", cell.x(), cell.y()),
        }
    }
}

/// A complete decision: an action, optionally preceded by a reselection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    action: Action,
    select: Option<u8>,
}

impl Move {
    /// Creates a move performed by the currently active unit.
    #[must_use]
    pub const fn new(action: Action) -> Self {
        Self {
            action,
            select: None,
        }
    }

    /// The do-nothing move.
    #[must_use]
    pub const fn nothing() -> Self {
        Self::new(Action::Nothing)
    }

    /// Returns the move annotated with a reselection of the own unit at `index`.
    #[must_use]
    pub const fn with_select(self, index: u8) -> Self {
        Self {
            action: self.action,
            select: Some(index),
        }
    }

    /// Action carried by the move.
    #[must_use]
    pub const fn action(&self) -> Action {
        self.action
    }

    /// Zero-based index of the own unit selected before acting, if any.
    #[must_use]
    pub const fn select(&self) -> Option<u8> {
        self.select
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(index) = self.select {
            write!(f, "select {};", u32::from(index) + 1)?;
        }
        write!(f, "{}", self.action)
    }
}

/// Unit state as reported by the engine for one round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WormSnapshot {
    /// Cell occupied by the unit.
    pub position: Coord,
    /// Remaining health. Zero or less means the unit is dead.
    pub health: i32,
    /// Weapon specialisation.
    pub profession: Profession,
    /// Rounds until the unit thaws and may act again.
    pub rounds_until_unfrozen: u32,
    /// Banana count when the engine reports it. Only own units carry it.
    pub bananas: Option<u32>,
    /// Snowball count when the engine reports it. Only own units carry it.
    pub snowballs: Option<u32>,
}

/// Terrain record for one map cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    /// Location of the cell.
    pub coord: Coord,
    /// Terrain covering the cell.
    pub terrain: Terrain,
    /// Whether a powerup lies on the cell.
    pub powerup: bool,
}

/// Everything the engine reports about one player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideSnapshot {
    /// Current score.
    pub score: i32,
    /// Zero-based index of the unit acting this round.
    pub current_worm: u8,
    /// Reselections left for the rest of the match.
    pub selections_remaining: u32,
    /// Command the player issued last round, when reported.
    pub previous_command: Option<String>,
    /// Units in index order.
    pub worms: Vec<WormSnapshot>,
}

/// Complete description of one round as delivered by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    /// One-based round index.
    pub round: u32,
    /// Consecutive do-nothing commands issued by this bot.
    pub consecutive_do_nothings: u32,
    /// The player this bot controls.
    pub own: SideSnapshot,
    /// The opposing player.
    pub opponent: SideSnapshot,
    /// Every map cell, deep space included.
    pub cells: Vec<CellSnapshot>,
}

/// Cumulative count of special weapons the opponent has spent.
///
/// The ledger is the only value carried from one round to the next. Each
/// update returns a new ledger instead of mutating the previous one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AmmoLedger {
    bananas_used: u32,
    snowballs_used: u32,
}

impl AmmoLedger {
    /// Creates a ledger with nothing spent.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bananas_used: 0,
            snowballs_used: 0,
        }
    }

    /// Creates a ledger with explicit usage counts.
    #[must_use]
    pub const fn with_usage(bananas_used: u32, snowballs_used: u32) -> Self {
        Self {
            bananas_used,
            snowballs_used,
        }
    }

    /// Bananas the opponent has thrown so far.
    #[must_use]
    pub const fn bananas_used(&self) -> u32 {
        self.bananas_used
    }

    /// Snowballs the opponent has thrown so far.
    #[must_use]
    pub const fn snowballs_used(&self) -> u32 {
        self.snowballs_used
    }

    /// Returns the ledger with one more banana recorded.
    #[must_use]
    pub const fn record_banana(self) -> Self {
        Self {
            bananas_used: self.bananas_used.saturating_add(1),
            snowballs_used: self.snowballs_used,
        }
    }

    /// Returns the ledger with one more snowball recorded.
    #[must_use]
    pub const fn record_snowball(self) -> Self {
        Self {
            bananas_used: self.bananas_used,
            snowballs_used: self.snowballs_used.saturating_add(1),
        }
    }

    /// Bananas an opponent unit of the given profession still holds.
    #[must_use]
    pub const fn remaining_bananas(&self, profession: Profession) -> u32 {
        match profession {
            Profession::Agent => STARTING_BANANAS.saturating_sub(self.bananas_used),
            Profession::Commando | Profession::Technologist => 0,
        }
    }

    /// Snowballs an opponent unit of the given profession still holds.
    #[must_use]
    pub const fn remaining_snowballs(&self, profession: Profession) -> u32 {
        match profession {
            Profession::Technologist => STARTING_SNOWBALLS.saturating_sub(self.snowballs_used),
            Profession::Agent | Profession::Commando => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Action, AmmoLedger, CellSnapshot, Coord, Direction, Move, Profession, RoundSnapshot,
        SideSnapshot, Terrain, WormSnapshot,
    };

    #[test]
    fn distance_is_symmetric_and_obeys_triangle_inequality() {
        let points: Vec<Coord> = (-3..=3)
            .flat_map(|x| (-3..=3).map(move |y| Coord::new(x * 2, y * 3 - 1)))
            .collect();

        for &a in &points {
            for &b in &points {
                assert!((a.distance(b) - b.distance(a)).abs() < f64::EPSILON);
                for &c in points.iter().step_by(5) {
                    assert!(a.distance(c) <= a.distance(b) + b.distance(c) + 1e-9);
                }
            }
        }
    }

    #[test]
    fn range_truncates_instead_of_rounding() {
        let origin = Coord::new(0, 0);
        assert_eq!(origin.range_to(Coord::new(3, 3)), 4);
        assert_eq!(origin.range_to(Coord::new(4, 2)), 4);
        assert_eq!(origin.range_to(Coord::new(3, 4)), 5);
        assert_eq!(origin.range_to(Coord::new(4, 4)), 5);
    }

    #[test]
    fn coordinates_order_row_major() {
        let mut cells = vec![Coord::new(2, 0), Coord::new(0, 1), Coord::new(1, 0)];
        cells.sort();
        assert_eq!(cells, vec![Coord::new(1, 0), Coord::new(2, 0), Coord::new(0, 1)]);
    }

    #[test]
    fn directions_step_to_their_neighbours() {
        let origin = Coord::new(5, 5);
        assert_eq!(origin.step(Direction::N), Coord::new(5, 4));
        assert_eq!(origin.step(Direction::SE), Coord::new(6, 6));
        assert_eq!(origin.step(Direction::W), Coord::new(4, 5));
        assert_eq!(origin.step(Direction::NW), Coord::new(4, 4));
    }

    #[test]
    fn commands_render_engine_grammar() {
        assert_eq!(Move::nothing().to_string(), "nothing");
        assert_eq!(
            Move::new(Action::Move(Coord::new(3, 14))).to_string(),
            "move 3 14"
        );
        assert_eq!(Move::new(Action::Dig(Coord::new(0, 9))).to_string(), "dig 0 9");
        assert_eq!(
            Move::new(Action::Shoot(Direction::NE)).to_string(),
            "shoot NE"
        );
        assert_eq!(
            Move::new(Action::Banana(Coord::new(12, 20))).to_string(),
            "banana 12 20"
        );
        assert_eq!(
            Move::new(Action::Snowball(Coord::new(7, 8))).to_string(),
            "snowball 7 8"
        );
        assert_eq!(
            Move::new(Action::Move(Coord::new(1, 2)))
                .with_select(2)
                .to_string(),
            "select 3;move 1 2"
        );
    }

    #[test]
    fn ledger_applies_professional_baseline() {
        let ledger = AmmoLedger::new().record_banana();
        assert_eq!(ledger.remaining_bananas(Profession::Agent), 2);
        assert_eq!(ledger.remaining_bananas(Profession::Commando), 0);
        assert_eq!(ledger.remaining_snowballs(Profession::Technologist), 3);
    }

    #[test]
    fn ledger_never_reports_negative_ammo() {
        let ledger = AmmoLedger::with_usage(5, 4);
        assert_eq!(ledger.remaining_bananas(Profession::Agent), 0);
        assert_eq!(ledger.remaining_snowballs(Profession::Technologist), 0);
    }

    #[test]
    fn round_snapshot_survives_bincode() {
        let snapshot = RoundSnapshot {
            round: 42,
            consecutive_do_nothings: 1,
            own: SideSnapshot {
                score: 100,
                current_worm: 1,
                selections_remaining: 3,
                previous_command: None,
                worms: vec![WormSnapshot {
                    position: Coord::new(4, 5),
                    health: 150,
                    profession: Profession::Agent,
                    rounds_until_unfrozen: 0,
                    bananas: Some(2),
                    snowballs: None,
                }],
            },
            opponent: SideSnapshot {
                score: 80,
                current_worm: 0,
                selections_remaining: 5,
                previous_command: Some("banana 4 6".to_owned()),
                worms: Vec::new(),
            },
            cells: vec![CellSnapshot {
                coord: Coord::new(4, 5),
                terrain: Terrain::Air,
                powerup: true,
            }],
        };

        let bytes = bincode::serialize(&snapshot).expect("serialize");
        let restored: RoundSnapshot = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, snapshot);
    }
}
