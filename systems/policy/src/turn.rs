//! Per-round decision context shared by every rule.

use std::collections::BTreeSet;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use worms_core::{Action, Coord, Direction, Side};
use worms_system_danger::{dangerous_cells, DangerQuery};
use worms_system_movegen::{valid_moves, LavaCrossing};
use worms_system_spatial::shots;
use worms_world::{query, RoundState, Worm};

use crate::PolicyConfig;

/// Everything the rules read while deciding for the own active unit.
pub(crate) struct Turn<'a> {
    pub(crate) state: &'a RoundState,
    pub(crate) config: &'a PolicyConfig,
    pub(crate) subject: &'a Worm,
    /// Cells that are, or are about to become, lethal.
    pub(crate) hazards: BTreeSet<Coord>,
    /// Cells the subject could be hit in before it acts again.
    pub(crate) danger: BTreeSet<Coord>,
    /// Clean shots the subject has right now.
    pub(crate) shots: Vec<(Direction, &'a Worm)>,
    pub(crate) rng: ChaCha8Rng,
}

impl<'a> Turn<'a> {
    pub(crate) fn new(state: &'a RoundState, config: &'a PolicyConfig) -> Self {
        let subject = state.active_worm(Side::Own);
        let hazards = query::hazard_cells(state);
        let danger = dangerous_cells(state, &DangerQuery::against(subject.id));
        let shots = shots(state, subject);
        let rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(u64::from(state.round())));

        tracing::debug!(
            target: "worms::policy",
            round = state.round(),
            worm = subject.id.index(),
            hazards = hazards.len(),
            danger = danger.len(),
            shots = shots.len(),
            "policy.turn"
        );

        Self {
            state,
            config,
            subject,
            hazards,
            danger,
            shots,
            rng,
        }
    }

    /// Cells the subject may step into, hazards removed.
    pub(crate) fn moves(&self) -> Vec<Coord> {
        self.targets(|action| matches!(action, Action::Move(_)))
    }

    /// Dirt cells the subject may dig, hazards removed.
    pub(crate) fn digs(&self) -> Vec<Coord> {
        self.targets(|action| matches!(action, Action::Dig(_)))
    }

    /// Cells in `cells` outside the full danger set.
    pub(crate) fn safe(&self, cells: &[Coord]) -> Vec<Coord> {
        cells
            .iter()
            .copied()
            .filter(|cell| !self.danger.contains(cell))
            .collect()
    }

    pub(crate) fn is_hazard(&self, cell: Coord) -> bool {
        self.hazards.contains(&cell)
    }

    fn targets(&self, keep: impl Fn(&Action) -> bool) -> Vec<Coord> {
        valid_moves(self.state, self.subject, LavaCrossing::Forbidden)
            .iter()
            .filter(|action| keep(action))
            .filter_map(Action::target)
            .filter(|cell| !self.is_hazard(*cell))
            .collect()
    }
}
