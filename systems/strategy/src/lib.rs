#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn planning for a Saloon player.
//!
//! The [`Orchestrator`] reads a [`Board`] and emits the commands one player
//! should issue this turn. Which script it follows is selected by the
//! [`Strategy`] carried in its [`TurnConfig`]; every strategy shares the same
//! per-turn bookkeeping so decisions made early in a turn are visible to the
//! ones made after them.

mod camp;
mod piano;
mod plan;
pub mod tactics;

use std::{fmt, str::FromStr, time::Duration};

use saloon_core::{Command, Job, PlayerId};
use saloon_world::Board;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use plan::TurnPlan;

/// Scripts the orchestrator can follow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Hold a slot on every piano, dodge bottles and harass enemy pianos.
    #[default]
    PianoControl,
    /// Piano control that also routes around hazards and bottle lanes.
    Cautious,
    /// Camp the YoungGun's call-in tiles to waste the opponent's call-ins.
    SpawnCamp,
}

impl Strategy {
    /// Every strategy in declaration order.
    pub const ALL: [Strategy; 3] = [Self::PianoControl, Self::Cautious, Self::SpawnCamp];

    /// Name used in configuration files and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PianoControl => "piano-control",
            Self::Cautious => "cautious",
            Self::SpawnCamp => "spawn-camp",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a strategy name is not recognised.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown strategy `{0}` (expected piano-control, cautious or spawn-camp)")]
pub struct ParseStrategyError(String);

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == normalized)
            .ok_or_else(|| ParseStrategyError(value.to_owned()))
    }
}

/// Tunables for a single turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnConfig {
    /// Script to follow.
    pub strategy: Strategy,
    /// Preference order when calling in a new cowboy.
    pub job_order: Vec<Job>,
    /// Longest path, in tiles, worth walking to reach a hazard.
    pub hazard_route_limit: usize,
    /// Enemies around a piano before idle brawlers go after it.
    pub enemy_piano_threshold: usize,
    /// Below this much remaining time only stationary actions are planned.
    pub min_time_budget_ms: u64,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            job_order: Job::ALL.to_vec(),
            hazard_route_limit: 10,
            enemy_piano_threshold: 2,
            min_time_budget_ms: 0,
        }
    }
}

impl TurnConfig {
    /// Returns the configuration with a different strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Minimum time budget as a [`Duration`].
    #[must_use]
    pub const fn min_time_budget(&self) -> Duration {
        Duration::from_millis(self.min_time_budget_ms)
    }
}

/// Plans the commands a player issues each turn.
#[derive(Clone, Debug, Default)]
pub struct Orchestrator {
    config: TurnConfig,
}

impl Orchestrator {
    /// Creates an orchestrator driven by the provided configuration.
    #[must_use]
    pub fn new(config: TurnConfig) -> Self {
        Self { config }
    }

    /// Configuration the orchestrator plans with.
    #[must_use]
    pub fn config(&self) -> &TurnConfig {
        &self.config
    }

    /// Appends this turn's commands for `player` to `out`.
    ///
    /// Commands are emitted in the order they should be issued. When the
    /// board reports less remaining time than the configured budget, movement
    /// is skipped and only stationary actions are planned.
    pub fn plan_turn(&self, board: &Board, player: PlayerId, out: &mut Vec<Command>) {
        let span = tracing::info_span!(
            "plan_turn",
            player = player.get(),
            turn = board.current_turn(),
            strategy = %self.config.strategy,
        );
        let _guard = span.enter();

        let movement = board.time_remaining() >= self.config.min_time_budget();
        if !movement {
            tracing::warn!(
                remaining = ?board.time_remaining(),
                budget = ?self.config.min_time_budget(),
                "time budget exhausted, skipping movement"
            );
        }

        let mut plan = TurnPlan::new(board, player);
        match self.config.strategy {
            Strategy::PianoControl => piano::plan_turn(&mut plan, &self.config, false, movement),
            Strategy::Cautious => piano::plan_turn(&mut plan, &self.config, true, movement),
            Strategy::SpawnCamp => camp::plan_turn(&mut plan, &self.config, movement),
        }

        let commands = plan.into_commands();
        tracing::debug!(count = commands.len(), "turn planned");
        out.extend(commands);
    }
}
