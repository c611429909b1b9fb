//! Serialisable per-turn snapshot handed over by the game layer.

use saloon_core::{BottleSnapshot, CowboySnapshot, FurnishingSnapshot, TileCoord, YoungGunSnapshot};
use serde::{Deserialize, Serialize};

const DEFAULT_MAX_COWBOYS_PER_JOB: u32 = 2;

/// Everything the agent may read about the board for a single turn.
///
/// Dead cowboys and destroyed furnishings are expected to be absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    /// Number of tile columns.
    pub width: u32,
    /// Number of tile rows.
    pub height: u32,
    /// Index of the turn being decided.
    #[serde(default)]
    pub current_turn: u32,
    /// Maximum number of living cowboys a player may have per job.
    #[serde(default = "default_max_cowboys_per_job")]
    pub max_cowboys_per_job: u32,
    /// Wall-clock budget left for the turn, in milliseconds.
    #[serde(default)]
    pub time_remaining_ms: u64,
    /// Balcony tiles, impassable to cowboys.
    #[serde(default)]
    pub balconies: Vec<TileCoord>,
    /// Tiles with a static hazard that damages cowboys walking through.
    #[serde(default)]
    pub hazards: Vec<TileCoord>,
    /// Furnishings and pianos still standing.
    #[serde(default)]
    pub furnishings: Vec<FurnishingSnapshot>,
    /// Living cowboys of both players.
    #[serde(default)]
    pub cowboys: Vec<CowboySnapshot>,
    /// Bottles in flight.
    #[serde(default)]
    pub bottles: Vec<BottleSnapshot>,
    /// The YoungGun of each player.
    #[serde(default)]
    pub young_guns: Vec<YoungGunSnapshot>,
}

impl BoardSnapshot {
    /// Creates an empty snapshot of the provided dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            current_turn: 0,
            max_cowboys_per_job: DEFAULT_MAX_COWBOYS_PER_JOB,
            time_remaining_ms: 0,
            balconies: Vec::new(),
            hazards: Vec::new(),
            furnishings: Vec::new(),
            cowboys: Vec::new(),
            bottles: Vec::new(),
            young_guns: Vec::new(),
        }
    }
}

fn default_max_cowboys_per_job() -> u32 {
    DEFAULT_MAX_COWBOYS_PER_JOB
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let snapshot: BoardSnapshot =
            serde_json::from_str(r#"{ "width": 4, "height": 3 }"#).expect("deserialize");
        assert_eq!(snapshot, BoardSnapshot::new(4, 3));
        assert_eq!(snapshot.max_cowboys_per_job, 2);
    }
}
