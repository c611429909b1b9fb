#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Saloon agent.
//!
//! This crate defines the vocabulary every other crate speaks: tile
//! coordinates, cardinal directions, cowboy jobs, immutable snapshots of the
//! units and objects that live on the board, and the [`Command`] values the
//! orchestrator emits. The external game layer owns the live state; everything
//! here is a read-only mirror captured once per turn.

pub mod geometry;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use geometry::{alignment, toward, GeometryError};

/// Cardinal directions on the tile grid.
///
/// North decreases `y`, south increases it, east increases `x` and west
/// decreases it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing `y`.
    North,
    /// Toward increasing `x`.
    East,
    /// Toward increasing `y`.
    South,
    /// Toward decreasing `x`.
    West,
}

impl Direction {
    /// All four directions in clockwise order starting at north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Name used by the game server for this direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::North => "North",
            Self::East => "East",
            Self::South => "South",
            Self::West => "West",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = GeometryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "north" => Ok(Self::North),
            "east" => Ok(Self::East),
            "south" => Ok(Self::South),
            "west" => Ok(Self::West),
            _ => Err(GeometryError::InvalidDirection(value.to_owned())),
        }
    }
}

/// Location of a single tile expressed as `x` (column) and `y` (row).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    x: i32,
    y: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal position of the tile.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical position of the tile.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Coordinate one tile away in the provided direction.
    ///
    /// The result may lie outside the board; the board decides whether it
    /// exists.
    #[must_use]
    pub fn step(self, direction: Direction) -> TileCoord {
        let (dx, dy) = direction.offset();
        TileCoord::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Jobs a cowboy can be called in with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Job {
    /// Melee unit that damages adjacent enemies automatically.
    Brawler,
    /// Throws bottles that make their target drunk.
    Bartender,
    /// Fires along a straight lane after focusing.
    Sharpshooter,
}

impl Job {
    /// Every job in the order the game lists them.
    pub const ALL: [Job; 3] = [Job::Bartender, Job::Brawler, Job::Sharpshooter];

    /// Name used by the game server for this job.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Brawler => "Brawler",
            Self::Bartender => "Bartender",
            Self::Sharpshooter => "Sharpshooter",
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reported when text does not name a cowboy job.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("`{0}` is not a cowboy job")]
pub struct ParseJobError(String);

impl FromStr for Job {
    type Err = ParseJobError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "brawler" => Ok(Self::Brawler),
            "bartender" => Ok(Self::Bartender),
            "sharpshooter" => Ok(Self::Sharpshooter),
            _ => Err(ParseJobError(value.to_owned())),
        }
    }
}

/// Identifier of one of the two players.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u8);

impl PlayerId {
    /// Creates a player identifier. Only `0` and `1` exist in a match.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// The other player of a two-player match.
    #[must_use]
    pub const fn opponent(&self) -> Self {
        Self(1 - (self.0 & 1))
    }
}

/// Unique identifier assigned to a cowboy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CowboyId(u32);

impl CowboyId {
    /// Creates a new cowboy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a furnishing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FurnishingId(u32);

impl FurnishingId {
    /// Creates a new furnishing identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a bottle in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BottleId(u32);

impl BottleId {
    /// Creates a new bottle identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Immutable representation of a single cowboy used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CowboySnapshot {
    /// Unique identifier assigned to the cowboy.
    pub id: CowboyId,
    /// Player controlling the cowboy.
    pub owner: PlayerId,
    /// Job the cowboy was called in with.
    pub job: Job,
    /// Tile the cowboy currently stands on.
    pub tile: TileCoord,
    /// Remaining health.
    pub health: u32,
    /// Turns until the cowboy may act again.
    pub turns_busy: u32,
    /// Whether the cowboy may still move this turn.
    pub can_move: bool,
    /// Whether the cowboy is drunk and moves involuntarily.
    pub is_drunk: bool,
    /// Direction a drunk cowboy stumbles toward.
    #[serde(default)]
    pub drunk_direction: Option<Direction>,
    /// Lane length a sharpshooter has focused for.
    #[serde(default)]
    pub focus: u32,
}

impl CowboySnapshot {
    /// Whether the cowboy may take an action this turn.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.turns_busy == 0
    }
}

/// Immutable representation of a bottle in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BottleSnapshot {
    /// Unique identifier assigned to the bottle.
    pub id: BottleId,
    /// Tile the bottle is currently flying over.
    pub tile: TileCoord,
    /// Direction the bottle travels, two tiles per player turn.
    pub direction: Direction,
    /// Direction a cowboy hit by the bottle will stumble toward.
    pub drunk_direction: Direction,
}

/// Immutable representation of a furnishing or piano.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FurnishingSnapshot {
    /// Unique identifier assigned to the furnishing.
    pub id: FurnishingId,
    /// Tile the furnishing occupies.
    pub tile: TileCoord,
    /// Remaining health.
    pub health: u32,
    /// Whether the furnishing is a piano that can be played for points.
    pub is_piano: bool,
    /// Whether the piano is being played this turn.
    #[serde(default)]
    pub is_playing: bool,
}

/// Immutable representation of a player's YoungGun on the balcony.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YoungGunSnapshot {
    /// Player owning the YoungGun.
    pub owner: PlayerId,
    /// Balcony tile the YoungGun stands on.
    pub tile: TileCoord,
    /// Tile a called-in cowboy appears on this turn.
    pub call_in_tile: TileCoord,
    /// Tile a called-in cowboy would appear on next turn.
    pub next_call_in_tile: TileCoord,
    /// Whether the YoungGun may call in a cowboy this turn.
    pub can_call_in: bool,
}

/// Requests the orchestrator sends to the external game layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Moves a cowboy onto an adjacent tile.
    Move {
        /// Cowboy being moved.
        cowboy: CowboyId,
        /// Adjacent destination tile.
        to: TileCoord,
    },
    /// Makes a cowboy perform its job action against an adjacent tile.
    Act {
        /// Cowboy performing the action.
        cowboy: CowboyId,
        /// Adjacent tile the action is aimed at.
        target: TileCoord,
        /// Drunk direction a bartender's bottle applies, if any.
        drunk_direction: Option<Direction>,
    },
    /// Makes a cowboy play an adjacent piano.
    Play {
        /// Cowboy playing the piano.
        cowboy: CowboyId,
        /// Piano being played.
        piano: FurnishingId,
    },
    /// Calls in a new cowboy through the player's YoungGun.
    CallIn {
        /// Player issuing the call-in.
        player: PlayerId,
        /// Job of the cowboy being called in.
        job: Job,
    },
}
