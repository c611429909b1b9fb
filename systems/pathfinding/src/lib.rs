#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Breadth-first search over the Saloon tile graph.
//!
//! Every tactical question the orchestrator asks is answered here: the
//! nearest tile satisfying a goal, the shortest path to every goal at once,
//! and next-hop tables that lead back to the nearest of several sources.
//! Passability and goals are supplied as [`TilePredicate`] values, and every
//! search is read-only over the [`Board`](saloon_world::Board).

mod flood;
pub mod predicate;
mod search;

use saloon_core::TileCoord;
use thiserror::Error;

pub use flood::{flood_path, FloodField};
pub use predicate::{TilePredicate, TilePredicateExt};
pub use search::{bfs, paths_to_all_goals};

/// Reasons a search produced no path.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    /// The frontier was exhausted without reaching a goal tile.
    #[error("no path from {start} reaches a goal tile")]
    NoPathFound {
        /// Tile the search started from.
        start: TileCoord,
    },
    /// The search was asked to start from a coordinate off the board.
    #[error("{0} is not a tile on the board")]
    UnknownTile(TileCoord),
}

/// Ordered tiles from a start to a goal, both inclusive.
///
/// A path always contains at least its start tile. A search whose start
/// already satisfies the goal returns a single-tile path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Path {
    tiles: Vec<TileCoord>,
}

impl Path {
    pub(crate) fn from_tiles(tiles: Vec<TileCoord>) -> Self {
        debug_assert!(!tiles.is_empty(), "paths contain at least the start tile");
        Self { tiles }
    }

    /// Tile the path starts on.
    #[must_use]
    pub fn start(&self) -> TileCoord {
        self.tiles[0]
    }

    /// Tile the path ends on.
    #[must_use]
    pub fn goal(&self) -> TileCoord {
        self.tiles[self.tiles.len() - 1]
    }

    /// Number of tiles on the path, start included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Always false; kept for parity with collection types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Number of moves needed to walk the path.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.tiles.len() - 1
    }

    /// First tile to move onto, or `None` when the start is the goal.
    #[must_use]
    pub fn next_step(&self) -> Option<TileCoord> {
        self.tiles.get(1).copied()
    }

    /// Tiles along the path in walking order.
    #[must_use]
    pub fn tiles(&self) -> &[TileCoord] {
        &self.tiles
    }

    /// Consumes the path, yielding the underlying tiles.
    #[must_use]
    pub fn into_vec(self) -> Vec<TileCoord> {
        self.tiles
    }
}
