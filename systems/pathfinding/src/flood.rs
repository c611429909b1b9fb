//! Multi-source flood fill producing next-hop tables.

use std::collections::BTreeMap;

use saloon_core::TileCoord;
use saloon_world::{Board, NeighborOrder};

use crate::{
    search::{Frontier, Mark},
    TilePredicate,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Hop {
    next: TileCoord,
    distance: u32,
}

/// Next hop toward the nearest source for every reachable tile.
///
/// Sources map to themselves at distance zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FloodField {
    hops: BTreeMap<TileCoord, Hop>,
}

impl FloodField {
    /// Adjacent tile one step closer to the nearest source.
    #[must_use]
    pub fn next_hop(&self, coord: TileCoord) -> Option<TileCoord> {
        self.hops.get(&coord).map(|hop| hop.next)
    }

    /// Number of steps from the tile to its nearest source.
    #[must_use]
    pub fn distance(&self, coord: TileCoord) -> Option<u32> {
        self.hops.get(&coord).map(|hop| hop.distance)
    }

    /// Whether the tile was reached from any source.
    #[must_use]
    pub fn contains(&self, coord: TileCoord) -> bool {
        self.hops.contains_key(&coord)
    }

    /// Whether the tile is one of the sources.
    #[must_use]
    pub fn is_source(&self, coord: TileCoord) -> bool {
        self.next_hop(coord) == Some(coord)
    }

    /// Tiles visited when following next hops from `coord` to its source.
    ///
    /// Returns `None` when the tile was never reached.
    #[must_use]
    pub fn route_from(&self, coord: TileCoord) -> Option<Vec<TileCoord>> {
        let mut route = vec![coord];
        let mut cursor = coord;
        loop {
            let next = self.next_hop(cursor)?;
            if next == cursor {
                return Some(route);
            }
            route.push(next);
            cursor = next;
        }
    }

    /// Number of reached tiles, sources included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hops.len()
    }

    /// Whether no tile was reached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// Every reached tile with its next hop, ordered by coordinate.
    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, TileCoord)> + '_ {
        self.hops.iter().map(|(coord, hop)| (*coord, hop.next))
    }
}

/// Breadth-first flood from every source at once.
///
/// Sources are admitted regardless of `wall`; every other tile is entered
/// only when `wall` does not hold for it. An empty source set yields an empty
/// field.
pub fn flood_path<W>(board: &Board, sources: &[TileCoord], wall: &W) -> FloodField
where
    W: TilePredicate + ?Sized,
{
    if sources.is_empty() {
        tracing::debug!("flood fill requested without sources");
        return FloodField::default();
    }

    let mut frontier = Frontier::rooted(board, sources.iter().copied());
    while let Some(current) = frontier.pop() {
        for neighbor in board.neighbors(current, NeighborOrder::default()) {
            let Some(tile) = board.tile(neighbor) else {
                continue;
            };
            if wall.holds(tile) {
                continue;
            }
            frontier.admit(current, neighbor);
        }
    }

    let hops = frontier
        .reached()
        .filter_map(|(coord, mark, distance)| {
            let next = match mark {
                Mark::Root => coord,
                Mark::Parent(parent) => parent,
                Mark::Unseen => return None,
            };
            Some((coord, Hop { next, distance }))
        })
        .collect();

    FloodField { hops }
}
