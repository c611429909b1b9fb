//! Safety checks against bottles in flight.
//!
//! Bottles advance two tiles per player turn, so anything within two tiles in
//! front of a bottle may be struck before the next decision point. The checks
//! ignore obstacles between the bottle and the tile and treat every such
//! candidate collision as a hit.

use saloon_core::{BottleSnapshot, Direction, TileCoord};

use crate::Board;

/// Tiles a bottle travels between two decision points.
pub const BOTTLE_STEPS_PER_TURN: usize = 2;

/// Reports whether a cowboy could stand on the tile through the next turn.
///
/// Balconies, furnished tiles, occupied tiles and coordinates off the board are
/// never safe. An open tile is unsafe when a bottle one or two tiles away is
/// flying straight at it.
#[must_use]
pub fn safe(board: &Board, coord: TileCoord) -> bool {
    let Some(tile) = board.tile(coord) else {
        return false;
    };
    if !tile.is_open() {
        return false;
    }
    incoming_bottle(board, coord).is_none()
}

/// Bottle that will pass through or land on the tile before the next turn.
#[must_use]
pub fn incoming_bottle(board: &Board, coord: TileCoord) -> Option<&BottleSnapshot> {
    for outward in Direction::ALL {
        let mut cursor = coord;
        for _ in 0..BOTTLE_STEPS_PER_TURN {
            let Some(next) = board.neighbor(cursor, outward) else {
                break;
            };
            let bottle = board.tile(next).and_then(|tile| tile.bottle());
            if let Some(bottle) = bottle {
                if bottle.direction == outward.opposite() {
                    return Some(bottle);
                }
            }
            cursor = next;
        }
    }
    None
}

/// Tiles the bottle crosses before the next decision point, nearest first.
///
/// The trajectory stops early at the edge of the board.
#[must_use]
pub fn bottle_trajectory(board: &Board, bottle: &BottleSnapshot) -> Vec<TileCoord> {
    let mut trajectory = Vec::with_capacity(BOTTLE_STEPS_PER_TURN);
    let mut cursor = bottle.tile;
    for _ in 0..BOTTLE_STEPS_PER_TURN {
        let Some(next) = board.neighbor(cursor, bottle.direction) else {
            break;
        };
        trajectory.push(next);
        cursor = next;
    }
    trajectory
}
