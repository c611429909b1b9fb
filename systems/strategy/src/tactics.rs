//! Scoring helpers shared by the strategies.
//!
//! Helpers read cowboy positions through [`Occupancy`] so they can be
//! evaluated against the raw board or against positions planned earlier in
//! the turn.

use std::collections::BTreeMap;

use saloon_core::{
    alignment, CowboySnapshot, Direction, FurnishingId, FurnishingSnapshot, PlayerId, TileCoord,
};
use saloon_world::{Board, NeighborOrder, Tile};

/// Order in which lanes are scanned when several score equally.
pub const LANE_ORDER: [Direction; 4] = [
    Direction::East,
    Direction::North,
    Direction::West,
    Direction::South,
];

/// Furthest distance a bartender looks for a throwing target.
pub const THROW_RANGE: u32 = 15;

/// Furthest distance scanned when picking a drunk direction.
pub const DRUNK_LOOKAHEAD: u32 = 5;

/// Source of cowboy positions used by the scoring helpers.
pub trait Occupancy {
    /// Cowboy standing on the tile, if any.
    fn occupant(&self, coord: TileCoord) -> Option<&CowboySnapshot>;

    /// Tile the cowboy stands on.
    fn position_of(&self, cowboy: &CowboySnapshot) -> TileCoord {
        cowboy.tile
    }
}

impl Occupancy for Board {
    fn occupant(&self, coord: TileCoord) -> Option<&CowboySnapshot> {
        self.tile(coord).and_then(Tile::cowboy)
    }
}

/// Greedy pairing of starts with goals by Manhattan distance.
///
/// Each goal in turn takes the nearest remaining start; ties go to the start
/// listed first. With `stack` set, goals keep being filled in further rounds
/// until every start is paired.
#[must_use]
pub fn shortest_pairs<K>(
    starts: &[(K, TileCoord)],
    goals: &[TileCoord],
    stack: bool,
) -> BTreeMap<K, TileCoord>
where
    K: Copy + Ord,
{
    let mut pairs = BTreeMap::new();
    if goals.is_empty() {
        return pairs;
    }

    let mut remaining = starts.to_vec();
    loop {
        for goal in goals {
            let Some((index, _)) = remaining
                .iter()
                .enumerate()
                .min_by_key(|(_, (_, tile))| tile.manhattan_distance(*goal))
            else {
                break;
            };
            let (key, _) = remaining.remove(index);
            let _ = pairs.insert(key, *goal);
        }
        if remaining.is_empty() || !stack {
            break;
        }
    }
    pairs
}

/// Splits the pianos between the players by column.
///
/// Pianos are ordered by `x` (then by identifier); the western half belongs to
/// player 0 and the rest, including the middle piano of an odd count, to
/// player 1.
#[must_use]
pub fn classify_pianos(board: &Board) -> BTreeMap<FurnishingId, PlayerId> {
    let mut pianos: Vec<&FurnishingSnapshot> = board.pianos().collect();
    pianos.sort_by_key(|piano| (piano.tile.x(), piano.id));
    let half = pianos.len() / 2;

    pianos
        .iter()
        .enumerate()
        .map(|(index, piano)| {
            let owner = if index < half {
                PlayerId::new(0)
            } else {
                PlayerId::new(1)
            };
            (piano.id, owner)
        })
        .collect()
}

/// Lane with the best enemy score within the sharpshooter's focus.
///
/// Enemies in the lane score one, allies cost three. Pianos in the lane add
/// one for every enemy next to them and subtract one for every ally. Only a
/// strictly positive score is worth a shot.
#[must_use]
pub fn best_bang_direction<O>(
    board: &Board,
    occupancy: &O,
    shooter: &CowboySnapshot,
) -> Option<Direction>
where
    O: Occupancy + ?Sized,
{
    let origin = occupancy.position_of(shooter);
    let mut best: Option<(Direction, i32)> = None;

    for direction in LANE_ORDER {
        let mut cursor = origin;
        let mut score = 0_i32;
        for _ in 0..shooter.focus {
            let Some(next) = board.neighbor(cursor, direction) else {
                break;
            };
            cursor = next;
            if let Some(cowboy) = occupancy.occupant(cursor) {
                score += if cowboy.owner == shooter.owner { -3 } else { 1 };
            }
            if board.tile(cursor).is_some_and(Tile::is_piano) {
                for around in board.neighbors(cursor, NeighborOrder::Vertical) {
                    if let Some(cowboy) = occupancy.occupant(around) {
                        score += if cowboy.owner == shooter.owner { -1 } else { 1 };
                    }
                }
            }
        }
        if score > best.map_or(0, |(_, best_score)| best_score) {
            best = Some((direction, score));
        }
    }

    best.map(|(direction, _)| direction)
}

/// Nearest enemy the bartender can hit in a straight unobstructed lane.
///
/// Furnishings, balconies and allies block a lane. A later lane only wins
/// with a strictly closer enemy.
#[must_use]
pub fn best_throw_direction<O>(
    board: &Board,
    occupancy: &O,
    bartender: &CowboySnapshot,
) -> Option<(Direction, CowboySnapshot)>
where
    O: Occupancy + ?Sized,
{
    let origin = occupancy.position_of(bartender);
    let mut range = THROW_RANGE;
    let mut best = None;

    for direction in LANE_ORDER {
        let mut cursor = origin;
        for distance in 0..range {
            let Some(next) = board.neighbor(cursor, direction) else {
                break;
            };
            cursor = next;
            let Some(tile) = board.tile(cursor) else {
                break;
            };
            if tile.furnishing().is_some() || tile.is_balcony() {
                break;
            }
            if let Some(cowboy) = occupancy.occupant(cursor) {
                if cowboy.owner != bartender.owner {
                    best = Some((direction, *cowboy));
                    range = distance;
                }
                break;
            }
        }
    }

    best
}

/// Direction a drunk target should stagger in.
///
/// Picks the closest furnishing or balcony within a few tiles so the target
/// runs into it, except that a piano sends the target the opposite way.
/// Defaults to east when nothing is close.
#[must_use]
pub fn best_drunk_direction(board: &Board, target: TileCoord) -> Direction {
    let mut range = DRUNK_LOOKAHEAD;
    let mut best = None;

    for direction in LANE_ORDER {
        let mut cursor = target;
        for distance in 0..range {
            let Some(next) = board.neighbor(cursor, direction) else {
                break;
            };
            cursor = next;
            let Some(tile) = board.tile(cursor) else {
                break;
            };
            if tile.is_piano() {
                best = Some(direction.opposite());
                range = distance;
                break;
            }
            if tile.furnishing().is_some() || tile.is_balcony() {
                best = Some(direction);
                range = distance;
                break;
            }
        }
    }

    best.unwrap_or(Direction::East)
}

/// How useful a piano slot is for a sharpshooter of `player`.
///
/// Counts pianos sharing a row or column with the slot on the enemy side of
/// it: enemy pianos add one and our own subtract one. Player 0 faces east.
#[must_use]
pub fn sharpshooter_slot_score(
    board: &Board,
    owners: &BTreeMap<FurnishingId, PlayerId>,
    player: PlayerId,
    slot: TileCoord,
) -> i32 {
    let faces_east = player == PlayerId::new(0);
    board
        .pianos()
        .filter(|piano| alignment(slot, piano.tile) == 0)
        .filter(|piano| (piano.tile.x() > slot.x()) == faces_east)
        .map(|piano| {
            if owners.get(&piano.id) == Some(&player) {
                -1
            } else {
                1
            }
        })
        .sum()
}

/// Whether a brawler standing on `coord` would be next to a piano crowded
/// by at least `threshold` enemies of `player`.
///
/// Tiles held by any cowboy other than `brawler` never qualify.
pub fn near_enemy_piano<O>(
    board: &Board,
    occupancy: &O,
    player: PlayerId,
    brawler: &CowboySnapshot,
    coord: TileCoord,
    threshold: usize,
) -> bool
where
    O: Occupancy + ?Sized,
{
    if occupancy
        .occupant(coord)
        .is_some_and(|cowboy| cowboy.id != brawler.id)
    {
        return false;
    }

    board
        .neighbors(coord, NeighborOrder::Vertical)
        .filter(|neighbor| board.tile(*neighbor).is_some_and(Tile::is_piano))
        .any(|piano| {
            let enemies = board
                .neighbors(piano, NeighborOrder::Vertical)
                .filter_map(|around| occupancy.occupant(around))
                .filter(|cowboy| cowboy.owner != player)
                .count();
            enemies >= threshold
        })
}
