#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Read-only tile graph for a single Saloon turn.
//!
//! A [`Board`] is built wholesale from a [`BoardSnapshot`] at the start of
//! every turn. Neighbour links are fixed during construction and the board
//! exposes no mutation methods, so searches run against a stable view for the
//! whole turn.

pub mod hazard;
pub mod layout;
mod snapshot;

use std::{fmt, time::Duration};

use saloon_core::{
    BottleSnapshot, CowboyId, CowboySnapshot, Direction, FurnishingId, FurnishingSnapshot,
    PlayerId, TileCoord, YoungGunSnapshot,
};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub use snapshot::BoardSnapshot;

/// Order in which a tile's neighbours are enumerated.
///
/// Breadth-first search breaks ties between equally distant goals by this
/// order, so it shapes the paths that come back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NeighborOrder {
    /// North, south, east, west.
    #[default]
    Vertical,
    /// East, west, north, south.
    Horizontal,
}

impl NeighborOrder {
    /// Directions visited by this ordering, first to last.
    #[must_use]
    pub const fn directions(self) -> [Direction; 4] {
        match self {
            Self::Vertical => [
                Direction::North,
                Direction::South,
                Direction::East,
                Direction::West,
            ],
            Self::Horizontal => [
                Direction::East,
                Direction::West,
                Direction::North,
                Direction::South,
            ],
        }
    }
}

/// Reasons a snapshot cannot be turned into a board.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    /// The snapshot declares a grid without tiles.
    #[error("board dimensions {width}x{height} contain no tiles")]
    EmptyGrid {
        /// Declared number of columns.
        width: u32,
        /// Declared number of rows.
        height: u32,
    },
    /// The snapshot declares a grid too large to address.
    #[error("board dimensions {width}x{height} exceed the addressable range")]
    Oversized {
        /// Declared number of columns.
        width: u32,
        /// Declared number of rows.
        height: u32,
    },
    /// An object references a tile outside the grid.
    #[error("{layer} at {coord} lies outside the board")]
    OutOfBounds {
        /// Kind of object that was misplaced.
        layer: &'static str,
        /// Offending coordinate.
        coord: TileCoord,
    },
    /// Two objects of the same kind share a tile.
    #[error("more than one {layer} occupies {coord}")]
    Overlap {
        /// Kind of object that overlaps.
        layer: &'static str,
        /// Shared coordinate.
        coord: TileCoord,
    },
}

/// A single tile and everything currently on it.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    coord: TileCoord,
    neighbors: [Option<TileCoord>; 4],
    cowboy: Option<CowboySnapshot>,
    furnishing: Option<FurnishingSnapshot>,
    bottle: Option<BottleSnapshot>,
    has_hazard: bool,
    is_balcony: bool,
    young_gun: Option<PlayerId>,
}

impl Tile {
    fn new(coord: TileCoord) -> Self {
        Self {
            coord,
            neighbors: [None; 4],
            cowboy: None,
            furnishing: None,
            bottle: None,
            has_hazard: false,
            is_balcony: false,
            young_gun: None,
        }
    }

    /// Coordinate of the tile.
    #[must_use]
    pub const fn coord(&self) -> TileCoord {
        self.coord
    }

    /// Adjacent tile in the provided direction, if it exists.
    #[must_use]
    pub fn neighbor(&self, direction: Direction) -> Option<TileCoord> {
        self.neighbors[slot(direction)]
    }

    /// Cowboy standing on the tile.
    #[must_use]
    pub fn cowboy(&self) -> Option<&CowboySnapshot> {
        self.cowboy.as_ref()
    }

    /// Furnishing or piano on the tile.
    #[must_use]
    pub fn furnishing(&self) -> Option<&FurnishingSnapshot> {
        self.furnishing.as_ref()
    }

    /// Bottle flying over the tile.
    #[must_use]
    pub fn bottle(&self) -> Option<&BottleSnapshot> {
        self.bottle.as_ref()
    }

    /// Whether the tile carries a static hazard.
    #[must_use]
    pub const fn has_hazard(&self) -> bool {
        self.has_hazard
    }

    /// Whether the tile is part of the balcony.
    #[must_use]
    pub const fn is_balcony(&self) -> bool {
        self.is_balcony
    }

    /// Owner of the YoungGun standing on the tile.
    #[must_use]
    pub const fn young_gun(&self) -> Option<PlayerId> {
        self.young_gun
    }

    /// Whether the tile holds a piano.
    #[must_use]
    pub fn is_piano(&self) -> bool {
        self.furnishing.is_some_and(|furnishing| furnishing.is_piano)
    }

    /// Whether a cowboy could step onto the tile right now.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.is_balcony && self.furnishing.is_none() && self.cowboy.is_none()
    }
}

/// Immutable tile graph plus the object lists it was built from.
#[derive(Clone, Debug)]
pub struct Board {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
    cowboys: Vec<CowboySnapshot>,
    furnishings: Vec<FurnishingSnapshot>,
    bottles: Vec<BottleSnapshot>,
    young_guns: Vec<YoungGunSnapshot>,
    current_turn: u32,
    max_cowboys_per_job: u32,
    time_remaining: Duration,
}

impl Board {
    /// Builds the tile graph described by the snapshot.
    pub fn from_snapshot(snapshot: &BoardSnapshot) -> Result<Self, BoardError> {
        let (width, height) = (snapshot.width, snapshot.height);
        if width == 0 || height == 0 {
            return Err(BoardError::EmptyGrid { width, height });
        }
        let (Ok(columns), Ok(rows)) = (i32::try_from(width), i32::try_from(height)) else {
            return Err(BoardError::Oversized { width, height });
        };
        let Some(tile_count) = usize::try_from(width)
            .ok()
            .zip(usize::try_from(height).ok())
            .and_then(|(w, h)| w.checked_mul(h))
        else {
            return Err(BoardError::Oversized { width, height });
        };

        let mut board = Self {
            width,
            height,
            tiles: Vec::with_capacity(tile_count),
            cowboys: Vec::new(),
            furnishings: Vec::new(),
            bottles: Vec::new(),
            young_guns: Vec::new(),
            current_turn: snapshot.current_turn,
            max_cowboys_per_job: snapshot.max_cowboys_per_job,
            time_remaining: Duration::from_millis(snapshot.time_remaining_ms),
        };

        for y in 0..rows {
            for x in 0..columns {
                let coord = TileCoord::new(x, y);
                let mut tile = Tile::new(coord);
                for direction in Direction::ALL {
                    let neighbor = coord.step(direction);
                    if board.contains(neighbor) {
                        tile.neighbors[slot(direction)] = Some(neighbor);
                    }
                }
                board.tiles.push(tile);
            }
        }

        for &coord in &snapshot.balconies {
            board.tile_mut(coord, "balcony")?.is_balcony = true;
        }
        for &coord in &snapshot.hazards {
            board.tile_mut(coord, "hazard")?.has_hazard = true;
        }
        for furnishing in &snapshot.furnishings {
            let tile = board.tile_mut(furnishing.tile, "furnishing")?;
            if tile.furnishing.replace(*furnishing).is_some() {
                return Err(BoardError::Overlap {
                    layer: "furnishing",
                    coord: furnishing.tile,
                });
            }
        }
        for cowboy in &snapshot.cowboys {
            let tile = board.tile_mut(cowboy.tile, "cowboy")?;
            if tile.cowboy.replace(*cowboy).is_some() {
                return Err(BoardError::Overlap {
                    layer: "cowboy",
                    coord: cowboy.tile,
                });
            }
        }
        for bottle in &snapshot.bottles {
            let tile = board.tile_mut(bottle.tile, "bottle")?;
            if tile.bottle.replace(*bottle).is_some() {
                return Err(BoardError::Overlap {
                    layer: "bottle",
                    coord: bottle.tile,
                });
            }
        }
        for young_gun in &snapshot.young_guns {
            board.tile_mut(young_gun.tile, "young gun")?.young_gun = Some(young_gun.owner);
        }

        board.cowboys = snapshot.cowboys.clone();
        board.cowboys.sort_by_key(|cowboy| cowboy.id);
        board.furnishings = snapshot.furnishings.clone();
        board.furnishings.sort_by_key(|furnishing| furnishing.id);
        board.bottles = snapshot.bottles.clone();
        board.bottles.sort_by_key(|bottle| bottle.id);
        board.young_guns = snapshot.young_guns.clone();
        board.young_guns.sort_by_key(|young_gun| young_gun.owner);

        tracing::debug!(
            width,
            height,
            turn = board.current_turn,
            cowboys = board.cowboys.len(),
            furnishings = board.furnishings.len(),
            bottles = board.bottles.len(),
            "board built from snapshot"
        );

        Ok(board)
    }

    fn tile_mut(&mut self, coord: TileCoord, layer: &'static str) -> Result<&mut Tile, BoardError> {
        let index = self
            .index_of(coord)
            .ok_or(BoardError::OutOfBounds { layer, coord })?;
        Ok(&mut self.tiles[index])
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of tiles.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Index of the turn being decided.
    #[must_use]
    pub const fn current_turn(&self) -> u32 {
        self.current_turn
    }

    /// Maximum number of living cowboys a player may have per job.
    #[must_use]
    pub const fn max_cowboys_per_job(&self) -> u32 {
        self.max_cowboys_per_job
    }

    /// Wall-clock budget the game server reported for this turn.
    #[must_use]
    pub const fn time_remaining(&self) -> Duration {
        self.time_remaining
    }

    /// Reports whether the coordinate lies on the board.
    #[must_use]
    pub fn contains(&self, coord: TileCoord) -> bool {
        self.index_of(coord).is_some()
    }

    /// Dense row-major index of the coordinate, if it lies on the board.
    #[must_use]
    pub fn index_of(&self, coord: TileCoord) -> Option<usize> {
        let x = u32::try_from(coord.x()).ok()?;
        let y = u32::try_from(coord.y()).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        let row = usize::try_from(y).ok()?;
        let column = usize::try_from(x).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Tile at the provided coordinate.
    #[must_use]
    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.index_of(coord).and_then(|index| self.tiles.get(index))
    }

    /// Iterator over every tile in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Adjacent coordinate in the provided direction, if it exists.
    #[must_use]
    pub fn neighbor(&self, coord: TileCoord, direction: Direction) -> Option<TileCoord> {
        self.tile(coord).and_then(|tile| tile.neighbor(direction))
    }

    /// Up to four adjacent coordinates enumerated in the provided order.
    pub fn neighbors(
        &self,
        coord: TileCoord,
        order: NeighborOrder,
    ) -> impl Iterator<Item = TileCoord> + '_ {
        let tile = self.tile(coord);
        order
            .directions()
            .into_iter()
            .filter_map(move |direction| tile.and_then(|tile| tile.neighbor(direction)))
    }

    /// Manhattan distance between two coordinates.
    ///
    /// This ignores walls and is only suitable as a heuristic.
    #[must_use]
    pub fn distance(&self, a: TileCoord, b: TileCoord) -> u32 {
        a.manhattan_distance(b)
    }

    /// Living cowboys of both players ordered by identifier.
    #[must_use]
    pub fn cowboys(&self) -> &[CowboySnapshot] {
        &self.cowboys
    }

    /// Living cowboys controlled by the provided player.
    pub fn cowboys_of(&self, player: PlayerId) -> impl Iterator<Item = &CowboySnapshot> {
        self.cowboys
            .iter()
            .filter(move |cowboy| cowboy.owner == player)
    }

    /// Cowboy with the provided identifier.
    #[must_use]
    pub fn cowboy(&self, id: CowboyId) -> Option<&CowboySnapshot> {
        self.cowboys
            .binary_search_by_key(&id, |cowboy| cowboy.id)
            .ok()
            .and_then(|index| self.cowboys.get(index))
    }

    /// Furnishings still standing, ordered by identifier.
    #[must_use]
    pub fn furnishings(&self) -> &[FurnishingSnapshot] {
        &self.furnishings
    }

    /// Furnishing with the provided identifier.
    #[must_use]
    pub fn furnishing(&self, id: FurnishingId) -> Option<&FurnishingSnapshot> {
        self.furnishings
            .binary_search_by_key(&id, |furnishing| furnishing.id)
            .ok()
            .and_then(|index| self.furnishings.get(index))
    }

    /// Pianos still standing, ordered by identifier.
    pub fn pianos(&self) -> impl Iterator<Item = &FurnishingSnapshot> {
        self.furnishings
            .iter()
            .filter(|furnishing| furnishing.is_piano)
    }

    /// Bottles in flight, ordered by identifier.
    #[must_use]
    pub fn bottles(&self) -> &[BottleSnapshot] {
        &self.bottles
    }

    /// YoungGun of the provided player.
    #[must_use]
    pub fn young_gun(&self, player: PlayerId) -> Option<&YoungGunSnapshot> {
        self.young_guns
            .iter()
            .find(|young_gun| young_gun.owner == player)
    }

    /// SHA-256 digest over the board contents.
    ///
    /// Every field of the snapshot feeds the digest, so two boards share a
    /// fingerprint exactly when they were built from equal snapshots.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        let mut hasher = Sha256::new();
        hasher.update(self.width.to_le_bytes());
        hasher.update(self.height.to_le_bytes());
        hasher.update(self.current_turn.to_le_bytes());
        hasher.update(self.max_cowboys_per_job.to_le_bytes());
        hasher.update(self.time_remaining.as_millis().to_le_bytes());

        for tile in &self.tiles {
            let flags = u8::from(tile.is_balcony) | u8::from(tile.has_hazard) << 1;
            hasher.update([flags]);
        }
        for cowboy in &self.cowboys {
            hasher.update(cowboy.id.get().to_le_bytes());
            hasher.update([cowboy.owner.get(), cowboy.job as u8]);
            hash_coord(&mut hasher, cowboy.tile);
            hasher.update(cowboy.health.to_le_bytes());
            hasher.update(cowboy.turns_busy.to_le_bytes());
            hasher.update([
                u8::from(cowboy.can_move),
                u8::from(cowboy.is_drunk),
                cowboy
                    .drunk_direction
                    .map_or(0, |direction| slot(direction) as u8 + 1),
            ]);
            hasher.update(cowboy.focus.to_le_bytes());
        }
        for furnishing in &self.furnishings {
            hasher.update(furnishing.id.get().to_le_bytes());
            hash_coord(&mut hasher, furnishing.tile);
            hasher.update(furnishing.health.to_le_bytes());
            hasher.update([u8::from(furnishing.is_piano), u8::from(furnishing.is_playing)]);
        }
        for bottle in &self.bottles {
            hasher.update(bottle.id.get().to_le_bytes());
            hash_coord(&mut hasher, bottle.tile);
            hasher.update([bottle.direction as u8, bottle.drunk_direction as u8]);
        }
        for young_gun in &self.young_guns {
            hasher.update([young_gun.owner.get()]);
            hash_coord(&mut hasher, young_gun.tile);
            hash_coord(&mut hasher, young_gun.call_in_tile);
            hash_coord(&mut hasher, young_gun.next_call_in_tile);
            hasher.update([u8::from(young_gun.can_call_in)]);
        }

        let mut digest = [0_u8; 32];
        digest.copy_from_slice(&hasher.finalize());
        Fingerprint(digest)
    }
}

fn hash_coord(hasher: &mut Sha256, coord: TileCoord) {
    hasher.update(coord.x().to_le_bytes());
    hasher.update(coord.y().to_le_bytes());
}

/// SHA-256 digest identifying the contents of a board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

const fn slot(direction: Direction) -> usize {
    match direction {
        Direction::North => 0,
        Direction::East => 1,
        Direction::South => 2,
        Direction::West => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saloon_core::Job;

    fn open_board(width: u32, height: u32) -> Board {
        Board::from_snapshot(&BoardSnapshot::new(width, height)).expect("valid board")
    }

    #[test]
    fn neighbor_links_are_symmetric() {
        let board = open_board(4, 3);
        for tile in board.tiles() {
            for direction in Direction::ALL {
                if let Some(neighbor) = tile.neighbor(direction) {
                    assert_eq!(
                        board.neighbor(neighbor, direction.opposite()),
                        Some(tile.coord()),
                        "link {direction} from {} is not mirrored",
                        tile.coord()
                    );
                }
            }
        }
    }

    #[test]
    fn corner_tiles_have_two_neighbors() {
        let board = open_board(4, 3);
        let corner = TileCoord::new(0, 0);
        let neighbors: Vec<_> = board.neighbors(corner, NeighborOrder::Vertical).collect();
        assert_eq!(neighbors, vec![TileCoord::new(0, 1), TileCoord::new(1, 0)]);
        assert_eq!(board.neighbor(corner, Direction::North), None);
        assert_eq!(board.neighbor(corner, Direction::West), None);
    }

    #[test]
    fn neighbor_orders_differ_in_axis_preference() {
        let board = open_board(3, 3);
        let center = TileCoord::new(1, 1);

        let vertical: Vec<_> = board.neighbors(center, NeighborOrder::Vertical).collect();
        assert_eq!(
            vertical,
            vec![
                TileCoord::new(1, 0),
                TileCoord::new(1, 2),
                TileCoord::new(2, 1),
                TileCoord::new(0, 1),
            ]
        );

        let horizontal: Vec<_> = board.neighbors(center, NeighborOrder::Horizontal).collect();
        assert_eq!(
            horizontal,
            vec![
                TileCoord::new(2, 1),
                TileCoord::new(0, 1),
                TileCoord::new(1, 0),
                TileCoord::new(1, 2),
            ]
        );
    }

    #[test]
    fn unknown_coordinates_have_no_neighbors() {
        let board = open_board(2, 2);
        assert!(board.tile(TileCoord::new(-1, 0)).is_none());
        assert_eq!(
            board
                .neighbors(TileCoord::new(5, 5), NeighborOrder::default())
                .count(),
            0
        );
    }

    #[test]
    fn rejects_empty_dimensions() {
        assert_eq!(
            Board::from_snapshot(&BoardSnapshot::new(0, 3)).err(),
            Some(BoardError::EmptyGrid {
                width: 0,
                height: 3
            })
        );
    }

    #[test]
    fn rejects_objects_outside_the_grid() {
        let mut snapshot = BoardSnapshot::new(2, 2);
        snapshot.hazards.push(TileCoord::new(2, 0));
        assert_eq!(
            Board::from_snapshot(&snapshot).err(),
            Some(BoardError::OutOfBounds {
                layer: "hazard",
                coord: TileCoord::new(2, 0)
            })
        );
    }

    #[test]
    fn rejects_stacked_cowboys() {
        let mut snapshot = BoardSnapshot::new(2, 2);
        let tile = TileCoord::new(1, 1);
        for id in [1, 2] {
            snapshot.cowboys.push(CowboySnapshot {
                id: CowboyId::new(id),
                owner: PlayerId::new(0),
                job: Job::Brawler,
                tile,
                health: 10,
                turns_busy: 0,
                can_move: true,
                is_drunk: false,
                drunk_direction: None,
                focus: 0,
            });
        }
        assert_eq!(
            Board::from_snapshot(&snapshot).err(),
            Some(BoardError::Overlap {
                layer: "cowboy",
                coord: tile
            })
        );
    }

    #[test]
    fn fingerprint_tracks_contents() {
        let snapshot = BoardSnapshot::new(3, 3);
        let first = Board::from_snapshot(&snapshot).expect("valid board");
        let second = Board::from_snapshot(&snapshot).expect("valid board");
        assert_eq!(first.fingerprint(), second.fingerprint());

        let mut changed = snapshot;
        changed.hazards.push(TileCoord::new(1, 1));
        let third = Board::from_snapshot(&changed).expect("valid board");
        assert_ne!(first.fingerprint(), third.fingerprint());
        assert_eq!(first.fingerprint().to_string().len(), 64);
    }

    #[test]
    fn fingerprint_covers_every_snapshot_field() {
        let mut snapshot = BoardSnapshot::new(4, 2);
        snapshot.cowboys.push(CowboySnapshot {
            id: CowboyId::new(1),
            owner: PlayerId::new(0),
            job: Job::Sharpshooter,
            tile: TileCoord::new(0, 1),
            health: 10,
            turns_busy: 0,
            can_move: true,
            is_drunk: false,
            drunk_direction: None,
            focus: 0,
        });
        snapshot.young_guns.push(YoungGunSnapshot {
            owner: PlayerId::new(0),
            tile: TileCoord::new(0, 0),
            call_in_tile: TileCoord::new(1, 0),
            next_call_in_tile: TileCoord::new(0, 1),
            can_call_in: true,
        });
        let base = Board::from_snapshot(&snapshot)
            .expect("valid board")
            .fingerprint();

        let mut variants = Vec::new();
        let mut focused = snapshot.clone();
        focused.cowboys[0].focus = 4;
        variants.push(("focus", focused));
        let mut stumbling = snapshot.clone();
        stumbling.cowboys[0].drunk_direction = Some(Direction::West);
        variants.push(("drunk direction", stumbling));
        let mut hurried = snapshot.clone();
        hurried.time_remaining_ms = 250;
        variants.push(("time remaining", hurried));
        let mut moved_spawn = snapshot.clone();
        moved_spawn.young_guns[0].call_in_tile = TileCoord::new(2, 0);
        variants.push(("call-in tile", moved_spawn));
        let mut next_spawn = snapshot.clone();
        next_spawn.young_guns[0].next_call_in_tile = TileCoord::new(3, 0);
        variants.push(("next call-in tile", next_spawn));
        let mut busy = snapshot.clone();
        busy.young_guns[0].can_call_in = false;
        variants.push(("can call in", busy));
        let mut opponent = snapshot;
        opponent.young_guns[0].owner = PlayerId::new(1);
        variants.push(("young gun owner", opponent));

        for (field, variant) in variants {
            let fingerprint = Board::from_snapshot(&variant)
                .expect("valid board")
                .fingerprint();
            assert_ne!(fingerprint, base, "{field} is not part of the fingerprint");
        }
    }
}
