//! Direction arithmetic and alignment tests on the tile grid.

use thiserror::Error;

use crate::{Direction, TileCoord};

/// Errors raised by the geometry helpers.
///
/// These indicate a caller bug rather than a game condition.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    /// The provided text does not name one of the four cardinal directions.
    #[error("`{0}` is not a cardinal direction")]
    InvalidDirection(String),
}

impl Direction {
    /// Direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Direction {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
        }
    }

    /// The two directions perpendicular to this one.
    ///
    /// Vertical directions yield `[West, East]`, horizontal ones yield
    /// `[North, South]`.
    #[must_use]
    pub const fn perpendicular(self) -> [Direction; 2] {
        match self {
            Self::North | Self::South => [Self::West, Self::East],
            Self::East | Self::West => [Self::North, Self::South],
        }
    }

    /// Unit offset `(dx, dy)` of a single step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Direction obtained by turning a quarter clockwise.
    #[must_use]
    pub const fn rotate_right(self) -> Direction {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
        }
    }
}

/// Smaller of the horizontal and vertical separations.
///
/// Zero means the tiles share a row or a column.
#[must_use]
pub fn alignment(a: TileCoord, b: TileCoord) -> u32 {
    let dx = a.x().abs_diff(b.x());
    let dy = a.y().abs_diff(b.y());
    dx.min(dy)
}

/// Single cardinal direction approximating the vector from `from` to `to`.
///
/// The larger axis wins. Exact diagonals resolve horizontally, and coincident
/// tiles resolve to east.
#[must_use]
pub fn toward(from: TileCoord, to: TileCoord) -> Direction {
    let dx = i64::from(to.x()) - i64::from(from.x());
    let dy = i64::from(to.y()) - i64::from(from.y());

    if dx >= dy.abs() {
        Direction::East
    } else if dy > dx.abs() {
        Direction::South
    } else if -dx >= dy.abs() {
        Direction::West
    } else {
        Direction::North
    }
}
