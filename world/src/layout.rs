//! Text layouts describing boards one glyph per tile.
//!
//! | Glyph | Meaning |
//! | --- | --- |
//! | `.` | open floor |
//! | `#` | balcony |
//! | `H` | hazard |
//! | `F` | furnishing |
//! | `P` | piano |
//! | `B` `T` `S` | brawler, bartender, sharpshooter of player 0 |
//! | `b` `t` `s` | brawler, bartender, sharpshooter of player 1 |
//! | `^` `>` `v` `<` | bottle flying north, east, south, west |
//!
//! Identifiers are assigned in row-major order starting at one.

use saloon_core::{
    BottleId, BottleSnapshot, CowboyId, CowboySnapshot, Direction, FurnishingId,
    FurnishingSnapshot, Job, PlayerId, TileCoord,
};
use thiserror::Error;

use crate::BoardSnapshot;

const COWBOY_HEALTH: u32 = 10;
const FURNISHING_HEALTH: u32 = 3;
const PIANO_HEALTH: u32 = 5;

/// Reasons a text layout cannot be parsed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// The layout contains no rows or only empty rows.
    #[error("layout contains no tiles")]
    Empty,
    /// A row is shorter or longer than the first row.
    #[error("row {row} has {found} tiles, expected {expected}")]
    Ragged {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A glyph has no meaning.
    #[error("unknown glyph `{glyph}` at {coord}")]
    UnknownGlyph {
        /// Glyph that was not recognised.
        glyph: char,
        /// Tile the glyph was found on.
        coord: TileCoord,
    },
    /// The layout is too large to address.
    #[error("layout exceeds the addressable range")]
    Oversized,
}

/// Parses a text layout into a board snapshot.
///
/// Surrounding whitespace on each row is ignored, as are blank rows.
pub fn parse_layout<S: AsRef<str>>(rows: &[S]) -> Result<BoardSnapshot, LayoutError> {
    let rows: Vec<&str> = rows
        .iter()
        .map(|row| row.as_ref().trim())
        .filter(|row| !row.is_empty())
        .collect();
    let Some(first) = rows.first() else {
        return Err(LayoutError::Empty);
    };
    let expected = first.chars().count();

    let width = u32::try_from(expected).map_err(|_| LayoutError::Oversized)?;
    let height = u32::try_from(rows.len()).map_err(|_| LayoutError::Oversized)?;
    let mut snapshot = BoardSnapshot::new(width, height);

    for (row_index, row) in rows.iter().enumerate() {
        let found = row.chars().count();
        if found != expected {
            return Err(LayoutError::Ragged {
                row: row_index,
                expected,
                found,
            });
        }
        let y = i32::try_from(row_index).map_err(|_| LayoutError::Oversized)?;

        for (column_index, glyph) in row.chars().enumerate() {
            let x = i32::try_from(column_index).map_err(|_| LayoutError::Oversized)?;
            let coord = TileCoord::new(x, y);
            place(&mut snapshot, glyph, coord)?;
        }
    }

    Ok(snapshot)
}

fn place(snapshot: &mut BoardSnapshot, glyph: char, coord: TileCoord) -> Result<(), LayoutError> {
    match glyph {
        '.' => {}
        '#' => snapshot.balconies.push(coord),
        'H' => snapshot.hazards.push(coord),
        'F' | 'P' => {
            let is_piano = glyph == 'P';
            let id = next_id(snapshot.furnishings.len())?;
            snapshot.furnishings.push(FurnishingSnapshot {
                id: FurnishingId::new(id),
                tile: coord,
                health: if is_piano { PIANO_HEALTH } else { FURNISHING_HEALTH },
                is_piano,
                is_playing: false,
            });
        }
        'B' | 'T' | 'S' | 'b' | 't' | 's' => {
            let owner = if glyph.is_ascii_uppercase() {
                PlayerId::new(0)
            } else {
                PlayerId::new(1)
            };
            let job = match glyph.to_ascii_uppercase() {
                'B' => Job::Brawler,
                'T' => Job::Bartender,
                _ => Job::Sharpshooter,
            };
            let id = next_id(snapshot.cowboys.len())?;
            snapshot.cowboys.push(CowboySnapshot {
                id: CowboyId::new(id),
                owner,
                job,
                tile: coord,
                health: COWBOY_HEALTH,
                turns_busy: 0,
                can_move: true,
                is_drunk: false,
                drunk_direction: None,
                focus: 0,
            });
        }
        '^' | '>' | 'v' | '<' => {
            let direction = match glyph {
                '^' => Direction::North,
                '>' => Direction::East,
                'v' => Direction::South,
                _ => Direction::West,
            };
            let id = next_id(snapshot.bottles.len())?;
            snapshot.bottles.push(BottleSnapshot {
                id: BottleId::new(id),
                tile: coord,
                direction,
                drunk_direction: Direction::North,
            });
        }
        _ => return Err(LayoutError::UnknownGlyph { glyph, coord }),
    }
    Ok(())
}

fn next_id(count: usize) -> Result<u32, LayoutError> {
    u32::try_from(count + 1).map_err(|_| LayoutError::Oversized)
}
