//! Wall and goal predicates consumed by the searches.
//!
//! Any `Fn(&Tile) -> bool` closure is a predicate. The value types below
//! capture their arguments when constructed, so a predicate built inside a
//! loop keeps matching what it was built for after the loop moves on.

use std::collections::BTreeSet;

use saloon_core::{Direction, TileCoord};
use saloon_world::{hazard, Board, Tile};

/// Test applied to a tile during a search.
pub trait TilePredicate {
    /// Whether the predicate holds for the tile.
    fn holds(&self, tile: &Tile) -> bool;
}

impl<F> TilePredicate for F
where
    F: Fn(&Tile) -> bool,
{
    fn holds(&self, tile: &Tile) -> bool {
        self(tile)
    }
}

/// Combinators available on every predicate.
pub trait TilePredicateExt: TilePredicate + Sized {
    /// Holds when either predicate holds.
    fn or<P: TilePredicate>(self, other: P) -> Either<Self, P> {
        Either(self, other)
    }

    /// Holds when both predicates hold.
    fn and<P: TilePredicate>(self, other: P) -> Both<Self, P> {
        Both(self, other)
    }

    /// Holds when this predicate does not.
    fn not(self) -> Negated<Self> {
        Negated(self)
    }
}

impl<T: TilePredicate> TilePredicateExt for T {}

/// Disjunction of two predicates.
#[derive(Clone, Debug)]
pub struct Either<A, B>(A, B);

impl<A: TilePredicate, B: TilePredicate> TilePredicate for Either<A, B> {
    fn holds(&self, tile: &Tile) -> bool {
        self.0.holds(tile) || self.1.holds(tile)
    }
}

/// Conjunction of two predicates.
#[derive(Clone, Debug)]
pub struct Both<A, B>(A, B);

impl<A: TilePredicate, B: TilePredicate> TilePredicate for Both<A, B> {
    fn holds(&self, tile: &Tile) -> bool {
        self.0.holds(tile) && self.1.holds(tile)
    }
}

/// Negation of a predicate.
#[derive(Clone, Debug)]
pub struct Negated<P>(P);

impl<P: TilePredicate> TilePredicate for Negated<P> {
    fn holds(&self, tile: &Tile) -> bool {
        !self.0.holds(tile)
    }
}

/// Holds on exactly one tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AtTile(TileCoord);

impl AtTile {
    /// Matches the provided coordinate.
    #[must_use]
    pub const fn new(target: TileCoord) -> Self {
        Self(target)
    }
}

impl TilePredicate for AtTile {
    fn holds(&self, tile: &Tile) -> bool {
        tile.coord() == self.0
    }
}

/// Holds on any tile of a fixed set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnyTile(BTreeSet<TileCoord>);

impl AnyTile {
    /// Whether the set contains the coordinate.
    #[must_use]
    pub fn contains(&self, coord: TileCoord) -> bool {
        self.0.contains(&coord)
    }

    /// Whether the set is empty, in which case the predicate never holds.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<TileCoord> for AnyTile {
    fn from_iter<I: IntoIterator<Item = TileCoord>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl TilePredicate for AnyTile {
    fn holds(&self, tile: &Tile) -> bool {
        self.contains(tile.coord())
    }
}

/// Tiles nothing can walk onto: furnishings, balconies and occupied tiles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Obstructed;

impl TilePredicate for Obstructed {
    fn holds(&self, tile: &Tile) -> bool {
        !tile.is_open()
    }
}

/// Tiles carrying a static hazard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HasHazard;

impl TilePredicate for HasHazard {
    fn holds(&self, tile: &Tile) -> bool {
        tile.has_hazard()
    }
}

/// Tiles [`hazard::safe`] rejects, for use as an extra wall.
#[derive(Clone, Copy, Debug)]
pub struct Unsafe<'b> {
    board: &'b Board,
}

impl<'b> Unsafe<'b> {
    /// Evaluates safety against the provided board.
    #[must_use]
    pub const fn on(board: &'b Board) -> Self {
        Self { board }
    }
}

impl TilePredicate for Unsafe<'_> {
    fn holds(&self, tile: &Tile) -> bool {
        !hazard::safe(self.board, tile.coord())
    }
}

/// Tiles next to at least one piano.
#[derive(Clone, Copy, Debug)]
pub struct AdjacentToPiano<'b> {
    board: &'b Board,
}

impl<'b> AdjacentToPiano<'b> {
    /// Looks for pianos on the provided board.
    #[must_use]
    pub const fn on(board: &'b Board) -> Self {
        Self { board }
    }
}

impl TilePredicate for AdjacentToPiano<'_> {
    fn holds(&self, tile: &Tile) -> bool {
        Direction::ALL.into_iter().any(|direction| {
            tile.neighbor(direction)
                .and_then(|neighbor| self.board.tile(neighbor))
                .is_some_and(Tile::is_piano)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saloon_world::layout::parse_layout;

    fn board(rows: &[&str]) -> Board {
        Board::from_snapshot(&parse_layout(rows).expect("valid layout")).expect("valid board")
    }

    fn tile(board: &Board, x: i32, y: i32) -> &Tile {
        board.tile(TileCoord::new(x, y)).expect("tile on board")
    }

    #[test]
    fn value_predicates_ignore_later_changes_to_their_source() {
        let board = board(&["...", "..."]);
        let mut target = TileCoord::new(1, 1);
        let goal = AtTile::new(target);
        target = TileCoord::new(2, 0);

        assert!(goal.holds(tile(&board, 1, 1)));
        assert!(!goal.holds(tile(&board, target.x(), target.y())));
    }

    #[test]
    fn predicates_built_in_a_loop_keep_their_own_targets() {
        let board = board(&["...."]);
        let mut goals: Vec<Box<dyn TilePredicate>> = Vec::new();
        for x in 0..4 {
            let target = TileCoord::new(x, 0);
            goals.push(Box::new(move |tile: &Tile| tile.coord() == target));
        }

        for (x, goal) in (0..4).zip(&goals) {
            for candidate in 0..4 {
                assert_eq!(
                    goal.holds(tile(&board, candidate, 0)),
                    candidate == x,
                    "goal built for column {x} misfired on column {candidate}"
                );
            }
        }
    }

    #[test]
    fn any_tile_copies_its_set() {
        let board = board(&["...."]);
        let mut spots = vec![TileCoord::new(0, 0), TileCoord::new(2, 0)];
        let goal: AnyTile = spots.iter().copied().collect();
        spots.clear();

        assert!(goal.holds(tile(&board, 0, 0)));
        assert!(goal.holds(tile(&board, 2, 0)));
        assert!(!goal.holds(tile(&board, 1, 0)));
    }

    #[test]
    fn combinators_compose() {
        let board = board(&["H.F"]);
        let wall = Obstructed.or(HasHazard);
        assert!(wall.holds(tile(&board, 0, 0)));
        assert!(!wall.holds(tile(&board, 1, 0)));
        assert!(wall.holds(tile(&board, 2, 0)));

        let open_hazard = HasHazard.and(Obstructed.not());
        assert!(open_hazard.holds(tile(&board, 0, 0)));
        assert!(!open_hazard.holds(tile(&board, 2, 0)));
    }

    #[test]
    fn unsafe_flags_bottle_lanes() {
        let board = board(&["..<.."]);
        let wall = Unsafe::on(&board);
        assert!(wall.holds(tile(&board, 1, 0)));
        assert!(wall.holds(tile(&board, 0, 0)));
        assert!(!wall.holds(tile(&board, 3, 0)));
    }

    #[test]
    fn adjacent_to_piano_checks_all_sides() {
        let board = board(&["...", ".P.", "..."]);
        let goal = AdjacentToPiano::on(&board);
        assert!(goal.holds(tile(&board, 1, 0)));
        assert!(goal.holds(tile(&board, 0, 1)));
        assert!(!goal.holds(tile(&board, 0, 0)));
        assert!(!goal.holds(tile(&board, 1, 1)));
    }
}
