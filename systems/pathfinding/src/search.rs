//! Single-goal and multi-goal breadth-first search.

use std::collections::{BTreeMap, VecDeque};

use saloon_core::TileCoord;
use saloon_world::{Board, NeighborOrder};

use crate::{Path, SearchError, TilePredicate};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Mark {
    Unseen,
    Root,
    Parent(TileCoord),
}

/// FIFO frontier with dense predecessor bookkeeping.
#[derive(Debug)]
pub(crate) struct Frontier<'b> {
    board: &'b Board,
    marks: Vec<Mark>,
    depths: Vec<u32>,
    queue: VecDeque<TileCoord>,
}

impl<'b> Frontier<'b> {
    /// Seeds the frontier with root tiles. Off-board and repeated roots are skipped.
    pub(crate) fn rooted<I>(board: &'b Board, roots: I) -> Self
    where
        I: IntoIterator<Item = TileCoord>,
    {
        let mut frontier = Self {
            board,
            marks: vec![Mark::Unseen; board.tile_count()],
            depths: vec![0; board.tile_count()],
            queue: VecDeque::new(),
        };

        for root in roots {
            let Some(index) = board.index_of(root) else {
                continue;
            };
            if frontier.marks[index] != Mark::Unseen {
                continue;
            }
            frontier.marks[index] = Mark::Root;
            frontier.queue.push_back(root);
        }

        frontier
    }

    pub(crate) fn pop(&mut self) -> Option<TileCoord> {
        self.queue.pop_front()
    }

    /// Records `from` as the predecessor of `next` unless `next` was seen before.
    pub(crate) fn admit(&mut self, from: TileCoord, next: TileCoord) {
        let (Some(from_index), Some(next_index)) =
            (self.board.index_of(from), self.board.index_of(next))
        else {
            return;
        };
        if self.marks[next_index] != Mark::Unseen {
            return;
        }
        self.marks[next_index] = Mark::Parent(from);
        self.depths[next_index] = self.depths[from_index].saturating_add(1);
        self.queue.push_back(next);
    }

    /// Every tile reached so far with its mark and depth, in row-major order.
    pub(crate) fn reached(&self) -> impl Iterator<Item = (TileCoord, Mark, u32)> + '_ {
        self.board
            .tiles()
            .zip(self.marks.iter().zip(self.depths.iter()))
            .filter(|(_, (mark, _))| **mark != Mark::Unseen)
            .map(|(tile, (mark, depth))| (tile.coord(), *mark, *depth))
    }

    fn path_to(&self, goal: TileCoord) -> Path {
        let mut tiles = vec![goal];
        let mut cursor = goal;
        while let Some(Mark::Parent(parent)) = self
            .board
            .index_of(cursor)
            .and_then(|index| self.marks.get(index).copied())
        {
            tiles.push(parent);
            cursor = parent;
        }
        tiles.reverse();
        Path::from_tiles(tiles)
    }
}

/// Shortest path from `start` to the first tile satisfying `goal`.
///
/// The goal test runs when a tile leaves the frontier, so a start tile that
/// satisfies the goal yields a single-tile path. Neighbours are skipped when
/// `wall` holds for them unless `goal` holds as well: goal tiles are always
/// enterable. Ties between equally distant goals are broken by `order`.
pub fn bfs<G, W>(
    board: &Board,
    start: TileCoord,
    goal: &G,
    wall: &W,
    order: NeighborOrder,
) -> Result<Path, SearchError>
where
    G: TilePredicate + ?Sized,
    W: TilePredicate + ?Sized,
{
    if !board.contains(start) {
        return Err(SearchError::UnknownTile(start));
    }

    let mut frontier = Frontier::rooted(board, [start]);
    while let Some(current) = frontier.pop() {
        let Some(tile) = board.tile(current) else {
            continue;
        };
        if goal.holds(tile) {
            return Ok(frontier.path_to(current));
        }
        expand(board, &mut frontier, current, goal, wall, order);
    }

    tracing::trace!(%start, "search exhausted the frontier");
    Err(SearchError::NoPathFound { start })
}

/// Shortest path from `start` to every reachable tile satisfying `goal`.
///
/// Unlike [`bfs`] the traversal continues past goal tiles, so goals lying
/// behind other goals are found as well. Goals walled off from `start` are
/// absent from the result.
pub fn paths_to_all_goals<G, W>(
    board: &Board,
    start: TileCoord,
    goal: &G,
    wall: &W,
) -> Result<BTreeMap<TileCoord, Path>, SearchError>
where
    G: TilePredicate + ?Sized,
    W: TilePredicate + ?Sized,
{
    if !board.contains(start) {
        return Err(SearchError::UnknownTile(start));
    }

    let mut paths = BTreeMap::new();
    let mut frontier = Frontier::rooted(board, [start]);
    while let Some(current) = frontier.pop() {
        let Some(tile) = board.tile(current) else {
            continue;
        };
        if goal.holds(tile) {
            let _ = paths.insert(current, frontier.path_to(current));
        }
        expand(
            board,
            &mut frontier,
            current,
            goal,
            wall,
            NeighborOrder::default(),
        );
    }

    Ok(paths)
}

fn expand<G, W>(
    board: &Board,
    frontier: &mut Frontier<'_>,
    current: TileCoord,
    goal: &G,
    wall: &W,
    order: NeighborOrder,
) where
    G: TilePredicate + ?Sized,
    W: TilePredicate + ?Sized,
{
    for neighbor in board.neighbors(current, order) {
        let Some(tile) = board.tile(neighbor) else {
            continue;
        };
        if wall.holds(tile) && !goal.holds(tile) {
            continue;
        }
        frontier.admit(current, neighbor);
    }
}
