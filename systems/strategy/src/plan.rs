//! Bookkeeping for the commands issued during one turn.

use std::collections::{BTreeMap, BTreeSet};

use saloon_core::{
    Command, CowboyId, CowboySnapshot, Direction, FurnishingId, FurnishingSnapshot, Job,
    PlayerId, TileCoord,
};
use saloon_system_pathfinding::{bfs, predicate::AtTile, Path, SearchError, TilePredicate};
use saloon_world::{hazard, Board, NeighborOrder, Tile};

use crate::tactics::Occupancy;

/// Planned state of the turn layered over the read-only board.
///
/// Moves recorded here update planned positions so later decisions in the
/// same turn route around them. The board itself is never touched.
#[derive(Debug)]
pub(crate) struct TurnPlan<'b> {
    board: &'b Board,
    player: PlayerId,
    occupants: BTreeMap<TileCoord, CowboyId>,
    positions: BTreeMap<CowboyId, TileCoord>,
    moved: BTreeSet<CowboyId>,
    acted: BTreeSet<CowboyId>,
    played: BTreeSet<FurnishingId>,
    called_in: bool,
    commands: Vec<Command>,
}

impl<'b> TurnPlan<'b> {
    pub(crate) fn new(board: &'b Board, player: PlayerId) -> Self {
        let mut occupants = BTreeMap::new();
        let mut positions = BTreeMap::new();
        for cowboy in board.cowboys() {
            let _ = occupants.insert(cowboy.tile, cowboy.id);
            let _ = positions.insert(cowboy.id, cowboy.tile);
        }

        Self {
            board,
            player,
            occupants,
            positions,
            moved: BTreeSet::new(),
            acted: BTreeSet::new(),
            played: BTreeSet::new(),
            called_in: false,
            commands: Vec::new(),
        }
    }

    pub(crate) fn board(&self) -> &'b Board {
        self.board
    }

    pub(crate) fn player(&self) -> PlayerId {
        self.player
    }

    /// Our living cowboys ordered by identifier.
    pub(crate) fn ours(&self) -> Vec<&'b CowboySnapshot> {
        self.board.cowboys_of(self.player).collect()
    }

    /// Our living cowboys with the provided job.
    pub(crate) fn ours_with_job(&self, job: Job) -> Vec<&'b CowboySnapshot> {
        self.board
            .cowboys_of(self.player)
            .filter(|cowboy| cowboy.job == job)
            .collect()
    }

    pub(crate) fn position(&self, cowboy: CowboyId) -> Option<TileCoord> {
        self.positions.get(&cowboy).copied()
    }

    /// Cowboy planned to stand on the tile once queued moves resolve.
    pub(crate) fn occupant(&self, coord: TileCoord) -> Option<&'b CowboySnapshot> {
        self.occupants
            .get(&coord)
            .and_then(|id| self.board.cowboy(*id))
    }

    pub(crate) fn is_ally(&self, cowboy: &CowboySnapshot) -> bool {
        cowboy.owner == self.player
    }

    /// Whether a cowboy could step onto the tile given the planned positions.
    pub(crate) fn is_free(&self, coord: TileCoord) -> bool {
        self.board.tile(coord).is_some_and(|tile| {
            !tile.is_balcony()
                && tile.furnishing().is_none()
                && !self.occupants.contains_key(&coord)
        })
    }

    pub(crate) fn can_move(&self, cowboy: &CowboySnapshot) -> bool {
        cowboy.can_move && !self.moved.contains(&cowboy.id)
    }

    pub(crate) fn can_act(&self, cowboy: &CowboySnapshot) -> bool {
        cowboy.is_ready() && !self.acted.contains(&cowboy.id)
    }

    /// Queues a move onto an adjacent free tile.
    pub(crate) fn move_cowboy(&mut self, cowboy: &CowboySnapshot, to: TileCoord) -> bool {
        let Some(from) = self.position(cowboy.id) else {
            return false;
        };
        if !self.can_move(cowboy) || from.manhattan_distance(to) != 1 || !self.is_free(to) {
            return false;
        }

        let _ = self.occupants.remove(&from);
        let _ = self.occupants.insert(to, cowboy.id);
        let _ = self.positions.insert(cowboy.id, to);
        let _ = self.moved.insert(cowboy.id);
        self.commands.push(Command::Move {
            cowboy: cowboy.id,
            to,
        });
        tracing::debug!(cowboy = cowboy.id.get(), %from, %to, "queued move");
        true
    }

    /// Queues a job action aimed at an adjacent tile.
    pub(crate) fn act(
        &mut self,
        cowboy: &CowboySnapshot,
        target: TileCoord,
        drunk_direction: Option<Direction>,
    ) -> bool {
        let Some(from) = self.position(cowboy.id) else {
            return false;
        };
        if !self.can_act(cowboy) || from.manhattan_distance(target) != 1 {
            return false;
        }

        let _ = self.acted.insert(cowboy.id);
        self.commands.push(Command::Act {
            cowboy: cowboy.id,
            target,
            drunk_direction,
        });
        tracing::debug!(cowboy = cowboy.id.get(), %target, "queued action");
        true
    }

    /// Queues playing an adjacent piano nobody plays yet.
    pub(crate) fn play(&mut self, cowboy: &CowboySnapshot, piano: &FurnishingSnapshot) -> bool {
        let Some(from) = self.position(cowboy.id) else {
            return false;
        };
        if !self.can_act(cowboy)
            || !piano.is_piano
            || piano.is_playing
            || self.played.contains(&piano.id)
            || from.manhattan_distance(piano.tile) != 1
        {
            return false;
        }

        let _ = self.acted.insert(cowboy.id);
        let _ = self.played.insert(piano.id);
        self.commands.push(Command::Play {
            cowboy: cowboy.id,
            piano: piano.id,
        });
        tracing::debug!(cowboy = cowboy.id.get(), piano = piano.id.get(), "queued piano");
        true
    }

    /// Queues a call-in unless one was already issued or the YoungGun is busy.
    pub(crate) fn call_in(&mut self, job: Job) -> bool {
        let Some(young_gun) = self.board.young_gun(self.player) else {
            return false;
        };
        if self.called_in || !young_gun.can_call_in {
            return false;
        }

        self.called_in = true;
        self.commands.push(Command::CallIn {
            player: self.player,
            job,
        });
        tracing::info!(%job, tile = %young_gun.call_in_tile, "calling in cowboy");
        true
    }

    /// Shortest route for one of our cowboys from its planned position.
    ///
    /// Furnishings, balconies, enemies and allies that already moved are
    /// walls. Cautious routing also walls off hazards and bottle lanes.
    pub(crate) fn route<G>(
        &self,
        cowboy: &CowboySnapshot,
        goal: &G,
        cautious: bool,
    ) -> Result<Path, SearchError>
    where
        G: TilePredicate + ?Sized,
    {
        let start = self.position(cowboy.id).unwrap_or(cowboy.tile);
        let wall = |tile: &Tile| self.blocks_route(tile, cautious);
        bfs(self.board, start, goal, &wall, NeighborOrder::Vertical)
    }

    fn blocks_route(&self, tile: &Tile, cautious: bool) -> bool {
        if tile.furnishing().is_some() || tile.is_balcony() {
            return true;
        }
        let blocked_by_cowboy = self
            .occupant(tile.coord())
            .is_some_and(|other| !self.is_ally(other) || !self.can_move(other));
        if blocked_by_cowboy {
            return true;
        }
        cautious
            && (tile.has_hazard() || hazard::incoming_bottle(self.board, tile.coord()).is_some())
    }

    /// Takes the first step of `path`, asking an ally in the way to make room.
    pub(crate) fn step_along(
        &mut self,
        cowboy: &CowboySnapshot,
        path: &Path,
        cautious: bool,
    ) -> bool {
        let Some(next) = path.next_step() else {
            return false;
        };
        if let Some(blocker) = self.occupant(next) {
            if !self.is_ally(blocker) || blocker.id == cowboy.id {
                return false;
            }
            if !self.step_aside(blocker, cautious) {
                return false;
            }
        }
        self.move_cowboy(cowboy, next)
    }

    /// Moves an ally out of the way.
    ///
    /// An ally next to a piano slides to another slot of the same piano when
    /// one is two steps away; otherwise it takes the first free neighbour.
    pub(crate) fn step_aside(&mut self, ally: &CowboySnapshot, cautious: bool) -> bool {
        if !self.can_move(ally) {
            return false;
        }
        let Some(from) = self.position(ally.id) else {
            return false;
        };

        let board = self.board;
        let pianos: Vec<TileCoord> = board
            .neighbors(from, NeighborOrder::Vertical)
            .filter(|coord| board.tile(*coord).is_some_and(Tile::is_piano))
            .collect();
        for piano in pianos {
            for slot in board.neighbors(piano, NeighborOrder::Vertical) {
                if !self.is_free(slot) {
                    continue;
                }
                let Ok(path) = self.route(ally, &AtTile::new(slot), cautious) else {
                    continue;
                };
                if path.len() == 3 {
                    if let Some(next) = path.next_step() {
                        return self.move_cowboy(ally, next);
                    }
                }
            }
        }

        let free = board
            .neighbors(from, NeighborOrder::Vertical)
            .find(|coord| self.is_free(*coord));
        match free {
            Some(next) => self.move_cowboy(ally, next),
            None => false,
        }
    }

    /// Plays the first adjacent piano that is still idle.
    pub(crate) fn play_adjacent(&mut self, cowboy: &CowboySnapshot) -> bool {
        if !self.can_act(cowboy) {
            return false;
        }
        let Some(from) = self.position(cowboy.id) else {
            return false;
        };

        let board = self.board;
        let pianos: Vec<&FurnishingSnapshot> = board
            .neighbors(from, NeighborOrder::Vertical)
            .filter_map(|coord| board.tile(coord).and_then(Tile::furnishing))
            .filter(|furnishing| furnishing.is_piano && !furnishing.is_playing)
            .collect();
        pianos.into_iter().any(|piano| self.play(cowboy, piano))
    }

    pub(crate) fn into_commands(self) -> Vec<Command> {
        self.commands
    }
}

impl Occupancy for TurnPlan<'_> {
    fn occupant(&self, coord: TileCoord) -> Option<&CowboySnapshot> {
        TurnPlan::occupant(self, coord)
    }

    fn position_of(&self, cowboy: &CowboySnapshot) -> TileCoord {
        self.position(cowboy.id).unwrap_or(cowboy.tile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saloon_core::YoungGunSnapshot;
    use saloon_world::layout::parse_layout;

    fn board(rows: &[&str]) -> Board {
        Board::from_snapshot(&parse_layout(rows).expect("valid layout")).expect("valid board")
    }

    #[test]
    fn moves_update_planned_occupancy() {
        let board = board(&["B.."]);
        let cowboy = board.cowboys()[0];
        let mut plan = TurnPlan::new(&board, PlayerId::new(0));

        assert!(plan.move_cowboy(&cowboy, TileCoord::new(1, 0)));
        assert_eq!(plan.position(cowboy.id), Some(TileCoord::new(1, 0)));
        assert!(plan.is_free(TileCoord::new(0, 0)));
        assert!(!plan.is_free(TileCoord::new(1, 0)));
        assert!(!plan.move_cowboy(&cowboy, TileCoord::new(2, 0)), "one move per turn");
        assert_eq!(plan.into_commands().len(), 1);
    }

    #[test]
    fn moves_must_be_adjacent_and_free() {
        let board = board(&["BF.", "..."]);
        let cowboy = board.cowboys()[0];
        let mut plan = TurnPlan::new(&board, PlayerId::new(0));

        assert!(!plan.move_cowboy(&cowboy, TileCoord::new(1, 0)), "furnished");
        assert!(!plan.move_cowboy(&cowboy, TileCoord::new(1, 1)), "diagonal");
        assert!(plan.move_cowboy(&cowboy, TileCoord::new(0, 1)));
    }

    #[test]
    fn each_piano_is_played_once() {
        let board = board(&["BPT"]);
        let piano = board.furnishings()[0];
        let brawler = board.cowboys()[0];
        let bartender = board.cowboys()[1];
        let mut plan = TurnPlan::new(&board, PlayerId::new(0));

        assert!(plan.play(&brawler, &piano));
        assert!(!plan.play(&bartender, &piano));
        assert!(!plan.act(&brawler, TileCoord::new(0, 1), None), "already acted");
    }

    #[test]
    fn only_one_call_in_per_turn() {
        let mut snapshot = parse_layout(&["#..", "..."]).expect("valid layout");
        snapshot.young_guns.push(YoungGunSnapshot {
            owner: PlayerId::new(0),
            tile: TileCoord::new(0, 0),
            call_in_tile: TileCoord::new(0, 1),
            next_call_in_tile: TileCoord::new(1, 0),
            can_call_in: true,
        });
        let board = Board::from_snapshot(&snapshot).expect("valid board");
        let mut plan = TurnPlan::new(&board, PlayerId::new(0));

        assert!(plan.call_in(Job::Brawler));
        assert!(!plan.call_in(Job::Bartender));

        let mut opponent = TurnPlan::new(&board, PlayerId::new(1));
        assert!(!opponent.call_in(Job::Brawler), "no young gun for player 1");
    }

    #[test]
    fn routes_pass_movable_allies_but_not_enemies() {
        let board = board(&[
            "B.T.b..", //
            "FFFFFFF", //
        ]);
        let brawler = board.cowboys()[0];
        let plan = TurnPlan::new(&board, PlayerId::new(0));

        let past_ally = plan
            .route(&brawler, &|tile: &Tile| tile.coord() == TileCoord::new(3, 0), false)
            .expect("allies step aside");
        assert_eq!(past_ally.len(), 4);

        let past_enemy =
            plan.route(&brawler, &|tile: &Tile| tile.coord() == TileCoord::new(6, 0), false);
        assert!(past_enemy.is_err());
    }

    #[test]
    fn cautious_routes_avoid_hazards() {
        let board = board(&[
            "B.H..", //
            ".....", //
        ]);
        let brawler = board.cowboys()[0];
        let plan = TurnPlan::new(&board, PlayerId::new(0));
        let goal = |tile: &Tile| tile.coord() == TileCoord::new(4, 0);

        let direct = plan.route(&brawler, &goal, false).expect("open board");
        assert!(direct.tiles().contains(&TileCoord::new(2, 0)));

        let careful = plan.route(&brawler, &goal, true).expect("detour exists");
        assert!(!careful.tiles().contains(&TileCoord::new(2, 0)));
        assert_eq!(careful.len(), direct.len() + 2);
    }
}
