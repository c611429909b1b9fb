//! Spawn camping: crowd the YoungGun's call-in tiles so enemy call-ins are
//! wasted, and keep sharpshooters on the pianos.

use saloon_core::{CowboySnapshot, Direction, Job, TileCoord, YoungGunSnapshot};
use saloon_system_pathfinding::{predicate::AdjacentToPiano, TilePredicateExt};
use saloon_world::{NeighborOrder, Tile};

use crate::{plan::TurnPlan, TurnConfig};

pub(crate) fn plan_turn(plan: &mut TurnPlan<'_>, config: &TurnConfig, movement: bool) {
    let board = plan.board();
    match board.young_gun(plan.player()).copied() {
        Some(young_gun) => camp(plan, config, &young_gun, movement),
        None => tracing::warn!(player = plan.player().get(), "no young gun on the board"),
    }

    for sharpshooter in plan.ours_with_job(Job::Sharpshooter) {
        if movement {
            let view: &TurnPlan<'_> = plan;
            let untaken = |tile: &Tile| {
                view.occupant(tile.coord())
                    .map_or(true, |cowboy| cowboy.id == sharpshooter.id)
            };
            let goal = AdjacentToPiano::on(board).and(untaken);
            if let Ok(path) = view.route(sharpshooter, &goal, false) {
                if path.len() > 1 {
                    let _ = plan.step_along(sharpshooter, &path, false);
                }
            }
        }
        let _ = plan.play_adjacent(sharpshooter);
    }
}

fn camp(
    plan: &mut TurnPlan<'_>,
    config: &TurnConfig,
    young_gun: &YoungGunSnapshot,
    movement: bool,
) {
    let spawn = young_gun.call_in_tile;
    let next_spawn = young_gun.next_call_in_tile;

    match plan.board().current_turn() {
        0 | 1 => {
            let _ = plan.call_in(Job::Brawler);
        }
        2 | 3 => {
            let first = plan.ours_with_job(Job::Brawler).first().copied();
            if let Some(brawler) = first.filter(|_| movement) {
                if is_adjacent(plan, brawler, next_spawn) {
                    let _ = plan.move_cowboy(brawler, next_spawn);
                }
            }
            let _ = plan.call_in(Job::Bartender);
        }
        _ => {
            let brawlers = plan.ours_with_job(Job::Brawler);
            let bartenders = plan.ours_with_job(Job::Bartender);

            if movement {
                for brawler in &brawlers {
                    if is_adjacent(plan, brawler, next_spawn) {
                        let _ = plan.move_cowboy(brawler, next_spawn);
                    } else if spawn != next_spawn {
                        seek_hazard(plan, config, brawler);
                    }
                }
            }

            if spawn == next_spawn {
                if brawlers.len() < 2 && open_or_same(plan, spawn, Job::Brawler) {
                    let _ = plan.call_in(Job::Brawler);
                }
            } else {
                if movement {
                    for bartender in &bartenders {
                        ambush(plan, config, bartender, spawn);
                    }
                }
                if bartenders.len() < 2 && open_or_same(plan, spawn, Job::Bartender) {
                    let _ = plan.call_in(Job::Bartender);
                }
            }

            let crushed = plan
                .board()
                .tile(spawn)
                .is_some_and(|tile| tile.furnishing().is_some());
            if crushed {
                let _ = plan.call_in(Job::Sharpshooter);
            }
        }
    }
}

/// Steps a bartender onto the call-in tile and throws to its right.
fn ambush(
    plan: &mut TurnPlan<'_>,
    config: &TurnConfig,
    bartender: &CowboySnapshot,
    spawn: TileCoord,
) {
    let Some(from) = plan.position(bartender.id) else {
        return;
    };
    let board = plan.board();
    let approach = [
        Direction::East,
        Direction::North,
        Direction::West,
        Direction::South,
    ]
    .into_iter()
    .find(|direction| board.neighbor(from, *direction) == Some(spawn));

    let Some(approach) = approach else {
        seek_hazard(plan, config, bartender);
        return;
    };
    if !plan.move_cowboy(bartender, spawn) {
        return;
    }

    let throw = approach.rotate_right();
    let Some(target) = board.neighbor(spawn, throw) else {
        return;
    };
    if plan.occupant(target).is_none() && plan.act(bartender, target, Some(throw)) {
        tracing::info!(cowboy = bartender.id.get(), %throw, "ambushing call-in tile");
    }
}

/// Walks a cowboy with nothing better to do toward the nearest hazard.
fn seek_hazard(plan: &mut TurnPlan<'_>, config: &TurnConfig, cowboy: &CowboySnapshot) {
    let Ok(path) = plan.route(cowboy, &Tile::has_hazard, false) else {
        return;
    };
    if path.len() > 1 && path.len() < config.hazard_route_limit {
        let _ = plan.step_along(cowboy, &path, false);
    }
}

fn is_adjacent(plan: &TurnPlan<'_>, cowboy: &CowboySnapshot, coord: TileCoord) -> bool {
    plan.position(cowboy.id)
        .is_some_and(|from| from.manhattan_distance(coord) == 1)
}

/// Whether a call-in of `job` onto the tile would not be wasted.
///
/// The tile must be unfurnished and free of bottles, including bottles about
/// to land on it, and may only hold a cowboy of the same job.
fn open_or_same(plan: &TurnPlan<'_>, coord: TileCoord, job: Job) -> bool {
    let board = plan.board();
    let Some(tile) = board.tile(coord) else {
        return false;
    };
    if tile.furnishing().is_some() || tile.bottle().is_some() {
        return false;
    }
    let bottle_arriving = board
        .neighbors(coord, NeighborOrder::Vertical)
        .filter_map(|neighbor| board.tile(neighbor))
        .filter_map(|neighbor| Some((neighbor.coord(), neighbor.bottle()?)))
        .any(|(at, bottle)| board.neighbor(at, bottle.direction) == Some(coord));
    if bottle_arriving {
        return false;
    }
    plan.occupant(coord).map_or(true, |cowboy| cowboy.job == job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use saloon_core::{Command, CowboyId, FurnishingId, PlayerId};
    use saloon_world::{layout::parse_layout, Board, BoardSnapshot};

    fn snapshot(rows: &[&str], turn: u32) -> BoardSnapshot {
        let mut snapshot = parse_layout(rows).expect("valid layout");
        snapshot.current_turn = turn;
        snapshot
    }

    fn with_young_gun(mut snapshot: BoardSnapshot, spawn: TileCoord, next: TileCoord) -> Board {
        snapshot.young_guns.push(YoungGunSnapshot {
            owner: PlayerId::new(0),
            tile: TileCoord::new(0, 0),
            call_in_tile: spawn,
            next_call_in_tile: next,
            can_call_in: true,
        });
        Board::from_snapshot(&snapshot).expect("valid board")
    }

    fn run(board: &Board) -> Vec<Command> {
        let mut plan = TurnPlan::new(board, PlayerId::new(0));
        plan_turn(&mut plan, &TurnConfig::default(), true);
        plan.into_commands()
    }

    fn call_in(job: Job) -> Command {
        Command::CallIn {
            player: PlayerId::new(0),
            job,
        }
    }

    #[test]
    fn opening_turns_call_brawlers_then_bartenders() {
        let rows = ["#....", ".....", "....."];
        let spawn = TileCoord::new(1, 0);
        let next = TileCoord::new(0, 1);

        let board = with_young_gun(snapshot(&rows, 0), spawn, next);
        assert_eq!(run(&board), vec![call_in(Job::Brawler)]);

        let board = with_young_gun(snapshot(&["#B...", ".....", "....."], 2), spawn, next);
        assert_eq!(
            run(&board),
            vec![call_in(Job::Bartender)],
            "brawler is not next to the next call-in tile"
        );
    }

    #[test]
    fn brawler_steps_onto_next_call_in_tile() {
        let board = with_young_gun(
            snapshot(&["#....", "B....", "....."], 2),
            TileCoord::new(1, 0),
            TileCoord::new(1, 1),
        );
        assert_eq!(
            run(&board),
            vec![
                Command::Move {
                    cowboy: CowboyId::new(1),
                    to: TileCoord::new(1, 1),
                },
                call_in(Job::Bartender),
            ]
        );
    }

    #[test]
    fn bartender_occupies_call_in_tile_and_throws_right() {
        let board = with_young_gun(
            snapshot(&["#....", ".T...", "....."], 5),
            TileCoord::new(1, 0),
            TileCoord::new(0, 1),
        );
        let commands = run(&board);

        assert_eq!(
            commands[0],
            Command::Move {
                cowboy: CowboyId::new(1),
                to: TileCoord::new(1, 0),
            }
        );
        assert_eq!(
            commands[1],
            Command::Act {
                cowboy: CowboyId::new(1),
                target: TileCoord::new(2, 0),
                drunk_direction: Some(Direction::East),
            },
            "approached heading north, so the throw goes east"
        );
        assert_eq!(commands[2], call_in(Job::Bartender));
    }

    #[test]
    fn wasted_call_ins_are_skipped() {
        let mut state = snapshot(&["#....", ".....", "....."], 6);
        state.bottles = parse_layout(&["..<..", ".....", "....."])
            .expect("valid layout")
            .bottles;
        let board = with_young_gun(state, TileCoord::new(1, 0), TileCoord::new(1, 0));
        assert!(
            run(&board).is_empty(),
            "a bottle is about to land on the call-in tile"
        );
    }

    #[test]
    fn sharpshooters_walk_to_pianos_and_play() {
        let board = Board::from_snapshot(&snapshot(&["S..P", "...."], 9)).expect("valid board");
        let commands = run(&board);
        assert_eq!(
            commands,
            vec![Command::Move {
                cowboy: CowboyId::new(1),
                to: TileCoord::new(1, 0),
            }]
        );

        let board = Board::from_snapshot(&snapshot(&["..SP", "...."], 9)).expect("valid board");
        assert_eq!(
            run(&board),
            vec![Command::Play {
                cowboy: CowboyId::new(1),
                piano: FurnishingId::new(1),
            }]
        );
    }

    #[test]
    fn sharpshooters_skip_piano_slots_held_by_others() {
        let board = Board::from_snapshot(&snapshot(&["S.BP", "...."], 9)).expect("valid board");
        assert_eq!(
            run(&board),
            vec![Command::Move {
                cowboy: CowboyId::new(1),
                to: TileCoord::new(0, 1),
            }],
            "the brawler holds the near slot, so the sharpshooter heads for the one below"
        );
    }

    #[test]
    fn idle_brawlers_head_for_hazards() {
        let board = with_young_gun(
            snapshot(&["#....", ".....", "B..H."], 7),
            TileCoord::new(1, 0),
            TileCoord::new(3, 0),
        );
        let commands = run(&board);
        assert_eq!(
            commands.first(),
            Some(&Command::Move {
                cowboy: CowboyId::new(1),
                to: TileCoord::new(1, 2),
            })
        );
    }
}
