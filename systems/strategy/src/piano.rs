//! Piano control: hold one slot on every piano, harass the opponent's pianos.

use std::{
    cmp::Reverse,
    collections::{BTreeMap, BTreeSet},
};

use saloon_core::{CowboyId, CowboySnapshot, Direction, FurnishingId, Job, PlayerId, TileCoord};
use saloon_system_pathfinding::predicate::{AnyTile, AtTile};
use saloon_world::{hazard, NeighborOrder, Tile};

use crate::{plan::TurnPlan, tactics, TurnConfig};

pub(crate) fn plan_turn(
    plan: &mut TurnPlan<'_>,
    config: &TurnConfig,
    cautious: bool,
    movement: bool,
) {
    if movement {
        dodge_bottles(plan, cautious);
    }
    call_in(plan, config);
    if movement {
        for (cowboy, slot) in assign_pianos(plan, cautious) {
            advance(plan, cowboy, slot, cautious);
        }
        brawl_enemy_pianos(plan, config, cautious);
    }
    shoot(plan);
    for cowboy in plan.ours() {
        let _ = plan.play_adjacent(cowboy);
    }
    throw_bottles(plan, movement, cautious);
}

/// Moves our cowboys out of the lanes of bottles about to reach them.
fn dodge_bottles(plan: &mut TurnPlan<'_>, cautious: bool) {
    let board = plan.board();
    for bottle in board.bottles() {
        // Farthest tile first: the cowboy nearer the bottle may need its room.
        for coord in hazard::bottle_trajectory(board, bottle).into_iter().rev() {
            let Some(cowboy) = plan.occupant(coord) else {
                continue;
            };
            if plan.is_ally(cowboy) {
                let _ = dodge(plan, cowboy, bottle.direction, cautious);
            }
        }
    }
}

fn dodge(
    plan: &mut TurnPlan<'_>,
    cowboy: &CowboySnapshot,
    incoming: Direction,
    cautious: bool,
) -> bool {
    if !plan.can_move(cowboy) {
        return false;
    }
    let Some(from) = plan.position(cowboy.id) else {
        return false;
    };

    let board = plan.board();
    let [left, right] = incoming.perpendicular();
    let escapes: Vec<(Direction, TileCoord)> = [left, right, incoming]
        .into_iter()
        .filter_map(|direction| Some((direction, board.neighbor(from, direction)?)))
        .filter(|(_, to)| !cautious || !board.tile(*to).is_some_and(Tile::has_hazard))
        .collect();

    for (direction, to) in &escapes {
        if plan.move_cowboy(cowboy, *to) {
            tracing::info!(cowboy = cowboy.id.get(), %direction, "dodged bottle");
            return true;
        }
    }

    for (direction, to) in &escapes {
        let Some(ally) = plan.occupant(*to) else {
            continue;
        };
        if plan.is_ally(ally)
            && plan.step_aside(ally, cautious)
            && plan.move_cowboy(cowboy, *to)
        {
            tracing::info!(
                cowboy = cowboy.id.get(),
                ally = ally.id.get(),
                %direction,
                "dodged bottle after ally made room"
            );
            return true;
        }
    }

    tracing::warn!(cowboy = cowboy.id.get(), tile = %from, "no way to dodge incoming bottle");
    false
}

/// Calls in the first job below the per-job cap.
fn call_in(plan: &mut TurnPlan<'_>, config: &TurnConfig) {
    let board = plan.board();
    let Some(young_gun) = board.young_gun(plan.player()) else {
        return;
    };
    let spawn = young_gun.call_in_tile;
    if board.tile(spawn).is_some_and(Tile::is_piano) {
        tracing::debug!(tile = %spawn, "call-in tile holds a piano");
        return;
    }
    if plan.occupant(spawn).is_some_and(|cowboy| plan.is_ally(cowboy)) {
        tracing::debug!(tile = %spawn, "call-in tile holds an ally");
        return;
    }

    let cap = board.max_cowboys_per_job() as usize;
    let job = config
        .job_order
        .iter()
        .copied()
        .find(|job| plan.ours_with_job(*job).len() < cap);
    if let Some(job) = job {
        let _ = plan.call_in(job);
    }
}

/// Picks a piano slot for every cowboy free to move.
///
/// Brawlers head for slots on the opponent's pianos, sharpshooters for slots
/// lined up with enemy pianos, and everybody else for the nearest piano no
/// ally holds yet. A cowboy that is the only ally at its piano stays there.
fn assign_pianos<'b>(
    plan: &TurnPlan<'b>,
    cautious: bool,
) -> Vec<(&'b CowboySnapshot, TileCoord)> {
    let board = plan.board();
    let player = plan.player();
    let owners = tactics::classify_pianos(board);

    let mut slots: BTreeMap<TileCoord, FurnishingId> = BTreeMap::new();
    let mut allies_at: BTreeMap<FurnishingId, Vec<CowboyId>> = BTreeMap::new();
    for piano in board.pianos() {
        for slot in board.neighbors(piano.tile, NeighborOrder::Vertical) {
            let Some(tile) = board.tile(slot) else {
                continue;
            };
            match plan.occupant(slot) {
                Some(cowboy) if !plan.is_ally(cowboy) => continue,
                Some(cowboy) => allies_at.entry(piano.id).or_default().push(cowboy.id),
                None => {}
            }
            if tile.furnishing().is_some() || tile.is_balcony() || tile.has_hazard() {
                continue;
            }
            if cautious && hazard::incoming_bottle(board, slot).is_some() {
                continue;
            }
            let _ = slots.entry(slot).or_insert(piano.id);
        }
    }

    let held: BTreeSet<FurnishingId> = allies_at.keys().copied().collect();
    let holders: BTreeSet<CowboyId> = allies_at
        .values()
        .filter(|allies| allies.len() == 1)
        .flatten()
        .copied()
        .collect();
    let candidates: Vec<&'b CowboySnapshot> = plan
        .ours()
        .into_iter()
        .filter(|cowboy| plan.can_move(cowboy) && !holders.contains(&cowboy.id))
        .collect();

    let mut assignments = Vec::new();
    let mut assigned = BTreeSet::new();

    let mut brawler_slots: BTreeSet<TileCoord> = slots
        .iter()
        .filter(|(_, piano)| owners.get(piano) != Some(&player))
        .map(|(slot, _)| *slot)
        .collect();
    for brawler in candidates.iter().filter(|cowboy| cowboy.job == Job::Brawler) {
        if brawler_slots.is_empty() {
            break;
        }
        let goal: AnyTile = brawler_slots.iter().copied().collect();
        match plan.route(brawler, &goal, cautious) {
            Ok(path) => {
                let slot = path.goal();
                let _ = brawler_slots.remove(&slot);
                let _ = slots.remove(&slot);
                let _ = assigned.insert(brawler.id);
                assignments.push((*brawler, slot));
            }
            Err(error) => {
                tracing::debug!(cowboy = brawler.id.get(), %error, "brawler found no slot");
            }
        }
    }

    slots.retain(|_, piano| !held.contains(piano));

    let forward = if player == PlayerId::new(0) { 1 } else { -1 };
    let mut lined_up: Vec<(i32, TileCoord, FurnishingId)> = slots
        .iter()
        .filter(|(_, piano)| owners.get(piano) == Some(&player))
        .map(|(slot, piano)| {
            let score = tactics::sharpshooter_slot_score(board, &owners, player, *slot);
            (score, *slot, *piano)
        })
        .filter(|(score, _, _)| *score > 0)
        .collect();
    lined_up.sort_by_key(|(score, slot, _)| Reverse((*score, slot.x() * forward)));
    let mut seen = BTreeSet::new();
    lined_up.retain(|(_, _, piano)| seen.insert(*piano));

    let sharpshooters: Vec<(CowboyId, TileCoord)> = candidates
        .iter()
        .filter(|cowboy| cowboy.job == Job::Sharpshooter)
        .map(|cowboy| (cowboy.id, plan.position(cowboy.id).unwrap_or(cowboy.tile)))
        .collect();
    let goals: Vec<TileCoord> = lined_up.iter().map(|(_, slot, _)| *slot).collect();
    for (id, slot) in tactics::shortest_pairs(&sharpshooters, &goals, false) {
        let Some(sharpshooter) = board.cowboy(id) else {
            continue;
        };
        if let Some(piano) = slots.get(&slot).copied() {
            slots.retain(|_, other| *other != piano);
        }
        let _ = assigned.insert(id);
        assignments.push((sharpshooter, slot));
    }

    let mut rest: Vec<&'b CowboySnapshot> = candidates
        .into_iter()
        .filter(|cowboy| !assigned.contains(&cowboy.id))
        .collect();
    rest.sort_by_key(|cowboy| (job_rank(cowboy.job), cowboy.id));
    for cowboy in rest {
        if slots.is_empty() {
            break;
        }
        let goal: AnyTile = slots.keys().copied().collect();
        match plan.route(cowboy, &goal, cautious) {
            Ok(path) => {
                let slot = path.goal();
                if let Some(piano) = slots.get(&slot).copied() {
                    slots.retain(|_, other| *other != piano);
                }
                assignments.push((cowboy, slot));
            }
            Err(error) => {
                tracing::debug!(cowboy = cowboy.id.get(), %error, "no piano slot in reach");
            }
        }
    }

    assignments
}

fn job_rank(job: Job) -> u8 {
    match job {
        Job::Sharpshooter => 0,
        Job::Bartender => 1,
        Job::Brawler => 2,
    }
}

fn advance(plan: &mut TurnPlan<'_>, cowboy: &CowboySnapshot, slot: TileCoord, cautious: bool) {
    if plan.position(cowboy.id) == Some(slot) {
        return;
    }
    match plan.route(cowboy, &AtTile::new(slot), cautious) {
        Ok(path) => {
            let _ = plan.step_along(cowboy, &path, cautious);
        }
        Err(error) => {
            tracing::debug!(cowboy = cowboy.id.get(), %error, "assigned slot unreachable");
        }
    }
}

/// Sends brawlers left without a slot toward pianos crowded by enemies.
fn brawl_enemy_pianos(plan: &mut TurnPlan<'_>, config: &TurnConfig, cautious: bool) {
    let board = plan.board();
    let player = plan.player();
    for brawler in plan.ours_with_job(Job::Brawler) {
        if !plan.can_move(brawler) {
            continue;
        }
        let view: &TurnPlan<'_> = plan;
        let goal = |tile: &Tile| {
            tactics::near_enemy_piano(
                board,
                view,
                player,
                brawler,
                tile.coord(),
                config.enemy_piano_threshold,
            )
        };
        let Ok(path) = view.route(brawler, &goal, cautious) else {
            continue;
        };
        if path.len() > 1 {
            let _ = plan.step_along(brawler, &path, cautious);
        }
    }
}

/// Sharpshooters fire down the lane with the best enemy score.
fn shoot(plan: &mut TurnPlan<'_>) {
    let board = plan.board();
    for shooter in plan.ours_with_job(Job::Sharpshooter) {
        if !plan.can_act(shooter) {
            continue;
        }
        let Some(direction) = tactics::best_bang_direction(board, &*plan, shooter) else {
            continue;
        };
        let target = plan
            .position(shooter.id)
            .and_then(|from| board.neighbor(from, direction));
        if let Some(target) = target {
            if plan.act(shooter, target, None) {
                tracing::info!(cowboy = shooter.id.get(), %direction, "firing down lane");
            }
        }
    }
}

/// Bartenders throw at the nearest enemy in a clear lane or close in on one.
fn throw_bottles(plan: &mut TurnPlan<'_>, movement: bool, cautious: bool) {
    let board = plan.board();
    let player = plan.player();
    for bartender in plan.ours_with_job(Job::Bartender) {
        if plan.can_act(bartender) {
            if let Some((direction, enemy)) =
                tactics::best_throw_direction(board, &*plan, bartender)
            {
                let drunk = tactics::best_drunk_direction(board, enemy.tile);
                let target = plan
                    .position(bartender.id)
                    .and_then(|from| board.neighbor(from, direction));
                if let Some(target) = target {
                    if plan.act(bartender, target, Some(drunk)) {
                        tracing::info!(
                            cowboy = bartender.id.get(),
                            enemy = enemy.id.get(),
                            %drunk,
                            "throwing bottle"
                        );
                        continue;
                    }
                }
            }
        }

        if !movement || !plan.can_move(bartender) {
            continue;
        }
        let view: &TurnPlan<'_> = plan;
        let enemy = |tile: &Tile| {
            view.occupant(tile.coord())
                .is_some_and(|cowboy| cowboy.owner != player)
        };
        let Ok(path) = view.route(bartender, &enemy, cautious) else {
            continue;
        };
        if path.len() > 2 {
            let _ = plan.step_along(bartender, &path, cautious);
        }
    }
}
