use saloon_core::{Command, Job, PlayerId, TileCoord, YoungGunSnapshot};
use saloon_system_strategy::{Orchestrator, Strategy, TurnConfig};
use saloon_world::{layout::parse_layout, Board, BoardSnapshot};

fn snapshot(rows: &[&str]) -> BoardSnapshot {
    parse_layout(rows).expect("valid layout")
}

fn build(snapshot: &BoardSnapshot) -> Board {
    Board::from_snapshot(snapshot).expect("valid board")
}

fn plan(board: &Board, config: TurnConfig) -> Vec<Command> {
    let mut out = Vec::new();
    Orchestrator::new(config).plan_turn(board, PlayerId::new(0), &mut out);
    out
}

fn is_move(command: &Command) -> bool {
    matches!(command, Command::Move { .. })
}

fn busy_saloon() -> BoardSnapshot {
    let mut snapshot = snapshot(&[
        "#.........#", //
        ".P..F..P.b.", //
        "..T....>...", //
        ".B..H..S...", //
        "...F...t.P.", //
        "#....b....#", //
    ]);
    for cowboy in &mut snapshot.cowboys {
        cowboy.focus = 4;
    }
    snapshot.young_guns.push(YoungGunSnapshot {
        owner: PlayerId::new(0),
        tile: TileCoord::new(0, 0),
        call_in_tile: TileCoord::new(1, 0),
        next_call_in_tile: TileCoord::new(0, 1),
        can_call_in: true,
    });
    snapshot
}

#[test]
fn identical_boards_produce_identical_turns() {
    let snapshot = busy_saloon();
    let board = build(&snapshot);
    assert_eq!(build(&snapshot).fingerprint(), board.fingerprint());

    for strategy in Strategy::ALL {
        let config = TurnConfig::default().with_strategy(strategy);
        let first = plan(&board, config.clone());
        for _ in 0..10 {
            let rebuilt = build(&snapshot);
            assert_eq!(plan(&rebuilt, config.clone()), first, "{strategy} diverged");
        }
    }
}

#[test]
fn planned_commands_are_appended() {
    let board = build(&busy_saloon());
    let earlier = Command::CallIn {
        player: PlayerId::new(0),
        job: Job::Sharpshooter,
    };
    let mut out = vec![earlier.clone()];

    Orchestrator::default().plan_turn(&board, PlayerId::new(0), &mut out);

    assert_eq!(out.first(), Some(&earlier));
    assert!(out.len() > 1, "the busy saloon always leaves something to do");
}

#[test]
fn every_cowboy_moves_and_acts_at_most_once() {
    let board = build(&busy_saloon());
    for strategy in Strategy::ALL {
        let commands = plan(&board, TurnConfig::default().with_strategy(strategy));
        let mut moved = Vec::new();
        let mut acted = Vec::new();
        let mut call_ins = 0;
        for command in &commands {
            match command {
                Command::Move { cowboy, .. } => moved.push(*cowboy),
                Command::Act { cowboy, .. } | Command::Play { cowboy, .. } => acted.push(*cowboy),
                Command::CallIn { player, .. } => {
                    assert_eq!(*player, PlayerId::new(0));
                    call_ins += 1;
                }
            }
        }
        for list in [&mut moved, &mut acted] {
            let before = list.len();
            list.sort();
            list.dedup();
            assert_eq!(list.len(), before, "{strategy} repeated a cowboy");
        }
        assert!(call_ins <= 1, "{strategy} called in twice");
        for id in moved.iter().chain(&acted) {
            let cowboy = board.cowboy(*id).expect("known cowboy");
            assert_eq!(cowboy.owner, PlayerId::new(0), "{strategy} commanded an enemy");
        }
    }
}

#[test]
fn exhausted_time_budget_skips_movement_but_still_plays() {
    let board = build(&snapshot(&[
        "TP...", //
        ".....", //
        "....B", //
    ]));

    let relaxed = plan(&board, TurnConfig::default());
    assert!(relaxed.iter().any(is_move), "brawler heads for the piano");

    let hurried = plan(
        &board,
        TurnConfig {
            min_time_budget_ms: 500,
            ..TurnConfig::default()
        },
    );
    assert!(!hurried.iter().any(is_move));
    assert!(hurried
        .iter()
        .any(|command| matches!(command, Command::Play { .. })));
}

#[test]
fn time_budgets_near_the_limit_do_not_wrap() {
    let mut state = snapshot(&[
        "TP...", //
        "....B", //
    ]);
    state.time_remaining_ms = u64::MAX - 1;
    let board = build(&state);

    let hurried = plan(
        &board,
        TurnConfig {
            min_time_budget_ms: u64::MAX,
            ..TurnConfig::default()
        },
    );
    assert!(!hurried.iter().any(is_move));

    let relaxed = plan(
        &board,
        TurnConfig {
            min_time_budget_ms: u64::MAX - 1,
            ..TurnConfig::default()
        },
    );
    assert!(relaxed.iter().any(is_move), "an exactly met budget still allows movement");
}

#[test]
fn cautious_strategy_routes_around_hazards() {
    let board = build(&snapshot(&[
        "P..", //
        "H..", //
        "T..", //
    ]));
    let first_move = |strategy| {
        plan(&board, TurnConfig::default().with_strategy(strategy))
            .into_iter()
            .find(is_move)
    };

    let hazard = TileCoord::new(0, 1);
    assert!(matches!(
        first_move(Strategy::PianoControl),
        Some(Command::Move { to, .. }) if to == hazard
    ));
    assert!(matches!(
        first_move(Strategy::Cautious),
        Some(Command::Move { to, .. }) if to == TileCoord::new(1, 2)
    ));
}

#[test]
fn spawn_camp_opens_with_brawlers() {
    let mut snapshot = snapshot(&["#...", "....", "...."]);
    snapshot.young_guns.push(YoungGunSnapshot {
        owner: PlayerId::new(0),
        tile: TileCoord::new(0, 0),
        call_in_tile: TileCoord::new(1, 0),
        next_call_in_tile: TileCoord::new(0, 1),
        can_call_in: true,
    });
    let board = build(&snapshot);

    let commands = plan(&board, TurnConfig::default().with_strategy(Strategy::SpawnCamp));
    assert_eq!(
        commands,
        vec![Command::CallIn {
            player: PlayerId::new(0),
            job: Job::Brawler,
        }]
    );
}
