#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plans Saloon turns and answers routing queries.

mod board_source;
mod board_transfer;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use saloon_core::{PlayerId, TileCoord};
use saloon_system_pathfinding::{
    bfs,
    predicate::{AtTile, HasHazard, Obstructed, Unsafe},
    SearchError, TilePredicate, TilePredicateExt,
};
use saloon_system_strategy::{Orchestrator, Strategy, TurnConfig};
use saloon_world::{Board, NeighborOrder};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Plans Saloon turns from board snapshots.
#[derive(Debug, Parser)]
#[command(name = "saloon", version)]
struct Cli {
    /// Log at debug level regardless of RUST_LOG.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan one turn and print the commands as JSON.
    Plan(PlanArgs),
    /// Print the shortest path between two tiles.
    Route(RouteArgs),
    /// Print a single-line transfer string for a board.
    Encode(EncodeArgs),
}

#[derive(Debug, Args)]
struct PlanArgs {
    /// Board file (.json, .toml, .txt) or transfer string.
    #[arg(short, long, value_name = "BOARD")]
    board: String,

    /// Player to plan for.
    #[arg(short, long, value_name = "ID", default_value_t = 0)]
    player: u8,

    /// TOML file with turn settings.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Strategy overriding the one in the config file.
    #[arg(short, long, value_name = "NAME")]
    strategy: Option<Strategy>,
}

#[derive(Debug, Args)]
struct RouteArgs {
    /// Board file (.json, .toml, .txt) or transfer string.
    #[arg(short, long, value_name = "BOARD")]
    board: String,

    /// Start tile as `X,Y`.
    #[arg(long, value_name = "X,Y", value_parser = parse_coord)]
    from: TileCoord,

    /// Goal tile as `X,Y`.
    #[arg(long, value_name = "X,Y", value_parser = parse_coord)]
    to: TileCoord,

    /// Expand east and west before north and south.
    #[arg(long)]
    horizontal: bool,

    /// Also avoid hazards and tiles a bottle is about to cross.
    #[arg(long)]
    cautious: bool,
}

#[derive(Debug, Args)]
struct EncodeArgs {
    /// Board file (.json, .toml, .txt) or transfer string.
    #[arg(short, long, value_name = "BOARD")]
    board: String,
}

/// Entry point for the Saloon command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Plan(args) => plan(args),
        Command::Route(args) => route(args),
        Command::Encode(args) => encode(args),
    }
}

fn init_tracing(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init();
}

fn plan(args: PlanArgs) -> Result<()> {
    let snapshot = board_source::load_board(&args.board)?;
    let board = Board::from_snapshot(&snapshot).context("board snapshot is inconsistent")?;

    let mut config = match &args.config {
        Some(path) => board_source::load_config(path)?,
        None => TurnConfig::default(),
    };
    if let Some(strategy) = args.strategy {
        config = config.with_strategy(strategy);
    }

    let mut commands = Vec::new();
    Orchestrator::new(config).plan_turn(&board, PlayerId::new(args.player), &mut commands);
    tracing::info!(
        count = commands.len(),
        fingerprint = %board.fingerprint(),
        "planned turn"
    );

    let json = serde_json::to_string_pretty(&commands).context("failed to serialise commands")?;
    println!("{json}");
    Ok(())
}

fn route(args: RouteArgs) -> Result<()> {
    let snapshot = board_source::load_board(&args.board)?;
    let board = Board::from_snapshot(&snapshot).context("board snapshot is inconsistent")?;

    let order = if args.horizontal {
        NeighborOrder::Horizontal
    } else {
        NeighborOrder::Vertical
    };
    let wall: Box<dyn TilePredicate + '_> = if args.cautious {
        Box::new(Obstructed.or(HasHazard).or(Unsafe::on(&board)))
    } else {
        Box::new(Obstructed)
    };

    match bfs(&board, args.from, &AtTile::new(args.to), wall.as_ref(), order) {
        Ok(path) => {
            let json = serde_json::to_string(path.tiles()).context("failed to serialise path")?;
            println!("{json}");
        }
        Err(SearchError::NoPathFound { start }) => {
            println!("no path from {start} to {}", args.to);
        }
        Err(error) => return Err(error).context("route query failed"),
    }
    Ok(())
}

fn encode(args: EncodeArgs) -> Result<()> {
    let snapshot = board_source::load_board(&args.board)?;
    let _ = Board::from_snapshot(&snapshot).context("board snapshot is inconsistent")?;
    let encoded = board_transfer::encode(&snapshot).context("failed to encode board")?;
    println!("{encoded}");
    Ok(())
}

fn parse_coord(value: &str) -> Result<TileCoord, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but found `{value}`"))?;
    let x = x
        .trim()
        .parse::<i32>()
        .map_err(|error| format!("invalid column `{x}`: {error}"))?;
    let y = y
        .trim()
        .parse::<i32>()
        .map_err(|error| format!("invalid row `{y}`: {error}"))?;
    Ok(TileCoord::new(x, y))
}
