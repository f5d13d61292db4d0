//! Plan a route through an obstacle file.
//!
//! Usage:
//!   cargo run -p gridnav-cli --bin gridnav-plan -- \
//!       --obstacles colliders.csv --start 0,0 --goal 120,80 --render

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gridnav_cli::{load_obstacles, parse_position, AsciiSink};
use gridnav_core::{
    LocalPosition, PlannerConfig, RoutePlan, RoutePlanner, SearchConfig, SearchMode,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status when the planner ran but found no route.
const EXIT_NO_ROUTE: u8 = 2;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    FirstDiscovery,
    Relaxing,
}

impl From<Mode> for SearchMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::FirstDiscovery => SearchMode::FirstDiscovery,
            Mode::Relaxing => SearchMode::Relaxing,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan a 2.5-D grid route around box obstacles")]
struct Args {
    /// Obstacle file (.csv colliders or .json array)
    #[arg(long)]
    obstacles: PathBuf,

    /// Start position as NORTH,EAST in metres
    #[arg(long, value_parser = parse_position, allow_hyphen_values = true)]
    start: LocalPosition,

    /// Goal position as NORTH,EAST in metres
    #[arg(long, value_parser = parse_position, allow_hyphen_values = true)]
    goal: LocalPosition,

    /// Flight altitude in metres
    #[arg(long, default_value_t = 5.0)]
    altitude: f64,

    /// Margin added around every obstacle
    #[arg(long, default_value_t = 5.0)]
    safety_distance: f64,

    #[arg(long, value_enum, default_value_t = Mode::FirstDiscovery)]
    mode: Mode,

    #[arg(long)]
    max_expansions: Option<usize>,

    #[arg(long)]
    time_limit_ms: Option<u64>,

    /// Keep every grid cell instead of pruning to line-of-sight waypoints
    #[arg(long)]
    no_prune: bool,

    /// Print an ASCII map of the grid and path to stderr
    #[arg(long)]
    render: bool,

    /// Print the plan as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gridnav_cli=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let set = load_obstacles(&args.obstacles)?;
    if let Some(home) = set.home {
        tracing::info!(lat0 = home.lat0, lon0 = home.lon0, "home position");
    }

    let config = PlannerConfig {
        vehicle_altitude: args.altitude,
        safety_distance: args.safety_distance,
        search: SearchConfig {
            mode: args.mode.into(),
            max_expansions: args.max_expansions,
            time_limit_ms: args.time_limit_ms,
        },
        prune: !args.no_prune,
        ..PlannerConfig::default()
    };

    let sink = AsciiSink::new();
    let mut planner = RoutePlanner::new(config);
    if args.render {
        planner = planner.with_sink(&sink);
    }
    let result = planner.plan(&set.obstacles, args.start, args.goal);

    if args.render {
        eprint!("{}", sink.output());
    }

    let plan = match result {
        Ok(plan) => plan,
        Err(err) if err.is_recoverable() => {
            eprintln!("No route: {}", err);
            return Ok(ExitCode::from(EXIT_NO_ROUTE));
        }
        Err(err) => {
            return Err(err).with_context(|| {
                format!("Planning failed for {}", args.obstacles.display())
            })
        }
    };

    if args.json {
        let body = serde_json::to_string_pretty(&plan).context("Failed to encode plan")?;
        println!("{}", body);
    } else {
        print_summary(&plan);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_summary(plan: &RoutePlan) {
    println!(
        "Grid {}x{} | start {}{} | goal {}{}",
        plan.north_size,
        plan.east_size,
        plan.start_cell,
        if plan.start_resolved { " (moved)" } else { "" },
        plan.goal_cell,
        if plan.goal_resolved { " (moved)" } else { "" },
    );
    println!(
        "Cost {:.2} | length {:.1}m | expanded {} | cells {} -> waypoints {}",
        plan.cost,
        plan.length_m,
        plan.nodes_expanded,
        plan.raw_path.len(),
        plan.path.len()
    );
    for (idx, point) in plan.waypoints.iter().enumerate() {
        println!(
            "  {:>3}: N {:>8.1}  E {:>8.1}  D {:>6.1}",
            idx, point.north, point.east, point.down
        );
    }
}
