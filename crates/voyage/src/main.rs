//! voyage: CLI route optimizer over a CSV road network.
//!
//! Loads a locations table and a roads table, then answers multi-stop
//! routing queries either from an interactive menu or from one-shot
//! subcommands.
//!
//! # Usage
//!
//! ```text
//! voyage --locations attractions.csv --roads roads.csv [OPTIONS] [COMMAND]
//! ```
//!
//! Without a command the interactive menu runs. `json` reads one request
//! from stdin and writes the response to stdout.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;
use voyage_engine::diagnostics::Clock;
use voyage_engine::{Graph, LocationId, OrderMode, RouteError, RouteOptimizer, RouterConfig};
use voyage_io::{LoadOptions, format_locations, format_route, format_route_error};

/// Multi-stop route optimizer over a CSV road network.
#[derive(Parser)]
#[command(name = "voyage", version)]
struct Cli {
    /// Locations table (`id,name,category,latitude,longitude,...`).
    #[arg(long, default_value = "attractions.csv")]
    locations: PathBuf,

    /// Roads table (`from,to,weight`, endpoints by name).
    #[arg(long, default_value = "roads.csv")]
    roads: PathBuf,

    /// Treat roads as one-way.
    #[arg(long)]
    directed: bool,

    /// Tour algorithm for flexible-order queries.
    #[arg(long, value_enum, default_value_t = Strategy::Auto)]
    strategy: Strategy,

    /// Cost units per great-circle kilometre for the A* estimate.
    #[arg(long, default_value_t = RouterConfig::DEFAULT_HEURISTIC_COST_PER_KM)]
    heuristic_cost_per_km: f64,

    /// Print per-stage diagnostics for route queries to stderr.
    #[arg(long)]
    diagnostics: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Full router config as a JSON string.
    ///
    /// When provided, `--strategy` and `--heuristic-cost-per-km` are
    /// ignored. The JSON must be a valid `RouterConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Menu loop: flexible order, fixed order, exit, full traversal.
    Interactive,
    /// Route through the named locations, starting at the first.
    Route {
        /// Location names.
        #[arg(required = true)]
        names: Vec<String>,
        /// Keep the given order instead of optimizing it.
        #[arg(long)]
        fixed: bool,
    },
    /// Visit every location (Kruskal MST preorder joined by A* legs).
    Tour,
    /// List the loaded locations.
    Locations,
    /// Answer one JSON request from stdin.
    Json,
}

/// Tour strategy selection.
#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    /// Exact for small sets, exact raced against MST + 2-opt for medium
    /// sets, MST + 2-opt for large sets.
    Auto,
    /// Always the exact DP (falls back above its size limit).
    Exact,
    /// MST preorder + 2-opt.
    Mst,
    /// Nearest-neighbor greedy.
    Greedy,
}

/// Build a [`RouterConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual flags are ignored. The heuristic scale must be finite and
/// non-negative either way.
fn config_from_cli(cli: &Cli) -> Result<RouterConfig, String> {
    let config = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        RouterConfig {
            heuristic_cost_per_km: cli.heuristic_cost_per_km,
            strategy: match cli.strategy {
                Strategy::Auto => voyage_engine::TourStrategy::Auto,
                Strategy::Exact => voyage_engine::TourStrategy::Exact,
                Strategy::Mst => voyage_engine::TourStrategy::MstTwoOpt,
                Strategy::Greedy => voyage_engine::TourStrategy::NearestNeighbor,
            },
            ..RouterConfig::default()
        }
    };

    let scale = config.heuristic_cost_per_km;
    if !scale.is_finite() || scale < 0.0 {
        return Err(format!(
            "Invalid heuristic cost per km {scale}: must be finite and non-negative"
        ));
    }
    Ok(config)
}

/// Install a stderr `fmt` subscriber. `-v` flags override `RUST_LOG`.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let options = LoadOptions {
        directed: cli.directed,
    };
    let graph = match voyage_io::load_graph_from_paths(&cli.locations, &cli.roads, &options) {
        Ok((graph, report)) => {
            info!(%report, "loaded road network");
            graph
        }
        Err(e) => {
            eprintln!("Error loading network: {e}");
            return ExitCode::FAILURE;
        }
    };
    let optimizer = RouteOptimizer::new(&graph, config);

    match cli.command.unwrap_or(Command::Interactive) {
        Command::Interactive => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            match run_interactive(stdin.lock(), stdout.lock(), &optimizer) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("I/O error: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        Command::Route { names, fixed } => {
            let mode = if fixed {
                OrderMode::Fixed
            } else {
                OrderMode::Flexible
            };
            route_once(&optimizer, &names, mode, cli.diagnostics)
        }
        Command::Tour => match optimizer.compute_full_graph_route() {
            Ok(route) => {
                println!("{}", format_route(&route, &graph));
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}", format_route_error(&e));
                ExitCode::FAILURE
            }
        },
        Command::Locations => {
            println!("{}", format_locations(&graph));
            ExitCode::SUCCESS
        }
        Command::Json => answer_json(&optimizer),
    }
}

/// Resolve names, returning `None` if any is unknown.
fn resolve(graph: &Graph, names: &[String]) -> Option<Vec<LocationId>> {
    names.iter().map(|n| graph.id_by_name(n.trim())).collect()
}

fn route_once(
    optimizer: &RouteOptimizer<'_>,
    names: &[String],
    mode: OrderMode,
    diagnostics: bool,
) -> ExitCode {
    let graph = optimizer.graph();
    let Some(ids) = resolve(graph, names) else {
        eprintln!("{}", format_route_error(&RouteError::Unreachable));
        return ExitCode::FAILURE;
    };

    match optimizer.compute_route_with_diagnostics(&ids, mode, &StdClock) {
        Ok((route, diag)) => {
            println!("{}", format_route(&route, graph));
            if diagnostics {
                eprintln!("{}", diag.report());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", format_route_error(&e));
            ExitCode::FAILURE
        }
    }
}

fn answer_json(optimizer: &RouteOptimizer<'_>) -> ExitCode {
    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        eprintln!("Error reading request: {e}");
        return ExitCode::FAILURE;
    }

    let response = voyage_io::respond(&input, optimizer);
    match response.to_json() {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing response: {e}");
            ExitCode::FAILURE
        }
    }
}

// ───── Interactive menu ─────

const MENU: &str = "\
========================================
    ROUTE OPTIMIZER
========================================
1. Flexible Order (TSP Optimization)
2. Fixed Order (A*)
3. Exit
4. Traverse Entire Graph (Kruskal + DFS + A*)
========================================
Enter your choice: ";

/// Run the menu loop until choice 3 or end of input.
fn run_interactive<R: BufRead, W: Write>(
    mut input: R,
    mut out: W,
    optimizer: &RouteOptimizer<'_>,
) -> io::Result<()> {
    let graph = optimizer.graph();
    writeln!(out, "{}", format_locations(graph))?;

    loop {
        write!(out, "\n{MENU}")?;
        out.flush()?;
        let Some(line) = read_line(&mut input)? else {
            return Ok(());
        };

        let mode = match line.trim().parse::<u8>() {
            Ok(1) => OrderMode::Flexible,
            Ok(2) => OrderMode::Fixed,
            Ok(3) => {
                writeln!(out, "\nThank you for using Route Optimizer!")?;
                return Ok(());
            }
            Ok(4) => {
                match optimizer.compute_full_graph_route() {
                    Ok(route) => writeln!(out, "{}", format_route(&route, graph))?,
                    Err(e) => writeln!(out, "{}", format_route_error(&e))?,
                }
                continue;
            }
            _ => continue,
        };

        write!(out, "Enter number of locations to visit: ")?;
        out.flush()?;
        let Some(count_line) = read_line(&mut input)? else {
            return Ok(());
        };
        let Ok(count) = count_line.trim().parse::<usize>() else {
            writeln!(out, "No locations selected.")?;
            continue;
        };

        writeln!(out, "Enter location names:")?;
        let mut names = Vec::new();
        for i in 0..count {
            write!(out, "  {}. ", i + 1)?;
            out.flush()?;
            let Some(name) = read_line(&mut input)? else {
                return Ok(());
            };
            names.push(name);
        }

        let outcome = resolve(graph, &names)
            .ok_or(RouteError::Unreachable)
            .and_then(|ids| optimizer.compute_route(&ids, mode));
        match outcome {
            Ok(route) => writeln!(out, "{}", format_route(&route, graph))?,
            Err(e) => writeln!(out, "\n{}", format_route_error(&e))?,
        }
    }
}

/// One line without its terminator, or `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}
