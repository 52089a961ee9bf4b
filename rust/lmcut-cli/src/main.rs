use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use lmcut_core::cost::display_cost;
use lmcut_core::gridworld::{self, Cell, GridWorld};
use lmcut_core::{CostPolicy, LmCutHeuristic, INFINITY};

mod config;

#[derive(Parser, Debug)]
#[command(name = "lmcut", version, about = "Evaluate the LM-Cut heuristic on grid navigation instances")]
struct Args {
    /// Grid width
    #[arg(long, default_value_t = 8)]
    width: usize,

    /// Grid height
    #[arg(long, default_value_t = 8)]
    height: usize,

    /// Start cell as x,y
    #[arg(long, value_name = "X,Y", value_parser = parse_cell, default_value = "0,0")]
    start: Cell,

    /// Cell to visit, repeatable
    #[arg(long = "goal", value_name = "X,Y", value_parser = parse_cell, required = true)]
    goals: Vec<Cell>,

    /// Blocked cell, repeatable
    #[arg(long = "wall", value_name = "X,Y", value_parser = parse_cell)]
    walls: Vec<Cell>,

    /// ignore | use_cost | cost_plus_one (overrides LMCUT_COST_POLICY)
    #[arg(long = "cost-policy", value_name = "POLICY", value_parser = parse_policy)]
    cost_policy: Option<CostPolicy>,

    /// Preallocated relaxation buckets (overrides LMCUT_INITIAL_BUCKETS)
    #[arg(long = "initial-buckets", value_name = "N")]
    initial_buckets: Option<usize>,

    /// Also evaluate the state with the agent moved to this cell
    #[arg(long, value_name = "X,Y", value_parser = parse_cell)]
    agent: Option<Cell>,

    /// Print h1 values of every fluent after the last evaluation
    #[arg(long)]
    dump_values: bool,

    /// Print a JSON summary instead of text
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn parse_cell(s: &str) -> Result<Cell, String> {
    gridworld::parse_cell(s).ok_or_else(|| format!("expected x,y but got {s:?}"))
}

fn parse_policy(s: &str) -> Result<CostPolicy, String> {
    CostPolicy::parse(s).ok_or_else(|| format!("unknown cost policy {s:?}"))
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.json_logs);
    info!(core_version = %lmcut_core::version(), ?args, "starting lmcut");

    let cfg = config::Config::from_env().context("reading environment")?;
    let options = cfg.options(args.cost_policy, args.initial_buckets);

    let grid = GridWorld::new(args.width, args.height).with_walls(args.walls.iter().copied());
    let problem = grid.problem(args.start, &args.goals).context("building grid instance")?;
    info!(fluents = problem.num_fluents(), actions = problem.num_actions(), "instance ready");

    let mut h = LmCutHeuristic::new(&problem, &options);
    let initial = h.eval(&problem.initial_state());
    let initial_stats = h.last_stats();
    if initial == INFINITY {
        warn!("goal unreachable from the start cell");
    }

    let mut agent_value = None;
    if let Some(cell) = args.agent {
        let state = grid.state_at(&problem, cell, &[]).with_context(|| format!("placing agent at {cell:?}"))?;
        agent_value = Some((cell, h.eval(&state)));
    }

    let supporters: Vec<(Cell, Vec<String>)> = args
        .goals
        .iter()
        .filter_map(|&(x, y)| problem.fluent_index(&gridworld::visited(x, y)).map(|f| ((x, y), f)))
        .map(|(cell, f)| {
            let names = h.get_best_supporters(f).into_iter().map(|a| problem.action(a).name.clone()).collect();
            (cell, names)
        })
        .collect();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        let summary = serde_json::json!({
            "cost_policy": options.cost_policy,
            "initial": { "h": display_cost(initial), "cuts": initial_stats.cuts, "dead_end": initial_stats.dead_end },
            "agent": agent_value.map(|(cell, v)| serde_json::json!({ "cell": [cell.0, cell.1], "h": display_cost(v) })),
            "best_supporters": supporters
                .iter()
                .map(|(cell, names)| serde_json::json!({ "goal": [cell.0, cell.1], "actions": names }))
                .collect::<Vec<_>>(),
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
    } else {
        writeln!(out, "h(start {:?}) = {} after {} cuts", args.start, display_cost(initial), initial_stats.cuts)?;
        if let Some((cell, v)) = agent_value {
            writeln!(out, "h(agent {:?}) = {}", cell, display_cost(v))?;
        }
        for (cell, names) in &supporters {
            writeln!(out, "best supporters of visited {:?}: [{}]", cell, names.join(", "))?;
        }
    }
    if args.dump_values {
        h.write_values(&mut out)?;
    }
    Ok(())
}
