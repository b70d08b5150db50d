use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use routeplanner_cli::input::{coordinate_or_prompt, parse_coordinate};
use routeplanner_cli::output::{render_summary, OutputFormat};
use routeplanner_cli::terminal::ColorPalette;
use routeplanner_lib::{
    build_graph_with, load_map, plan_route, resolve_map_path, Error as LibError, Graph,
    GraphBuildOptions, RouteRequest, RouteSummary,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Shortest road routes over OpenStreetMap data")]
struct Cli {
    /// Map file in OpenStreetMap JSON format.
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Start X coordinate (0 to 100). Prompted for when omitted.
    #[arg(long, value_parser = parse_coordinate)]
    start_x: Option<f64>,

    /// Start Y coordinate (0 to 100). Prompted for when omitted.
    #[arg(long, value_parser = parse_coordinate)]
    start_y: Option<f64>,

    /// End X coordinate (0 to 100). Prompted for when omitted.
    #[arg(long, value_parser = parse_coordinate)]
    end_x: Option<f64>,

    /// End Y coordinate (0 to 100). Prompted for when omitted.
    #[arg(long, value_parser = parse_coordinate)]
    end_y: Option<f64>,

    /// Include footways, paths, and steps in the road graph.
    #[arg(long)]
    walking: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if cli.file.is_none() {
        eprintln!("To specify a map file use the following format:");
        eprintln!("Usage: routeplanner -f <map.json>");
    }

    let map_path = resolve_map_path(cli.file.as_deref());
    let graph = load_graph(&map_path, cli.walking)?;
    let request = read_request(&cli)?;

    let plan = match plan_route(&graph, &request) {
        Ok(plan) => plan,
        Err(LibError::NoPathFound { start, goal }) => {
            bail!(
                "no route found between node {} and node {}",
                node_label(&graph, start),
                node_label(&graph, goal)
            );
        }
        Err(err) => return Err(err).context("failed to plan route"),
    };
    info!(
        hops = plan.hop_count(),
        meters = plan.distance_meters(),
        "route planned"
    );

    let summary = RouteSummary::from_plan(&graph, &plan).context("failed to summarise route")?;
    let rendered = render_summary(&summary, cli.format, ColorPalette::detect())?;
    print!("{}", rendered);
    io::stdout().flush()?;

    Ok(())
}

fn load_graph(path: &Path, walking: bool) -> Result<Graph> {
    let map = load_map(path)
        .with_context(|| format!("failed to load map data from {}", path.display()))?;
    let options = if walking {
        GraphBuildOptions::walking()
    } else {
        GraphBuildOptions::default()
    };
    Ok(build_graph_with(&map, &options))
}

fn read_request(cli: &Cli) -> Result<RouteRequest> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut writer = io::stdout().lock();

    let start_x = coordinate_or_prompt(cli.start_x, "start X", &mut reader, &mut writer)?;
    let start_y = coordinate_or_prompt(cli.start_y, "start Y", &mut reader, &mut writer)?;
    let end_x = coordinate_or_prompt(cli.end_x, "end X", &mut reader, &mut writer)?;
    let end_y = coordinate_or_prompt(cli.end_y, "end Y", &mut reader, &mut writer)?;

    Ok(RouteRequest::new((start_x, start_y), (end_x, end_y)))
}

fn node_label(graph: &Graph, index: usize) -> String {
    graph
        .node(index)
        .map(|node| node.id.to_string())
        .unwrap_or_else(|| format!("#{}", index))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
