use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::fs;
use std::path::PathBuf;

use netemu::{adjacency, definition, draw, model, plan, routes, subnet};

/// Topology and static-route planner for emulated IP networks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the network definition YAML file
    definition: PathBuf,

    /// Print a GraphViz map of the router adjacency and exit
    #[arg(short, long)]
    draw: bool,

    /// Output directory for the emulation plan and route table
    #[arg(short, long, default_value = "emulation_output")]
    output: PathBuf,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Starting netemu planner");
    info!("Definition file: {:?}", args.definition);

    let def = definition::load_definition(&args.definition)
        .wrap_err_with(|| format!("Failed to load definition '{}'", args.definition.display()))?;
    let topology = model::build_model(&def).wrap_err("Invalid network definition")?;

    let (partition, switches) = subnet::aggregate(&topology).wrap_err("Subnet aggregation failed")?;

    if args.draw {
        print!("{}", draw::render_adjacency(&topology, &partition));
        return Ok(());
    }

    let links = subnet::materialize_links(&partition).wrap_err("Link materialization failed")?;
    let graph = adjacency::build_adjacency(&topology, &partition)
        .wrap_err("Adjacency construction failed")?;
    let table = routes::compute_route_table(&graph, &partition);
    let emulation_plan = plan::build_plan(&topology, &partition, &switches, links, &table);

    fs::create_dir_all(&args.output)
        .wrap_err_with(|| format!("Failed to create output directory '{}'", args.output.display()))?;

    let plan_path = args.output.join("emulation_plan.yaml");
    let plan_file = fs::File::create(&plan_path)
        .wrap_err_with(|| format!("Failed to create '{}'", plan_path.display()))?;
    serde_yaml::to_writer(plan_file, &emulation_plan)
        .wrap_err("Failed to serialize emulation plan")?;
    info!("Wrote emulation plan: {:?}", plan_path);

    let table_path = args.output.join("route_table.json");
    let table_file = fs::File::create(&table_path)
        .wrap_err_with(|| format!("Failed to create '{}'", table_path.display()))?;
    serde_json::to_writer_pretty(table_file, &table).wrap_err("Failed to serialize route table")?;
    info!("Wrote route table: {:?}", table_path);

    info!(
        "Planned {} subnet(s), {} switch(es), {} link(s), {} static route(s)",
        partition.len(),
        emulation_plan.switches.len(),
        emulation_plan.links.len(),
        emulation_plan.routes.len()
    );

    Ok(())
}
