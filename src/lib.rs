//! # netemu - Topology and static-route planner for emulated IP networks
//!
//! This library computes, from a declarative YAML description of routers
//! and hosts, everything an emulation driver needs to bring the network
//! up: the grouping of interfaces into shared-media segments versus
//! point-to-point links, switch assignments, and a least-cost static
//! route table for every router toward every subnet.
//!
//! ## Pipeline
//!
//! Data flows through four stages, each producing an immutable result
//! consumed by the next:
//!
//! 1. [`definition`] / [`model`]: parse the YAML definition and build
//!    the typed device model, preserving declaration order.
//! 2. [`subnet`]: partition interfaces into subnets by exact prefix
//!    bit-string, allocate switches for shared segments (prefix length
//!    <= 29), and materialize the link plan.
//! 3. [`adjacency`]: derive the weighted router-to-router graph.
//! 4. [`routes`]: uniform-cost search with first-hop labeling, producing
//!    `Local` / `NextHop` / `Unreachable` per (router, subnet) pair.
//!
//! The whole computation is synchronous and deterministic: re-running it
//! on a byte-identical definition yields an identical plan.
//!
//! ## Example
//!
//! ```rust,no_run
//! use netemu::{definition, model, subnet, adjacency, routes, plan};
//!
//! let def = definition::load_definition(std::path::Path::new("network.yaml"))?;
//! let topology = model::build_model(&def)?;
//! let (partition, switches) = subnet::aggregate(&topology)?;
//! let links = subnet::materialize_links(&partition)?;
//! let graph = adjacency::build_adjacency(&topology, &partition)?;
//! let table = routes::compute_route_table(&graph, &partition);
//! let emulation_plan = plan::build_plan(&topology, &partition, &switches, links, &table);
//! # Ok::<(), color_eyre::Report>(())
//! ```

pub mod addr;
pub mod adjacency;
pub mod definition;
pub mod draw;
pub mod model;
pub mod plan;
pub mod routes;
pub mod subnet;

pub use addr::FormatError;
pub use model::SchemaError;
pub use routes::Route;
pub use subnet::TopologyError;
