//! Static route computation.
//!
//! This file runs a uniform-cost search over the router adjacency graph
//! for every (router, subnet) pair. Instead of reconstructing paths
//! from a predecessor map, each frontier entry carries the first hop
//! taken from the source; the answer is available the instant a router
//! attached to the destination subnet is dequeued.
//!
//! Ties in accumulated cost are broken by insertion order: the frontier
//! is a binary heap keyed by (cost, insertion sequence), so among
//! equal-cost candidates the one discovered first wins. That makes the
//! whole table a deterministic function of declaration order.

use crate::adjacency::AdjacencyGraph;
use crate::addr;
use crate::subnet::SubnetPartition;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// Outcome of a route lookup for one (router, subnet) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Route {
    /// The subnet is directly attached; no route needs installing.
    Local,
    /// Forward through the named neighbor, reachable at `address`.
    NextHop { router: String, address: String },
    /// No path exists; no route is installed. Not an error.
    Unreachable,
}

/// A frontier entry: accumulated cost, insertion sequence (FIFO
/// tie-break), the router to expand, and the first hop that led here.
#[derive(Debug)]
struct State {
    cost: u32,
    seq: u32,
    router: String,
    first_hop: Option<(String, String)>,
}

impl Eq for State {}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.seq == other.seq
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for a min-heap; seq keeps equal costs FIFO
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find the least-cost next hop from `source` toward the subnet with
/// the given prefix.
pub fn compute_route(graph: &AdjacencyGraph, source: &str, prefix: &str) -> Route {
    let Some(src) = graph.get(source) else {
        return Route::Unreachable;
    };
    if src.is_attached(prefix) {
        return Route::Local;
    }

    let mut heap = BinaryHeap::new();
    let mut finalized: HashSet<&str> = HashSet::new();
    let mut seq = 0u32;

    heap.push(State {
        cost: 0,
        seq,
        router: source.to_string(),
        first_hop: None,
    });

    while let Some(state) = heap.pop() {
        if finalized.contains(state.router.as_str()) {
            continue;
        }
        let Some(node) = graph.get(&state.router) else {
            continue;
        };

        if node.is_attached(prefix) {
            return match state.first_hop {
                Some((router, address)) => Route::NextHop { router, address },
                // Only the source carries no first hop, and its own
                // subnets were checked before the search started.
                None => Route::Local,
            };
        }

        for neighbor in &node.neighbors {
            if finalized.contains(neighbor.router.as_str()) {
                continue;
            }
            seq += 1;
            let first_hop = match &state.first_hop {
                Some(hop) => hop.clone(),
                None => (neighbor.router.clone(), neighbor.address.clone()),
            };
            heap.push(State {
                cost: state.cost + neighbor.cost,
                seq,
                router: neighbor.router.clone(),
                first_hop: Some(first_hop),
            });
        }

        finalized.insert(node.name.as_str());
    }

    Route::Unreachable
}

/// One row of a router's route table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    /// Destination in dotted CIDR form, e.g. `10.0.1.0/24`.
    pub destination: String,
    /// Destination prefix bit-string.
    pub prefix: String,
    pub route: Route,
}

/// All routes for one router, in subnet first-sighting order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouterRoutes {
    pub router: String,
    pub routes: Vec<RouteEntry>,
}

/// The full per-router route table, in router declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteTable {
    pub routers: Vec<RouterRoutes>,
}

impl RouteTable {
    /// Look up the computed route for a (router, prefix) pair.
    pub fn route(&self, router: &str, prefix: &str) -> Option<&Route> {
        self.routers
            .iter()
            .find(|r| r.router == router)
            .and_then(|r| r.routes.iter().find(|e| e.prefix == prefix))
            .map(|e| &e.route)
    }
}

/// Compute the route table for every router and every subnet.
pub fn compute_route_table(graph: &AdjacencyGraph, partition: &SubnetPartition) -> RouteTable {
    let mut table = RouteTable::default();

    for router in graph.iter() {
        let mut routes = Vec::new();
        for subnet in partition.iter() {
            routes.push(RouteEntry {
                destination: addr::prefix_to_cidr(&subnet.prefix),
                prefix: subnet.prefix.clone(),
                route: compute_route(graph, &router.name, &subnet.prefix),
            });
        }
        table.routers.push(RouterRoutes {
            router: router.name.clone(),
            routes,
        });
    }

    log::info!("Computed routes for {} router(s)", table.routers.len());

    table
}
