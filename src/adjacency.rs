//! Router adjacency graph.
//!
//! This file derives a weighted graph over routers only: two routers
//! are adjacent if they attach to the same subnet, with edge weight
//! equal to that subnet's cost. A router with several interfaces into
//! the same neighbor keeps one entry per shared subnet; the route
//! search prefers the cheaper one on its own.

use crate::addr;
use crate::model::TopologyModel;
use crate::subnet::{SubnetPartition, TopologyError};
use std::collections::HashMap;

/// A directed adjacency edge: the neighbor, the address it advertises
/// on the shared subnet, and the subnet's cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbor {
    pub router: String,
    pub address: String,
    pub cost: u32,
}

/// One router's view of the graph: its directly attached subnet
/// prefixes and its adjacency edges, both in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterNode {
    pub name: String,
    pub subnets: Vec<String>,
    pub neighbors: Vec<Neighbor>,
}

impl RouterNode {
    pub fn is_attached(&self, prefix: &str) -> bool {
        self.subnets.iter().any(|p| p == prefix)
    }
}

/// The router adjacency graph, in router declaration order.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyGraph {
    routers: Vec<RouterNode>,
    index: HashMap<String, usize>,
}

impl AdjacencyGraph {
    pub fn get(&self, name: &str) -> Option<&RouterNode> {
        self.index.get(name).map(|i| &self.routers[*i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouterNode> {
        self.routers.iter()
    }

    pub fn len(&self) -> usize {
        self.routers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }
}

/// Build the adjacency graph from the model and its subnet partition.
///
/// Neighbor order follows the owning router's interface declaration
/// order, then the shared subnet's attachment order; this is what the
/// route search's FIFO tie-break ultimately keys on.
pub fn build_adjacency(
    model: &TopologyModel,
    partition: &SubnetPartition,
) -> Result<AdjacencyGraph, TopologyError> {
    let mut graph = AdjacencyGraph::default();

    for router in &model.routers {
        let mut node = RouterNode {
            name: router.name.clone(),
            subnets: Vec::new(),
            neighbors: Vec::new(),
        };

        for iface in &router.interfaces {
            let prefix = addr::subnet_prefix(&iface.address, &iface.mask)?;
            if let Some(subnet) = partition.get(&prefix) {
                for attachment in &subnet.routers {
                    if attachment.device != router.name {
                        node.neighbors.push(Neighbor {
                            router: attachment.device.clone(),
                            address: attachment.address.clone(),
                            cost: subnet.cost,
                        });
                    }
                }
            }
            node.subnets.push(prefix);
        }

        graph.index.insert(node.name.clone(), graph.routers.len());
        graph.routers.push(node);
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Definition;
    use crate::model::build_model;
    use crate::subnet::aggregate;

    fn graph(yaml: &str) -> AdjacencyGraph {
        let def: Definition = serde_yaml::from_str(yaml).unwrap();
        let model = build_model(&def).unwrap();
        let (partition, _) = aggregate(&model).unwrap();
        build_adjacency(&model, &partition).unwrap()
    }

    #[test]
    fn test_neighbors_share_subnet_cost() {
        let g = graph(
            "routers:\n\
             \x20 r1:\n\
             \x20   eth0: {address: 10.0.0.1, mask: 255.255.255.252, cost: 4}\n\
             \x20 r2:\n\
             \x20   eth0: {address: 10.0.0.2, mask: 255.255.255.252, cost: 9}\n",
        );

        let r1 = g.get("r1").unwrap();
        assert_eq!(
            r1.neighbors,
            vec![Neighbor {
                router: "r2".to_string(),
                address: "10.0.0.2".to_string(),
                // First-seen cost, not r2's own
                cost: 4,
            }]
        );

        let r2 = g.get("r2").unwrap();
        assert_eq!(r2.neighbors[0].router, "r1");
        assert_eq!(r2.neighbors[0].cost, 4);
    }

    #[test]
    fn test_no_self_adjacency() {
        let g = graph(
            "routers:\n\
             \x20 r1:\n\
             \x20   eth0: {address: 192.168.1.1, mask: 255.255.255.0}\n\
             \x20   eth1: {address: 192.168.1.2, mask: 255.255.255.0}\n",
        );

        let r1 = g.get("r1").unwrap();
        assert!(r1.neighbors.is_empty());
        // Both interfaces still record the attachment
        assert_eq!(r1.subnets.len(), 2);
        assert_eq!(r1.subnets[0], r1.subnets[1]);
    }

    #[test]
    fn test_parallel_links_keep_both_entries() {
        let g = graph(
            "routers:\n\
             \x20 r1:\n\
             \x20   eth0: {address: 10.0.0.1, mask: 255.255.255.252, cost: 10}\n\
             \x20   eth1: {address: 10.0.4.1, mask: 255.255.255.252, cost: 2}\n\
             \x20 r2:\n\
             \x20   eth0: {address: 10.0.0.2, mask: 255.255.255.252}\n\
             \x20   eth1: {address: 10.0.4.2, mask: 255.255.255.252}\n",
        );

        let r1 = g.get("r1").unwrap();
        assert_eq!(r1.neighbors.len(), 2);
        assert_eq!(r1.neighbors[0].cost, 10);
        assert_eq!(r1.neighbors[1].cost, 2);
        assert!(r1.neighbors.iter().all(|n| n.router == "r2"));
    }

    #[test]
    fn test_shared_segment_full_adjacency() {
        let g = graph(
            "routers:\n\
             \x20 r1:\n\
             \x20   eth0: {address: 192.168.1.1, mask: 255.255.255.0}\n\
             \x20 r2:\n\
             \x20   eth0: {address: 192.168.1.2, mask: 255.255.255.0}\n\
             \x20 r3:\n\
             \x20   eth0: {address: 192.168.1.3, mask: 255.255.255.0}\n",
        );

        let r2 = g.get("r2").unwrap();
        let names: Vec<&str> = r2.neighbors.iter().map(|n| n.router.as_str()).collect();
        assert_eq!(names, vec!["r1", "r3"]);
    }
}
