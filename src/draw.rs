//! GraphViz rendering of the router adjacency.
//!
//! Auxiliary output: renders routers and the subnets they share as an
//! undirected graph with cost labels, suitable for piping into `dot`.
//! Only the subnet partition is consulted, never the route table.

use crate::model::TopologyModel;
use crate::subnet::SubnetPartition;

/// Render the router-to-router adjacency as GraphViz source.
pub fn render_adjacency(model: &TopologyModel, partition: &SubnetPartition) -> String {
    let mut out = String::from("graph Network {\n");

    for router in &model.routers {
        out.push_str(&format!("\t{} [shape=circle];\n", router.name));
    }

    for subnet in partition.iter() {
        for (i, a) in subnet.routers.iter().enumerate() {
            for b in &subnet.routers[i + 1..] {
                out.push_str(&format!(
                    "\t{} -- {} [label=\"{}\"];\n",
                    a.device, b.device, subnet.cost
                ));
            }
        }
    }

    out.push_str("}\n");
    out
}
