//! Emulation plan assembly.
//!
//! This file gathers the pipeline results into a single serializable
//! plan for the external emulation driver: switches, links, per-device
//! interface configuration, per-host default gateways, and the static
//! routes each router must install.

use crate::addr;
use crate::model::TopologyModel;
use crate::routes::{Route, RouteTable};
use crate::subnet::{Attachment, LinkPlan, SubnetPartition, Switch};
use serde::Serialize;

/// A switch to instantiate, with its subnet in dotted CIDR form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchPlan {
    pub name: String,
    pub network: String,
}

/// One subnet of the partition, in driver-friendly form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubnetPlan {
    /// Network in dotted CIDR form.
    pub network: String,
    /// Prefix bit-string identifying the subnet.
    pub prefix: String,
    pub cost: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switch: Option<String>,
    pub routers: Vec<Attachment>,
    pub hosts: Vec<Attachment>,
}

/// One interface configuration command: address plus netmask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceConfig {
    pub device: String,
    pub interface: String,
    pub address: String,
    pub mask: String,
}

/// A host's default gateway: the first router attached to its subnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayHint {
    pub host: String,
    pub interface: String,
    pub gateway: String,
}

/// One static route a router must install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticRoute {
    pub router: String,
    /// Destination in dotted CIDR form.
    pub destination: String,
    /// Address of the next-hop router on the first shared subnet.
    pub via: String,
}

/// Everything the emulation driver needs, in deterministic order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmulationPlan {
    pub subnets: Vec<SubnetPlan>,
    pub switches: Vec<SwitchPlan>,
    pub links: Vec<LinkPlan>,
    pub interfaces: Vec<InterfaceConfig>,
    pub gateways: Vec<GatewayHint>,
    pub routes: Vec<StaticRoute>,
}

/// Assemble the full emulation plan from the pipeline results.
pub fn build_plan(
    model: &TopologyModel,
    partition: &SubnetPartition,
    switches: &[Switch],
    links: Vec<LinkPlan>,
    table: &RouteTable,
) -> EmulationPlan {
    let mut plan = EmulationPlan {
        links,
        ..EmulationPlan::default()
    };

    for subnet in partition.iter() {
        plan.subnets.push(SubnetPlan {
            network: addr::prefix_to_cidr(&subnet.prefix),
            prefix: subnet.prefix.clone(),
            cost: subnet.cost,
            switch: subnet.switch.clone(),
            routers: subnet.routers.clone(),
            hosts: subnet.hosts.clone(),
        });
    }

    for switch in switches {
        plan.switches.push(SwitchPlan {
            name: switch.name.clone(),
            network: addr::prefix_to_cidr(&switch.prefix),
        });
    }

    // Hosts first, then routers, mirroring driver bring-up order
    for host in &model.hosts {
        for iface in &host.interfaces {
            plan.interfaces.push(InterfaceConfig {
                device: host.name.clone(),
                interface: iface.name.clone(),
                address: iface.address.clone(),
                mask: iface.mask.clone(),
            });
        }
    }
    for router in &model.routers {
        for iface in &router.interfaces {
            plan.interfaces.push(InterfaceConfig {
                device: router.name.clone(),
                interface: iface.name.clone(),
                address: iface.address.clone(),
                mask: iface.mask.clone(),
            });
        }
    }

    for subnet in partition.iter() {
        for host in &subnet.hosts {
            // The first router attached to the subnet is the gateway
            if let Some(router) = subnet.routers.first() {
                plan.gateways.push(GatewayHint {
                    host: host.device.clone(),
                    interface: host.interface.clone(),
                    gateway: router.address.clone(),
                });
            }
        }
    }

    for router in &table.routers {
        for entry in &router.routes {
            if let Route::NextHop { address, .. } = &entry.route {
                plan.routes.push(StaticRoute {
                    router: router.router.clone(),
                    destination: entry.destination.clone(),
                    via: address.clone(),
                });
            }
        }
    }

    plan
}
