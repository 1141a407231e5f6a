//! Subnet aggregation.
//!
//! This file partitions every interface in the model into subnets keyed
//! by exact prefix bit-string, decides which subnets become switched
//! shared segments versus direct point-to-point links, and materializes
//! the link plan the emulation driver consumes.
//!
//! Subnet identity is the exact prefix string: interfaces with differing
//! mask lengths form distinct subnets even when one network contains the
//! other. Processing follows declaration order throughout, which fixes
//! switch naming and every downstream tie-break.

use crate::addr::{self, FormatError};
use crate::model::TopologyModel;
use serde::Serialize;
use std::collections::HashMap;

/// Longest prefix that still gets a switch; /30 and /31 subnets are
/// realized as direct links instead.
pub const SWITCHED_PREFIX_MAX: usize = 29;

/// Errors produced while aggregating subnets and materializing links
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("host interface '{host}.{interface}' belongs to prefix {prefix:?} which no router advertises")]
    OrphanHost {
        host: String,
        interface: String,
        prefix: String,
    },

    #[error(
        "point-to-point subnet {prefix:?} has an unsupported attachment set \
         ({routers} router(s), {hosts} host(s))"
    )]
    BadCardinality {
        prefix: String,
        routers: usize,
        hosts: usize,
    },

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// A (device, interface) attachment to a subnet, with the address the
/// interface advertises there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub device: String,
    pub interface: String,
    pub address: String,
}

impl Attachment {
    fn new(device: &str, interface: &str, address: &str) -> Self {
        Attachment {
            device: device.to_string(),
            interface: interface.to_string(),
            address: address.to_string(),
        }
    }
}

/// A subnet: its prefix bit-string, router-side cost, attachments in
/// declaration order, and the switch assigned to it (if any).
///
/// Every member interface's mask length equals the prefix length, so
/// `prefix.len()` doubles as the subnet's CIDR length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subnet {
    pub prefix: String,
    pub cost: u32,
    pub routers: Vec<Attachment>,
    pub hosts: Vec<Attachment>,
    pub switch: Option<String>,
}

/// A switch allocated for a shared-medium subnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Switch {
    pub name: String,
    pub prefix: String,
    pub routers: Vec<Attachment>,
    pub hosts: Vec<Attachment>,
}

/// The subnet partition, in first-sighting order.
#[derive(Debug, Clone, Default)]
pub struct SubnetPartition {
    subnets: Vec<Subnet>,
    index: HashMap<String, usize>,
}

impl SubnetPartition {
    pub fn get(&self, prefix: &str) -> Option<&Subnet> {
        self.index.get(prefix).map(|i| &self.subnets[*i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subnet> {
        self.subnets.iter()
    }

    pub fn len(&self) -> usize {
        self.subnets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subnets.is_empty()
    }

    fn insert_router(&mut self, prefix: String, cost: u32, attachment: Attachment) {
        match self.index.get(&prefix) {
            Some(i) => self.subnets[*i].routers.push(attachment),
            None => {
                self.index.insert(prefix.clone(), self.subnets.len());
                // First sighting fixes the subnet's cost
                self.subnets.push(Subnet {
                    prefix,
                    cost,
                    routers: vec![attachment],
                    hosts: Vec::new(),
                    switch: None,
                });
            }
        }
    }
}

/// One link the emulation driver must create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkPlan {
    /// One endpoint of a switched segment's star.
    SwitchPort {
        switch: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        switch_port: Option<String>,
        device: String,
        interface: String,
        /// Address in CIDR form the endpoint configures itself with.
        address: String,
    },
    /// Direct router-to-router link; each side configures itself.
    RouterToRouter {
        a_router: String,
        a_interface: String,
        b_router: String,
        b_interface: String,
    },
    /// Direct router-to-host link.
    RouterToHost {
        router: String,
        router_interface: String,
        host: String,
        host_interface: String,
    },
}

/// Partition every interface into subnets and allocate switches.
///
/// Router interfaces are processed first, in declaration order; the
/// first interface seen for a prefix creates the subnet and fixes its
/// cost. Host interfaces must land on a prefix some router already
/// advertises. Subnets with prefix length <= 29 then receive switches
/// named `s1`, `s2`, ... in first-sighting order.
pub fn aggregate(model: &TopologyModel) -> Result<(SubnetPartition, Vec<Switch>), TopologyError> {
    let mut partition = SubnetPartition::default();

    for router in &model.routers {
        for iface in &router.interfaces {
            let prefix = addr::subnet_prefix(&iface.address, &iface.mask)?;
            partition.insert_router(
                prefix,
                iface.cost,
                Attachment::new(&router.name, &iface.name, &iface.address),
            );
        }
    }

    for host in &model.hosts {
        for iface in &host.interfaces {
            match partition.index.get(&iface.prefix) {
                Some(i) => partition.subnets[*i].hosts.push(Attachment::new(
                    &host.name,
                    &iface.name,
                    &iface.address,
                )),
                None => {
                    return Err(TopologyError::OrphanHost {
                        host: host.name.clone(),
                        interface: iface.name.clone(),
                        prefix: iface.prefix.clone(),
                    })
                }
            }
        }
    }

    let mut switches = Vec::new();
    for subnet in &mut partition.subnets {
        if subnet.prefix.len() <= SWITCHED_PREFIX_MAX {
            let name = format!("s{}", switches.len() + 1);
            subnet.switch = Some(name.clone());
            switches.push(Switch {
                name,
                prefix: subnet.prefix.clone(),
                routers: subnet.routers.clone(),
                hosts: subnet.hosts.clone(),
            });
        }
    }

    log::info!(
        "Aggregated {} subnet(s), {} switched",
        partition.len(),
        switches.len()
    );

    Ok((partition, switches))
}

/// Materialize the link plan for every subnet.
///
/// Switched subnets yield one star link per attachment, all terminating
/// at the subnet's switch. Switch-less subnets must hold exactly two
/// routers, or one router and one host; anything else is rejected.
pub fn materialize_links(partition: &SubnetPartition) -> Result<Vec<LinkPlan>, TopologyError> {
    let mut links = Vec::new();

    for subnet in partition.iter() {
        match &subnet.switch {
            Some(switch) => {
                for (i, attachment) in subnet.routers.iter().enumerate() {
                    links.push(LinkPlan::SwitchPort {
                        switch: switch.clone(),
                        switch_port: Some(format!("{}-eth{}", switch, i)),
                        device: attachment.device.clone(),
                        interface: attachment.interface.clone(),
                        address: format!("{}/{}", attachment.address, subnet.prefix.len()),
                    });
                }
                for attachment in &subnet.hosts {
                    links.push(LinkPlan::SwitchPort {
                        switch: switch.clone(),
                        switch_port: None,
                        device: attachment.device.clone(),
                        interface: attachment.interface.clone(),
                        address: format!("{}/{}", attachment.address, subnet.prefix.len()),
                    });
                }
            }
            None => match (subnet.routers.as_slice(), subnet.hosts.as_slice()) {
                ([a, b], []) => links.push(LinkPlan::RouterToRouter {
                    a_router: a.device.clone(),
                    a_interface: a.interface.clone(),
                    b_router: b.device.clone(),
                    b_interface: b.interface.clone(),
                }),
                ([router], [host]) => links.push(LinkPlan::RouterToHost {
                    router: router.device.clone(),
                    router_interface: router.interface.clone(),
                    host: host.device.clone(),
                    host_interface: host.interface.clone(),
                }),
                _ => {
                    return Err(TopologyError::BadCardinality {
                        prefix: subnet.prefix.clone(),
                        routers: subnet.routers.len(),
                        hosts: subnet.hosts.len(),
                    })
                }
            },
        }
    }

    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Definition;
    use crate::model::build_model;

    fn model(yaml: &str) -> TopologyModel {
        let def: Definition = serde_yaml::from_str(yaml).unwrap();
        build_model(&def).unwrap()
    }

    #[test]
    fn test_partition_by_exact_prefix() {
        let m = model(
            "routers:\n\
             \x20 r1:\n\
             \x20   eth0: {address: 10.0.0.1, mask: 255.255.255.252}\n\
             \x20 r2:\n\
             \x20   eth0: {address: 10.0.0.2, mask: 255.255.255.252}\n",
        );

        let (partition, switches) = aggregate(&m).unwrap();
        assert_eq!(partition.len(), 1);
        assert!(switches.is_empty());

        let subnet = partition.iter().next().unwrap();
        assert_eq!(subnet.routers.len(), 2);
        assert_eq!(subnet.routers[0].device, "r1");
        assert_eq!(subnet.routers[1].device, "r2");
    }

    #[test]
    fn test_differing_mask_lengths_stay_distinct() {
        // Same address range, /24 versus /25: never merged
        let m = model(
            "routers:\n\
             \x20 r1:\n\
             \x20   eth0: {address: 192.168.1.1, mask: 255.255.255.0}\n\
             \x20 r2:\n\
             \x20   eth0: {address: 192.168.1.2, mask: 255.255.255.128}\n",
        );

        let (partition, switches) = aggregate(&m).unwrap();
        assert_eq!(partition.len(), 2);
        assert_eq!(switches.len(), 2);
    }

    #[test]
    fn test_first_seen_cost_wins() {
        let m = model(
            "routers:\n\
             \x20 r1:\n\
             \x20   eth0: {address: 10.0.1.1, mask: 255.255.255.0, cost: 7}\n\
             \x20 r2:\n\
             \x20   eth0: {address: 10.0.1.2, mask: 255.255.255.0, cost: 3}\n",
        );

        let (partition, _) = aggregate(&m).unwrap();
        assert_eq!(partition.iter().next().unwrap().cost, 7);
    }

    #[test]
    fn test_switch_allocation_and_naming_order() {
        let m = model(
            "routers:\n\
             \x20 r1:\n\
             \x20   eth0: {address: 10.0.1.1, mask: 255.255.255.0}\n\
             \x20   eth1: {address: 10.0.0.1, mask: 255.255.255.252}\n\
             \x20   eth2: {address: 10.0.2.1, mask: 255.255.255.0}\n",
        );

        let (partition, switches) = aggregate(&m).unwrap();
        // /30 subnet gets no switch; /24s are named in sighting order
        assert_eq!(switches.len(), 2);
        assert_eq!(switches[0].name, "s1");
        assert_eq!(switches[1].name, "s2");

        let subnets: Vec<&Subnet> = partition.iter().collect();
        assert_eq!(subnets[0].switch.as_deref(), Some("s1"));
        assert_eq!(subnets[1].switch, None);
        assert_eq!(subnets[2].switch.as_deref(), Some("s2"));
    }

    #[test]
    fn test_orphan_host_fails() {
        let m = model(
            "routers:\n\
             \x20 r1:\n\
             \x20   eth0: {address: 10.0.1.1, mask: 255.255.255.0}\n\
             hosts:\n\
             \x20 h1:\n\
             \x20   eth0: {address: 10.9.9.2, mask: 255.255.255.0}\n",
        );

        assert!(matches!(
            aggregate(&m).unwrap_err(),
            TopologyError::OrphanHost { .. }
        ));
    }

    #[test]
    fn test_switched_subnet_star_links() {
        // A /24 with two routers and one host: one switch, three endpoints
        let m = model(
            "routers:\n\
             \x20 r1:\n\
             \x20   eth0: {address: 192.168.1.1, mask: 255.255.255.0}\n\
             \x20 r2:\n\
             \x20   eth0: {address: 192.168.1.2, mask: 255.255.255.0}\n\
             hosts:\n\
             \x20 h1:\n\
             \x20   eth0: {address: 192.168.1.10, mask: 255.255.255.0}\n",
        );

        let (partition, switches) = aggregate(&m).unwrap();
        assert_eq!(switches.len(), 1);

        let links = materialize_links(&partition).unwrap();
        assert_eq!(links.len(), 3);
        assert!(links
            .iter()
            .all(|l| matches!(l, LinkPlan::SwitchPort { switch, .. } if switch == "s1")));
        assert!(matches!(
            &links[0],
            LinkPlan::SwitchPort { switch_port: Some(port), address, .. }
                if port == "s1-eth0" && address == "192.168.1.1/24"
        ));
        assert!(matches!(
            &links[2],
            LinkPlan::SwitchPort { switch_port: None, device, .. } if device == "h1"
        ));
    }

    #[test]
    fn test_direct_router_to_router_link() {
        let m = model(
            "routers:\n\
             \x20 r1:\n\
             \x20   eth0: {address: 10.0.0.1, mask: 255.255.255.252}\n\
             \x20 r2:\n\
             \x20   eth0: {address: 10.0.0.2, mask: 255.255.255.252}\n",
        );

        let (partition, _) = aggregate(&m).unwrap();
        let links = materialize_links(&partition).unwrap();
        assert_eq!(
            links,
            vec![LinkPlan::RouterToRouter {
                a_router: "r1".to_string(),
                a_interface: "eth0".to_string(),
                b_router: "r2".to_string(),
                b_interface: "eth0".to_string(),
            }]
        );
    }

    #[test]
    fn test_direct_router_to_host_link() {
        let m = model(
            "routers:\n\
             \x20 r1:\n\
             \x20   eth0: {address: 10.0.0.1, mask: 255.255.255.252}\n\
             hosts:\n\
             \x20 h1:\n\
             \x20   eth0: {address: 10.0.0.2, mask: 255.255.255.252}\n",
        );

        let (partition, _) = aggregate(&m).unwrap();
        let links = materialize_links(&partition).unwrap();
        assert!(matches!(&links[0], LinkPlan::RouterToHost { router, host, .. }
            if router == "r1" && host == "h1"));
    }

    #[test]
    fn test_lone_point_to_point_interface_fails() {
        let m = model(
            "routers:\n\
             \x20 r1:\n\
             \x20   eth0: {address: 10.0.0.1, mask: 255.255.255.252}\n",
        );

        let (partition, _) = aggregate(&m).unwrap();
        assert!(matches!(
            materialize_links(&partition).unwrap_err(),
            TopologyError::BadCardinality {
                routers: 1,
                hosts: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_crowded_point_to_point_subnet_fails() {
        let m = model(
            "routers:\n\
             \x20 r1:\n\
             \x20   eth0: {address: 10.0.0.1, mask: 255.255.255.252}\n\
             \x20 r2:\n\
             \x20   eth0: {address: 10.0.0.2, mask: 255.255.255.252}\n\
             hosts:\n\
             \x20 h1:\n\
             \x20   eth0: {address: 10.0.0.3, mask: 255.255.255.252}\n",
        );

        let (partition, _) = aggregate(&m).unwrap();
        assert!(matches!(
            materialize_links(&partition).unwrap_err(),
            TopologyError::BadCardinality {
                routers: 2,
                hosts: 1,
                ..
            }
        ));
    }
}
