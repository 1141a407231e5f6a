//! In-memory topology model.
//!
//! This file turns the raw YAML definition into the typed device model
//! the rest of the pipeline consumes: routers and hosts with their
//! interfaces, in declaration order. Missing or ill-typed fields are
//! reported as [`SchemaError`] naming the offending device and
//! interface. The model is immutable once built.

use crate::addr::{self, FormatError};
use crate::definition::Definition;
use serde_yaml::{Mapping, Value};

/// Errors produced while building the model from a definition
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("{kind} name {name:?} is not a string")]
    NameNotString { kind: &'static str, name: String },

    #[error("{kind} '{device}' must be a mapping of interfaces")]
    DeviceNotMapping { kind: &'static str, device: String },

    #[error("interface '{device}.{interface}' must be a mapping")]
    InterfaceNotMapping { device: String, interface: String },

    #[error("interface '{device}.{interface}' is missing required field '{field}'")]
    MissingField {
        device: String,
        interface: String,
        field: &'static str,
    },

    #[error("interface '{device}.{interface}': field '{field}' must be a string")]
    FieldNotString {
        device: String,
        interface: String,
        field: &'static str,
    },

    #[error("interface '{device}.{interface}': cost must be a positive integer")]
    InvalidCost { device: String, interface: String },

    #[error("interface '{device}.{interface}' has a malformed address or mask")]
    BadAddress {
        device: String,
        interface: String,
        #[source]
        source: FormatError,
    },
}

/// A router interface: address, mask, and link cost (default 1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterInterface {
    pub name: String,
    pub address: String,
    pub mask: String,
    pub cost: u32,
}

/// A host interface. Hosts carry no cost; their subnet prefix is
/// computed eagerly at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInterface {
    pub name: String,
    pub address: String,
    pub mask: String,
    pub prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Router {
    pub name: String,
    pub interfaces: Vec<RouterInterface>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub name: String,
    pub interfaces: Vec<HostInterface>,
}

/// The complete device model, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologyModel {
    pub routers: Vec<Router>,
    pub hosts: Vec<Host>,
}

impl TopologyModel {
    /// Look up a router interface by device and interface name.
    pub fn router_interface(&self, router: &str, interface: &str) -> Option<&RouterInterface> {
        self.routers
            .iter()
            .find(|r| r.name == router)
            .and_then(|r| r.interfaces.iter().find(|i| i.name == interface))
    }

    /// Look up a host interface by device and interface name.
    pub fn host_interface(&self, host: &str, interface: &str) -> Option<&HostInterface> {
        self.hosts
            .iter()
            .find(|h| h.name == host)
            .and_then(|h| h.interfaces.iter().find(|i| i.name == interface))
    }
}

/// Build the typed topology model from a parsed definition.
pub fn build_model(definition: &Definition) -> Result<TopologyModel, SchemaError> {
    let mut model = TopologyModel::default();

    for (name, interfaces) in &definition.routers {
        let name = string_name("router", name)?;
        let interfaces = device_mapping("router", &name, interfaces)?;

        let mut router = Router {
            name: name.clone(),
            interfaces: Vec::new(),
        };
        for (iface_name, config) in interfaces {
            let iface_name = interface_name(&name, iface_name)?;
            let config = interface_mapping(&name, &iface_name, config)?;
            router
                .interfaces
                .push(build_router_interface(&name, iface_name, config)?);
        }
        model.routers.push(router);
    }

    for (name, interfaces) in &definition.hosts {
        let name = string_name("host", name)?;
        let interfaces = device_mapping("host", &name, interfaces)?;

        let mut host = Host {
            name: name.clone(),
            interfaces: Vec::new(),
        };
        for (iface_name, config) in interfaces {
            let iface_name = interface_name(&name, iface_name)?;
            let config = interface_mapping(&name, &iface_name, config)?;
            host.interfaces
                .push(build_host_interface(&name, iface_name, config)?);
        }
        model.hosts.push(host);
    }

    Ok(model)
}

fn string_name(kind: &'static str, value: &Value) -> Result<String, SchemaError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| SchemaError::NameNotString {
            kind,
            name: format!("{:?}", value),
        })
}

fn interface_name(device: &str, value: &Value) -> Result<String, SchemaError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| SchemaError::NameNotString {
            kind: "interface",
            name: format!("{}.{:?}", device, value),
        })
}

fn device_mapping<'a>(
    kind: &'static str,
    device: &str,
    value: &'a Value,
) -> Result<&'a Mapping, SchemaError> {
    value.as_mapping().ok_or_else(|| SchemaError::DeviceNotMapping {
        kind,
        device: device.to_string(),
    })
}

fn interface_mapping<'a>(
    device: &str,
    interface: &str,
    value: &'a Value,
) -> Result<&'a Mapping, SchemaError> {
    value
        .as_mapping()
        .ok_or_else(|| SchemaError::InterfaceNotMapping {
            device: device.to_string(),
            interface: interface.to_string(),
        })
}

fn required_string(
    device: &str,
    interface: &str,
    config: &Mapping,
    field: &'static str,
) -> Result<String, SchemaError> {
    match config.get(field) {
        Some(value) => value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| SchemaError::FieldNotString {
                device: device.to_string(),
                interface: interface.to_string(),
                field,
            }),
        None => Err(SchemaError::MissingField {
            device: device.to_string(),
            interface: interface.to_string(),
            field,
        }),
    }
}

fn build_router_interface(
    device: &str,
    name: String,
    config: &Mapping,
) -> Result<RouterInterface, SchemaError> {
    let address = required_string(device, &name, config, "address")?;
    let mask = required_string(device, &name, config, "mask")?;

    let cost = match config.get("cost") {
        Some(value) => value
            .as_u64()
            .filter(|c| (1..=u64::from(u32::MAX)).contains(c))
            .ok_or_else(|| SchemaError::InvalidCost {
                device: device.to_string(),
                interface: name.clone(),
            })? as u32,
        None => 1,
    };

    Ok(RouterInterface {
        name,
        address,
        mask,
        cost,
    })
}

fn build_host_interface(
    device: &str,
    name: String,
    config: &Mapping,
) -> Result<HostInterface, SchemaError> {
    let address = required_string(device, &name, config, "address")?;
    let mask = required_string(device, &name, config, "mask")?;

    let prefix =
        addr::subnet_prefix(&address, &mask).map_err(|source| SchemaError::BadAddress {
            device: device.to_string(),
            interface: name.clone(),
            source,
        })?;

    Ok(HostInterface {
        name,
        address,
        mask,
        prefix,
    })
}
