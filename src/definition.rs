//! Network definition loading.
//!
//! This file loads the YAML emulation definition from disk. The raw
//! document is kept as ordered YAML mappings so that router, host, and
//! interface declaration order survives parsing; that order is the only
//! source of determinism for otherwise-symmetric topologies and drives
//! switch naming and route tie-breaking downstream.

use color_eyre::Result;
use log::info;
use serde::Deserialize;
use serde_yaml::Mapping;
use std::fs::File;
use std::path::Path;

/// Raw emulation definition, exactly as declared in YAML.
///
/// `routers` and `hosts` map device names to interface maps; each
/// interface map carries `address`, `mask`, and (routers only) an
/// optional `cost`. Field validation happens when the definition is
/// turned into a [`crate::model::TopologyModel`].
#[derive(Debug, Default, Deserialize)]
pub struct Definition {
    #[serde(default)]
    pub routers: Mapping,
    #[serde(default)]
    pub hosts: Mapping,
}

/// Load and parse a network definition from a YAML file
pub fn load_definition(path: &Path) -> Result<Definition> {
    info!("Loading network definition from: {:?}", path);

    let file = File::open(path)?;
    let definition: Definition = serde_yaml::from_reader(file)?;

    info!(
        "Parsed definition with {} router(s) and {} host(s)",
        definition.routers.len(),
        definition.hosts.len()
    );

    Ok(definition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_definition_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "routers:\n  r1:\n    eth0:\n      address: 10.0.0.1\n      mask: 255.255.255.252\nhosts:\n  h1:\n    eth0:\n      address: 10.0.1.2\n      mask: 255.255.255.0\n"
        )
        .unwrap();

        let definition = load_definition(file.path()).unwrap();
        assert_eq!(definition.routers.len(), 1);
        assert_eq!(definition.hosts.len(), 1);
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let definition: Definition = serde_yaml::from_str("routers: {}").unwrap();
        assert!(definition.routers.is_empty());
        assert!(definition.hosts.is_empty());
    }

    #[test]
    fn test_declaration_order_is_preserved() {
        let definition: Definition =
            serde_yaml::from_str("routers:\n  zeta: {}\n  alpha: {}\n  mid: {}\n").unwrap();
        let names: Vec<&str> = definition
            .routers
            .iter()
            .map(|(name, _)| name.as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }
}
