use crate::engine::{AddressResolver, MobilityRegistry};
use crate::NodeId;
use anyhow::{Context, Result, bail, ensure};
use serde::Deserialize;
use slog::{Logger, error, info};
use std::collections::HashMap;
use std::fs;
use std::net::{IpAddr, Ipv4Addr};

#[derive(Deserialize, Debug)]
struct TopologyFile {
    #[serde(default)]
    terminal: Vec<TerminalEntry>,
    #[serde(default)]
    station: Vec<StationEntry>,
    #[serde(default, rename = "edge-host")]
    edge_host: Vec<EdgeHostEntry>,
    #[serde(default)]
    host: Vec<HostEntry>,
}

#[derive(Deserialize, Debug)]
struct HostEntry {
    name: String,
    address: IpAddr,
}

#[derive(Deserialize, Debug)]
struct TerminalEntry {
    address: Ipv4Addr,
    id: NodeId,
    serving_station: NodeId,
}

#[derive(Deserialize, Debug)]
struct StationEntry {
    id: NodeId,
    name: String,
    address: IpAddr,
}

#[derive(Deserialize, Debug)]
struct EdgeHostEntry {
    subnet: Ipv4Addr,
    prefix_len: u8,
    upf: IpAddr,
}

struct EdgeSubnet {
    network: u32,
    mask: u32,
    upf: IpAddr,
}

/// In-process mobility/location registry plus symbolic-name resolution,
/// loaded once from a TOML file.
pub struct Topology {
    terminals: HashMap<Ipv4Addr, NodeId>,
    serving: HashMap<NodeId, NodeId>,
    station_names: HashMap<NodeId, String>,
    addresses: HashMap<String, IpAddr>,
    edge_hosts: Vec<EdgeSubnet>,
}

/// Load the topology from file into memory.
pub fn load_topology_file(filename: &str, logger: &Logger) -> Result<Topology> {
    let path = std::env::current_dir()?;
    let contents = fs::read_to_string(filename).inspect_err(|e| {
        error!(
            logger,
            "Failed to load topology file {filename} (current directory {}) with error code {e}",
            path.display()
        )
    })?;
    let topology = parse_topology(&contents)?;
    info!(
        logger,
        "Loaded {} terminals, {} stations, {} edge hosts from {filename}",
        topology.terminals.len(),
        topology.station_names.len(),
        topology.edge_hosts.len()
    );
    Ok(topology)
}

fn parse_topology(contents: &str) -> Result<Topology> {
    let file: TopologyFile = toml::from_str(contents)?;

    let mut station_names = HashMap::new();
    let mut addresses = HashMap::new();
    for station in file.station {
        ensure!(
            station_names.insert(station.id, station.name.clone()).is_none(),
            "Duplicate station id {}",
            station.id
        );
        ensure!(
            addresses.insert(station.name.clone(), station.address).is_none(),
            "Duplicate station name '{}'",
            station.name
        );
    }

    for host in file.host {
        ensure!(
            addresses.insert(host.name.clone(), host.address).is_none(),
            "Duplicate name '{}'",
            host.name
        );
    }

    let mut terminals = HashMap::new();
    let mut serving = HashMap::new();
    for terminal in file.terminal {
        if !station_names.contains_key(&terminal.serving_station) {
            bail!(
                "Terminal {} is served by unknown station {}",
                terminal.id,
                terminal.serving_station
            );
        }
        terminals.insert(terminal.address, terminal.id);
        serving.insert(terminal.id, terminal.serving_station);
    }

    let mut edge_hosts = Vec::new();
    for entry in file.edge_host {
        ensure!(
            entry.prefix_len <= 32,
            "Bad prefix length {} for edge subnet {}",
            entry.prefix_len,
            entry.subnet
        );
        let mask = if entry.prefix_len == 0 {
            0
        } else {
            u32::MAX << (32 - entry.prefix_len)
        };
        edge_hosts.push(EdgeSubnet {
            network: u32::from(entry.subnet) & mask,
            mask,
            upf: entry.upf,
        });
    }

    Ok(Topology {
        terminals,
        serving,
        station_names,
        addresses,
        edge_hosts,
    })
}

impl MobilityRegistry for Topology {
    fn terminal_id(&self, addr: Ipv4Addr) -> Option<NodeId> {
        self.terminals.get(&addr).copied()
    }

    fn serving_station(&self, terminal: NodeId) -> Result<NodeId> {
        self.serving
            .get(&terminal)
            .copied()
            .with_context(|| format!("No serving station recorded for terminal {terminal}"))
    }

    fn station_name(&self, station: NodeId) -> Result<String> {
        self.station_names
            .get(&station)
            .cloned()
            .with_context(|| format!("No name recorded for station {station}"))
    }

    fn edge_upf(&self, addr: Ipv4Addr) -> Option<IpAddr> {
        let addr = u32::from(addr);
        self.edge_hosts
            .iter()
            .find(|subnet| addr & subnet.mask == subnet.network)
            .map(|subnet| subnet.upf)
    }
}

impl AddressResolver for Topology {
    fn resolve(&self, name: &str) -> Result<IpAddr> {
        self.addresses
            .get(name)
            .copied()
            .with_context(|| format!("Cannot resolve symbolic name '{name}'"))
    }
}
