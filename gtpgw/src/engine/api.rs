//! Trait boundary to the gateway's external collaborators.

use crate::{Datagram, NodeId};
use anyhow::Result;
use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// View onto the mobility/location registry.  Lookups are synchronous -
/// they consult process-local state, not the network.
pub trait MobilityRegistry: Send + Sync {
    /// Node id of the attached terminal owning this address, if any.
    fn terminal_id(&self, addr: Ipv4Addr) -> Option<NodeId>;

    /// Base station currently serving a terminal.  This is the handover
    /// indirection - the answer can change between packets.
    fn serving_station(&self, terminal: NodeId) -> Result<NodeId>;

    /// Symbolic name of a base station.
    fn station_name(&self, station: NodeId) -> Result<String>;

    /// User-plane function address of the edge host whose subnet contains
    /// this address, if any.
    fn edge_upf(&self, addr: Ipv4Addr) -> Option<IpAddr>;
}

/// Symbolic name to network address resolution.
pub trait AddressResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Result<IpAddr>;
}

/// Local interface name to interface id.
pub trait InterfaceTable: Send + Sync {
    fn interface_id(&self, name: &str) -> Option<u32>;
}

/// Outbound channel toward the classifier / local network side.
#[async_trait]
pub trait LocalGate: Send + Sync {
    async fn deliver(&self, datagram: Datagram) -> Result<()>;
}

/// Outbound side of the tunnel transport.
#[async_trait]
pub trait TunnelTransport: Send + Sync {
    async fn send_to(&self, packet: Vec<u8>, peer: SocketAddr) -> Result<()>;
}
