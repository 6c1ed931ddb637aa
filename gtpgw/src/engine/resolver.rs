use super::{AddressResolver, MobilityRegistry, NodeIdentity};
use crate::{FlowLabel, NodeId, NodeRole};
use anyhow::{Context, Result, bail};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

/// Where a decapsulated datagram goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundRoute {
    /// Deliver on the local gate toward the radio side, carrying the egress
    /// interface selector.
    LocalRadio,
    /// Deliver on the local gate as the exit toward external networks.
    LocalExit,
    /// Re-encapsulate and tunnel to this peer.
    Tunnel(IpAddr),
}

/// Derives the next tunnel peer for each packet.  Holds no per-flow state -
/// every call consults the registry afresh, so handovers take effect on the
/// next packet.
pub struct EndpointResolver {
    identity: NodeIdentity,
    registry: Arc<dyn MobilityRegistry>,
    addresses: Arc<dyn AddressResolver>,
}

impl EndpointResolver {
    pub fn new(
        identity: NodeIdentity,
        registry: Arc<dyn MobilityRegistry>,
        addresses: Arc<dyn AddressResolver>,
    ) -> Self {
        Self {
            identity,
            registry,
            addresses,
        }
    }

    pub fn identity(&self) -> &NodeIdentity {
        &self.identity
    }

    /// Tunnel peer for a classifier-labeled datagram.
    pub fn outbound_peer(&self, flow: FlowLabel, dest: Ipv4Addr) -> Result<IpAddr> {
        match flow {
            FlowLabel::ToGateway => self.gateway_addr(),
            FlowLabel::ToEdgeHost => self
                .registry
                .edge_upf(dest)
                .with_context(|| format!("No edge host owns {dest}")),
            FlowLabel::ToStation(station) => self.station_addr(station),
            FlowLabel::Local | FlowLabel::Removed => {
                bail!("No tunnel peer for flow label '{flow}'")
            }
        }
    }

    /// Routing decision for a decapsulated datagram.  Terminal lookup first,
    /// edge-host subnets second, default gateway fallback last.
    pub fn inbound_route(&self, dest: Ipv4Addr) -> Result<InboundRoute> {
        if let Some(terminal) = self.registry.terminal_id(dest) {
            let serving = self.registry.serving_station(terminal)?;
            if self.identity.node_id == Some(serving) {
                return Ok(InboundRoute::LocalRadio);
            }
            return Ok(InboundRoute::Tunnel(self.station_addr(serving)?));
        }

        if let Some(upf) = self.registry.edge_upf(dest) {
            if self.identity.role == NodeRole::EdgeUserPlaneFunction {
                return Ok(InboundRoute::LocalExit);
            }
            return Ok(InboundRoute::Tunnel(upf));
        }

        if self.identity.role.is_core_gateway() {
            // This node is the exit toward external networks.
            return Ok(InboundRoute::LocalExit);
        }
        Ok(InboundRoute::Tunnel(self.gateway_addr()?))
    }

    fn gateway_addr(&self) -> Result<IpAddr> {
        self.identity
            .gateway_addr
            .context("Core gateway address was not resolved at startup")
    }

    fn station_addr(&self, station: NodeId) -> Result<IpAddr> {
        let name = self.registry.station_name(station)?;
        self.addresses.resolve(&name)
    }
}
