use anyhow::{Result, anyhow};
use std::fmt;

/// Identifier of a node in the radio network, as tracked by the mobility
/// registry.  Only meaningful for base stations and attached terminals.
pub type NodeId = u16;

/// Routing decision label attached to each datagram by the upstream traffic
/// classifier.  On the wire between the classifier and this engine it is a
/// signed integer; it is decoded once at the dispatch boundary and never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowLabel {
    /// Deliver on the local gate without tunneling.
    Local,
    /// Tunnel toward the core network gateway.
    ToGateway,
    /// The destination no longer exists - discard silently.
    Removed,
    /// Tunnel toward the mobile-edge host owning the destination address.
    ToEdgeHost,
    /// Tunnel toward this serving base station.
    ToStation(NodeId),
}

impl FlowLabel {
    pub fn from_raw(raw: i32) -> Result<Self> {
        Ok(match raw {
            0 => FlowLabel::Local,
            -1 => FlowLabel::ToGateway,
            -2 => FlowLabel::Removed,
            -3 => FlowLabel::ToEdgeHost,
            id => FlowLabel::ToStation(
                NodeId::try_from(id)
                    .map_err(|_| anyhow!("Routing-flow identifier {id} is not a station id"))?,
            ),
        })
    }
}

impl fmt::Display for FlowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowLabel::Local => write!(f, "local"),
            FlowLabel::ToGateway => write!(f, "to-gateway"),
            FlowLabel::Removed => write!(f, "removed"),
            FlowLabel::ToEdgeHost => write!(f, "to-edge-host"),
            FlowLabel::ToStation(id) => write!(f, "station {id}"),
        }
    }
}
