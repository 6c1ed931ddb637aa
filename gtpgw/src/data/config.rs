use crate::NodeId;
use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    // Address the tunnel transport binds.
    pub ip_addr: IpAddr,

    // UDP port bound locally for the tunnel transport.
    pub local_port: u16,

    // UDP port of peer tunnel endpoints.
    pub tunnel_peer_port: u16,

    // Role string from the deployment configuration, e.g. "GNODEB".
    pub role: String,

    // Node id of this base station.  Unused by gateway and edge roles.
    pub node_id: Option<NodeId>,

    // Symbolic name of the core network gateway.
    pub gateway_name: Option<String>,

    // True when a base station has its core-side link connected.
    pub upstream_connected: bool,

    // Name of the radio-side egress interface, if any.
    pub egress_interface: Option<String>,
}
