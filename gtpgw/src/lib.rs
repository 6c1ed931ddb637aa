mod data;
mod engine;
mod gtpgw;
mod net;

pub use data::{
    Config, Datagram, FlowLabel, IPV4_HEADER_LEN, L3Protocol, NodeId, NodeRole, Topology,
    load_topology_file,
};
pub use engine::{
    AddressResolver, EndpointResolver, Forwarder, ForwarderCounters, GTP_HEADER_LEN, GTPU_PORT,
    InboundRoute, InterfaceTable, LocalGate, MobilityRegistry, NodeIdentity, TunnelTransport,
    decapsulate, encapsulate,
};
pub use gtpgw::{GatewayEvent, GtpGateway};
pub use net::{ChannelGate, SystemInterfaces};
