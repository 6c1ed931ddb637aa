mod api;
mod codec;
mod forwarder;
mod identity;
mod resolver;

pub use api::{AddressResolver, InterfaceTable, LocalGate, MobilityRegistry, TunnelTransport};
pub use codec::{decapsulate, encapsulate};
pub use forwarder::{Forwarder, ForwarderCounters};
pub use identity::NodeIdentity;
pub use resolver::{EndpointResolver, InboundRoute};

/// 4-byte TEID followed by a 4-byte payload length.
pub const GTP_HEADER_LEN: usize = 8;
pub const GTPU_PORT: u16 = 2152; // TS29.281

// TEID differentiation happens below this layer.
pub(crate) const TEID_UNSET: u32 = 0;
