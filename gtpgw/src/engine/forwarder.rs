use super::{EndpointResolver, InboundRoute, LocalGate, TEID_UNSET, TunnelTransport};
use super::{decapsulate, encapsulate};
use crate::{Datagram, FlowLabel};
use anyhow::Result;
use atomic_counter::{AtomicCounter, RelaxedCounter};
use slog::{Logger, debug};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

/// Per-decision counters, read by the shutdown stats dump and by tests.
pub struct ForwarderCounters {
    local: RelaxedCounter,
    tunnel: RelaxedCounter,
    drop: RelaxedCounter,
}

impl Default for ForwarderCounters {
    fn default() -> Self {
        Self {
            local: RelaxedCounter::new(0),
            tunnel: RelaxedCounter::new(0),
            drop: RelaxedCounter::new(0),
        }
    }
}

impl ForwarderCounters {
    pub fn local_delivered(&self) -> usize {
        self.local.get()
    }
    pub fn tunneled(&self) -> usize {
        self.tunnel.get()
    }
    pub fn discarded(&self) -> usize {
        self.drop.get()
    }
}

/// The per-packet tunneling decision engine.  Each call makes exactly one
/// routing decision: local delivery, one tunneled send, or a discard.
pub struct Forwarder {
    resolver: EndpointResolver,
    local_gate: Arc<dyn LocalGate>,
    transport: Arc<dyn TunnelTransport>,
    tunnel_peer_port: u16,
    counters: Arc<ForwarderCounters>,
    logger: Logger,
}

impl Forwarder {
    pub fn new(
        resolver: EndpointResolver,
        local_gate: Arc<dyn LocalGate>,
        transport: Arc<dyn TunnelTransport>,
        tunnel_peer_port: u16,
        logger: Logger,
    ) -> Self {
        Self {
            resolver,
            local_gate,
            transport,
            tunnel_peer_port,
            counters: Arc::new(ForwarderCounters::default()),
            logger,
        }
    }

    pub fn counters(&self) -> Arc<ForwarderCounters> {
        self.counters.clone()
    }

    /// Classifier path: decide between discard, local delivery and
    /// encapsulate-and-forward.
    pub async fn handle_outbound(&self, datagram: Datagram, flow: FlowLabel) -> Result<()> {
        match flow {
            FlowLabel::Removed => {
                // The destination has left the network - defined discard path.
                debug!(self.logger, "Destination removed, dropping datagram");
                self.counters.drop.inc();
                Ok(())
            }
            FlowLabel::Local => {
                self.counters.local.inc();
                self.local_gate.deliver(datagram).await
            }
            _ => {
                let dest = datagram.dest_addr()?;
                let peer = self.resolver.outbound_peer(flow, dest)?;
                debug!(self.logger, "Flow '{flow}': tunneling to {peer}");
                self.tunnel(datagram, peer).await
            }
        }
    }

    /// Transport path: decapsulate and re-route the inner datagram.
    pub async fn handle_inbound(&self, packet: &[u8]) -> Result<()> {
        let (_teid, payload) = decapsulate(packet)?;
        let mut datagram = Datagram::ipv4(payload);
        let dest = datagram.dest_addr()?;

        match self.resolver.inbound_route(dest)? {
            InboundRoute::LocalRadio => {
                datagram.egress_interface = self.resolver.identity().radio_interface;
                debug!(self.logger, "Local delivery to terminal {dest}");
                self.counters.local.inc();
                self.local_gate.deliver(datagram).await
            }
            InboundRoute::LocalExit => {
                debug!(self.logger, "Local delivery toward external network for {dest}");
                self.counters.local.inc();
                self.local_gate.deliver(datagram).await
            }
            InboundRoute::Tunnel(peer) => {
                debug!(self.logger, "Re-tunneling {dest} to {peer}");
                self.tunnel(datagram, peer).await
            }
        }
    }

    async fn tunnel(&self, datagram: Datagram, peer: IpAddr) -> Result<()> {
        let packet = encapsulate(TEID_UNSET, &datagram.bytes)?;
        self.counters.tunnel.inc();
        self.transport
            .send_to(packet, SocketAddr::new(peer, self.tunnel_peer_port))
            .await
    }
}
