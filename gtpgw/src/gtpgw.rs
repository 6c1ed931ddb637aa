use crate::engine::{
    AddressResolver, EndpointResolver, Forwarder, ForwarderCounters, InterfaceTable, LocalGate,
    MobilityRegistry, NodeIdentity,
};
use crate::net::{UdpTunnelTransport, create_gtpu_socket};
use crate::{Config, Datagram, FlowLabel};
use anyhow::Result;
use async_channel::{Receiver, Sender};
use async_std::net::UdpSocket;
use async_std::task::{self, JoinHandle};
use slog::{Logger, error, info};
use std::sync::Arc;

/// One inbound item for the dispatch loop, tagged by origin.
pub enum GatewayEvent {
    /// A datagram from the traffic classifier with its raw routing-flow
    /// identifier.
    FromClassifier { datagram: Datagram, flow_id: i32 },
    /// A raw tunneled packet received from the transport.
    FromTransport { packet: Vec<u8> },
}

/// Runtime wrapper around the decision engine: binds the tunnel socket and
/// runs the single dispatch loop.  Each event is processed to completion
/// before the next is considered.
pub struct GtpGateway {
    event_tx: Sender<GatewayEvent>,
    counters: Arc<ForwarderCounters>,
    dispatch_task: JoinHandle<()>,
    ingest_task: JoinHandle<()>,
    logger: Logger,
}

impl GtpGateway {
    /// Bootstrap the node identity, bind the tunnel socket and start the
    /// dispatch loop.
    pub async fn start(
        config: Config,
        registry: Arc<dyn MobilityRegistry>,
        addresses: Arc<dyn AddressResolver>,
        interfaces: Arc<dyn InterfaceTable>,
        local_gate: Arc<dyn LocalGate>,
        logger: Logger,
    ) -> Result<Self> {
        let identity =
            NodeIdentity::bootstrap(&config, addresses.as_ref(), interfaces.as_ref(), &logger)?;
        info!(
            logger,
            "Starting as {:?} (node id {:?})", identity.role, identity.node_id
        );

        let socket = Arc::new(UdpSocket::from(create_gtpu_socket(
            config.ip_addr,
            config.local_port,
            &logger,
        )?));
        let transport = Arc::new(UdpTunnelTransport::new(socket.clone()));
        let resolver = EndpointResolver::new(identity, registry, addresses);
        let forwarder = Forwarder::new(
            resolver,
            local_gate,
            transport,
            config.tunnel_peer_port,
            logger.clone(),
        );
        let counters = forwarder.counters();

        let (event_tx, event_rx) = async_channel::unbounded();
        let ingest_task = task::spawn(ingest(socket, event_tx.clone(), logger.clone()));
        let dispatch_task = task::spawn(dispatch(forwarder, event_rx, logger.clone()));

        Ok(Self {
            event_tx,
            counters,
            dispatch_task,
            ingest_task,
            logger,
        })
    }

    /// Input side of the classifier boundary.
    pub fn event_sender(&self) -> Sender<GatewayEvent> {
        self.event_tx.clone()
    }

    pub fn counters(&self) -> Arc<ForwarderCounters> {
        self.counters.clone()
    }

    pub async fn graceful_shutdown(self) {
        info!(&self.logger, "Shutting down");
        self.ingest_task.cancel().await;
        self.event_tx.close();
        self.dispatch_task.await;
        info!(
            &self.logger,
            "Forwarded local={} tunneled={} discarded={}",
            self.counters.local_delivered(),
            self.counters.tunneled(),
            self.counters.discarded()
        );
    }
}

async fn ingest(socket: Arc<UdpSocket>, events: Sender<GatewayEvent>, logger: Logger) {
    let mut buf = [0u8; 2000];
    loop {
        match socket.recv_from(&mut buf).await {
            // The engine sees raw bytes only - transport delivery
            // indications stop here.
            Ok((bytes_read, _peer)) => {
                let packet = buf[..bytes_read].to_vec();
                if events
                    .send(GatewayEvent::FromTransport { packet })
                    .await
                    .is_err()
                {
                    break;
                }
            }
            Err(e) => {
                info!(logger, "Exiting transport ingest with error {e}");
                break;
            }
        }
    }
}

async fn dispatch(forwarder: Forwarder, events: Receiver<GatewayEvent>, logger: Logger) {
    while let Ok(event) = events.recv().await {
        let outcome = match event {
            GatewayEvent::FromClassifier { datagram, flow_id } => {
                match FlowLabel::from_raw(flow_id) {
                    Ok(flow) => forwarder.handle_outbound(datagram, flow).await,
                    Err(e) => Err(e),
                }
            }
            GatewayEvent::FromTransport { packet } => forwarder.handle_inbound(&packet).await,
        };
        if let Err(e) = outcome {
            // The registry and resolver are authoritative - a forwarding
            // fault aborts the node.
            error!(logger, "Fatal forwarding error: {e:#}");
            break;
        }
    }
}
