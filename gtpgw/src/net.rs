//! Production implementations of the gate, transport and interface-table
//! boundaries.

use crate::engine::{InterfaceTable, LocalGate, TunnelTransport};
use crate::Datagram;
use anyhow::{Context, Result, anyhow};
use async_channel::Sender;
use async_std::net::UdpSocket;
use async_trait::async_trait;
use slog::{Logger, info};
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

/// Local gate backed by a channel - the abstract outbound direction toward
/// the classifier / local network.
pub struct ChannelGate(Sender<Datagram>);

impl ChannelGate {
    pub fn new(sender: Sender<Datagram>) -> Self {
        Self(sender)
    }
}

#[async_trait]
impl LocalGate for ChannelGate {
    async fn deliver(&self, datagram: Datagram) -> Result<()> {
        self.0
            .send(datagram)
            .await
            .map_err(|_| anyhow!("Local gate closed"))
    }
}

/// Interface table backed by the operating system.
pub struct SystemInterfaces;

impl InterfaceTable for SystemInterfaces {
    fn interface_id(&self, name: &str) -> Option<u32> {
        let Ok(name) = std::ffi::CString::new(name) else {
            return None;
        };
        match unsafe { libc::if_nametoindex(name.as_ptr()) } {
            0 => None,
            index => Some(index),
        }
    }
}

/// Outbound tunnel sends over the shared GTP-U socket.
pub(crate) struct UdpTunnelTransport {
    socket: Arc<UdpSocket>,
}

impl UdpTunnelTransport {
    pub fn new(socket: Arc<UdpSocket>) -> Self {
        Self { socket }
    }
}

#[async_trait]
impl TunnelTransport for UdpTunnelTransport {
    async fn send_to(&self, packet: Vec<u8>, peer: SocketAddr) -> Result<()> {
        self.socket.send_to(&packet, peer).await?;
        Ok(())
    }
}

/// Open the local UDP socket for the tunnel transport.
pub(crate) fn create_gtpu_socket(
    local_ip: IpAddr,
    port: u16,
    logger: &Logger,
) -> Result<std::net::UdpSocket> {
    let transport_address = SocketAddr::new(local_ip, port);
    let domain = match local_ip {
        IpAddr::V4(_) => Domain::IPV4,
        IpAddr::V6(_) => Domain::IPV6,
    };

    let gtpu_socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    gtpu_socket.set_reuse_port(true)?;
    gtpu_socket
        .bind(&transport_address.into())
        .context(format!("Failed to bind {}", transport_address))?;
    info!(logger, "Serving GTP-U on {transport_address}");
    Ok(gtpu_socket.into())
}
