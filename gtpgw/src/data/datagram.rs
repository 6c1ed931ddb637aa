use anyhow::{Result, ensure};
use std::net::Ipv4Addr;

pub const IPV4_HEADER_LEN: usize = 20;

/// Network-layer protocol marker reattached to a datagram after
/// decapsulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum L3Protocol {
    Ipv4,
}

/// An owned network-layer packet plus the metadata the local gate needs.
#[derive(Debug, Clone)]
pub struct Datagram {
    pub bytes: Vec<u8>,
    pub protocol: L3Protocol,
    /// Egress interface selector, attached when delivering toward the
    /// radio side of a base station.
    pub egress_interface: Option<u32>,
}

impl Datagram {
    pub fn ipv4(bytes: Vec<u8>) -> Self {
        Datagram {
            bytes,
            protocol: L3Protocol::Ipv4,
            egress_interface: None,
        }
    }

    /// Destination address from the IPv4 header.
    pub fn dest_addr(&self) -> Result<Ipv4Addr> {
        ensure!(
            self.bytes.len() >= IPV4_HEADER_LEN,
            "Datagram shorter than an IPv4 header"
        );
        ensure!(
            self.bytes[0] & 0xf0 == 0x40,
            "Not IPv4 - first byte of IP header {:x}",
            self.bytes[0]
        );
        Ok(Ipv4Addr::new(
            self.bytes[16],
            self.bytes[17],
            self.bytes[18],
            self.bytes[19],
        ))
    }
}
