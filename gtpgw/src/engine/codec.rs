//! The fixed 8-byte tunneling header: 4-byte TEID, then a 4-byte payload
//! length.  Encapsulation and decapsulation are exact inverses over the
//! payload bytes.

use super::GTP_HEADER_LEN;
use anyhow::{Result, anyhow, ensure};

/// Prepend the tunneling header to `payload`.  The length field is 4 bytes,
/// so payloads over u32::MAX bytes cannot be framed.
pub fn encapsulate(teid: u32, payload: &[u8]) -> Result<Vec<u8>> {
    let length = u32::try_from(payload.len())
        .map_err(|_| anyhow!("Payload of {} bytes overflows the length field", payload.len()))?;
    let mut packet = Vec::with_capacity(GTP_HEADER_LEN + payload.len());
    packet.extend_from_slice(&teid.to_be_bytes());
    packet.extend_from_slice(&length.to_be_bytes());
    packet.extend_from_slice(payload);
    Ok(packet)
}

/// Strip the tunneling header, returning the TEID and the payload bytes.
pub fn decapsulate(packet: &[u8]) -> Result<(u32, Vec<u8>)> {
    ensure!(
        packet.len() >= GTP_HEADER_LEN,
        "Tunneled packet shorter than the {GTP_HEADER_LEN}-byte header"
    );
    let teid = u32::from_be_bytes([packet[0], packet[1], packet[2], packet[3]]);
    let length = u32::from_be_bytes([packet[4], packet[5], packet[6], packet[7]]) as usize;
    ensure!(
        packet.len() - GTP_HEADER_LEN == length,
        "Header length field {length} does not match payload length {}",
        packet.len() - GTP_HEADER_LEN
    );
    Ok((teid, packet[GTP_HEADER_LEN..].to_vec()))
}
