//! Chains two nodes through the wire format: what one node tunnels, the
//! next node decapsulates and delivers.

use anyhow::Result;
use gtpgw::{Datagram, FlowLabel};
use gtpgw_tests::framework::*;

#[async_std::test]
async fn tunneled_packet_is_delivered_by_the_serving_station() -> Result<()> {
    // Station 1 gets a downlink datagram for terminal 9 and tunnels it to
    // station 2, which serves the terminal and delivers it locally.
    let station1 = build_station(1)?;
    let station2 = build_station(2)?;
    let inner = build_ipv4_udp_packet(external_addr(), terminal_addr());

    station1
        .forwarder
        .handle_outbound(Datagram::ipv4(inner.clone()), FlowLabel::ToStation(2))
        .await?;
    let sent = station1.transport.sent().await;
    assert_eq!(sent.len(), 1);

    station2.forwarder.handle_inbound(&sent[0].0).await?;

    let delivered = station2.gate.delivered().await;
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].bytes, inner);
    assert!(station2.transport.sent().await.is_empty());
    Ok(())
}
