//! Whole-node tests over real UDP sockets on loopback: the dispatch loop,
//! the transport ingest path and the classifier event boundary.

use anyhow::Result;
use async_std::future;
use async_std::net::UdpSocket;
use gtpgw_tests::framework::*;
use gtpgw_tests::{MockInterfaces, MockRegistry, MockResolver, RecordingGate};
use gtpgw::{Config, Datagram, GatewayEvent, GtpGateway, encapsulate};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

fn local_config(local_port: u16, tunnel_peer_port: u16) -> Config {
    Config {
        ip_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
        local_port,
        tunnel_peer_port,
        role: "GNODEB".to_string(),
        node_id: Some(1),
        gateway_name: Some("upf1".to_string()),
        upstream_connected: true,
        egress_interface: None,
    }
}

fn loopback_registry() -> MockRegistry {
    MockRegistry::new()
        .with_station(1, "gnb1")
        .with_station(2, "gnb2")
        .with_terminal(terminal_addr(), 9, 2)
}

fn loopback_resolver() -> MockResolver {
    let localhost = IpAddr::V4(Ipv4Addr::LOCALHOST);
    MockResolver::new()
        .with_name("gnb1", localhost)
        .with_name("gnb2", localhost)
        .with_name("upf1", localhost)
}

#[async_std::test]
async fn udp_ingest_retunnels_toward_the_serving_station() -> Result<()> {
    let logger = init_logging();

    // Peer socket playing station 2.
    let peer = UdpSocket::bind("127.0.0.1:0").await?;
    let peer_port = peer.local_addr()?.port();

    let gw = GtpGateway::start(
        local_config(16152, peer_port),
        Arc::new(loopback_registry()),
        Arc::new(loopback_resolver()),
        Arc::new(MockInterfaces::default()),
        Arc::new(RecordingGate::default()),
        logger,
    )
    .await?;

    // Tunnel a packet for terminal 9 into the gateway; station 1 does not
    // serve it, so the gateway re-tunnels toward "gnb2" - our peer socket.
    let inner = build_ipv4_udp_packet(external_addr(), terminal_addr());
    let sender = UdpSocket::bind("127.0.0.1:0").await?;
    sender
        .send_to(&encapsulate(0, &inner)?, "127.0.0.1:16152")
        .await?;

    let mut buf = [0u8; 2000];
    let (bytes_read, _) =
        future::timeout(Duration::from_secs(1), peer.recv_from(&mut buf)).await??;
    let (_, payload) = gtpgw::decapsulate(&buf[..bytes_read])?;
    assert_eq!(payload, inner);

    assert_eq!(gw.counters().tunneled(), 1);
    gw.graceful_shutdown().await;
    Ok(())
}

#[async_std::test]
async fn classifier_event_with_local_flow_reaches_the_local_gate() -> Result<()> {
    let logger = init_logging();
    let gate = Arc::new(RecordingGate::default());

    let gw = GtpGateway::start(
        local_config(16153, 16154),
        Arc::new(loopback_registry()),
        Arc::new(loopback_resolver()),
        Arc::new(MockInterfaces::default()),
        gate.clone(),
        logger,
    )
    .await?;

    let bytes = build_ipv4_udp_packet(external_addr(), terminal_addr());
    gw.event_sender()
        .send(GatewayEvent::FromClassifier {
            datagram: Datagram::ipv4(bytes.clone()),
            flow_id: 0,
        })
        .await?;

    // The dispatch loop processes events in order; wait for the delivery.
    let mut delivered = gate.delivered().await;
    for _ in 0..100 {
        if !delivered.is_empty() {
            break;
        }
        async_std::task::sleep(Duration::from_millis(10)).await;
        delivered = gate.delivered().await;
    }
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].bytes, bytes);

    gw.graceful_shutdown().await;
    Ok(())
}
