//! Transport-path scenarios: decapsulation and the terminal / edge-host /
//! default-gateway routing order.

use anyhow::Result;
use gtpgw::{decapsulate, encapsulate};
use gtpgw_tests::framework::*;
use gtpgw_tests::MockInterfaces;
use std::net::SocketAddr;

#[async_std::test]
async fn terminal_served_elsewhere_is_retunneled_to_its_station() -> Result<()> {
    // Terminal 9 is served by station 2; this node is station 1.
    let node = build_station(1)?;
    let inner = build_ipv4_udp_packet(external_addr(), terminal_addr());

    node.forwarder.handle_inbound(&encapsulate(0, &inner)?).await?;

    let sent = node.transport.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, SocketAddr::new(gnb2_ip(), TUNNEL_PORT));
    let (_, payload) = decapsulate(&sent[0].0)?;
    assert_eq!(payload, inner);
    assert!(node.gate.delivered().await.is_empty());
    Ok(())
}

#[async_std::test]
async fn terminal_served_here_is_delivered_locally() -> Result<()> {
    let mut config = station_config(2);
    config.egress_interface = Some("cellular".to_string());
    let node = build_node(
        &config,
        default_registry(),
        default_resolver(),
        MockInterfaces::default().with_interface("cellular", 7),
    )?;
    let inner = build_ipv4_udp_packet(external_addr(), terminal_addr());

    node.forwarder.handle_inbound(&encapsulate(0, &inner)?).await?;

    let delivered = node.gate.delivered().await;
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].bytes, inner);
    assert_eq!(delivered[0].egress_interface, Some(7));
    assert!(node.transport.sent().await.is_empty());
    Ok(())
}

#[async_std::test]
async fn edge_host_is_checked_before_the_gateway_fallback() -> Result<()> {
    let node = build_station(1)?;
    let inner = build_ipv4_udp_packet(terminal_addr(), edge_addr());

    node.forwarder.handle_inbound(&encapsulate(0, &inner)?).await?;

    let sent = node.transport.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, SocketAddr::new(edge_upf_ip(), TUNNEL_PORT));
    Ok(())
}

#[async_std::test]
async fn terminal_inside_an_edge_subnet_routes_to_its_station() -> Result<()> {
    // An address can be both a registered terminal and inside an edge-host
    // subnet; the terminal lookup wins, so the packet goes to the serving
    // station rather than the edge UPF.
    let terminal_in_edge_subnet = "10.5.1.7".parse()?;
    let node = build_node(
        &station_config(1),
        default_registry().with_terminal(terminal_in_edge_subnet, 11, 2),
        default_resolver(),
        MockInterfaces::default(),
    )?;
    let inner = build_ipv4_udp_packet(external_addr(), terminal_in_edge_subnet);

    node.forwarder.handle_inbound(&encapsulate(0, &inner)?).await?;

    let sent = node.transport.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, SocketAddr::new(gnb2_ip(), TUNNEL_PORT));
    assert!(node.gate.delivered().await.is_empty());
    Ok(())
}

#[async_std::test]
async fn zero_prefix_edge_subnet_matches_every_destination() -> Result<()> {
    // A /0 edge subnet is a catch-all: anything that is not a registered
    // terminal tunnels to its UPF instead of the default gateway.
    let node = build_node(
        &station_config(1),
        default_registry().with_edge_host("0.0.0.0".parse()?, 0, edge_upf_ip()),
        default_resolver(),
        MockInterfaces::default(),
    )?;
    let inner = build_ipv4_udp_packet(terminal_addr(), external_addr());

    node.forwarder.handle_inbound(&encapsulate(0, &inner)?).await?;

    let sent = node.transport.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, SocketAddr::new(edge_upf_ip(), TUNNEL_PORT));
    Ok(())
}

#[async_std::test]
async fn edge_upf_delivers_its_own_edge_traffic_locally() -> Result<()> {
    let node = build_node(
        &role_config("UPF_MEC"),
        default_registry(),
        default_resolver(),
        MockInterfaces::default(),
    )?;
    let inner = build_ipv4_udp_packet(terminal_addr(), edge_addr());

    node.forwarder.handle_inbound(&encapsulate(0, &inner)?).await?;

    let delivered = node.gate.delivered().await;
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].bytes, inner);
    assert_eq!(delivered[0].egress_interface, None);
    assert!(node.transport.sent().await.is_empty());
    Ok(())
}

#[async_std::test]
async fn gateway_role_exits_unmatched_traffic_locally() -> Result<()> {
    for role in ["PGW", "UPF"] {
        let node = build_node(
            &role_config(role),
            default_registry(),
            default_resolver(),
            MockInterfaces::default(),
        )?;
        let inner = build_ipv4_udp_packet(terminal_addr(), external_addr());

        node.forwarder.handle_inbound(&encapsulate(0, &inner)?).await?;

        assert_eq!(node.gate.delivered().await.len(), 1);
        assert!(node.transport.sent().await.is_empty());
    }
    Ok(())
}

#[async_std::test]
async fn station_defaults_unmatched_traffic_to_the_gateway() -> Result<()> {
    let node = build_station(1)?;
    let inner = build_ipv4_udp_packet(terminal_addr(), external_addr());

    node.forwarder.handle_inbound(&encapsulate(0, &inner)?).await?;

    let sent = node.transport.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, SocketAddr::new(gateway_ip(), TUNNEL_PORT));
    assert!(node.gate.delivered().await.is_empty());
    Ok(())
}

#[async_std::test]
async fn truncated_tunnel_packet_is_a_fault() -> Result<()> {
    let node = build_station(1)?;
    assert!(node.forwarder.handle_inbound(&[0u8; 4]).await.is_err());
    assert!(node.gate.delivered().await.is_empty());
    assert!(node.transport.sent().await.is_empty());
    Ok(())
}
