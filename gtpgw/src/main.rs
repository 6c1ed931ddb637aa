//! main - starts a single GTP-U tunneling gateway node

use anyhow::Result;
use async_std::channel::Sender;
use async_std::prelude::*;
use clap::Parser;
use gtpgw::{ChannelGate, Config, GTPU_PORT, GtpGateway, SystemInterfaces, load_topology_file};
use signal_hook::consts::signal::*;
use signal_hook_async_std::Signals;
use slog::{Drain, Logger, debug, o};
use std::net::IpAddr;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Role of this node: ENODEB, GNODEB, PGW, UPF or UPF_MEC.
    #[arg(long)]
    role: String,

    /// Node id of a base-station role.
    #[arg(long)]
    node_id: Option<u16>,

    /// Local IP address the tunnel transport binds.  Defaults to the eth0
    /// address.
    #[arg(long, default_value_t = local_ip_address::local_ip().unwrap())]
    local_ip: IpAddr,

    /// UDP port bound locally for the tunnel transport.
    #[arg(long, default_value_t = GTPU_PORT)]
    local_port: u16,

    /// UDP port of peer tunnel endpoints.
    #[arg(long, default_value_t = GTPU_PORT)]
    tunnel_peer_port: u16,

    /// Symbolic name of the core network gateway.
    #[arg(long)]
    gateway: Option<String>,

    /// Set when a base station has its core-side link connected.
    #[arg(long)]
    upstream_connected: bool,

    /// Name of the radio-side egress interface.
    #[arg(long)]
    egress_interface: Option<String>,

    /// Topology file for the in-process mobility registry.
    #[arg(long, default_value = "topology.toml")]
    topology: String,
}

#[async_std::main]
async fn main() -> Result<()> {
    exit_on_panic();
    let logger = init_logging();

    let args = Args::parse();
    let topology = Arc::new(load_topology_file(&args.topology, &logger)?);

    // Local deliveries leave on an abstract gate.  Standalone, that gate is
    // a channel drained below - the local network stack is a separate
    // concern.
    let (local_tx, local_rx) = async_channel::unbounded();
    let drain_logger = logger.new(o!("gate" => "local"));
    let _local_drain = async_std::task::spawn(async move {
        while let Ok(datagram) = local_rx.recv().await {
            debug!(drain_logger, "Local delivery of {:?}", datagram);
        }
    });

    let gw = GtpGateway::start(
        Config {
            ip_addr: args.local_ip,
            local_port: args.local_port,
            tunnel_peer_port: args.tunnel_peer_port,
            role: args.role,
            node_id: args.node_id,
            gateway_name: args.gateway,
            upstream_connected: args.upstream_connected,
            egress_interface: args.egress_interface,
        },
        topology.clone(),
        topology,
        Arc::new(SystemInterfaces),
        Arc::new(ChannelGate::new(local_tx)),
        logger,
    )
    .await?;

    wait_for_signal().await?;
    gw.graceful_shutdown().await;

    Ok(())
}

fn init_logging() -> Logger {
    // Use info level logging by default
    if std::env::var("RUST_LOG").is_err() {
        unsafe { std::env::set_var("RUST_LOG", "info") }
    }
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = slog_envlogger::new(drain);
    slog::Logger::root(drain, o!())
}

fn exit_on_panic() {
    let orig_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        orig_hook(panic_info);
        std::process::exit(1);
    }));
}

async fn wait_for_signal() -> Result<i32> {
    let signals = Signals::new([SIGHUP, SIGTERM, SIGINT, SIGQUIT])?;
    let handle = signals.handle();
    let (sig_sender, sig_receiver) = async_std::channel::unbounded();
    let signals_task = async_std::task::spawn(handle_signals(signals, sig_sender));
    let signal = sig_receiver.recv().await;
    handle.close();
    signals_task.await;
    Ok(signal?)
}

async fn handle_signals(signals: Signals, sig_sender: Sender<i32>) {
    let mut signals = signals.fuse();
    while let Some(signal) = signals.next().await {
        match signal {
            SIGHUP => {
                // Reload configuration
                // Reopen the log file
            }
            SIGTERM | SIGINT | SIGQUIT => {
                // Shutdown the system;
                let _ = sig_sender.send(signal).await;
            }
            _ => unreachable!(),
        }
    }
}
