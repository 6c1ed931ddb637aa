use super::{AddressResolver, InterfaceTable};
use crate::{Config, NodeId, NodeRole};
use anyhow::{Context, Result, ensure};
use slog::{Logger, info};
use std::net::IpAddr;

/// Identity of the local node, immutable after bootstrap.
#[derive(Debug, Clone)]
pub struct NodeIdentity {
    pub role: NodeRole,
    pub node_id: Option<NodeId>,
    /// Core gateway address, resolved at most once per node lifetime.
    pub gateway_addr: Option<IpAddr>,
    /// Interface id for radio-side local deliveries.
    pub radio_interface: Option<u32>,
}

impl NodeIdentity {
    pub fn bootstrap(
        config: &Config,
        addresses: &dyn AddressResolver,
        interfaces: &dyn InterfaceTable,
        logger: &Logger,
    ) -> Result<Self> {
        let role: NodeRole = config.role.parse()?;

        // Nodes that may have to tunnel toward the core gateway resolve its
        // address now and reuse it for every packet: a base station with a
        // connected core-side link, or the edge UPF.
        let mut gateway_addr = None;
        if !role.is_core_gateway() {
            let connected_station = role.is_base_station() && config.upstream_connected;
            if connected_station || role == NodeRole::EdgeUserPlaneFunction {
                let name = config
                    .gateway_name
                    .as_deref()
                    .context("No core gateway name configured")?;
                let addr = addresses.resolve(name)?;
                info!(logger, "Resolved core gateway {name} to {addr}");
                gateway_addr = Some(addr);
            }
        }

        let node_id = if role.is_base_station() {
            ensure!(
                config.node_id.is_some(),
                "Base station role requires a node id"
            );
            config.node_id
        } else {
            None
        };

        let radio_interface = match &config.egress_interface {
            Some(name) => Some(
                interfaces
                    .interface_id(name)
                    .with_context(|| format!("Interface '{name}' does not exist"))?,
            ),
            None => None,
        };

        Ok(NodeIdentity {
            role,
            node_id,
            gateway_addr,
            radio_interface,
        })
    }
}
