use anyhow::bail;
use std::str::FromStr;

/// Role of the node hosting this gateway.  Fixed for the lifetime of the
/// node; parsed once at startup from the deployment configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    BaseStation4G,
    BaseStation5G,
    CoreGateway,
    UserPlaneFunction,
    EdgeUserPlaneFunction,
}

impl NodeRole {
    pub fn is_base_station(self) -> bool {
        matches!(self, NodeRole::BaseStation4G | NodeRole::BaseStation5G)
    }

    /// Roles that sit on the boundary to external networks and therefore
    /// terminate tunnels rather than forwarding to a gateway.
    pub fn is_core_gateway(self) -> bool {
        matches!(self, NodeRole::CoreGateway | NodeRole::UserPlaneFunction)
    }
}

impl FromStr for NodeRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ENODEB" => NodeRole::BaseStation4G,
            "GNODEB" => NodeRole::BaseStation5G,
            "PGW" => NodeRole::CoreGateway,
            "UPF" => NodeRole::UserPlaneFunction,
            "UPF_MEC" => NodeRole::EdgeUserPlaneFunction,
            other => bail!("Unknown node role '{other}'"),
        })
    }
}
