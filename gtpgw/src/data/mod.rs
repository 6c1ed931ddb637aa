mod config;
mod datagram;
mod flow;
mod role;
mod topology;

pub use config::*;
pub use datagram::*;
pub use flow::*;
pub use role::*;
pub use topology::*;
