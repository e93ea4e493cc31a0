//! Command channel to the siren controllers.
//!
//! One logical connection to one remote machine at a time. Domain
//! commands are framed into the 10-byte wire format and pushed through
//! whichever transport the channel was constructed with: a direct UDP
//! socket, or a WebSocket tunnel to a local UDP proxy for sandboxed
//! deployments. Inbound datagrams and lifecycle changes surface on an
//! event stream rather than callbacks.

pub mod channel;
pub mod config;
pub mod error;
pub mod event;
pub mod transport;
pub mod tunnel;
pub mod udp;

pub use channel::ControlChannel;
pub use config::{ControlConfig, NetworkSection, TransportKind};
pub use error::ChannelError;
pub use event::ChannelEvent;
