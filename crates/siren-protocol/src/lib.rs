pub mod commands;
pub mod frame;
pub mod machines;
pub mod proxy;

/// UDP port the siren controllers listen on (command direction)
pub const CONTROL_PORT: u16 = 4443;

/// Local port the manager binds for controller replies
pub const RECEIVE_PORT: u16 = 4444;

/// Ports used by the file-transfer tooling; the registry is their
/// lookup source for addresses and credentials
pub const SSH_PORT: u16 = 22;
pub const FTP_PORT: u16 = 21;

/// UDP proxy endpoint for sandboxed builds without raw socket access
pub const DEFAULT_PROXY_URL: &str = "ws://localhost:8006/udp-proxy";
