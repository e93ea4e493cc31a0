/// Notifications raised by the channel, delivered in order on the
/// receiver handed out at construction. State-change events fire at
/// most once per actual change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Transport came up or went down
    ConnectionChanged(bool),
    /// Current target address switched
    AddressChanged(String),
    /// Current target port switched
    PortChanged(u16),
    /// One inbound datagram, raw bytes as received
    DataReceived {
        data: Vec<u8>,
        from_address: String,
        from_port: u16,
    },
    /// A non-fatal failure, human-readable
    Error(String),
}
