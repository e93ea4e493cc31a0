use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::ChannelError;
use crate::event::ChannelEvent;

/// What the channel needs from a wire: start it, push bytes at an
/// address, tear it down. Inbound datagrams are delivered as
/// [`ChannelEvent::DataReceived`] on the sender given to `start`.
///
/// The implementation is picked once when the channel is built
/// ([`TransportKind`]); a running channel never switches transports.
///
/// [`TransportKind`]: crate::config::TransportKind
#[async_trait]
pub trait Transport: Send {
    /// Bind the socket or complete the tunnel handshake, and spawn the
    /// receive loop feeding `events`.
    async fn start(&mut self, events: mpsc::Sender<ChannelEvent>) -> Result<(), ChannelError>;

    /// Best-effort transmit of one datagram. No retry, no ack.
    async fn send_to(&mut self, data: &[u8], address: &str, port: u16)
        -> Result<(), ChannelError>;

    /// Close the transport and stop the receive loop. Safe to call when
    /// never started.
    async fn shutdown(&mut self);

    /// Local address of the receive socket, where applicable.
    fn local_addr(&self) -> Option<SocketAddr>;
}

/// Log a warning when a datagram that claims to be a command frame
/// fails its checksum. The raw bytes are still delivered; the UI layer
/// decides what to do with them.
pub(crate) fn warn_on_bad_frame(data: &[u8], from: &str) {
    use siren_protocol::frame::{Frame, FRAME_LEN, LENGTH_MARKER};

    if data.len() == FRAME_LEN && data[0] == LENGTH_MARKER && Frame::parse(data).is_none() {
        tracing::warn!(from = %from, "inbound frame failed BCC verification");
    }
}
