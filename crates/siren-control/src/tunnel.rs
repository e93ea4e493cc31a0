//! WebSocket tunnel transport for sandboxed builds.
//!
//! Holds a connection to a local proxy process that speaks UDP on the
//! channel's behalf. Outbound frames leave as `udp_send` JSON
//! envelopes; inbound `udp_receive` envelopes are unwrapped into the
//! same data-received events the direct transport raises. Anything
//! else from the proxy is logged and dropped.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use siren_protocol::proxy;

use crate::error::ChannelError;
use crate::event::ChannelEvent;
use crate::transport::{warn_on_bad_frame, Transport};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

pub struct TunnelTransport {
    url: String,
    writer: Option<WsSink>,
    reader: Option<JoinHandle<()>>,
    /// Shared with the channel; the reader task flips it when the
    /// proxy closes on us, so the close notification fires exactly once
    /// whether teardown comes from our side or theirs.
    connected: Arc<AtomicBool>,
}

impl TunnelTransport {
    pub fn new(url: String, connected: Arc<AtomicBool>) -> Self {
        Self {
            url,
            writer: None,
            reader: None,
            connected,
        }
    }
}

#[async_trait]
impl Transport for TunnelTransport {
    async fn start(&mut self, events: mpsc::Sender<ChannelEvent>) -> Result<(), ChannelError> {
        self.shutdown().await;

        info!(url = %self.url, "connecting to UDP proxy");
        let (ws_stream, _response) = connect_async(&self.url)
            .await
            .map_err(|e| ChannelError::Tunnel(e.to_string()))?;

        let (writer, mut reader) = ws_stream.split();
        self.writer = Some(writer);

        // Record the up transition before the reader exists. A proxy
        // that closes immediately after the handshake must still
        // produce up-then-down, never a latched stale state.
        if !self.connected.swap(true, Ordering::SeqCst) {
            let _ = events.send(ChannelEvent::ConnectionChanged(true)).await;
        }

        let connected = Arc::clone(&self.connected);
        self.reader = Some(tokio::spawn(async move {
            while let Some(msg) = reader.next().await {
                match msg {
                    Ok(Message::Text(text)) => match proxy::decode_receive(&text) {
                        Some(datagram) => {
                            warn_on_bad_frame(&datagram.data, &datagram.address);
                            let event = ChannelEvent::DataReceived {
                                data: datagram.data,
                                from_address: datagram.address,
                                from_port: datagram.port,
                            };
                            if events.send(event).await.is_err() {
                                return;
                            }
                        }
                        None => {
                            debug!("ignoring non-datagram proxy message");
                        }
                    },
                    Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                    Ok(Message::Close(_)) => {
                        info!("proxy closed the tunnel");
                        break;
                    }
                    Ok(_) => {} // Binary, Frame
                    Err(e) => {
                        warn!("tunnel read error: {}", e);
                        let _ = events
                            .send(ChannelEvent::Error(format!("tunnel error: {}", e)))
                            .await;
                        break;
                    }
                }
            }

            if connected.swap(false, Ordering::SeqCst) {
                let _ = events.send(ChannelEvent::ConnectionChanged(false)).await;
            }
        }));

        Ok(())
    }

    async fn send_to(
        &mut self,
        data: &[u8],
        address: &str,
        port: u16,
    ) -> Result<(), ChannelError> {
        let writer = self.writer.as_mut().ok_or(ChannelError::NotStarted)?;

        let envelope = proxy::encode_send(address, port, data);
        writer
            .send(Message::Text(envelope))
            .await
            .map_err(|e| ChannelError::Tunnel(e.to_string()))
    }

    async fn shutdown(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.close().await;
        }
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        None // the proxy owns the socket
    }
}
