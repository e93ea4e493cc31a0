//! Direct datagram transport for desktop builds.
//!
//! Binds the shared receive port with SO_REUSEADDR so several manager
//! processes can listen side by side, then drains inbound datagrams on
//! a spawned task, one event per datagram.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;

use async_trait::async_trait;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::error::ChannelError;
use crate::event::ChannelEvent;
use crate::transport::{warn_on_bad_frame, Transport};

/// Create the receive socket with the shared-address policy applied
/// before binding.
fn create_shared_socket(port: u16) -> std::io::Result<std::net::UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;

    // On macOS/BSD, sharing the port additionally needs SO_REUSEPORT
    #[cfg(any(target_os = "macos", target_os = "freebsd"))]
    socket.set_reuse_port(true)?;

    let addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port);
    socket.bind(&addr.into())?;

    socket.set_nonblocking(true)?;

    Ok(socket.into())
}

pub struct UdpTransport {
    receive_port: u16,
    socket: Option<Arc<UdpSocket>>,
    reader: Option<JoinHandle<()>>,
}

impl UdpTransport {
    pub fn new(receive_port: u16) -> Self {
        Self {
            receive_port,
            socket: None,
            reader: None,
        }
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn start(&mut self, events: mpsc::Sender<ChannelEvent>) -> Result<(), ChannelError> {
        // Re-initializing replaces the previous socket and reader
        self.shutdown().await;

        let std_socket =
            create_shared_socket(self.receive_port).map_err(|source| ChannelError::Bind {
                port: self.receive_port,
                source,
            })?;
        let socket = Arc::new(UdpSocket::from_std(std_socket).map_err(|source| {
            ChannelError::Bind {
                port: self.receive_port,
                source,
            }
        })?);

        info!(port = self.receive_port, "UDP socket bound");

        let reader_socket = Arc::clone(&socket);
        self.reader = Some(tokio::spawn(async move {
            let mut buf = [0u8; 1500]; // MTU-sized buffer
            loop {
                match reader_socket.recv_from(&mut buf).await {
                    Ok((len, addr)) => {
                        let data = buf[..len].to_vec();
                        let from_address = addr.ip().to_string();
                        warn_on_bad_frame(&data, &from_address);
                        debug!(bytes = len, from = %addr, "datagram received");

                        let event = ChannelEvent::DataReceived {
                            data,
                            from_address,
                            from_port: addr.port(),
                        };
                        if events.send(event).await.is_err() {
                            return; // consumer dropped the receiver
                        }
                    }
                    Err(e) => {
                        error!("receive error: {}", e);
                        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                    }
                }
            }
        }));

        self.socket = Some(socket);
        Ok(())
    }

    async fn send_to(
        &mut self,
        data: &[u8],
        address: &str,
        port: u16,
    ) -> Result<(), ChannelError> {
        let socket = self.socket.as_ref().ok_or(ChannelError::NotStarted)?;

        let sent = socket.send_to(data, (address, port)).await?;
        if sent != data.len() {
            return Err(ChannelError::ShortSend {
                sent,
                expected: data.len(),
            });
        }
        Ok(())
    }

    async fn shutdown(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        self.socket = None;
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }
}
