//! The command channel proper: one current target, one transport,
//! one event stream.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use siren_protocol::commands::Command;
use siren_protocol::frame::build_frame;
use siren_protocol::machines::MachineId;

use crate::config::{ControlConfig, TransportKind};
use crate::event::ChannelEvent;
use crate::transport::Transport;
use crate::tunnel::TunnelTransport;
use crate::udp::UdpTransport;

/// Capacity of the event stream. The UI consumer is expected to keep
/// up; events beyond a full buffer are dropped with a warning.
const EVENT_QUEUE_DEPTH: usize = 64;

/// Channel to the siren controllers.
///
/// Owns its transport for its lifetime and tracks a single current
/// target. Methods take `&mut self`: invocation is sequential,
/// UI-driven, and a target switch in [`send_command_to_machine`] is a
/// state transition observable as an `AddressChanged` event, not a
/// per-call parameter.
///
/// [`send_command_to_machine`]: ControlChannel::send_command_to_machine
pub struct ControlChannel {
    transport: Box<dyn Transport>,
    address: String,
    port: u16,
    target_machine: MachineId,
    connected: Arc<AtomicBool>,
    events_tx: mpsc::Sender<ChannelEvent>,
}

impl ControlChannel {
    /// Build a channel from config. The transport implementation is
    /// fixed here and never switches at runtime. Returns the channel
    /// and the receiving end of its event stream.
    pub fn new(config: &ControlConfig) -> (Self, mpsc::Receiver<ChannelEvent>) {
        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
        let connected = Arc::new(AtomicBool::new(false));

        let transport: Box<dyn Transport> = match config.network.transport {
            TransportKind::Udp => Box::new(UdpTransport::new(config.network.receive_port)),
            TransportKind::Tunnel => Box::new(TunnelTransport::new(
                config.network.proxy_url.clone(),
                Arc::clone(&connected),
            )),
        };

        let channel = Self {
            transport,
            address: config.network.target_address.clone(),
            port: config.network.control_port,
            target_machine: MachineId::ControlHost,
            connected,
            events_tx,
        };
        (channel, events_rx)
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn target_machine(&self) -> MachineId {
        self.target_machine
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Local address of the receive socket (direct UDP only).
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.transport.local_addr()
    }

    /// Switch the current target address. Emits `AddressChanged` only
    /// on an actual change.
    pub fn set_address(&mut self, address: &str) {
        if self.address != address {
            self.address = address.to_string();
            self.emit(ChannelEvent::AddressChanged(self.address.clone()));
        }
    }

    /// Switch the current target port. Emits `PortChanged` only on an
    /// actual change.
    pub fn set_port(&mut self, port: u16) {
        if self.port != port {
            self.port = port;
            self.emit(ChannelEvent::PortChanged(port));
        }
    }

    /// Start the transport: bind the receive socket, or open the proxy
    /// handshake. Failures are non-fatal; the caller may retry.
    pub async fn initialize(&mut self) {
        // A restart while connected counts as a teardown first
        if self.connected.swap(false, Ordering::SeqCst) {
            self.emit(ChannelEvent::ConnectionChanged(false));
        }

        match self.transport.start(self.events_tx.clone()).await {
            Ok(()) => {
                // The tunnel transport flips the shared flag itself
                // during start; the swap keeps the notification
                // single-shot either way.
                if !self.connected.swap(true, Ordering::SeqCst) {
                    self.emit(ChannelEvent::ConnectionChanged(true));
                }
            }
            Err(e) => {
                warn!(error = %e, "transport start failed");
                self.emit(ChannelEvent::Error(e.to_string()));
            }
        }
    }

    /// Set the target, then start the transport.
    pub async fn connect_to_host(&mut self, address: &str, port: u16) {
        self.set_address(address);
        self.set_port(port);
        self.initialize().await;
    }

    /// Tear the transport down. Idempotent: the connection-changed
    /// notification fires only when the channel was actually connected.
    pub async fn disconnect(&mut self) {
        self.transport.shutdown().await;
        if self.connected.swap(false, Ordering::SeqCst) {
            self.emit(ChannelEvent::ConnectionChanged(false));
        }
    }

    /// Frame an opcode plus up to six argument bytes and transmit to
    /// the current target. Best-effort: a failure is logged and raised
    /// as an `Error` event, never returned.
    pub async fn send_command(&mut self, command: Command, args: &[u8]) {
        let mut payload = Vec::with_capacity(1 + args.len());
        payload.push(command as u8);
        payload.extend_from_slice(args);

        let frame = build_frame(&payload);
        debug!(command = ?command, to = %self.address, port = self.port, "sending command");

        if let Err(e) = self
            .transport
            .send_to(&frame, &self.address, self.port)
            .await
        {
            warn!(error = %e, command = ?command, "send failed");
            self.emit(ChannelEvent::Error(e.to_string()));
        }
    }

    /// Resolve the machine's address through the registry, make it the
    /// current target, then send. The switch persists for subsequent
    /// [`send_command`] calls.
    ///
    /// [`send_command`]: ControlChannel::send_command
    pub async fn send_command_to_machine(
        &mut self,
        machine: MachineId,
        command: Command,
        args: &[u8],
    ) {
        self.set_address(machine.address());
        self.target_machine = machine;
        self.send_command(command, args).await;
    }

    // -- Convenience wrappers over the common opcodes --

    pub async fn ask_synchro(&mut self, machine: MachineId) {
        self.send_command_to_machine(machine, Command::AskSynchro, &[])
            .await;
    }

    pub async fn new_list(&mut self, machine: MachineId, list_index: u8) {
        self.send_command_to_machine(machine, Command::NewList, &[list_index])
            .await;
    }

    pub async fn set_loop(&mut self, machine: MachineId, enabled: bool) {
        self.send_command_to_machine(machine, Command::Boucle, &[enabled as u8])
            .await;
    }

    pub async fn start(&mut self, machine: MachineId) {
        self.send_command_to_machine(machine, Command::Start, &[])
            .await;
    }

    pub async fn stop(&mut self, machine: MachineId) {
        self.send_command_to_machine(machine, Command::Stop, &[])
            .await;
    }

    pub async fn reset(&mut self, machine: MachineId) {
        self.send_command_to_machine(machine, Command::Reset, &[])
            .await;
    }

    pub async fn set_reverse(&mut self, machine: MachineId, enabled: bool) {
        self.send_command_to_machine(machine, Command::Reverse, &[enabled as u8])
            .await;
    }

    pub async fn set_speed(&mut self, machine: MachineId, speed: i8) {
        self.send_command_to_machine(machine, Command::SetSpeed, &[speed as u8])
            .await;
    }

    pub async fn set_transpose(&mut self, machine: MachineId, semitones: i8) {
        self.send_command_to_machine(machine, Command::Transpo, &[semitones as u8])
            .await;
    }

    pub async fn set_volume(&mut self, machine: MachineId, volume: u8) {
        self.send_command_to_machine(machine, Command::Volume, &[volume])
            .await;
    }

    pub async fn set_mute(&mut self, machine: MachineId, muted: bool) {
        self.send_command_to_machine(machine, Command::Mute, &[muted as u8])
            .await;
    }

    /// Installation-wide volume. Always addressed to the control host,
    /// whatever the currently selected machine.
    pub async fn set_global_volume(&mut self, volume: u8) {
        self.send_command_to_machine(MachineId::ControlHost, Command::VolumeGene, &[volume])
            .await;
    }

    fn emit(&self, event: ChannelEvent) {
        if self.events_tx.try_send(event).is_err() {
            warn!("event queue full, notification dropped");
        }
    }
}
