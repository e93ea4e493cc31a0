//! Channel tests over real loopback sockets.
//!
//! The channel binds an ephemeral receive port (port 0 in config) so
//! tests never collide; a plain tokio UDP socket plays the part of a
//! siren controller on the other end.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

use siren_control::{ChannelEvent, ControlChannel, ControlConfig, TransportKind};
use siren_protocol::commands::Command;
use siren_protocol::machines::MachineId;
use siren_protocol::proxy;

fn test_config() -> ControlConfig {
    let mut config = ControlConfig::default();
    config.network.receive_port = 0; // ephemeral, avoids collisions
    config
}

fn tunnel_config(port: u16) -> ControlConfig {
    let mut config = ControlConfig::default();
    config.network.transport = TransportKind::Tunnel;
    config.network.proxy_url = format!("ws://127.0.0.1:{}/udp-proxy", port);
    config
}

/// Pull events until one matches, within a deadline.
async fn wait_for<F>(rx: &mut mpsc::Receiver<ChannelEvent>, mut pred: F) -> ChannelEvent
where
    F: FnMut(&ChannelEvent) -> bool,
{
    timeout(Duration::from_secs(2), async {
        loop {
            let event = rx.recv().await.expect("event stream closed");
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

#[tokio::test]
async fn send_command_emits_reference_frame() {
    let peer = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let peer_addr = peer.local_addr().unwrap();

    let (mut channel, mut events) = ControlChannel::new(&test_config());
    channel
        .connect_to_host(&peer_addr.ip().to_string(), peer_addr.port())
        .await;

    wait_for(&mut events, |e| {
        matches!(e, ChannelEvent::ConnectionChanged(true))
    })
    .await;

    channel.send_command(Command::AskSynchro, &[]).await;

    let mut buf = [0u8; 32];
    let (len, _) = timeout(Duration::from_secs(2), peer.recv_from(&mut buf))
        .await
        .expect("no datagram arrived")
        .unwrap();

    assert_eq!(
        &buf[..len],
        &[0x0A, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
    );
}

#[tokio::test]
async fn convenience_wrapper_encodes_arguments() {
    let peer = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let peer_addr = peer.local_addr().unwrap();

    let (mut channel, mut events) = ControlChannel::new(&test_config());
    channel
        .connect_to_host(&peer_addr.ip().to_string(), peer_addr.port())
        .await;
    wait_for(&mut events, |e| {
        matches!(e, ChannelEvent::ConnectionChanged(true))
    })
    .await;

    channel.send_command(Command::NewList, &[3]).await;

    let mut buf = [0u8; 32];
    let (len, _) = timeout(Duration::from_secs(2), peer.recv_from(&mut buf))
        .await
        .expect("no datagram arrived")
        .unwrap();

    assert_eq!(len, 10);
    assert_eq!(buf[0], 0x0A);
    assert_eq!(buf[1], 0x02 ^ 3); // BCC over opcode + index + padding
    assert_eq!(buf[3], Command::NewList as u8);
    assert_eq!(buf[4], 3);
}

#[tokio::test]
async fn send_to_machine_switches_current_target() {
    let (mut channel, mut events) = ControlChannel::new(&test_config());
    channel.initialize().await;
    wait_for(&mut events, |e| {
        matches!(e, ChannelEvent::ConnectionChanged(true))
    })
    .await;

    channel
        .send_command_to_machine(MachineId::Siren1, Command::Start, &[])
        .await;

    // The switch is a persistent state transition, not a per-call
    // parameter
    assert_eq!(channel.address(), "192.168.1.11");
    assert_eq!(channel.target_machine(), MachineId::Siren1);

    let event = wait_for(&mut events, |e| {
        matches!(e, ChannelEvent::AddressChanged(_))
    })
    .await;
    assert_eq!(
        event,
        ChannelEvent::AddressChanged("192.168.1.11".to_string())
    );
}

#[tokio::test]
async fn global_volume_always_targets_control_host() {
    let (mut channel, _events) = ControlChannel::new(&test_config());
    channel.initialize().await;

    // Select some other machine first
    channel
        .send_command_to_machine(MachineId::CarA, Command::Stop, &[])
        .await;
    assert_eq!(channel.address(), "192.168.1.50");

    channel.set_global_volume(100).await;
    assert_eq!(channel.address(), MachineId::ControlHost.address());
    assert_eq!(channel.target_machine(), MachineId::ControlHost);
}

#[tokio::test]
async fn disconnect_is_idempotent() {
    let (mut channel, mut events) = ControlChannel::new(&test_config());
    channel.initialize().await;
    wait_for(&mut events, |e| {
        matches!(e, ChannelEvent::ConnectionChanged(true))
    })
    .await;

    channel.disconnect().await;
    assert!(!channel.is_connected());
    wait_for(&mut events, |e| {
        matches!(e, ChannelEvent::ConnectionChanged(false))
    })
    .await;

    // A second teardown raises nothing
    channel.disconnect().await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn disconnect_before_connect_raises_nothing() {
    let (mut channel, mut events) = ControlChannel::new(&test_config());

    channel.disconnect().await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!channel.is_connected());
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn inbound_datagram_raises_data_received() {
    let (mut channel, mut events) = ControlChannel::new(&test_config());
    channel.initialize().await;
    wait_for(&mut events, |e| {
        matches!(e, ChannelEvent::ConnectionChanged(true))
    })
    .await;

    let local = channel.local_addr().expect("UDP transport has a socket");

    let peer = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let reply = [0x0A, 0x05, 0x00, 0x05, 0, 0, 0, 0, 0, 0]; // IsSynchro
    peer.send_to(&reply, ("127.0.0.1", local.port()))
        .await
        .unwrap();

    let event = wait_for(&mut events, |e| {
        matches!(e, ChannelEvent::DataReceived { .. })
    })
    .await;

    let ChannelEvent::DataReceived {
        data,
        from_address,
        from_port,
    } = event
    else {
        unreachable!();
    };
    assert_eq!(data, reply);
    assert_eq!(from_address, "127.0.0.1");
    assert_eq!(from_port, peer.local_addr().unwrap().port());
}

#[tokio::test]
async fn one_event_per_datagram() {
    let (mut channel, mut events) = ControlChannel::new(&test_config());
    channel.initialize().await;
    wait_for(&mut events, |e| {
        matches!(e, ChannelEvent::ConnectionChanged(true))
    })
    .await;

    let local = channel.local_addr().unwrap();
    let peer = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    for i in 0u8..5 {
        peer.send_to(&[i, i, i], ("127.0.0.1", local.port()))
            .await
            .unwrap();
    }

    for i in 0u8..5 {
        let event = wait_for(&mut events, |e| {
            matches!(e, ChannelEvent::DataReceived { .. })
        })
        .await;
        let ChannelEvent::DataReceived { data, .. } = event else {
            unreachable!();
        };
        assert_eq!(data, vec![i, i, i], "arrival order preserved");
    }
}

#[tokio::test]
async fn set_address_emits_only_on_change() {
    let (mut channel, mut events) = ControlChannel::new(&test_config());

    let initial = channel.address().to_string();
    channel.set_address(&initial);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(events.try_recv().is_err(), "no event for a no-op switch");

    channel.set_address("10.0.0.1");
    let event = wait_for(&mut events, |e| {
        matches!(e, ChannelEvent::AddressChanged(_))
    })
    .await;
    assert_eq!(event, ChannelEvent::AddressChanged("10.0.0.1".to_string()));
}

// --- WebSocket tunnel transport -------------------------------------
//
// A loopback tokio-tungstenite server stands in for the UDP proxy, so
// these exercise the real connect/split/reader path, not just the
// envelope codec.

#[tokio::test]
async fn tunnel_relays_envelopes_both_ways() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let proxy_task = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

        // An envelope type the channel must drop, then a real datagram
        ws.send(Message::Text(
            r#"{"type":"stats","address":"1.2.3.4","port":4443,"data":"ff"}"#.to_string(),
        ))
        .await
        .unwrap();
        ws.send(Message::Text(
            r#"{"type":"udp_receive","address":"192.168.1.11","port":4443,"data":"0a050005000000000000"}"#
                .to_string(),
        ))
        .await
        .unwrap();

        // The channel's outbound command arrives as a udp_send envelope
        let outbound = loop {
            match ws.next().await.expect("channel hung up").unwrap() {
                Message::Text(text) => break text,
                _ => continue,
            }
        };

        ws.close(None).await.unwrap();
        outbound
    });

    let (mut channel, mut events) = ControlChannel::new(&tunnel_config(port));
    channel.initialize().await;
    wait_for(&mut events, |e| {
        matches!(e, ChannelEvent::ConnectionChanged(true))
    })
    .await;
    assert!(channel.is_connected());

    // Exactly one data event: the udp_receive, not the unknown type
    let event = wait_for(&mut events, |e| {
        matches!(e, ChannelEvent::DataReceived { .. })
    })
    .await;
    let ChannelEvent::DataReceived {
        data,
        from_address,
        from_port,
    } = event
    else {
        unreachable!();
    };
    assert_eq!(data, [0x0A, 0x05, 0x00, 0x05, 0, 0, 0, 0, 0, 0]);
    assert_eq!(from_address, "192.168.1.11");
    assert_eq!(from_port, 4443);

    channel.send_command(Command::AskSynchro, &[]).await;

    let outbound = timeout(Duration::from_secs(2), proxy_task)
        .await
        .expect("proxy task stalled")
        .unwrap();
    // Re-tag the envelope so the decode helper can unwrap it
    let datagram = proxy::decode_receive(&outbound.replace("udp_send", "udp_receive"))
        .expect("outbound message is a udp_send envelope");
    assert_eq!(datagram.address, channel.address());
    assert_eq!(datagram.port, channel.port());
    assert_eq!(
        datagram.data,
        [0x0A, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
    );

    // The proxy closed after replying: exactly one down notification
    wait_for(&mut events, |e| {
        matches!(e, ChannelEvent::ConnectionChanged(false))
    })
    .await;
    assert!(!channel.is_connected());

    channel.disconnect().await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    while let Ok(event) = events.try_recv() {
        assert!(
            !matches!(
                event,
                ChannelEvent::ConnectionChanged(_) | ChannelEvent::DataReceived { .. }
            ),
            "unexpected late event: {:?}",
            event
        );
    }
}

#[tokio::test]
async fn tunnel_closed_by_proxy_reports_down_exactly_once() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let proxy_task = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        // Close immediately after the handshake
        ws.close(None).await.unwrap();
    });

    let (mut channel, mut events) = ControlChannel::new(&tunnel_config(port));
    channel.initialize().await;

    // Up is reported before down even when the proxy drops us right
    // away, and the channel never latches a stale connected state
    wait_for(&mut events, |e| {
        matches!(e, ChannelEvent::ConnectionChanged(true))
    })
    .await;
    wait_for(&mut events, |e| {
        matches!(e, ChannelEvent::ConnectionChanged(false))
    })
    .await;
    assert!(!channel.is_connected());

    channel.disconnect().await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    while let Ok(event) = events.try_recv() {
        assert!(
            !matches!(event, ChannelEvent::ConnectionChanged(_)),
            "duplicate connection notification: {:?}",
            event
        );
    }

    proxy_task.await.unwrap();
}
