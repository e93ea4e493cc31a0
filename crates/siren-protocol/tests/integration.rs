//! Integration tests for the siren-protocol crate.
//!
//! These exercise the public API across module boundaries: frames built
//! from the command table, registry lookups feeding addressing, and the
//! proxy envelope carrying real frames.

use siren_protocol::commands::Command;
use siren_protocol::frame::{bcc, build_frame, Frame, FRAME_LEN};
use siren_protocol::machines::{all_addresses, all_names, MachineId};
use siren_protocol::proxy::{decode_receive, encode_send};

// ---------------------------------------------------------------------------
// 1. Frame construction from the command table
// ---------------------------------------------------------------------------

#[test]
fn ask_synchro_reference_frame() {
    let frame = build_frame(&[Command::AskSynchro as u8]);
    assert_eq!(
        frame,
        [0x0A, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
    );
}

#[test]
fn volume_gene_payload() {
    let frame = build_frame(&[Command::VolumeGene as u8, 100]);
    assert_eq!(frame[3], 0x1F);
    assert_eq!(frame[4], 100);
    assert_eq!(frame[1], 0x1F ^ 100);
}

#[test]
fn every_command_frames_and_verifies() {
    for v in 0u8..=255 {
        let Some(cmd) = Command::from_u8(v) else {
            continue;
        };
        let frame = build_frame(&[cmd as u8, 1, 2, 3]);
        assert_eq!(frame.len(), FRAME_LEN);
        assert_eq!(frame[1] ^ bcc(&frame), 0, "BCC self-consistency for {:?}", cmd);

        let parsed = Frame::parse(&frame).expect("built frame should parse");
        assert_eq!(parsed.command(), Some(cmd));
        assert_eq!(parsed.args[..3], [1, 2, 3]);
    }
}

#[test]
fn corrupted_frame_fails_verification_parse() {
    let mut frame = build_frame(&[Command::SetSpeed as u8, 0x20]);
    frame[4] = 0x21; // single-bit-ish payload corruption
    assert!(Frame::parse(&frame).is_none());
}

// ---------------------------------------------------------------------------
// 2. Registry totality and defaults
// ---------------------------------------------------------------------------

#[test]
fn registry_total_over_valid_identifiers() {
    for v in 0u8..13 {
        assert!(MachineId::is_valid(v));
        let machine = MachineId::from_u8(v).unwrap();
        assert!(!machine.address().is_empty());
        assert!(!machine.name().is_empty());
        assert!(!machine.playlist_path().is_empty());
    }
    assert_eq!(all_addresses().len(), MachineId::COUNT);
    assert_eq!(all_names().len(), MachineId::COUNT);
}

#[test]
fn out_of_range_identifier_maps_to_control_host() {
    for v in [13u8, 99, 255] {
        assert!(!MachineId::is_valid(v));
        let machine = MachineId::from_u8_or_default(v);
        assert_eq!(machine.address(), MachineId::ControlHost.address());
        assert_eq!(machine.name(), MachineId::ControlHost.name());
        assert_eq!(machine.midi_path(), MachineId::ControlHost.midi_path());
    }
}

// ---------------------------------------------------------------------------
// 3. Proxy envelope carrying real frames
// ---------------------------------------------------------------------------

#[test]
fn frame_through_proxy_envelope_roundtrip() {
    let frame = build_frame(&[Command::NewList as u8, 7]);
    let json = encode_send(MachineId::Siren2.address(), siren_protocol::CONTROL_PORT, &frame);

    // Simulate the proxy echoing the datagram back as a udp_receive
    let echoed = json.replace("udp_send", "udp_receive");
    let datagram = decode_receive(&echoed).expect("echoed envelope should decode");

    assert_eq!(datagram.address, "192.168.1.12");
    assert_eq!(datagram.port, 4443);
    assert_eq!(datagram.data, frame);

    let parsed = Frame::parse(&datagram.data).expect("relayed frame should verify");
    assert_eq!(parsed.command(), Some(Command::NewList));
    assert_eq!(parsed.args[0], 7);
}

#[test]
fn unknown_envelope_type_produces_nothing() {
    let msg = r#"{"type":"stats","address":"1.2.3.4","port":4443,"data":"0a01"}"#;
    assert!(decode_receive(msg).is_none());
}
