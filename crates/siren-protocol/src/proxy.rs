//! JSON envelope spoken with the local UDP proxy.
//!
//! Sandboxed builds cannot open raw datagram sockets; they hold a
//! WebSocket to a proxy process that sends and receives UDP on their
//! behalf. Frames travel hex-encoded inside text messages.

use serde::{Deserialize, Serialize};

/// Text message exchanged with the proxy, tagged on `"type"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProxyEnvelope {
    #[serde(rename = "udp_send")]
    UdpSend {
        address: String,
        port: u16,
        data: String,
    },
    #[serde(rename = "udp_receive")]
    UdpReceive {
        address: String,
        port: u16,
        data: String,
    },
}

/// A datagram relayed by the proxy, payload already hex-decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayedDatagram {
    pub data: Vec<u8>,
    pub address: String,
    pub port: u16,
}

/// Encode an outbound datagram as a `udp_send` envelope.
pub fn encode_send(address: &str, port: u16, payload: &[u8]) -> String {
    let envelope = ProxyEnvelope::UdpSend {
        address: address.to_string(),
        port,
        data: hex::encode(payload),
    };
    // The envelope contains only strings and integers, serialization
    // cannot fail
    serde_json::to_string(&envelope).unwrap_or_default()
}

/// Decode an inbound proxy message.
///
/// Returns the relayed datagram for a well-formed `udp_receive`
/// envelope; `None` for any other envelope type, malformed JSON, or a
/// payload that is not valid hex. Callers drop those silently.
pub fn decode_receive(text: &str) -> Option<RelayedDatagram> {
    match serde_json::from_str::<ProxyEnvelope>(text).ok()? {
        ProxyEnvelope::UdpReceive {
            address,
            port,
            data,
        } => {
            let data = hex::decode(&data).ok()?;
            Some(RelayedDatagram {
                data,
                address,
                port,
            })
        }
        ProxyEnvelope::UdpSend { .. } => None,
    }
}
