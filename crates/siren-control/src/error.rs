use thiserror::Error;

/// Everything that can go wrong on the channel. None of these are
/// fatal: each is logged, surfaced as an [`Error`] event, and the
/// channel stays usable for the next call.
///
/// [`Error`]: crate::event::ChannelEvent::Error
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("failed to bind UDP socket on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to send UDP packet: {0}")]
    Send(#[from] std::io::Error),

    #[error("short UDP send: wrote {sent} of {expected} bytes")]
    ShortSend { sent: usize, expected: usize },

    #[error("tunnel error: {0}")]
    Tunnel(String),

    #[error("transport not started")]
    NotStarted,
}
