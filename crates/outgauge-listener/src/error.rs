//! Error types for the OutGauge listener.

use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// A datagram could not be turned into a [`TelemetryRecord`](crate::TelemetryRecord).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("OutGauge packet has wrong length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("OutGauge packet truncated: field `{field}` at offset {offset} is out of bounds")]
    Truncated { field: &'static str, offset: usize },
}

/// Errors surfaced by [`OutGaugeListener`](crate::OutGaugeListener).
#[derive(Error, Debug)]
pub enum ListenerError {
    #[error("Failed to bind OutGauge UDP socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("OutGauge UDP receive error: {0}")]
    Read(#[source] io::Error),

    #[error("Invalid listener configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("OutGauge receive task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

impl ListenerError {
    /// `true` for errors raised before any socket was opened.
    pub fn is_startup(&self) -> bool {
        matches!(self, Self::Bind { .. } | Self::InvalidConfig { .. })
    }
}
