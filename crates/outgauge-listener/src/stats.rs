//! Receive-loop counters.
//!
//! The loop increments these with `Ordering::Relaxed`; the handle reads a
//! [`ListenerStats`] snapshot. Values are eventually consistent with each other.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot returned by [`OutGaugeListener::stats`](crate::OutGaugeListener::stats).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListenerStats {
    /// Datagrams read from the socket, whatever their size
    pub datagrams_received: u64,
    /// Datagrams ignored because they were not exactly one packet long
    pub datagrams_discarded: u64,
    /// Correctly sized datagrams the decoder rejected
    pub decode_failures: u64,
    /// Records handed to the queue
    pub records_delivered: u64,
    /// Records lost because the queue was full
    pub records_dropped: u64,
}

#[derive(Debug, Default)]
pub(crate) struct ListenerCounters {
    datagrams_received: AtomicU64,
    datagrams_discarded: AtomicU64,
    decode_failures: AtomicU64,
    records_delivered: AtomicU64,
    records_dropped: AtomicU64,
}

impl ListenerCounters {
    #[inline]
    pub(crate) fn inc_received(&self) {
        self.datagrams_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_discarded(&self) {
        self.datagrams_discarded.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_delivered(&self) {
        self.records_delivered.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_dropped(&self) {
        self.records_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> ListenerStats {
        ListenerStats {
            datagrams_received: self.datagrams_received.load(Ordering::Relaxed),
            datagrams_discarded: self.datagrams_discarded.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            records_delivered: self.records_delivered.load(Ordering::Relaxed),
            records_dropped: self.records_dropped.load(Ordering::Relaxed),
        }
    }
}

impl ListenerStats {
    /// Datagrams that did not become a queued record.
    pub fn lost(&self) -> u64 {
        self.datagrams_discarded
            .saturating_add(self.decode_failures)
            .saturating_add(self.records_dropped)
    }
}
